mod ht001_doctype;
pub mod ht002_tag_nesting;
mod ht003_malformed_tag;
mod ht004_nested_angle;
mod ht005_unmatched_quote;
pub mod ht006_tag_typo;
mod ht007_duplicate_id;

pub use ht001_doctype::HT001Doctype;
pub use ht002_tag_nesting::{HT002TagNesting, NestingValidator, OpenTagFrame};
pub use ht003_malformed_tag::HT003MalformedTag;
pub use ht004_nested_angle::HT004NestedAngle;
pub use ht005_unmatched_quote::HT005UnmatchedQuote;
pub use ht006_tag_typo::{HT006Config, HT006TagTypo};
pub use ht007_duplicate_id::HT007DuplicateId;

use crate::config::GlobalConfig;
use crate::rule::Rule;
use crate::types::{Category, Diagnostic};

/// Returns all rule instances for config validation and CLI
pub fn all_rules(config: &crate::config::Config) -> Vec<Box<dyn Rule>> {
    type RuleCtor = fn(&crate::config::Config) -> Box<dyn Rule>;
    const RULES: &[(&str, RuleCtor)] = &[
        ("HT001", HT001Doctype::from_config),
        ("HT002", HT002TagNesting::from_config),
        ("HT003", HT003MalformedTag::from_config),
        ("HT004", HT004NestedAngle::from_config),
        ("HT005", HT005UnmatchedQuote::from_config),
        ("HT006", HT006TagTypo::from_config),
        ("HT007", HT007DuplicateId::from_config),
    ];
    RULES.iter().map(|(_, ctor)| ctor(config)).collect()
}

fn names_match(names: &[String], code: &str, category: Category) -> bool {
    names.iter().any(|name| {
        let name = name.trim();
        name.eq_ignore_ascii_case(code) || name.eq_ignore_ascii_case(category.as_str())
    })
}

/// Whether diagnostics of `category` survive the `[global]` enable/disable lists.
///
/// Names may be rule codes or category names. `disable = ["all"]` turns
/// everything off except what `enable` names explicitly.
pub fn category_enabled(global_config: &GlobalConfig, category: Category) -> bool {
    let code = category.rule_code();
    let disable_all = global_config.disable.iter().any(|n| n.trim().eq_ignore_ascii_case("all"));
    let explicitly_enabled = names_match(&global_config.enable, code, category);

    if disable_all {
        return explicitly_enabled;
    }
    if !global_config.enable.is_empty() && !explicitly_enabled {
        return false;
    }
    !names_match(&global_config.disable, code, category)
}

/// Keep the rules that can still emit at least one enabled category
pub fn filter_rules(rules: &[Box<dyn Rule>], global_config: &GlobalConfig) -> Vec<Box<dyn Rule>> {
    rules
        .iter()
        .filter(|rule| {
            rule.categories()
                .iter()
                .any(|&category| category_enabled(global_config, category))
        })
        .map(|rule| dyn_clone::clone_box(&**rule))
        .collect()
}

/// Drop diagnostics whose category was disabled even though their rule runs
pub fn filter_diagnostics(diagnostics: Vec<Diagnostic>, global_config: &GlobalConfig) -> Vec<Diagnostic> {
    if global_config.enable.is_empty() && global_config.disable.is_empty() {
        return diagnostics;
    }
    diagnostics
        .into_iter()
        .filter(|d| category_enabled(global_config, d.category))
        .collect()
}
