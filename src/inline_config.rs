//! Inline configuration comment handling
//!
//! Supports:
//! - `<!-- tagcheck-disable -->` - Disable all rules from this point
//! - `<!-- tagcheck-enable -->` - Re-enable all rules from this point
//! - `<!-- tagcheck-disable HT002 duplicate-id -->` - Disable specific rules or categories
//! - `<!-- tagcheck-enable HT002 -->` - Re-enable specific rules or categories
//! - `<!-- tagcheck-disable-line HT003 -->` - Disable rules for the current line
//! - `<!-- tagcheck-disable-next-line HT003 -->` - Disable rules for the next line
//! - `<!-- tagcheck-capture -->` / `<!-- tagcheck-restore -->` - Save and restore the state
//! - `<!-- tagcheck-disable-file -->` - Disable all rules for the entire file
//! - `<!-- tagcheck-enable-file -->` - Re-enable all rules for the entire file
//!
//! Names are rule codes (`HT002`) or category names (`unclosed-tag`).

use crate::config::normalize_key;
use crate::types::Category;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<!--\s*tagcheck-(disable-next-line|disable-line|disable-file|enable-file|disable|enable|capture|restore)(?:\s+(.*?))?\s*-->",
    )
    .unwrap()
});

const ALL: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Disable,
    Enable,
    DisableLine,
    DisableNextLine,
    DisableFile,
    EnableFile,
    Capture,
    Restore,
}

impl DirectiveKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "disable" => Self::Disable,
            "enable" => Self::Enable,
            "disable-line" => Self::DisableLine,
            "disable-next-line" => Self::DisableNextLine,
            "disable-file" => Self::DisableFile,
            "enable-file" => Self::EnableFile,
            "capture" => Self::Capture,
            "restore" => Self::Restore,
            _ => return None,
        })
    }
}

/// One directive comment found on a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub kind: DirectiveKind,
    /// Rule codes or category names; empty means all rules
    pub rules: Vec<&'a str>,
}

/// Parse every directive on a line, in order of appearance
pub fn parse_directives(line: &str) -> Vec<Directive<'_>> {
    DIRECTIVE
        .captures_iter(line)
        .filter_map(|caps| {
            let kind = DirectiveKind::from_keyword(caps.get(1)?.as_str())?;
            let rules = caps
                .get(2)
                .map(|m| m.as_str().split_whitespace().collect())
                .unwrap_or_default();
            Some(Directive { kind, rules })
        })
        .collect()
}

/// Apply a disable (or enable) of `rules` to a disabled/enabled pair of sets
fn apply(disabled: &mut HashSet<String>, enabled: &mut HashSet<String>, rules: &[&str], disable: bool) {
    if rules.is_empty() {
        disabled.clear();
        enabled.clear();
        if disable {
            disabled.insert(ALL.to_string());
        }
        return;
    }

    // While everything is disabled, individual names are tracked as exceptions
    let all_disabled = disabled.contains(ALL);
    for rule in rules {
        let name = normalize_key(rule);
        match (all_disabled, disable) {
            (true, true) => {
                enabled.remove(&name);
            }
            (true, false) => {
                enabled.insert(name);
            }
            (false, true) => {
                disabled.insert(name);
            }
            (false, false) => {
                disabled.remove(&name);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InlineConfig {
    /// Rules disabled at each line (1-indexed), state before that line's comments
    disabled_at_line: HashMap<usize, HashSet<String>>,
    /// Exceptions when `*` is disabled at a line
    enabled_at_line: HashMap<usize, HashSet<String>>,
    /// Rules disabled for single lines via disable-line / disable-next-line
    line_disabled_rules: HashMap<usize, HashSet<String>>,
    file_disabled_rules: HashSet<String>,
    file_enabled_rules: HashSet<String>,
}

impl InlineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process all directive comments in the content
    pub fn from_content(content: &str) -> Self {
        let mut config = Self::new();
        if !content.contains("tagcheck-") {
            return config;
        }

        let mut currently_disabled = HashSet::new();
        let mut currently_enabled = HashSet::new();
        let mut capture_stack: Vec<(HashSet<String>, HashSet<String>)> = Vec::new();

        for (idx, line) in content.split('\n').enumerate() {
            let line_num = idx + 1;

            // Comments on a line don't affect that same line
            if !currently_disabled.is_empty() {
                config.disabled_at_line.insert(line_num, currently_disabled.clone());
                config.enabled_at_line.insert(line_num, currently_enabled.clone());
            }

            for directive in parse_directives(line) {
                match directive.kind {
                    DirectiveKind::Disable => {
                        apply(&mut currently_disabled, &mut currently_enabled, &directive.rules, true)
                    }
                    DirectiveKind::Enable => {
                        apply(&mut currently_disabled, &mut currently_enabled, &directive.rules, false)
                    }
                    DirectiveKind::DisableFile => apply(
                        &mut config.file_disabled_rules,
                        &mut config.file_enabled_rules,
                        &directive.rules,
                        true,
                    ),
                    DirectiveKind::EnableFile => apply(
                        &mut config.file_disabled_rules,
                        &mut config.file_enabled_rules,
                        &directive.rules,
                        false,
                    ),
                    DirectiveKind::DisableLine | DirectiveKind::DisableNextLine => {
                        let target = if directive.kind == DirectiveKind::DisableLine {
                            line_num
                        } else {
                            line_num + 1
                        };
                        let line_rules = config.line_disabled_rules.entry(target).or_default();
                        if directive.rules.is_empty() {
                            line_rules.insert(ALL.to_string());
                        } else {
                            line_rules.extend(directive.rules.iter().map(|r| normalize_key(r)));
                        }
                    }
                    DirectiveKind::Capture => {
                        capture_stack.push((currently_disabled.clone(), currently_enabled.clone()));
                    }
                    DirectiveKind::Restore => {
                        if let Some((disabled, enabled)) = capture_stack.pop() {
                            currently_disabled = disabled;
                            currently_enabled = enabled;
                        }
                    }
                }
            }
        }

        log::debug!(
            "[tagcheck-inline] {} file-level, {} line-level directives",
            config.file_disabled_rules.len(),
            config.line_disabled_rules.len()
        );

        config
    }

    /// True when nothing was disabled anywhere
    pub fn is_empty(&self) -> bool {
        self.disabled_at_line.is_empty() && self.line_disabled_rules.is_empty() && self.file_disabled_rules.is_empty()
    }

    /// Check if a rule (by code or by the category of a diagnostic) is disabled at a line
    pub fn is_rule_disabled(&self, rule_code: &str, category: Category, line_number: usize) -> bool {
        let names = [rule_code, category.as_str()];
        let mentions = |set: &HashSet<String>| names.iter().any(|n| set.contains(*n));

        if self.file_disabled_rules.contains(ALL) {
            return !mentions(&self.file_enabled_rules);
        } else if mentions(&self.file_disabled_rules) {
            return true;
        }

        if let Some(line_rules) = self.line_disabled_rules.get(&line_number)
            && (line_rules.contains(ALL) || mentions(line_rules))
        {
            return true;
        }

        if let Some(disabled_set) = self.disabled_at_line.get(&line_number) {
            if disabled_set.contains(ALL) {
                return self
                    .enabled_at_line
                    .get(&line_number)
                    .is_none_or(|enabled| !mentions(enabled));
            }
            return mentions(disabled_set);
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives() {
        let parsed = parse_directives("<!-- tagcheck-disable -->");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind, DirectiveKind::Disable);
        assert!(parsed[0].rules.is_empty());

        let parsed = parse_directives("<!-- tagcheck-disable-next-line HT002 unclosed-tag -->");
        assert_eq!(parsed[0].kind, DirectiveKind::DisableNextLine);
        assert_eq!(parsed[0].rules, vec!["HT002", "unclosed-tag"]);

        assert!(parse_directives("<!-- tagcheck-disabled -->").is_empty());
        assert!(parse_directives("<p>regular text</p>").is_empty());
    }

    #[test]
    fn test_multiple_directives_on_one_line() {
        let parsed = parse_directives("<!-- tagcheck-disable HT001 --><!-- tagcheck-enable HT001 -->");
        let kinds: Vec<_> = parsed.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DirectiveKind::Disable, DirectiveKind::Enable]);
    }

    #[test]
    fn test_inline_config_from_content() {
        let content = "<!DOCTYPE html>
<!-- tagcheck-disable HT003 -->
<div class=\"x
<!-- tagcheck-enable HT003 -->
<p class=\"y
<!-- tagcheck-disable-next-line unclosed-tag -->
<section>
<b> <!-- tagcheck-disable-line -->
";
        let config = InlineConfig::from_content(content);

        assert!(config.is_rule_disabled("HT003", Category::MalformedTag, 3));
        assert!(!config.is_rule_disabled("HT003", Category::MalformedTag, 5));
        assert!(config.is_rule_disabled("HT002", Category::UnclosedTag, 7));
        assert!(!config.is_rule_disabled("HT002", Category::MismatchedClosing, 7));
        assert!(config.is_rule_disabled("HT007", Category::DuplicateId, 8));
        assert!(!config.is_rule_disabled("HT002", Category::UnclosedTag, 9));
    }

    #[test]
    fn test_disable_all_with_exception() {
        let content = "<!-- tagcheck-disable -->\n<!-- tagcheck-enable HT007 -->\nline\n";
        let config = InlineConfig::from_content(content);
        assert!(config.is_rule_disabled("HT003", Category::MalformedTag, 3));
        assert!(!config.is_rule_disabled("HT007", Category::DuplicateId, 3));
    }

    #[test]
    fn test_capture_restore() {
        let content = "<!-- tagcheck-disable HT001 -->
<!-- tagcheck-capture -->
<!-- tagcheck-disable HT002 HT003 -->
<!-- tagcheck-restore -->
after
";
        let config = InlineConfig::from_content(content);
        assert!(config.is_rule_disabled("HT001", Category::MissingDoctype, 5));
        assert!(!config.is_rule_disabled("HT002", Category::UnclosedTag, 5));
        assert!(!config.is_rule_disabled("HT003", Category::MalformedTag, 5));
    }

    #[test]
    fn test_disable_file_applies_everywhere() {
        let content = "<p>\n<!-- tagcheck-disable-file duplicate-id -->\n";
        let config = InlineConfig::from_content(content);
        assert!(config.is_rule_disabled("HT007", Category::DuplicateId, 1));
        assert!(!config.is_rule_disabled("HT002", Category::UnclosedTag, 1));
    }

    #[test]
    fn test_no_directives() {
        assert!(InlineConfig::from_content("<p></p>").is_empty());
    }
}
