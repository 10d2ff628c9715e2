use tagcheck_lib::config::{Config, GlobalConfig};
use tagcheck_lib::rules::{all_rules, category_enabled, filter_diagnostics, filter_rules};
use tagcheck_lib::types::Category;

fn global(enable: &[&str], disable: &[&str]) -> GlobalConfig {
    GlobalConfig {
        enable: enable.iter().map(|s| s.to_string()).collect(),
        disable: disable.iter().map(|s| s.to_string()).collect(),
        ..GlobalConfig::default()
    }
}

#[test]
fn test_every_category_has_a_rule() {
    let rules = all_rules(&Config::default());
    for category in Category::ALL {
        assert!(
            rules.iter().any(|r| r.categories().contains(&category)),
            "no rule reports {category}"
        );
    }
}

#[test]
fn test_disable_by_code_and_category() {
    let rules = all_rules(&Config::default());
    let filtered = filter_rules(&rules, &global(&[], &["HT001", "duplicate-id"]));
    let names: Vec<&str> = filtered.iter().map(|r| r.name()).collect();
    assert!(!names.contains(&"HT001"));
    assert!(!names.contains(&"HT007"));
    assert_eq!(names.len(), rules.len() - 2);
}

#[test]
fn test_disable_single_category_of_nesting_rule() {
    let config = global(&[], &["unexpected-closing"]);
    assert!(!category_enabled(&config, Category::UnexpectedClosing));
    assert!(category_enabled(&config, Category::UnclosedTag));

    let diagnostics = tagcheck_lib::analyze("<!DOCTYPE html>\n</p>\n<div>");
    let kept = filter_diagnostics(diagnostics, &config);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].category, Category::UnclosedTag);
}

#[test]
fn test_disable_all_with_enable_list() {
    let config = global(&["HT002"], &["all"]);
    assert!(category_enabled(&config, Category::UnclosedTag));
    assert!(!category_enabled(&config, Category::MissingDoctype));
}
