use tagcheck_lib::config::Config;
use tagcheck_lib::lint_context::LintContext;
use tagcheck_lib::rule::Rule;
use tagcheck_lib::rules::{HT006Config, HT006TagTypo, all_rules};
use tagcheck_lib::types::Category;

#[test]
fn test_builtin_table() {
    let rule = HT006TagTypo::new();
    let content = "<haed></haed>\n<boyd>\n<titl>x</titl>\n<mta charset=\"utf-8\">";
    let ctx = LintContext::new(content);
    let result = rule.check(&ctx);

    let lines: Vec<usize> = result.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
    assert!(result[0].message.contains("<head>"));
    assert!(result.iter().all(|d| d.category == Category::TagTypo));
}

#[test]
fn test_extra_typos_from_config_file() {
    let config = Config::from_toml_str("[HT006]\nextra-typos = { \"<bdoy>\" = \"<body>\" }\n", "t.toml").unwrap();
    let rules = all_rules(&config);
    let result = tagcheck_lib::lint("<!DOCTYPE html>\n<bdoy></bdoy>", &rules);

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].category, Category::TagTypo);
    assert!(result[0].message.contains("<bdoy>"));
    assert!(result[0].message.contains("<body>"));
}

#[test]
fn test_extra_typo_names_are_normalized() {
    let mut config = HT006Config::default();
    config.extra_typos.insert("Sectoin".to_string(), "section".to_string());
    let rule = HT006TagTypo::from_config_struct(config);

    let ctx = LintContext::new("<SECTOIN>");
    let result = rule.check(&ctx);
    assert_eq!(result.len(), 1);
    assert!(result[0].message.contains("<section>"));
}
