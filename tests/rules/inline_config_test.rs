use tagcheck_lib::config::Config;
use tagcheck_lib::rules::all_rules;
use tagcheck_lib::types::Category;

fn lint(content: &str) -> Vec<tagcheck_lib::Diagnostic> {
    tagcheck_lib::lint(content, &all_rules(&Config::default()))
}

#[test]
fn test_disable_next_line_by_category() {
    let content = "<!DOCTYPE html>\n<!-- tagcheck-disable-next-line unclosed-tag -->\n<div>\n<p>x</p>";
    assert!(lint(content).is_empty());
}

#[test]
fn test_disable_block_then_enable() {
    let content = "<!DOCTYPE html>\n<!-- tagcheck-disable HT003 -->\n<a href=\"x\"\n<!-- tagcheck-enable HT003 -->\n<b";
    let result = lint(content);
    let malformed: Vec<_> = result.iter().filter(|d| d.category == Category::MalformedTag).collect();
    assert_eq!(malformed.len(), 1);
    assert_eq!(malformed[0].line, 5);
}

#[test]
fn test_disable_file() {
    let content = "<!-- tagcheck-disable-file -->\n<div><span>";
    assert!(lint(content).is_empty());
}

#[test]
fn test_analyze_ignores_directives() {
    let content = "<!-- tagcheck-disable-file -->\n<div>";
    assert!(!tagcheck_lib::analyze(content).is_empty());
}
