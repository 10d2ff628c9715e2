use tagcheck_lib::lint_context::LintContext;
use tagcheck_lib::rule::Rule;
use tagcheck_lib::rules::{HT002TagNesting, NestingValidator};
use tagcheck_lib::types::Category;
use tagcheck_lib::utils::scan_tags;

#[test]
fn test_nested_document_is_clean() {
    let rule = HT002TagNesting;
    let content = "<html>\n  <body>\n    <ul><li>a</li><li>b<br></li></ul>\n  </body>\n</html>\n";
    let ctx = LintContext::new(content);
    assert!(rule.check(&ctx).is_empty());
}

#[test]
fn test_self_closing_syntax_does_not_open() {
    let rule = HT002TagNesting;
    let ctx = LintContext::new("<div><custom-widget /></div>");
    assert!(rule.check(&ctx).is_empty());
}

#[test]
fn test_unclosed_frames_report_their_own_line() {
    let rule = HT002TagNesting;
    let content = "<section>\n<article>\n<p>text\n</section>";
    let ctx = LintContext::new(content);
    let result = rule.check(&ctx);

    let lines: Vec<usize> = result.iter().map(|d| d.line).collect();
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|d| d.category == Category::UnclosedTag));
    assert!(lines.contains(&2));
    assert!(lines.contains(&3));
}

#[test]
fn test_tag_names_are_case_insensitive() {
    let rule = HT002TagNesting;
    let ctx = LintContext::new("<DIV><Span>x</SPAN></div>");
    assert!(rule.check(&ctx).is_empty());
}

#[test]
fn test_validator_tracks_open_frames() {
    let ctx = LintContext::new("<main><nav><a href=\"/\">home</a>");
    let mut validator = NestingValidator::new(&ctx);
    for event in ctx.tags() {
        validator.feed(&event);
    }

    let open: Vec<&str> = validator.open_frames().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(open, vec!["main", "nav"]);

    let result = validator.finish();
    assert_eq!(result.len(), 2);
}

#[test]
fn test_masked_script_produces_no_events() {
    let ctx = LintContext::new("<script>document.write('<div>')</script>");
    let names: Vec<String> = scan_tags(&ctx.masked).map(|e| e.name).collect();
    assert_eq!(names, vec!["script", "script"]);
}
