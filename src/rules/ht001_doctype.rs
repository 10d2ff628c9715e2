use crate::lint_context::LintContext;
use crate::rule::Rule;
use crate::types::{Category, Diagnostic};
use regex::Regex;
use std::sync::LazyLock;

static DOCTYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^<!DOCTYPE\s+html>").unwrap());

/// The first non-blank line must be an HTML5 doctype declaration
#[derive(Debug, Clone, Default)]
pub struct HT001Doctype;

impl Rule for HT001Doctype {
    fn name(&self) -> &'static str {
        "HT001"
    }

    fn description(&self) -> &'static str {
        "Document should start with <!DOCTYPE html>"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::MissingDoctype]
    }

    fn explanation(&self) -> Option<&'static str> {
        Some(
            "The first non-blank line of the document must be `<!DOCTYPE html>` (any case). \
             Without it browsers render the page in quirks mode. Leading blank lines are allowed; \
             leading indentation on the doctype line is not.",
        )
    }

    fn check(&self, ctx: &LintContext) -> Vec<Diagnostic> {
        let Some((idx, info)) = ctx.lines.iter().enumerate().find(|(_, info)| !info.is_blank) else {
            return Vec::new();
        };
        let line_num = idx + 1;
        let line = info.content(ctx.content);

        if DOCTYPE_REGEX.is_match(line) {
            return Vec::new();
        }

        vec![Diagnostic::new(
            Category::MissingDoctype,
            line_num,
            1,
            line.trim_end().chars().count(),
            "Missing or invalid <!DOCTYPE html> declaration",
        )]
    }

    fn from_config(_config: &crate::config::Config) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        Box::new(HT001Doctype)
    }
}
