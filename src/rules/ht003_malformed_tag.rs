use crate::lint_context::LintContext;
use crate::rule::Rule;
use crate::types::{Category, Diagnostic};
use crate::utils::lexical::char_column;
use regex::Regex;
use std::sync::LazyLock;

// A `<` with no `>` anywhere after it on the same line
static UNTERMINATED_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*$").unwrap());

/// Tags must be terminated with `>` on the line they start
#[derive(Debug, Clone, Default)]
pub struct HT003MalformedTag;

impl Rule for HT003MalformedTag {
    fn name(&self) -> &'static str {
        "HT003"
    }

    fn description(&self) -> &'static str {
        "Tags should be closed with '>'"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::MalformedTag]
    }

    fn check(&self, ctx: &LintContext) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();

        for (line_num, line) in ctx.numbered_lines() {
            if let Some(m) = UNTERMINATED_TAG.find(line) {
                let column = char_column(line, m.start());
                warnings.push(Diagnostic::new(
                    Category::MalformedTag,
                    line_num,
                    column,
                    m.as_str().chars().count(),
                    "Malformed HTML tag - missing closing >",
                ));
            }
        }

        warnings
    }

    fn from_config(_config: &crate::config::Config) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        Box::new(HT003MalformedTag)
    }
}
