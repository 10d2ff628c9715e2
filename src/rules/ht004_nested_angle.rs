use crate::lint_context::LintContext;
use crate::rule::Rule;
use crate::types::{Category, Diagnostic};
use crate::utils::lexical::char_column;
use regex::Regex;
use std::sync::LazyLock;

// A second `<` before the `>` that would close the first
static NESTED_ANGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*<[^>]*>").unwrap());

/// A tag must not contain another unescaped `<`
#[derive(Debug, Clone, Default)]
pub struct HT004NestedAngle;

impl Rule for HT004NestedAngle {
    fn name(&self) -> &'static str {
        "HT004"
    }

    fn description(&self) -> &'static str {
        "Tags should not contain a nested '<'"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::InvalidNestedAngle]
    }

    fn explanation(&self) -> Option<&'static str> {
        Some("A literal `<` inside a tag usually means a tag was left open. Use `&lt;` for a literal less-than sign.")
    }

    fn check(&self, ctx: &LintContext) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();

        for (line_num, line) in ctx.numbered_lines() {
            for m in NESTED_ANGLE.find_iter(line) {
                let column = char_column(line, m.start());
                warnings.push(Diagnostic::new(
                    Category::InvalidNestedAngle,
                    line_num,
                    column,
                    m.as_str().chars().count(),
                    "Invalid nested < character in HTML tag",
                ));
            }
        }

        warnings
    }

    fn from_config(_config: &crate::config::Config) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        Box::new(HT004NestedAngle)
    }
}
