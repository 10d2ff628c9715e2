use crate::lint_context::LintContext;
use crate::rule::Rule;
use crate::types::{Category, Diagnostic};
use crate::utils::lexical::{char_column, has_unbalanced_quotes};
use regex::Regex;
use std::sync::LazyLock;

static TAG_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Attribute quotes inside a tag must be balanced
#[derive(Debug, Clone, Default)]
pub struct HT005UnmatchedQuote;

impl Rule for HT005UnmatchedQuote {
    fn name(&self) -> &'static str {
        "HT005"
    }

    fn description(&self) -> &'static str {
        "Attribute quotes should be balanced"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::UnmatchedQuote]
    }

    fn explanation(&self) -> Option<&'static str> {
        Some(
            "Each complete `<...>` span must contain an even number of unescaped `\"` and `'` characters. \
             A quote preceded by a backslash is not counted.",
        )
    }

    fn check(&self, ctx: &LintContext) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();

        for (line_num, line) in ctx.numbered_lines() {
            for m in TAG_SPAN.find_iter(line) {
                if !has_unbalanced_quotes(m.as_str()) {
                    continue;
                }
                warnings.push(Diagnostic::new(
                    Category::UnmatchedQuote,
                    line_num,
                    char_column(line, m.start()),
                    m.as_str().chars().count(),
                    "Unmatched quotes in HTML attribute",
                ));
            }
        }

        warnings
    }

    fn from_config(_config: &crate::config::Config) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        Box::new(HT005UnmatchedQuote)
    }
}
