use crate::lint_context::LintContext;
use crate::rule::Rule;
use crate::types::{Category, Diagnostic};
use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

// `id` must start at an ASCII word boundary, so `data-id` counts and `userid`
// does not. Values may contain backslash-escaped quotes and never span lines.
static ID_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?-u:\b)(id\s*=\s*(?:"((?:\\.|[^"\\\n])*)"|'((?:\\.|[^'\\\n])*)'))"#).unwrap()
});

/// `id` values must be unique within the document
#[derive(Debug, Clone, Default)]
pub struct HT007DuplicateId;

impl Rule for HT007DuplicateId {
    fn name(&self) -> &'static str {
        "HT007"
    }

    fn description(&self) -> &'static str {
        "Element ids should be unique"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::DuplicateId]
    }

    fn explanation(&self) -> Option<&'static str> {
        Some(
            "Every `id` attribute value must be unique in the document. Each occurrence of a repeated \
             value is reported. Values are compared case-sensitively.",
        )
    }

    fn check(&self, ctx: &LintContext) -> Vec<Diagnostic> {
        let groups = ID_ATTRIBUTE
            .captures_iter(ctx.content)
            .filter_map(|caps| {
                let attr = caps.get(1)?;
                let value = caps.get(2).or_else(|| caps.get(3))?;
                Some((value.as_str(), (attr.start(), attr.end())))
            })
            .into_group_map();

        let mut warnings = Vec::new();
        for (value, spans) in groups.into_iter().sorted_by_key(|(_, spans)| spans[0].0) {
            if spans.len() < 2 {
                continue;
            }
            for (start, end) in spans {
                let (line, column) = ctx.offset_to_line_col(start);
                warnings.push(Diagnostic::new(
                    Category::DuplicateId,
                    line,
                    column,
                    ctx.span_len(start, end),
                    format!("Duplicate id=\"{value}\""),
                ));
            }
        }

        warnings
    }

    fn from_config(_config: &crate::config::Config) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        Box::new(HT007DuplicateId)
    }
}
