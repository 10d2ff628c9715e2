pub mod cache;
pub mod config;
pub mod exit_codes;
pub mod inline_config;
pub mod lint_context;
pub mod output;
pub mod rule;
pub mod rule_config_serde;
pub mod rules;
pub mod types;
pub mod utils;

pub use rules::*;

pub use crate::lint_context::{LineInfo, LintContext};
pub use crate::types::{Category, Diagnostic, Severity};
use crate::rule::Rule;
use std::sync::LazyLock;
use std::time::Instant;

/// Rule set used by [`analyze`]: every rule with default options
static DEFAULT_RULES: LazyLock<Vec<Box<dyn Rule>>> =
    LazyLock::new(|| rules::all_rules(&crate::config::Config::default()));

/// Compute content hash used as the analysis cache key
pub fn compute_content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Analyze HTML source with the built-in rule set.
///
/// Never fails: any input, including empty or binary-looking text, yields a
/// (possibly empty) list of diagnostics sorted by line, then column.
pub fn analyze(source: &str) -> Vec<Diagnostic> {
    let ctx = LintContext::new(source);
    aggregate(run_rules(&ctx, &DEFAULT_RULES))
}

/// Lint content against the given rules, honouring inline directive comments.
/// Assumes the provided `rules` are the final, configured and filtered set.
pub fn lint(content: &str, rules: &[Box<dyn Rule>]) -> Vec<Diagnostic> {
    let inline_config = crate::inline_config::InlineConfig::from_content(content);
    let ctx = LintContext::new(content);

    let mut diagnostics = run_rules(&ctx, rules);
    if !inline_config.is_empty() {
        diagnostics.retain(|d| !inline_config.is_rule_disabled(d.rule_code(), d.category, d.line));
    }

    aggregate(diagnostics)
}

fn run_rules(ctx: &LintContext, rules: &[Box<dyn Rule>]) -> Vec<Diagnostic> {
    let overall_start = Instant::now();
    let mut diagnostics = Vec::new();

    for rule in rules {
        let rule_start = Instant::now();
        let rule_diagnostics = rule.check(ctx);
        log::debug!(
            "[tagcheck-lint] {} produced {} diagnostics in {:?}",
            rule.name(),
            rule_diagnostics.len(),
            rule_start.elapsed()
        );
        diagnostics.extend(rule_diagnostics);
    }

    log::debug!(
        "[tagcheck-lint] {} rules over {} bytes in {:?}",
        rules.len(),
        ctx.content.len(),
        overall_start.elapsed()
    );
    diagnostics
}

/// Order diagnostics by `(line, column)`. The sort is stable, so diagnostics
/// at the same position keep the order their rules produced them in.
pub fn aggregate(mut diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics.sort_by_key(|d| (d.line, d.column));
    diagnostics
}

/// Whether any diagnostic belongs to a category that should block submission
pub fn has_blocking_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.is_error() && d.category.is_blocking())
}
