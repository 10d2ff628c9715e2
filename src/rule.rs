use crate::lint_context::LintContext;
use crate::types::{Category, Diagnostic};
use dyn_clone::DynClone;

/// A single check run against a [`LintContext`].
///
/// Checks are heuristic and infallible: malformed input is reported as
/// diagnostics, never as an error.
pub trait Rule: DynClone + Send + Sync {
    /// Rule code, e.g. `HT002`
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Diagnostic categories this rule can emit
    fn categories(&self) -> &'static [Category];

    fn check(&self, ctx: &LintContext) -> Vec<Diagnostic>;

    /// Longer explanation shown by `tagcheck rule <CODE>`
    fn explanation(&self) -> Option<&'static str> {
        None
    }

    fn from_config(config: &crate::config::Config) -> Box<dyn Rule>
    where
        Self: Sized;

    /// Default `[CODE]` configuration section, if the rule has options
    fn default_config_section(&self) -> Option<(String, toml::Value)> {
        None
    }

    /// Whether the rule matches a name given in configuration or an inline
    /// directive: its code or one of its category names.
    fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.name().eq_ignore_ascii_case(name)
            || self
                .categories()
                .iter()
                .any(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

dyn_clone::clone_trait_object!(Rule);
