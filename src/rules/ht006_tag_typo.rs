use crate::lint_context::LintContext;
use crate::rule::Rule;
use crate::rule_config_serde::RuleConfig;
use crate::types::{Category, Diagnostic};
use crate::utils::lexical::char_column;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Common misspellings of document-structure tags
pub const BUILTIN_TYPOS: &[(&str, &str)] = &[
    ("<htlm>", "<html>"),
    ("<haed>", "<head>"),
    ("<boyd>", "<body>"),
    ("<titl>", "<title>"),
    ("<mta>", "<meta>"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct HT006Config {
    /// Additional misspelling -> correction pairs, e.g. `"<bdoy>" = "<body>"`
    #[serde(default)]
    pub extra_typos: BTreeMap<String, String>,
}

impl RuleConfig for HT006Config {
    const RULE_NAME: &'static str = "HT006";
}

/// Known tag misspellings
#[derive(Debug, Clone)]
pub struct HT006TagTypo {
    /// Lowercased misspelling paired with its correction
    typos: Vec<(String, String)>,
}

impl Default for HT006TagTypo {
    fn default() -> Self {
        Self::new()
    }
}

impl HT006TagTypo {
    pub fn new() -> Self {
        Self::from_config_struct(HT006Config::default())
    }

    pub fn from_config_struct(config: HT006Config) -> Self {
        let mut typos: Vec<(String, String)> = BUILTIN_TYPOS
            .iter()
            .map(|(wrong, correct)| (wrong.to_string(), correct.to_string()))
            .collect();

        for (wrong, correct) in config.extra_typos {
            let wrong = as_tag(&wrong).to_ascii_lowercase();
            if wrong.len() <= 2 {
                log::warn!("[HT006] ignoring empty typo entry");
                continue;
            }
            if typos.iter().any(|(w, _)| *w == wrong) {
                continue;
            }
            typos.push((wrong, as_tag(&correct)));
        }

        Self { typos }
    }
}

/// Accept `bdoy` as shorthand for `<bdoy>`
fn as_tag(name: &str) -> String {
    let name = name.trim();
    if name.starts_with('<') && name.ends_with('>') {
        name.to_string()
    } else {
        format!("<{}>", name.trim_start_matches('<').trim_end_matches('>'))
    }
}

impl Rule for HT006TagTypo {
    fn name(&self) -> &'static str {
        "HT006"
    }

    fn description(&self) -> &'static str {
        "Common tag names should be spelled correctly"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::TagTypo]
    }

    fn explanation(&self) -> Option<&'static str> {
        Some(
            "Flags case-insensitive occurrences of well-known misspellings such as `<htlm>` and `<boyd>`. \
             More pairs can be added with `extra-typos` in the `[HT006]` section.",
        )
    }

    fn check(&self, ctx: &LintContext) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();

        for (line_num, line) in ctx.numbered_lines() {
            if !line.contains('<') {
                continue;
            }
            // ASCII lowercasing keeps byte offsets aligned with `line`
            let lower = line.to_ascii_lowercase();
            // One diagnostic per misspelling per line, at its first occurrence
            for (wrong, correct) in &self.typos {
                if let Some(idx) = lower.find(wrong.as_str()) {
                    warnings.push(Diagnostic::new(
                        Category::TagTypo,
                        line_num,
                        char_column(line, idx),
                        wrong.chars().count(),
                        format!("Possible typo: \"{wrong}\" should be \"{correct}\""),
                    ));
                }
            }
        }

        warnings
    }

    fn from_config(config: &crate::config::Config) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        let rule_config = crate::rule_config_serde::load_rule_config::<HT006Config>(config);
        Box::new(Self::from_config_struct(rule_config))
    }

    fn default_config_section(&self) -> Option<(String, toml::Value)> {
        crate::rule_config_serde::default_section::<HT006Config>()
    }
}
