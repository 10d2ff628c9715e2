//! In-memory analysis cache
//!
//! Results are keyed on a blake3 hash of the content combined with a hash of
//! the active rule set, so the same document checked with a different
//! configuration is analyzed again. Entries never expire on their own; callers
//! drop them with [`AnalysisCache::invalidate`] or [`AnalysisCache::clear`].

use crate::config::Config;
use crate::rule::Rule;
use crate::types::Diagnostic;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: HashMap<(String, String), Arc<Vec<Diagnostic>>>,
    hits: u64,
    misses: u64,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash the active rule names together with the rule option sections
    pub fn hash_rules(rules: &[Box<dyn Rule>], config: &Config) -> String {
        let mut hasher = blake3::Hasher::new();
        for rule in rules {
            hasher.update(rule.name().as_bytes());
            if let Some(section) = config.rules.get(rule.name()) {
                for (key, value) in &section.values {
                    hasher.update(key.as_bytes());
                    hasher.update(value.to_string().as_bytes());
                }
            }
            hasher.update(b"\0");
        }
        hasher.finalize().to_hex().to_string()
    }

    pub fn get(&mut self, content: &str, rules_hash: &str) -> Option<Arc<Vec<Diagnostic>>> {
        let key = (crate::compute_content_hash(content), rules_hash.to_string());
        match self.entries.get(&key) {
            Some(cached) => {
                self.hits += 1;
                log::debug!("[tagcheck-cache] hit for {}", &key.0[..12]);
                Some(Arc::clone(cached))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, content: &str, rules_hash: &str, diagnostics: Vec<Diagnostic>) -> Arc<Vec<Diagnostic>> {
        let diagnostics = Arc::new(diagnostics);
        self.entries.insert(
            (crate::compute_content_hash(content), rules_hash.to_string()),
            Arc::clone(&diagnostics),
        );
        diagnostics
    }

    /// Return the cached result for `content`, linting it on a miss
    pub fn get_or_lint(&mut self, content: &str, rules: &[Box<dyn Rule>], rules_hash: &str) -> Arc<Vec<Diagnostic>> {
        if let Some(cached) = self.get(content, rules_hash) {
            return cached;
        }
        let diagnostics = crate::lint(content, rules);
        self.insert(content, rules_hash, diagnostics)
    }

    /// Drop every entry for `content`, whatever rule set produced it
    pub fn invalidate(&mut self, content: &str) -> bool {
        let content_hash = crate::compute_content_hash(content);
        let before = self.entries.len();
        self.entries.retain(|(hash, _), _| *hash != content_hash);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{HT001Doctype, all_rules};

    #[test]
    fn test_hit_after_miss() {
        let config = Config::default();
        let rules = all_rules(&config);
        let key = AnalysisCache::hash_rules(&rules, &config);
        let mut cache = AnalysisCache::new();

        let first = cache.get_or_lint("<div>", &rules, &key);
        let second = cache.get_or_lint("<div>", &rules, &key);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, entries: 1 });
    }

    #[test]
    fn test_rule_set_is_part_of_key() {
        let config = Config::default();
        let all = all_rules(&config);
        let only_doctype: Vec<Box<dyn Rule>> = vec![Box::new(HT001Doctype)];
        let mut cache = AnalysisCache::new();

        let full = cache.get_or_lint("<div>", &all, &AnalysisCache::hash_rules(&all, &config));
        let partial = cache.get_or_lint("<div>", &only_doctype, &AnalysisCache::hash_rules(&only_doctype, &config));

        assert_eq!(full.len(), 2);
        assert_eq!(partial.len(), 1);
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_rule_options_are_part_of_key() {
        let plain = Config::default();
        let configured = Config::from_toml_str("[HT006]\nextra-typos = { \"bdoy\" = \"body\" }\n", "t.toml").unwrap();
        let rules = all_rules(&plain);
        assert_ne!(
            AnalysisCache::hash_rules(&rules, &plain),
            AnalysisCache::hash_rules(&rules, &configured)
        );
    }

    #[test]
    fn test_invalidate_and_clear() {
        let config = Config::default();
        let rules = all_rules(&config);
        let key = AnalysisCache::hash_rules(&rules, &config);
        let mut cache = AnalysisCache::new();
        cache.get_or_lint("<p>", &rules, &key);
        cache.get_or_lint("<b>", &rules, &key);

        assert!(cache.invalidate("<p>"));
        assert!(!cache.invalidate("<p>"));
        assert_eq!(cache.stats().entries, 1);

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
