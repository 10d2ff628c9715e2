//!
//! This module defines configuration structures, loading logic, and validation for tagcheck.
//! Configuration lives in `.tagcheck.toml` (or `tagcheck.toml`) and is discovered upward from
//! the working directory.

use crate::rule::Rule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Config file names searched for, in priority order, in each directory
pub const CONFIG_FILES: &[&str] = &[".tagcheck.toml", "tagcheck.toml", ".config/tagcheck.toml"];

/// Normalizes configuration keys (rule names, option names) to lowercase kebab-case.
pub fn normalize_key(key: &str) -> String {
    // If the key looks like a rule code (e.g., HT002), uppercase it
    if key.len() == 5 && key.to_ascii_lowercase().starts_with("ht") && key[2..].chars().all(|c| c.is_ascii_digit()) {
        key.to_ascii_uppercase()
    } else {
        key.replace('_', "-").to_ascii_lowercase()
    }
}

/// Represents a rule-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct RuleConfig {
    /// Configuration values for the rule
    #[serde(flatten)]
    #[schemars(schema_with = "arbitrary_value_schema")]
    pub values: BTreeMap<String, toml::Value>,
}

/// Generate a JSON schema for arbitrary configuration values
fn arbitrary_value_schema(_gen: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "type": "object",
        "additionalProperties": true
    })
}

/// Represents the complete configuration loaded from .tagcheck.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[schemars(
    description = "tagcheck configuration for checking HTML files. Rules can be configured individually using [HT###] sections with rule-specific options."
)]
pub struct Config {
    /// Global configuration options
    #[serde(default)]
    pub global: GlobalConfig,

    /// Per-file rule ignores: maps file patterns to lists of rules to ignore
    /// Example: { "legacy/**/*.html": ["HT001"] }
    #[serde(default, rename = "per-file-ignores")]
    pub per_file_ignores: HashMap<String, Vec<String>>,

    /// Rule-specific configurations (e.g., HT006)
    ///
    /// - HT006: extra-typos (table of misspelled tag -> correct tag)
    #[serde(flatten)]
    pub rules: BTreeMap<String, RuleConfig>,
}

impl Config {
    /// Parse configuration from TOML text, normalizing rule section names
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("{path}: Failed to parse TOML: {e}")))?;

        config.rules = std::mem::take(&mut config.rules)
            .into_iter()
            .map(|(name, rule_config)| (normalize_key(&name), rule_config))
            .collect();

        Ok(config)
    }

    /// Get the set of rules that should be ignored for a specific file based on per-file-ignores configuration
    /// Returns a HashSet of rule names as written in the configuration (codes uppercased)
    pub fn get_ignored_rules_for_file(&self, file_path: &Path) -> HashSet<String> {
        use globset::{Glob, GlobSetBuilder};

        let mut ignored_rules = HashSet::new();

        if self.per_file_ignores.is_empty() {
            return ignored_rules;
        }

        let mut builder = GlobSetBuilder::new();
        let mut pattern_to_rules: Vec<&Vec<String>> = Vec::new();

        for (pattern, rules) in &self.per_file_ignores {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    pattern_to_rules.push(rules);
                }
                Err(_) => log::warn!("Invalid glob pattern in per-file-ignores: {pattern}"),
            }
        }

        let globset = match builder.build() {
            Ok(gs) => gs,
            Err(e) => {
                log::error!("Failed to build globset for per-file-ignores: {e}");
                return ignored_rules;
            }
        };

        for match_idx in globset.matches(file_path) {
            if let Some(rules) = pattern_to_rules.get(match_idx) {
                for rule in rules.iter() {
                    ignored_rules.insert(normalize_key(rule));
                }
            }
        }

        ignored_rules
    }
}

/// Global configuration options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Enabled rules (codes or category names)
    #[serde(default)]
    pub enable: Vec<String>,

    /// Disabled rules (codes or category names)
    #[serde(default)]
    pub disable: Vec<String>,

    /// Files to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Files to include
    #[serde(default)]
    pub include: Vec<String>,

    /// Respect .gitignore files when scanning directories
    #[serde(default = "default_true", alias = "respect_gitignore")]
    pub respect_gitignore: bool,

    /// Output format for results (text, concise, json, github)
    #[serde(skip_serializing_if = "Option::is_none", alias = "output_format")]
    pub output_format: Option<String>,

    /// Whether repeated content is served from the analysis cache (default: true)
    #[serde(default = "default_true")]
    pub cache: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            enable: Vec::new(),
            disable: Vec::new(),
            exclude: Vec::new(),
            include: Vec::new(),
            respect_gitignore: true,
            output_format: None,
            cache: true,
        }
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Configuration file already exists
    #[error("Configuration file already exists at {path}")]
    FileExists { path: String },
}

/// Create a default configuration file at the specified path
pub fn create_default_config(path: &str) -> Result<(), ConfigError> {
    if Path::new(path).exists() {
        return Err(ConfigError::FileExists { path: path.to_string() });
    }

    let default_config = r#"# tagcheck configuration file

[global]
# Rules to disable, by code or category name
# disable = ["HT001", "duplicate-id"]

# Rules to enable exclusively (if provided, only these rules will run)
# enable = ["HT002", "HT003"]

# File/directory patterns to include
# include = ["public/**/*.html"]

# File/directory patterns to exclude
exclude = [
    ".git",
    "node_modules",
    "dist",
    "build",
]

# Respect .gitignore files when scanning directories (default: true)
respect-gitignore = true

# Output format: text, concise, json, github
# output-format = "text"

# [per-file-ignores]
# "legacy/**/*.html" = ["HT001"]

# [HT006]
# extra-typos = { "<bdoy>" = "<body>", "<hade>" = "<head>" }
"#;

    fs::write(path, default_config).map_err(|err| ConfigError::IoError {
        source: err,
        path: path.to_string(),
    })
}

/// Get a rule-specific configuration value
/// Tries both the original key and its kebab-case / snake_case variants
pub fn get_rule_config_value<T: serde::de::DeserializeOwned>(config: &Config, rule_name: &str, key: &str) -> Option<T> {
    let rule_config = config.rules.get(&normalize_key(rule_name))?;

    let key_variants = [
        key.to_string(),
        normalize_key(key),
        key.replace('-', "_"),
        key.replace('_', "-"),
    ];

    for variant in &key_variants {
        if let Some(value) = rule_config.values.get(variant)
            && let Ok(result) = T::deserialize(value.clone())
        {
            return Some(result);
        }
    }

    None
}

/// A configuration together with where it came from
#[derive(Debug, Clone, Default)]
pub struct SourcedConfig {
    pub config: Config,
    /// The file the configuration was read from, if any
    pub loaded_file: Option<PathBuf>,
    /// Directory containing `.git` above the config file (or the config's directory)
    pub project_root: Option<PathBuf>,
}

impl SourcedConfig {
    /// Load configuration from an explicit path, or discover it upward from the
    /// current directory unless `skip_auto_discovery` is set.
    pub fn load_with_discovery(config_path: Option<&str>, skip_auto_discovery: bool) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            log::debug!("[tagcheck-config] Explicit config_path provided: {path}");
            return Self::load_file(Path::new(path));
        }

        if skip_auto_discovery {
            log::debug!("[tagcheck-config] Skipping auto-discovery due to --no-config flag");
            return Ok(Self::default());
        }

        match Self::discover_config_upward() {
            Some(path) => Self::load_file(&path),
            None => {
                log::debug!("[tagcheck-config] No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            source: e,
            path: path_str.clone(),
        })?;
        let config = Config::from_toml_str(&content, &path_str)?;
        log::debug!("[tagcheck-config] Loaded configuration file: {path_str}");

        let config_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            config,
            loaded_file: Some(path.to_path_buf()),
            project_root: Some(Self::find_project_root_from(&config_dir)),
        })
    }

    /// Finds project root by walking up from start_dir looking for .git directory.
    /// Falls back to start_dir if no .git found.
    fn find_project_root_from(start_dir: &Path) -> PathBuf {
        const MAX_DEPTH: usize = 100;
        let mut current = start_dir.to_path_buf();

        for _ in 0..MAX_DEPTH {
            if current.join(".git").exists() {
                log::debug!("[tagcheck-config] Found .git at: {}", current.display());
                return current;
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        start_dir.to_path_buf()
    }

    /// Discover a configuration file by traversing up the directory tree.
    /// Stops at the first directory that contains `.git`.
    fn discover_config_upward() -> Option<PathBuf> {
        const MAX_DEPTH: usize = 100;

        let start_dir = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                log::debug!("[tagcheck-config] Failed to get current directory: {e}");
                return None;
            }
        };

        Self::discover_config_from(&start_dir, MAX_DEPTH)
    }

    fn discover_config_from(start_dir: &Path, max_depth: usize) -> Option<PathBuf> {
        let mut current_dir = start_dir.to_path_buf();

        for _ in 0..max_depth {
            for name in CONFIG_FILES {
                let candidate = current_dir.join(name);
                if candidate.is_file() {
                    log::debug!("[tagcheck-config] Found config file: {}", candidate.display());
                    return Some(candidate);
                }
            }

            if current_dir.join(".git").exists() {
                log::debug!("[tagcheck-config] Stopping at .git boundary: {}", current_dir.display());
                break;
            }

            if !current_dir.pop() {
                break;
            }
        }

        None
    }
}

impl From<SourcedConfig> for Config {
    fn from(sourced: SourcedConfig) -> Self {
        sourced.config
    }
}

/// Registry of all known rules and their config schemas
pub struct RuleRegistry {
    /// Map of rule code (e.g. "HT006") to its default option table
    pub rule_schemas: BTreeMap<String, toml::map::Map<String, toml::Value>>,
    /// Category names accepted wherever a rule name is
    pub category_names: BTreeSet<String>,
}

impl RuleRegistry {
    /// Build a registry from a list of rules
    pub fn from_rules(rules: &[Box<dyn Rule>]) -> Self {
        let mut rule_schemas = BTreeMap::new();
        let mut category_names = BTreeSet::new();

        for rule in rules {
            let table = match rule.default_config_section() {
                Some((_, toml::Value::Table(table))) => table,
                _ => toml::map::Map::new(),
            };
            rule_schemas.insert(normalize_key(rule.name()), table);
            category_names.extend(rule.categories().iter().map(|c| c.as_str().to_string()));
        }

        RuleRegistry {
            rule_schemas,
            category_names,
        }
    }

    /// Get all known rule codes
    pub fn rule_names(&self) -> BTreeSet<String> {
        self.rule_schemas.keys().cloned().collect()
    }

    /// Whether a name from `enable`/`disable` refers to a known rule
    pub fn is_known_name(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case("all")
            || self.rule_schemas.contains_key(&normalize_key(name))
            || self.category_names.contains(&name.to_ascii_lowercase())
    }

    /// Get the expected value for a rule's configuration key
    pub fn expected_value_for(&self, rule: &str, key: &str) -> Option<&toml::Value> {
        let schema = self.rule_schemas.get(rule)?;
        schema.get(key).or_else(|| schema.get(&normalize_key(key)))
    }
}

/// Represents a config validation warning
#[derive(Debug, Clone)]
pub struct ConfigValidationWarning {
    pub message: String,
    pub rule: Option<String>,
    pub key: Option<String>,
}

/// Validate a loaded config against the rule registry
pub fn validate_config(config: &Config, registry: &RuleRegistry) -> Vec<ConfigValidationWarning> {
    let mut warnings = Vec::new();
    let known_rules: Vec<String> = registry.rule_names().into_iter().collect();

    for (rule, rule_config) in &config.rules {
        let Some(schema) = registry.rule_schemas.get(rule) else {
            let mut message = format!("Unknown rule in config: {rule}");
            if let Some(suggestion) = suggest_similar_key(rule, &known_rules) {
                message.push_str(&format!(" (did you mean: {suggestion}?)"));
            }
            warnings.push(ConfigValidationWarning {
                message,
                rule: Some(rule.clone()),
                key: None,
            });
            continue;
        };

        let valid_keys: Vec<String> = schema.keys().cloned().collect();
        for (key, value) in &rule_config.values {
            match registry.expected_value_for(rule, key) {
                None => {
                    let mut message = format!("Unknown option for rule {rule}: {key}");
                    if let Some(suggestion) = suggest_similar_key(key, &valid_keys) {
                        message.push_str(&format!(" (did you mean: {suggestion}?)"));
                    }
                    warnings.push(ConfigValidationWarning {
                        message,
                        rule: Some(rule.clone()),
                        key: Some(key.clone()),
                    });
                }
                Some(expected) if !toml_value_type_matches(expected, value) => {
                    warnings.push(ConfigValidationWarning {
                        message: format!(
                            "Type mismatch for {rule}.{key}: expected {}, got {}",
                            toml_type_name(expected),
                            toml_type_name(value)
                        ),
                        rule: Some(rule.clone()),
                        key: Some(key.clone()),
                    });
                }
                Some(_) => {}
            }
        }
    }

    for name in config.global.enable.iter().chain(&config.global.disable) {
        if !registry.is_known_name(name) {
            warnings.push(ConfigValidationWarning {
                message: format!("Unknown rule in global enable/disable: {name}"),
                rule: Some(name.clone()),
                key: None,
            });
        }
    }

    warnings
}

fn toml_type_name(val: &toml::Value) -> &'static str {
    match val {
        toml::Value::String(_) => "string",
        toml::Value::Integer(_) => "integer",
        toml::Value::Float(_) => "float",
        toml::Value::Boolean(_) => "boolean",
        toml::Value::Array(_) => "array",
        toml::Value::Table(_) => "table",
        toml::Value::Datetime(_) => "datetime",
    }
}

fn toml_value_type_matches(expected: &toml::Value, actual: &toml::Value) -> bool {
    use toml::Value::*;
    matches!(
        (expected, actual),
        (String(_), String(_))
            | (Integer(_), Integer(_))
            | (Float(_), Float(_) | Integer(_))
            | (Boolean(_), Boolean(_))
            | (Array(_), Array(_))
            | (Table(_), Table(_))
            | (Datetime(_), Datetime(_))
    )
}

/// Calculate Levenshtein distance between two strings (simple implementation)
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len2 = s2_chars.len();

    if s1_chars.is_empty() {
        return len2;
    }
    if len2 == 0 {
        return s1_chars.len();
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=s1_chars.len() {
        curr_row[0] = i;
        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);
            curr_row[j] = (prev_row[j] + 1).min(curr_row[j - 1] + 1).min(prev_row[j - 1] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Suggest a similar key from a list of valid keys using fuzzy matching
fn suggest_similar_key(unknown: &str, valid_keys: &[String]) -> Option<String> {
    let unknown_lower = unknown.to_lowercase();
    let max_distance = 2.max(unknown.len() / 3);

    valid_keys
        .iter()
        .map(|valid| (valid, levenshtein_distance(&unknown_lower, &valid.to_lowercase())))
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by_key(|(_, distance)| *distance)
        .map(|(key, _)| key.clone())
}
