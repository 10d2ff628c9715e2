use serial_test::serial;
use std::fs;
use std::path::Path;
use tagcheck_lib::config::{
    Config, ConfigError, RuleRegistry, SourcedConfig, create_default_config, get_rule_config_value, validate_config,
};
use tagcheck_lib::rules::all_rules;
use tempfile::tempdir;

#[test]
fn test_load_config_file() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let config_path = temp_dir.path().join("custom.toml");
    let config_content = r#"
[global]
disable = ["HT001"]
enable = ["HT002", "duplicate-id"]
include = ["public/*.html"]
exclude = ["vendor"]
output-format = "concise"
cache = false

[ht006]
extra_typos = { "<bdoy>" = "<body>" }
"#;
    fs::write(&config_path, config_content).expect("Failed to write config");

    let sourced = SourcedConfig::load_with_discovery(config_path.to_str(), false).expect("config should load");
    assert_eq!(sourced.loaded_file.as_deref(), Some(config_path.as_path()));

    let config: Config = sourced.into();
    assert_eq!(config.global.disable, vec!["HT001"]);
    assert_eq!(config.global.enable, vec!["HT002", "duplicate-id"]);
    assert_eq!(config.global.include, vec!["public/*.html"]);
    assert_eq!(config.global.exclude, vec!["vendor"]);
    assert_eq!(config.global.output_format.as_deref(), Some("concise"));
    assert!(!config.global.cache);
    assert!(config.global.respect_gitignore);

    // Section names are normalized, option keys accept both spellings
    let typos: Option<std::collections::BTreeMap<String, String>> =
        get_rule_config_value(&config, "HT006", "extra-typos");
    assert_eq!(typos.unwrap().get("<bdoy>").map(String::as_str), Some("<body>"));
}

#[test]
fn test_invalid_toml_is_a_parse_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "[global\ndisable = [").unwrap();

    let result = SourcedConfig::load_with_discovery(config_path.to_str(), false);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_missing_explicit_config_is_an_io_error() {
    let result = SourcedConfig::load_with_discovery(Some("/nonexistent/tagcheck.toml"), false);
    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}

#[test]
fn test_create_default_config() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(".tagcheck.toml");
    let path_str = path.to_str().unwrap();

    create_default_config(path_str).expect("first init succeeds");
    let content = fs::read_to_string(&path).unwrap();
    let config = Config::from_toml_str(&content, path_str).expect("generated config parses");
    assert!(config.global.exclude.contains(&"node_modules".to_string()));

    assert!(matches!(create_default_config(path_str), Err(ConfigError::FileExists { .. })));
}

#[test]
fn test_validation_warns_about_unknown_names() {
    let config = Config::from_toml_str(
        "[global]\ndisable = [\"HT099\", \"unclosed-tag\"]\n\n[HT06]\nfoo = 1\n\n[HT006]\nextra-typo = {}\n",
        "t.toml",
    )
    .unwrap();
    let registry = RuleRegistry::from_rules(&all_rules(&Config::default()));
    let warnings = validate_config(&config, &registry);
    let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();

    assert_eq!(warnings.len(), 3, "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("Unknown rule in config: ht06 (did you mean: HT006?)")));
    assert!(messages.iter().any(|m| m.contains("did you mean: extra-typos?")));
    assert!(messages.iter().any(|m| m.contains("HT099")));
}

#[test]
fn test_validation_reports_type_mismatch() {
    let config = Config::from_toml_str("[HT006]\nextra-typos = \"bdoy\"\n", "t.toml").unwrap();
    let registry = RuleRegistry::from_rules(&all_rules(&Config::default()));
    let warnings = validate_config(&config, &registry);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("expected table, got string"));
}

#[test]
fn test_per_file_ignores_match_globs() {
    let config = Config::from_toml_str(
        "[per-file-ignores]\n\"legacy/**/*.html\" = [\"ht001\", \"duplicate_id\"]\n",
        "t.toml",
    )
    .unwrap();

    let ignored = config.get_ignored_rules_for_file(Path::new("legacy/old/index.html"));
    assert!(ignored.contains("HT001"));
    assert!(ignored.contains("duplicate-id"));
    assert!(config.get_ignored_rules_for_file(Path::new("site/index.html")).is_empty());
}

#[test]
#[serial]
fn test_discovery_walks_up_to_git_root() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".tagcheck.toml"), "[global]\ndisable = [\"HT007\"]\n").unwrap();
    let nested = root.join("site").join("pages");
    fs::create_dir_all(&nested).unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(&nested).unwrap();
    let sourced = SourcedConfig::load_with_discovery(None, false);
    let skipped = SourcedConfig::load_with_discovery(None, true);
    std::env::set_current_dir(original_dir).unwrap();

    let sourced = sourced.unwrap();
    assert_eq!(sourced.config.global.disable, vec!["HT007"]);
    assert!(sourced.loaded_file.is_some());

    let skipped = skipped.unwrap();
    assert!(skipped.loaded_file.is_none());
    assert_eq!(skipped.config, Config::default());
}

#[test]
#[serial]
fn test_discovery_stops_at_git_boundary() {
    let temp_dir = tempdir().unwrap();
    let outer = temp_dir.path();
    fs::write(outer.join(".tagcheck.toml"), "[global]\ndisable = [\"HT007\"]\n").unwrap();
    let repo = outer.join("repo");
    fs::create_dir_all(repo.join(".git")).unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(&repo).unwrap();
    let sourced = SourcedConfig::load_with_discovery(None, false);
    std::env::set_current_dir(original_dir).unwrap();

    assert!(sourced.unwrap().loaded_file.is_none());
}
