//! Typed per-rule configuration loaded from `[HTxxx]` sections.

use crate::config::{Config, normalize_key};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A rule's option struct, deserialized from its configuration section
pub trait RuleConfig: Serialize + DeserializeOwned + Default + Clone {
    const RULE_NAME: &'static str;
}

/// Load a rule's typed configuration, falling back to defaults on errors
pub fn load_rule_config<T: RuleConfig>(config: &Config) -> T {
    let Some(rule_config) = config.rules.get(T::RULE_NAME) else {
        return T::default();
    };

    // Accept snake_case keys as well as kebab-case
    let table: toml::map::Map<String, toml::Value> = rule_config
        .values
        .iter()
        .map(|(key, value)| (normalize_key(key), value.clone()))
        .collect();

    match toml::Value::Table(table).try_into::<T>() {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("Invalid configuration for rule {}: {e}", T::RULE_NAME);
            T::default()
        }
    }
}

/// Convert a JSON value to its TOML equivalent. Returns `None` for `null`.
pub fn json_to_toml_value(json_val: &serde_json::Value) -> Option<toml::Value> {
    match json_val {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(toml::Value::Boolean(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(toml::Value::Integer)
            .or_else(|| n.as_f64().map(toml::Value::Float)),
        serde_json::Value::String(s) => Some(toml::Value::String(s.clone())),
        serde_json::Value::Array(arr) => Some(toml::Value::Array(
            arr.iter().filter_map(json_to_toml_value).collect(),
        )),
        serde_json::Value::Object(obj) => {
            let table = obj
                .iter()
                .filter_map(|(k, v)| json_to_toml_value(v).map(|tv| (k.clone(), tv)))
                .collect();
            Some(toml::Value::Table(table))
        }
    }
}

/// Default `[CODE]` section for a rule config, or `None` if it has no options
pub fn default_section<T: RuleConfig>() -> Option<(String, toml::Value)> {
    let json_value = serde_json::to_value(T::default()).ok()?;
    match json_to_toml_value(&json_value)? {
        toml::Value::Table(table) if !table.is_empty() => Some((T::RULE_NAME.to_string(), toml::Value::Table(table))),
        _ => None,
    }
}
