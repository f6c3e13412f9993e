//! Configuration loading and environment parsing.

use super::validation::validate_config_security;
use super::Config;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Load configuration with the following precedence (highest first):
/// 1) `TOWN_SERVER_CONFIG_JSON` env var containing raw JSON
/// 2) File pointed by `TOWN_SERVER_CONFIG_PATH` env var
/// 3) `config.json` in the current working directory
/// 4) Defaults compiled into the binary
///
/// Individual fields can additionally be overridden by environment variables with prefix
/// `TOWN_SERVER__`, using `__` as a nested separator, e.g. `TOWN_SERVER__PORT=9090` or
/// `TOWN_SERVER__TOWN__DEFAULT_CAPACITY=50`.
///
/// **Note:** validation errors from [`validate_config_security`] are logged to stderr but
/// not propagated — `load()` always returns a `Config`. Callers that need a hard failure
/// should call [`validate_config_security`] on the result themselves.
#[must_use]
pub fn load() -> Config {
    let defaults = Config::default();
    let mut merged =
        serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    if let Ok(json) = std::env::var("TOWN_SERVER_CONFIG_JSON") {
        if let Some(value) = parse_json_document(&json, "TOWN_SERVER_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    if let Ok(path) = std::env::var("TOWN_SERVER_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    merge_file_source(&mut merged, &PathBuf::from("config.json"));

    apply_env_overrides(&mut merged);

    let config = match serde_json::from_value::<Config>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to deserialize config; using defaults: {e}");
            defaults
        }
    };

    if let Err(e) = validate_config_security(&config) {
        eprintln!("Configuration validation error: {e}");
    }

    config
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }
    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(value) =
                parse_json_document(&contents, &format!("file {}", path.display()))
            {
                merge_values(target, value);
            }
        }
        Err(err) => {
            eprintln!("Failed to read config from {}: {}", path.display(), err);
        }
    }
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => {
            *target_slot = source_value;
        }
    }
}

fn apply_env_overrides(root: &mut Value) {
    for (key, raw_value) in std::env::vars() {
        let Some(stripped) = key.strip_prefix("TOWN_SERVER__") else {
            continue;
        };

        let segments: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        if segments.is_empty() {
            continue;
        }

        set_nested_value(root, &segments, parse_scalar(raw_value.trim()));
    }
}

fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set_nested_value(target: &mut Value, segments: &[String], value: Value) {
    if segments.len() == 1 {
        let map = ensure_object(target);
        map.insert(segments[0].clone(), value);
        return;
    }

    let map = ensure_object(target);
    let entry = map
        .entry(segments[0].clone())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    set_nested_value(entry, &segments[1..], value);
}

fn ensure_object(value: &mut Value) -> &mut serde_json::Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(serde_json::Map::new());
    }
    #[allow(clippy::expect_used)]
    value
        .as_object_mut()
        .expect("value was just coerced into an object")
}
