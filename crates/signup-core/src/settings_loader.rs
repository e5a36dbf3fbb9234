//! Settings loading from configuration files.
//!
//! This module loads [`Settings`] from TOML or JSON and applies environment
//! variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `SIGNUP_DEBUG` | `debug` |
//! | `SIGNUP_LOG_LEVEL` | `log_level` |
//! | `SIGNUP_STORAGE_BACKEND` | `storage.backend` |
//! | `SIGNUP_STORAGE_LOCATION` | `storage.location` |
//! | `SIGNUP_STORAGE_BUCKET` | `storage.bucket` |
//! | `SIGNUP_AVATAR_MAX_BYTES` | `registration.avatar_max_bytes` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use signup_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("signup.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::SignupError;
use crate::settings::{Settings, StorageBackend};

/// Loads settings from a TOML string.
///
/// Keys missing from the TOML keep their default values, including keys
/// nested inside `[storage]` and `[registration]`.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, SignupError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| SignupError::Configuration(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, SignupError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SignupError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, SignupError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| SignupError::Configuration(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, SignupError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SignupError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Loads settings from a file, picking the format from its extension
/// (`.json` is JSON, anything else is TOML), then applies the environment.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SignupError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_file_with_env(path)
    } else {
        from_toml_file_with_env(path)
    }
}

/// Applies environment variable overrides to a settings struct.
///
/// Values that fail to parse (a non-numeric size, an unknown backend) are
/// ignored with a warning and the previous value is kept.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("SIGNUP_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("SIGNUP_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("SIGNUP_STORAGE_BACKEND") {
        match val.parse::<StorageBackend>() {
            Ok(backend) => settings.storage.backend = backend,
            Err(e) => tracing::warn!("Ignoring SIGNUP_STORAGE_BACKEND: {e}"),
        }
    }

    if let Ok(val) = std::env::var("SIGNUP_STORAGE_LOCATION") {
        settings.storage.location = PathBuf::from(val);
    }

    if let Ok(val) = std::env::var("SIGNUP_STORAGE_BUCKET") {
        settings.storage.bucket = val;
    }

    if let Ok(val) = std::env::var("SIGNUP_AVATAR_MAX_BYTES") {
        match val.parse::<u64>() {
            Ok(bytes) => settings.registration.avatar_max_bytes = bytes,
            Err(_) => tracing::warn!("Ignoring non-numeric SIGNUP_AVATAR_MAX_BYTES={val}"),
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, SignupError> {
    std::fs::read_to_string(path).map_err(|e| {
        SignupError::Configuration(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, SignupError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        SignupError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        SignupError::Configuration(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test touches its own environment variable; the test harness runs
    // them on parallel threads.

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "debug"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
        // Defaults preserved
        assert_eq!(settings.storage.bucket, "avatars");
        assert_eq!(settings.registration.min_techs, 2);
    }

    #[test]
    fn test_from_toml_str_nested_tables_keep_defaults() {
        let toml = r#"
            [storage]
            backend = "memory"

            [registration]
            avatar_max_bytes = 1024
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage.bucket, "avatars");
        assert_eq!(settings.registration.avatar_max_bytes, 1024);
        assert_eq!(settings.registration.email_domain, "@github.com");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.registration.avatar_max_bytes, 5_242_880);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(SignupError::Configuration(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("[registration]\nmin_techs = \"two\"");
        assert!(result.is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "debug": false,
            "storage": { "location": "/srv/uploads", "bucket": "profile-pictures" }
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.storage.location, PathBuf::from("/srv/uploads"));
        assert_eq!(settings.storage.bucket, "profile-pictures");
        assert_eq!(settings.storage.backend, StorageBackend::Filesystem);
    }

    #[test]
    fn test_from_json_str_empty_object() {
        let settings = from_json_str("{}").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_json_str_invalid() {
        let result = from_json_str("{invalid json");
        assert!(result.is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signup.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_from_file_picks_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signup.json");
        std::fs::write(&path, r#"{"registration": {"min_techs": 3}}"#).unwrap();

        let settings = from_file_with_env(&path).unwrap();
        assert_eq!(settings.registration.min_techs, 3);
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/nonexistent/path/signup.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = from_json_file("/nonexistent/path/signup.json");
        assert!(result.is_err());
    }

    // ── Environment variable overrides ──────────────────────────────

    #[test]
    fn test_apply_env_overrides_debug() {
        let mut settings = Settings::default();
        std::env::set_var("SIGNUP_DEBUG", "false");
        apply_env_overrides(&mut settings);
        assert!(!settings.debug);

        std::env::set_var("SIGNUP_DEBUG", "1");
        apply_env_overrides(&mut settings);
        assert!(settings.debug);
        std::env::remove_var("SIGNUP_DEBUG");
    }

    #[test]
    fn test_apply_env_overrides_backend() {
        let mut settings = Settings::default();
        std::env::set_var("SIGNUP_STORAGE_BACKEND", "memory");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);

        std::env::set_var("SIGNUP_STORAGE_BACKEND", "tape");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        std::env::remove_var("SIGNUP_STORAGE_BACKEND");
    }

    #[test]
    fn test_apply_env_overrides_avatar_max_bytes() {
        let mut settings = Settings::default();
        std::env::set_var("SIGNUP_AVATAR_MAX_BYTES", "2048");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.registration.avatar_max_bytes, 2048);

        std::env::set_var("SIGNUP_AVATAR_MAX_BYTES", "lots");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.registration.avatar_max_bytes, 2048);
        std::env::remove_var("SIGNUP_AVATAR_MAX_BYTES");
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("SIGNUP_LOG_LEVEL", "trace");
        let settings = from_env();
        assert_eq!(settings.log_level, "trace");
        std::env::remove_var("SIGNUP_LOG_LEVEL");
    }

    #[test]
    fn test_toml_with_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signup_env.toml");
        std::fs::write(
            &path,
            "[storage]\nbucket = \"toml-bucket\"\nlocation = \"/tmp/x\"\n",
        )
        .unwrap();

        std::env::set_var("SIGNUP_STORAGE_BUCKET", "env-bucket");
        std::env::set_var("SIGNUP_STORAGE_LOCATION", "/tmp/from-env");

        let settings = from_toml_file_with_env(&path).unwrap();
        assert_eq!(settings.storage.bucket, "env-bucket");
        assert_eq!(settings.storage.location, PathBuf::from("/tmp/from-env"));

        std::env::remove_var("SIGNUP_STORAGE_BUCKET");
        std::env::remove_var("SIGNUP_STORAGE_LOCATION");
    }

    // ── merge_json helper ───────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"outer": {"a": 1, "b": 2}});
        let over = serde_json::json!({"outer": {"b": 3}});
        let merged = merge_json(base, over);
        assert_eq!(merged["outer"]["a"], 1);
        assert_eq!(merged["outer"]["b"], 3);
    }

    #[test]
    fn test_merge_json_array_override() {
        let base = serde_json::json!({"list": [1, 2, 3]});
        let over = serde_json::json!({"list": [4, 5]});
        let merged = merge_json(base, over);
        // Arrays are replaced, not merged
        assert_eq!(merged["list"], serde_json::json!([4, 5]));
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            count = 42
            flag = true
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["count"], 42);
        assert_eq!(json["flag"], true);
        assert_eq!(json["nested"]["key"], "value");
    }
}
