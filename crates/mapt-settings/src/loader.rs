//! Settings loading — file deep-merge and environment overrides.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::errors::{Result, SettingsError};
use crate::types::MaptSettings;

/// Deep-merge `overlay` into `base`.
///
/// Objects merge recursively; any other value in `overlay` replaces the
/// corresponding `base` value wholesale.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load settings from a JSON file, deep-merged over compiled defaults, with
/// `MAPT_*` environment overrides applied last and validation clamping.
pub fn load_settings_from_path(path: &Path) -> Result<MaptSettings> {
    let raw = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let file_value: Value = serde_json::from_str(&raw)?;
    let defaults = serde_json::to_value(MaptSettings::default())?;
    let merged = deep_merge(defaults, file_value);
    let mut settings: MaptSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, &std::env::vars().collect());
    settings.validate();
    Ok(settings)
}

/// Resolve settings at the composition root.
///
/// With a path, loads that file (falling back to defaults with a warning if
/// it cannot be read or parsed). Without one, starts from defaults. Env
/// overrides and validation apply in both cases.
pub fn resolve_settings(path: Option<&Path>) -> MaptSettings {
    if let Some(path) = path {
        match load_settings_from_path(path) {
            Ok(settings) => return settings,
            Err(e) => {
                tracing::warn!(error = %e, ?path, "failed to load settings, using defaults");
            }
        }
    }
    let mut settings = MaptSettings::default();
    apply_env_overrides(&mut settings, &std::env::vars().collect());
    settings.validate();
    settings
}

/// Apply `MAPT_*` overrides from an environment snapshot.
///
/// Takes the snapshot as a map so the override logic is testable without
/// mutating process environment (which is unsafe in edition 2024).
pub(crate) fn apply_env_overrides(settings: &mut MaptSettings, vars: &HashMap<String, String>) {
    fn parsed<T: std::str::FromStr>(vars: &HashMap<String, String>, key: &str) -> Option<T> {
        let raw = vars.get(key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key, raw, "ignoring unparsable env override");
                None
            }
        }
    }

    if let Some(model) = vars.get("MAPT_MODEL") {
        settings.model.model.clone_from(model);
    }
    if let Some(temperature) = parsed(vars, "MAPT_TEMPERATURE") {
        settings.model.temperature = temperature;
    }
    if let Some(api_key_env) = vars.get("MAPT_API_KEY_ENV") {
        settings.model.api_key_env.clone_from(api_key_env);
    }
    if let Some(base_url) = vars.get("MAPT_BASE_URL") {
        settings.model.base_url = Some(base_url.clone());
    }
    if let Some(max_per_minute) = parsed(vars, "MAPT_MAX_PER_MINUTE") {
        settings.rate.max_per_minute = max_per_minute;
    }
    if let Some(max_per_day) = parsed(vars, "MAPT_MAX_PER_DAY") {
        settings.rate.max_per_day = max_per_day;
    }
    if let Some(spacing) = parsed(vars, "MAPT_MIN_SPACING_SECS") {
        settings.rate.min_spacing_secs = spacing;
    }
    if let Some(top_k) = parsed(vars, "MAPT_TOP_K") {
        settings.retrieval.top_k = top_k;
    }
    if let Some(level) = vars.get("MAPT_LOG_LEVEL") {
        settings.logging.level.clone_from(level);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn deep_merge_recurses_into_objects() {
        let base = serde_json::json!({"rate": {"maxPerMinute": 60, "maxPerDay": 10000}});
        let overlay = serde_json::json!({"rate": {"maxPerMinute": 5}});
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["rate"]["maxPerMinute"], 5);
        assert_eq!(merged["rate"]["maxPerDay"], 10000);
    }

    #[test]
    fn deep_merge_replaces_scalars_and_arrays() {
        let base = serde_json::json!({"a": [1, 2], "b": "x"});
        let overlay = serde_json::json!({"a": [3], "b": "y"});
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["a"], serde_json::json!([3]));
        assert_eq!(merged["b"], "y");
    }

    #[test]
    fn load_merges_file_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rate":{{"maxPerMinute":3}},"model":{{"temperature":0.5}}}}"#
        )
        .unwrap();
        let settings = load_settings_from_path(file.path()).unwrap();
        assert_eq!(settings.rate.max_per_minute, 3);
        assert_eq!(settings.rate.max_per_day, 10_000);
        assert!((settings.model.temperature - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn load_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_settings_from_path(file.path()),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_settings_from_path(Path::new("/nonexistent/mapt.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn resolve_without_path_yields_defaults() {
        let settings = resolve_settings(None);
        assert_eq!(settings.model.model, "gemini-2.5-flash");
    }

    #[test]
    fn env_overrides_apply() {
        let mut settings = MaptSettings::default();
        let vars: HashMap<String, String> = [
            ("MAPT_MODEL", "gemini-2.5-pro"),
            ("MAPT_MAX_PER_MINUTE", "7"),
            ("MAPT_MIN_SPACING_SECS", "0.5"),
            ("MAPT_BASE_URL", "http://localhost:9999"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        apply_env_overrides(&mut settings, &vars);
        assert_eq!(settings.model.model, "gemini-2.5-pro");
        assert_eq!(settings.rate.max_per_minute, 7);
        assert!((settings.rate.min_spacing_secs - 0.5).abs() < f64::EPSILON);
        assert_eq!(settings.model.base_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn unparsable_env_override_is_ignored() {
        let mut settings = MaptSettings::default();
        let vars: HashMap<String, String> =
            [("MAPT_MAX_PER_MINUTE".to_string(), "lots".to_string())]
                .into_iter()
                .collect();
        apply_env_overrides(&mut settings, &vars);
        assert_eq!(settings.rate.max_per_minute, 60);
    }
}
