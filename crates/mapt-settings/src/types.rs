//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so settings
//! files may be partial — missing fields get their compiled default during
//! deserialization. Defaults match the production values of the original
//! deployment (Gemini flash, paid-tier quotas).

use serde::{Deserialize, Serialize};

/// Root settings type for the mapt engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaptSettings {
    /// Completion provider settings.
    pub model: ModelSettings,
    /// Outbound-call rate limits.
    pub rate: RateLimitSettings,
    /// Reference-context retrieval settings.
    pub retrieval: RetrievalSettings,
    /// Assessment pipeline settings.
    pub assessment: AssessmentSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Override for the assessed quality list. `None` keeps the compiled
    /// default taxonomy (the 20 MAP-T qualities).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<Vec<String>>,
}

impl MaptSettings {
    /// Clamp out-of-range values and correct invalid invariants.
    ///
    /// Called automatically during loading. Bad values are corrected with a
    /// warning rather than rejected, so a typo in a settings file degrades
    /// to safe behavior instead of a startup failure.
    pub fn validate(&mut self) {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            let clamped = self.model.temperature.clamp(0.0, 2.0);
            tracing::warn!(
                temperature = self.model.temperature,
                clamped,
                "temperature out of range, clamped"
            );
            self.model.temperature = clamped;
        }
        if self.rate.max_per_minute == 0 {
            tracing::warn!("maxPerMinute must be at least 1, corrected");
            self.rate.max_per_minute = 1;
        }
        if self.rate.max_per_day == 0 {
            tracing::warn!("maxPerDay must be at least 1, corrected");
            self.rate.max_per_day = 1;
        }
        if self.rate.min_spacing_secs < 0.0 {
            tracing::warn!(
                spacing = self.rate.min_spacing_secs,
                "minSpacingSecs negative, corrected to 0"
            );
            self.rate.min_spacing_secs = 0.0;
        }
        if self.retrieval.top_k == 0 {
            tracing::warn!("topK must be at least 1, corrected");
            self.retrieval.top_k = 1;
        }
        if self
            .taxonomy
            .as_ref()
            .is_some_and(|qualities| qualities.is_empty())
        {
            tracing::warn!("empty taxonomy override ignored, using default qualities");
            self.taxonomy = None;
        }
        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            let corrected = self.retrieval.chunk_size / 2;
            tracing::warn!(
                overlap = self.retrieval.chunk_overlap,
                size = self.retrieval.chunk_size,
                corrected,
                "chunkOverlap must be smaller than chunkSize, corrected"
            );
            self.retrieval.chunk_overlap = corrected;
        }
    }
}

/// Completion provider configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Gemini model identifier.
    pub model: String,
    /// Sampling temperature. Low values keep assessments consistent.
    pub temperature: f64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Override for the API base URL (tests, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.1,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: None,
        }
    }
}

/// Rolling-window rate limits for outbound API calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitSettings {
    /// Maximum admitted calls in any trailing 60 seconds.
    pub max_per_minute: usize,
    /// Maximum admitted calls in any trailing 24 hours.
    pub max_per_day: usize,
    /// Minimum gap between consecutive admitted calls, in seconds.
    pub min_spacing_secs: f64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_per_minute: 60,
            max_per_day: 10_000,
            min_spacing_secs: 1.0,
        }
    }
}

/// Reference-context retrieval configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalSettings {
    /// Number of context snippets retrieved per observation.
    pub top_k: usize,
    /// Reference text chunk size, in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks, in characters.
    pub chunk_overlap: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 10,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Assessment pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssessmentSettings {
    /// Maximum bytes of raw model output attached to a terminal error.
    pub preview_bytes: usize,
    /// HTTP timeout for one completion call, in seconds.
    pub timeout_secs: u64,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            preview_bytes: 200,
            timeout_secs: 120,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default tracing level (`RUST_LOG` still wins when set).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let settings = MaptSettings::default();
        assert_eq!(settings.model.model, "gemini-2.5-flash");
        assert!((settings.model.temperature - 0.1).abs() < f64::EPSILON);
        assert_eq!(settings.model.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(settings.rate.max_per_minute, 60);
        assert_eq!(settings.rate.max_per_day, 10_000);
        assert!((settings.rate.min_spacing_secs - 1.0).abs() < f64::EPSILON);
        assert_eq!(settings.retrieval.top_k, 10);
        assert_eq!(settings.retrieval.chunk_size, 1000);
        assert_eq!(settings.retrieval.chunk_overlap, 200);
        assert_eq!(settings.assessment.preview_bytes, 200);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: MaptSettings =
            serde_json::from_str(r#"{"rate":{"maxPerMinute":5}}"#).unwrap();
        assert_eq!(settings.rate.max_per_minute, 5);
        assert_eq!(settings.rate.max_per_day, 10_000);
        assert_eq!(settings.model.model, "gemini-2.5-flash");
    }

    #[test]
    fn validate_clamps_temperature() {
        let mut settings = MaptSettings::default();
        settings.model.temperature = 9.0;
        settings.validate();
        assert!((settings.model.temperature - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_corrects_zero_limits() {
        let mut settings = MaptSettings::default();
        settings.rate.max_per_minute = 0;
        settings.rate.max_per_day = 0;
        settings.retrieval.top_k = 0;
        settings.validate();
        assert_eq!(settings.rate.max_per_minute, 1);
        assert_eq!(settings.rate.max_per_day, 1);
        assert_eq!(settings.retrieval.top_k, 1);
    }

    #[test]
    fn validate_corrects_negative_spacing() {
        let mut settings = MaptSettings::default();
        settings.rate.min_spacing_secs = -2.0;
        settings.validate();
        assert!(settings.rate.min_spacing_secs.abs() < f64::EPSILON);
    }

    #[test]
    fn validate_drops_empty_taxonomy_override() {
        let mut settings = MaptSettings::default();
        settings.taxonomy = Some(vec![]);
        settings.validate();
        assert!(settings.taxonomy.is_none());

        settings.taxonomy = Some(vec!["Curiosity".into()]);
        settings.validate();
        assert_eq!(settings.taxonomy.as_deref(), Some(&["Curiosity".to_string()][..]));
    }

    #[test]
    fn validate_corrects_oversized_overlap() {
        let mut settings = MaptSettings::default();
        settings.retrieval.chunk_size = 100;
        settings.retrieval.chunk_overlap = 150;
        settings.validate();
        assert_eq!(settings.retrieval.chunk_overlap, 50);
    }
}
