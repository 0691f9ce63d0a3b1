//! Fixed assessment taxonomy — quality names and rating levels.
//!
//! The taxonomy is loaded once at composition time and is read-only for the
//! process lifetime. Valid quality slugs are always derived from it, never
//! from model output.

use crate::labels::slugify_quality;

/// The 20 MAP-T personality qualities assessed by default.
pub const DEFAULT_QUALITIES: [&str; 20] = [
    "Adaptability",
    "Academic achievement",
    "Boldness",
    "Competition",
    "Creativity",
    "Enthusiasm",
    "Excitability",
    "General ability",
    "Guilt proneness",
    "Individualism",
    "Innovation",
    "Leadership",
    "Maturity",
    "Mental health",
    "Morality",
    "Self control",
    "Sensitivity",
    "Self sufficiency",
    "Social warmth",
    "Tension",
];

/// Rating level for one quality.
///
/// `NotObserved` is a valid model response (absence of evidence) but is
/// excluded from canonical labels — it carries no classification signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    /// Weak evidence of the quality.
    Low,
    /// Moderate evidence of the quality.
    Middle,
    /// Strong evidence of the quality.
    High,
    /// No direct evidence in the observation.
    NotObserved,
}

impl Level {
    /// Lowercase slug used in canonical labels.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Middle => "middle",
            Self::High => "high",
            Self::NotObserved => "not observed",
        }
    }

    /// Uppercase name used in prompt format instructions.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Middle => "MIDDLE",
            Self::High => "HIGH",
            Self::NotObserved => "NOT OBSERVED",
        }
    }

    /// Whether this level contributes a canonical label.
    pub fn is_ratable(self) -> bool {
        !matches!(self, Self::NotObserved)
    }

    /// All levels, in prompt order.
    pub fn all() -> [Self; 4] {
        [Self::Low, Self::Middle, Self::High, Self::NotObserved]
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// The fixed, ordered set of assessable qualities.
///
/// Slugs are precomputed at construction so per-item normalization never
/// re-derives them.
#[derive(Clone, Debug)]
pub struct Taxonomy {
    qualities: Vec<String>,
    slugs: Vec<String>,
}

impl Taxonomy {
    /// Build a taxonomy from an ordered list of quality names.
    pub fn new<I, S>(qualities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let qualities: Vec<String> = qualities.into_iter().map(Into::into).collect();
        let slugs = qualities.iter().map(|q| slugify_quality(q)).collect();
        Self { qualities, slugs }
    }

    /// Quality names in taxonomy order.
    pub fn qualities(&self) -> &[String] {
        &self.qualities
    }

    /// Normalized slugs, parallel to [`Self::qualities`].
    pub fn slugs(&self) -> &[String] {
        &self.slugs
    }

    /// Number of qualities.
    pub fn len(&self) -> usize {
        self.qualities.len()
    }

    /// Whether the taxonomy is empty.
    pub fn is_empty(&self) -> bool {
        self.qualities.is_empty()
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITIES)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_taxonomy_has_twenty_qualities() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.len(), 20);
        assert!(!taxonomy.is_empty());
    }

    #[test]
    fn slugs_are_lowercase_hyphenated() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.slugs().contains(&"academic-achievement".to_string()));
        assert!(taxonomy.slugs().contains(&"self-control".to_string()));
        assert!(taxonomy.slugs().contains(&"leadership".to_string()));
    }

    #[test]
    fn slugs_parallel_qualities() {
        let taxonomy = Taxonomy::new(["Social warmth", "Tension"]);
        assert_eq!(taxonomy.qualities(), ["Social warmth", "Tension"]);
        assert_eq!(taxonomy.slugs(), ["social-warmth", "tension"]);
    }

    #[test]
    fn level_slugs() {
        assert_eq!(Level::Low.slug(), "low");
        assert_eq!(Level::Middle.slug(), "middle");
        assert_eq!(Level::High.slug(), "high");
        assert_eq!(Level::NotObserved.slug(), "not observed");
    }

    #[test]
    fn only_not_observed_is_unratable() {
        assert!(Level::Low.is_ratable());
        assert!(Level::Middle.is_ratable());
        assert!(Level::High.is_ratable());
        assert!(!Level::NotObserved.is_ratable());
    }

    #[test]
    fn prompt_names_are_uppercase() {
        let names: Vec<&str> = Level::all().iter().map(|l| l.prompt_name()).collect();
        assert_eq!(names, ["LOW", "MIDDLE", "HIGH", "NOT OBSERVED"]);
    }
}
