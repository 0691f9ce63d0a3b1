//! Canonical label extraction — fuzzy normalization of raw model output.
//!
//! The model is not a reliable emitter of exact taxonomy strings or exact
//! level enums. Normalization is two-stage: structural slug match first,
//! then token-overlap fallback against the taxonomy. Levels are located by
//! pattern search rather than full-string equality, so noisy phrasing like
//! `"Level: HIGH."` still resolves.
//!
//! All matching is pure over (raw string, fixed allowed set) and
//! independently testable from the pipeline.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::assessment::AssessmentResult;
use crate::taxonomy::{Level, Taxonomy};

/// Level token search pattern. Alternation order matters: longer synonyms
/// are listed before their prefixes so `"middle"` never resolves as `"mid"`
/// plus trailing noise.
static LEVEL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"low|middle|mid|medium|high|not[\s_]*observed|n/?a").expect("level pattern is valid")
});

/// A validated `"<quality-slug>-<level-slug>"` token.
///
/// Quality slug is taxonomy-derived; level slug is one of `low`, `middle`,
/// `high`. `not observed` never appears here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalLabel(String);

impl CanonicalLabel {
    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CanonicalLabel> for String {
    fn from(label: CanonicalLabel) -> Self {
        label.0
    }
}

/// Normalize a raw quality string into slug form: lowercase, strip anything
/// that is not an ASCII letter or whitespace, collapse runs, hyphen-join.
pub fn slugify_quality(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Match a raw quality string against the allowed taxonomy slugs.
///
/// Exact slug match wins. Otherwise the allowed slug sharing the most
/// hyphen-separated words is accepted, provided at least one word is
/// shared; ties resolve to taxonomy order. Returns `None` when nothing
/// overlaps.
pub fn match_quality<'a>(raw: &str, allowed: &'a [String]) -> Option<&'a str> {
    let slug = slugify_quality(raw);
    if let Some(exact) = allowed.iter().find(|a| **a == slug) {
        return Some(exact);
    }

    let tokens: HashSet<&str> = slug.split('-').filter(|t| !t.is_empty()).collect();
    let mut best: Option<&str> = None;
    let mut best_score = 0usize;
    for candidate in allowed {
        let score = candidate
            .split('-')
            .filter(|word| tokens.contains(word))
            .count();
        if score > best_score {
            best = Some(candidate);
            best_score = score;
        }
    }
    best
}

/// Locate a level token anywhere in a raw level string and map synonyms to
/// the canonical [`Level`]. Returns `None` when no token is present.
pub fn match_level(raw: &str) -> Option<Level> {
    let lowered = raw.trim().to_lowercase();
    let token = LEVEL_TOKEN.find(&lowered)?.as_str();
    let level = match token {
        "low" => Level::Low,
        "middle" | "mid" | "medium" => Level::Middle,
        "high" => Level::High,
        // not observed (any spacing/underscore), na, n/a
        _ => Level::NotObserved,
    };
    Some(level)
}

/// Extract the deduplicated canonical label sequence from an assessment.
///
/// An item contributes a label only when its quality matched the taxonomy
/// and its level normalized to a ratable value — `not observed` items are
/// excluded by design. Labels keep first-occurrence order; repeats of the
/// same quality-level pair are dropped silently.
pub fn extract_labels(result: &AssessmentResult, taxonomy: &Taxonomy) -> Vec<CanonicalLabel> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut labels = Vec::new();

    for item in &result.assessments {
        let Some(quality) = match_quality(&item.quality, taxonomy.slugs()) else {
            continue;
        };
        let Some(level) = match_level(&item.level) else {
            continue;
        };
        if !level.is_ratable() {
            continue;
        }
        let label = format!("{quality}-{}", level.slug());
        if seen.insert(label.clone()) {
            labels.push(CanonicalLabel(label));
        }
    }

    labels
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::AssessmentItem;

    fn item(quality: &str, level: &str) -> AssessmentItem {
        AssessmentItem {
            quality: quality.into(),
            level: level.into(),
            reasoning: String::new(),
        }
    }

    fn result(items: Vec<AssessmentItem>) -> AssessmentResult {
        AssessmentResult {
            assessments: items,
            summary: String::new(),
        }
    }

    // ── slugify_quality ──────────────────────────────────────────────────

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify_quality("Academic achievement"), "academic-achievement");
    }

    #[test]
    fn slugify_strips_punctuation_and_digits() {
        assert_eq!(slugify_quality("Self-control (2nd)"), "self-control-nd");
        assert_eq!(slugify_quality("  Leadership!  "), "leadership");
    }

    #[test]
    fn slugify_collapses_whitespace() {
        assert_eq!(slugify_quality("social\t  warmth"), "social-warmth");
    }

    #[test]
    fn slugify_empty_input() {
        assert_eq!(slugify_quality("123 !!"), "");
    }

    // ── match_quality ────────────────────────────────────────────────────

    fn allowed() -> Vec<String> {
        Taxonomy::default().slugs().to_vec()
    }

    #[test]
    fn exact_slug_match() {
        assert_eq!(match_quality("leadership", &allowed()), Some("leadership"));
    }

    #[test]
    fn cosmetic_noise_still_matches() {
        assert_eq!(match_quality(" Leadership. ", &allowed()), Some("leadership"));
        assert_eq!(
            match_quality("Academic Achievement", &allowed()),
            Some("academic-achievement")
        );
    }

    #[test]
    fn token_overlap_fallback() {
        // "self-discipline-control" shares "self" and "control" with
        // "self-control" but is not an exact slug.
        assert_eq!(
            match_quality("Self discipline control", &allowed()),
            Some("self-control")
        );
    }

    #[test]
    fn no_overlap_rejects() {
        assert_eq!(match_quality("Kindness", &allowed()), None);
    }

    #[test]
    fn empty_quality_rejects() {
        assert_eq!(match_quality("", &allowed()), None);
        assert_eq!(match_quality("42!", &allowed()), None);
    }

    // ── match_level ──────────────────────────────────────────────────────

    #[test]
    fn plain_levels() {
        assert_eq!(match_level("low"), Some(Level::Low));
        assert_eq!(match_level("middle"), Some(Level::Middle));
        assert_eq!(match_level("high"), Some(Level::High));
    }

    #[test]
    fn noisy_phrasing() {
        assert_eq!(match_level("Level: HIGH."), Some(Level::High));
        assert_eq!(match_level("high confidence"), Some(Level::High));
        assert_eq!(match_level("  LOW  "), Some(Level::Low));
    }

    #[test]
    fn middle_synonyms() {
        assert_eq!(match_level("mid"), Some(Level::Middle));
        assert_eq!(match_level("medium"), Some(Level::Middle));
    }

    #[test]
    fn not_observed_variants() {
        assert_eq!(match_level("NOT OBSERVED"), Some(Level::NotObserved));
        assert_eq!(match_level("not_observed"), Some(Level::NotObserved));
        assert_eq!(match_level("notobserved"), Some(Level::NotObserved));
        assert_eq!(match_level("n/a"), Some(Level::NotObserved));
        assert_eq!(match_level("na"), Some(Level::NotObserved));
    }

    #[test]
    fn unrecognized_level_rejects() {
        assert_eq!(match_level("excellent"), None);
        assert_eq!(match_level(""), None);
    }

    // ── extract_labels ───────────────────────────────────────────────────

    #[test]
    fn duplicate_quality_level_collapses() {
        let taxonomy = Taxonomy::default();
        let res = result(vec![item("leadership", "High."), item("Leadership ", "high")]);
        let labels = extract_labels(&res, &taxonomy);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].as_str(), "leadership-high");
    }

    #[test]
    fn unknown_quality_contributes_nothing() {
        let taxonomy = Taxonomy::default();
        let res = result(vec![item("Kindness", "high")]);
        assert!(extract_labels(&res, &taxonomy).is_empty());
    }

    #[test]
    fn not_observed_is_excluded() {
        let taxonomy = Taxonomy::default();
        let res = result(vec![
            item("Creativity", "NOT OBSERVED"),
            item("Tension", "low"),
        ]);
        let labels = extract_labels(&res, &taxonomy);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].as_str(), "tension-low");
    }

    #[test]
    fn first_occurrence_order_is_preserved() {
        let taxonomy = Taxonomy::default();
        let res = result(vec![
            item("Tension", "high"),
            item("Creativity", "low"),
            item("Tension", "HIGH"),
            item("Boldness", "middle"),
        ]);
        let labels = extract_labels(&res, &taxonomy);
        let texts: Vec<&str> = labels.iter().map(CanonicalLabel::as_str).collect();
        assert_eq!(texts, ["tension-high", "creativity-low", "boldness-middle"]);
    }

    #[test]
    fn same_quality_different_levels_both_kept() {
        let taxonomy = Taxonomy::default();
        let res = result(vec![item("Tension", "high"), item("Tension", "low")]);
        let labels = extract_labels(&res, &taxonomy);
        assert_eq!(labels.len(), 2);
    }

    // ── idempotence (already-canonical input is unchanged) ───────────────

    #[test]
    fn canonical_input_round_trips() {
        let taxonomy = Taxonomy::default();
        let res = result(vec![
            item("academic-achievement", "high"),
            item("self-control", "middle"),
        ]);
        let labels = extract_labels(&res, &taxonomy);
        let texts: Vec<&str> = labels.iter().map(CanonicalLabel::as_str).collect();
        assert_eq!(texts, ["academic-achievement-high", "self-control-middle"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Rebuild assessment items from emitted labels by splitting off the
        /// trailing level slug.
        fn items_from_labels(labels: &[CanonicalLabel]) -> Vec<AssessmentItem> {
            labels
                .iter()
                .map(|label| {
                    let (quality, level) = label
                        .as_str()
                        .rsplit_once('-')
                        .expect("canonical labels contain a hyphen");
                    item(quality, level)
                })
                .collect()
        }

        proptest! {
            // Normalizing an already-canonical sequence returns it unchanged.
            #[test]
            fn extraction_is_idempotent(
                picks in proptest::collection::vec((0usize..20, 0usize..3), 0..32)
            ) {
                let taxonomy = Taxonomy::default();
                let levels = [Level::Low, Level::Middle, Level::High];
                let items: Vec<AssessmentItem> = picks
                    .iter()
                    .map(|&(q, l)| item(&taxonomy.qualities()[q], levels[l].slug()))
                    .collect();

                let first = extract_labels(&result(items), &taxonomy);
                let second = extract_labels(&result(items_from_labels(&first)), &taxonomy);
                prop_assert_eq!(first, second);
            }

            // Every emitted label is unique and uses a taxonomy slug.
            #[test]
            fn labels_are_unique_and_grounded(
                picks in proptest::collection::vec((0usize..20, 0usize..3), 0..32)
            ) {
                let taxonomy = Taxonomy::default();
                let levels = [Level::Low, Level::Middle, Level::High];
                let items: Vec<AssessmentItem> = picks
                    .iter()
                    .map(|&(q, l)| item(&taxonomy.qualities()[q], levels[l].slug()))
                    .collect();

                let labels = extract_labels(&result(items), &taxonomy);
                let mut seen = std::collections::HashSet::new();
                for label in &labels {
                    prop_assert!(seen.insert(label.as_str().to_owned()));
                    let (quality, level) = label.as_str().rsplit_once('-').unwrap();
                    prop_assert!(taxonomy.slugs().iter().any(|s| s == quality));
                    prop_assert!(["low", "middle", "high"].contains(&level));
                }
            }
        }
    }
}
