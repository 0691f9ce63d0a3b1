//! Assessment result types — the wire shapes exchanged with the model and
//! handed to downstream review/export.
//!
//! `quality` and `level` on [`AssessmentItem`] are untrusted free text until
//! normalized by [`crate::labels::extract_labels`].

use serde::{Deserialize, Serialize};

/// One quality rating produced by the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentItem {
    /// Quality name as emitted by the model (free text).
    pub quality: String,
    /// Rating level as emitted by the model (free text).
    pub level: String,
    /// Brief evidence-based explanation.
    #[serde(default)]
    pub reasoning: String,
}

/// A structurally valid assessment for one observation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Per-quality ratings, in model emission order.
    pub assessments: Vec<AssessmentItem>,
    /// Overall assessment summary.
    #[serde(default)]
    pub summary: String,
}

/// Terminal failure shape for one observation.
///
/// `raw_response` is attached only when every decode layer failed, and is
/// already truncated to the configured preview length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentError {
    /// Human-readable failure description.
    pub error: String,
    /// Bounded preview of the undecodable model output, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Exactly one of a result or an error — never both, never neither.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AssessmentOutcome {
    /// Structurally valid assessment.
    Success(AssessmentResult),
    /// Diagnosable failure.
    Error(AssessmentError),
}

impl AssessmentOutcome {
    /// Build a failure outcome with no raw-response preview.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Error(AssessmentError {
            error: message.into(),
            raw_response: None,
        })
    }

    /// Whether this outcome carries a valid assessment.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The assessment result, if successful.
    pub fn as_result(&self) -> Option<&AssessmentResult> {
        match self {
            Self::Success(result) => Some(result),
            Self::Error(_) => None,
        }
    }

    /// The error, if failed.
    pub fn as_error(&self) -> Option<&AssessmentError> {
        match self {
            Self::Success(_) => None,
            Self::Error(err) => Some(err),
        }
    }
}

/// One subject in a batch request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchItem {
    /// Caller-supplied identifier.
    pub id: String,
    /// Subject name, for progress reporting and output association.
    pub name: String,
    /// Observation text to assess.
    #[serde(default)]
    pub observations: String,
}

/// Per-subject entry in a batch response.
#[derive(Clone, Debug, Serialize)]
pub struct BatchRecord {
    /// Identifier from the corresponding [`BatchItem`].
    pub id: String,
    /// Name from the corresponding [`BatchItem`].
    pub name: String,
    /// Assessment outcome for this subject.
    pub outcome: AssessmentOutcome,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
