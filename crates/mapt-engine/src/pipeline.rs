//! Assessment pipeline — retrieval-augmented prompting with layered
//! response recovery.
//!
//! One observation in, exactly one outcome out. Failures at any layer fall
//! through to the next, strictly more permissive one; nothing is ever
//! fabricated, and nothing escapes as an unhandled fault. Every outbound
//! completion call passes through the shared [`RateGovernor`] first.

use std::sync::Arc;

use tracing::{debug, info, warn};

use mapt_core::{
    AssessmentError, AssessmentOutcome, BatchItem, BatchRecord, Taxonomy, text::preview,
};
use mapt_settings::MaptSettings;

use crate::governor::RateGovernor;
use crate::prompts::{build_fallback_prompt, build_structured_prompt, response_schema};
use crate::provider::{Completion, ContextRetriever};
use crate::recovery::{decode_result, extract_json_object};

/// Resolved pipeline configuration.
#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    /// Context snippets retrieved per observation.
    pub top_k: usize,
    /// Byte cap on the raw-response preview attached to terminal errors.
    pub preview_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            preview_bytes: 200,
        }
    }
}

impl PipelineConfig {
    /// Extract the pipeline-relevant values from full settings.
    pub fn from_settings(settings: &MaptSettings) -> Self {
        Self {
            top_k: settings.retrieval.top_k,
            preview_bytes: settings.assessment.preview_bytes,
        }
    }
}

/// Produces one [`AssessmentOutcome`] per observation.
///
/// The retriever is wired after construction (reference material may load
/// later than the pipeline is built); assessing before that fails fast with
/// a configuration error rather than a network error.
pub struct AssessmentPipeline {
    completion: Arc<dyn Completion>,
    governor: Arc<RateGovernor>,
    taxonomy: Arc<Taxonomy>,
    retriever: Option<Arc<dyn ContextRetriever>>,
    config: PipelineConfig,
}

impl AssessmentPipeline {
    /// Build a pipeline without a retriever.
    pub fn new(
        completion: Arc<dyn Completion>,
        governor: Arc<RateGovernor>,
        taxonomy: Arc<Taxonomy>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            completion,
            governor,
            taxonomy,
            retriever: None,
            config,
        }
    }

    /// Wire the context retriever.
    pub fn set_retriever(&mut self, retriever: Arc<dyn ContextRetriever>) {
        self.retriever = Some(retriever);
    }

    /// Builder-style retriever wiring.
    #[must_use]
    pub fn with_retriever(mut self, retriever: Arc<dyn ContextRetriever>) -> Self {
        self.set_retriever(retriever);
        self
    }

    /// The taxonomy this pipeline assesses against.
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Assess one observation. Always returns an outcome.
    pub async fn assess(&self, observation: &str) -> AssessmentOutcome {
        let Some(retriever) = &self.retriever else {
            return AssessmentOutcome::failure(
                "context retriever not configured; wire reference material before assessing",
            );
        };

        let context = match retriever.retrieve(observation, self.config.top_k).await {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "context retrieval failed");
                return AssessmentOutcome::failure(format!("assessment failed: {e}"));
            }
        };
        debug!(snippets = context.len(), "context retrieved");

        // Layer 1: structured attempt.
        let prompt = build_structured_prompt(&self.taxonomy, &context, observation);
        self.governor.admit().await;
        let structured_err = match self
            .completion
            .complete_structured(&prompt, &response_schema())
            .await
        {
            Ok(result) => {
                debug!(items = result.assessments.len(), "structured attempt succeeded");
                return AssessmentOutcome::Success(result);
            }
            Err(e) => {
                warn!(error = %e, "structured attempt failed, trying string fallback");
                e
            }
        };

        // Layer 2: plain string attempt with explicit JSON instructions.
        let prompt = build_fallback_prompt(&self.taxonomy, &context, observation);
        self.governor.admit().await;
        let raw = match self.completion.complete(&prompt).await {
            Ok(raw) => raw,
            Err(fallback_err) => {
                return AssessmentOutcome::failure(format!(
                    "assessment failed: {structured_err}; fallback also failed: {fallback_err}"
                ));
            }
        };

        let trimmed = raw.trim();
        let decode_err = match decode_result(trimmed) {
            Ok(result) => {
                debug!("fallback response decoded directly");
                return AssessmentOutcome::Success(result);
            }
            Err(e) => e,
        };

        // Layer 3: pull the first balanced JSON object out of the prose.
        if let Some(span) = extract_json_object(trimmed) {
            if let Ok(result) = decode_result(span) {
                debug!("assessment recovered from embedded json span");
                return AssessmentOutcome::Success(result);
            }
        }

        // Terminal: attach a bounded preview so operators can diagnose the
        // malformed output without unbounded log growth.
        warn!(response_bytes = trimmed.len(), "all decode layers failed");
        AssessmentOutcome::Error(AssessmentError {
            error: format!(
                "assessment failed: {structured_err}; could not parse fallback response: {decode_err}"
            ),
            raw_response: Some(preview(trimmed, self.config.preview_bytes)),
        })
    }

    /// Assess a batch of subjects sequentially.
    ///
    /// Sequential by design: a single governor keeps admission accounting
    /// simple and the quota is process-wide anyway. A blank observation
    /// short-circuits locally without consuming an admission, and one
    /// item's failure never aborts the rest.
    pub async fn assess_batch(&self, items: &[BatchItem]) -> Vec<BatchRecord> {
        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            info!(
                subject = %item.name,
                progress = format!("{}/{}", index + 1, items.len()),
                "assessing subject"
            );
            let outcome = if item.observations.trim().is_empty() {
                AssessmentOutcome::failure("no observations provided")
            } else {
                self.assess(&item.observations).await
            };
            records.push(BatchRecord {
                id: item.id.clone(),
                name: item.name.clone(),
                outcome,
            });
        }
        records
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
