//! Capability traits consumed by the assessment pipeline.
//!
//! The pipeline depends only on these contracts: a completion capability
//! (the LLM) and a context retriever (reference snippets for a query). Both
//! may fail at the transport level; failures propagate to the pipeline's
//! layered fallback, never retried here.

use async_trait::async_trait;
use thiserror::Error;

use mapt_core::AssessmentResult;

/// Failures from the completion capability.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(String),

    /// Request never produced a usable response (network, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status.
    #[error("provider returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Bounded provider error text.
        message: String,
    },

    /// Provider answered but carried no completion text.
    #[error("provider returned an empty response")]
    Empty,

    /// Structured response text did not decode to the expected shape.
    #[error("structured response did not decode: {0}")]
    Decode(String),
}

/// Failure from the context retriever.
#[derive(Debug, Error)]
#[error("context retrieval failed: {0}")]
pub struct RetrievalError(pub String);

/// Text/structured generation capability (the LLM).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Completion: Send + Sync {
    /// Generate free text for a prompt.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Generate a structurally validated assessment for a prompt.
    ///
    /// `schema` is a hint for providers that support constrained output;
    /// decoding against [`AssessmentResult`] is still the contract.
    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<AssessmentResult, CompletionError>;
}

/// Ordered reference-context snippets relevant to a query.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Return up to `k` snippets, most relevant first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError>;
}
