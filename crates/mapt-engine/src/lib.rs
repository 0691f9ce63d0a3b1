//! # mapt-engine
//!
//! The request pipeline that turns one observation string into a validated,
//! rate-limited, structured assessment.
//!
//! - **Governor**: [`governor::RateGovernor`] — dual rolling-window
//!   admission control plus minimum inter-call spacing
//! - **Providers**: [`provider::Completion`] / [`provider::ContextRetriever`]
//!   capability traits, with [`gemini::GeminiProvider`] and
//!   [`retriever::LexicalRetriever`] implementations
//! - **Pipeline**: [`pipeline::AssessmentPipeline`] — retrieval-augmented
//!   prompting with layered response recovery; always returns an outcome,
//!   never an unhandled fault
//!
//! ## Crate Position
//!
//! Depends on `mapt-core` (types) and `mapt-settings` (configuration).
//! Consumed by `mapt-cli`.

#![deny(unsafe_code)]

pub mod gemini;
pub mod governor;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod recovery;
pub mod retriever;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use governor::{GovernorStatus, RateGovernor};
pub use pipeline::{AssessmentPipeline, PipelineConfig};
pub use provider::{Completion, CompletionError, ContextRetriever, RetrievalError};
pub use retriever::LexicalRetriever;
