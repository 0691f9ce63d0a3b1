//! # mapt-core
//!
//! Foundation types for the mapt assessment engine.
//!
//! This crate provides the shared vocabulary the engine and CLI depend on:
//!
//! - **Taxonomy**: [`taxonomy::Taxonomy`] — the fixed quality list and
//!   [`taxonomy::Level`] rating levels
//! - **Results**: [`assessment::AssessmentResult`] /
//!   [`assessment::AssessmentError`], unified as
//!   [`assessment::AssessmentOutcome`]
//! - **Labels**: [`labels::extract_labels`] — fuzzy normalization of raw
//!   model output into canonical `"quality-level"` tokens
//! - **Text**: [`text::preview`] — bounded, UTF-8-safe response previews
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `mapt-engine` and `mapt-cli`.

#![deny(unsafe_code)]

pub mod assessment;
pub mod labels;
pub mod taxonomy;
pub mod text;

pub use assessment::{
    AssessmentError, AssessmentItem, AssessmentOutcome, AssessmentResult, BatchItem, BatchRecord,
};
pub use labels::{CanonicalLabel, extract_labels};
pub use taxonomy::{Level, Taxonomy};
