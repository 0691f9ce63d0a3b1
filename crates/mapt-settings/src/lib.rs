//! # mapt-settings
//!
//! Layered configuration for the mapt assessment engine.
//!
//! Settings are resolved from three layers (in priority order):
//! 1. **Compiled defaults** — [`MaptSettings::default()`]
//! 2. **Settings file** — optional JSON, deep-merged over defaults
//! 3. **Environment variables** — `MAPT_*` overrides (highest priority)
//!
//! Resolution happens once, at the composition root; the resulting value is
//! an explicit dependency of whatever holds it. There is deliberately no
//! process-wide singleton and no per-call probing for optional values.
//!
//! # Usage
//!
//! ```no_run
//! use mapt_settings::resolve_settings;
//!
//! let settings = resolve_settings(None);
//! println!("model: {}", settings.model.model);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings_from_path, resolve_settings};
pub use types::*;
