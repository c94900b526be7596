//! Configuration management for neuropac analyses.
//!
//! Analyses and decoding runs are described in TOML files so a run can be
//! repeated exactly.
//!
//! # Features
//!
//! - **Analysis configs**: sampling, model, bands, windows, permutations
//! - **Decoding configs**: classifier, cross-validation, feature grouping
//! - **Validation**: every problem in a file reported at once
//!
//! # Example
//!
//! ```rust
//! use neuropac_config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_toml(r#"
//!     sample_rate = 500.0
//!     n_samples = 1000
//!     model = "212"
//!     seed = 1
//! "#).unwrap();
//!
//! let engine = config.build_engine().unwrap();
//! assert_eq!(engine.model().id().to_string(), "212");
//! ```

mod analysis;
mod decoding;
mod error;

/// Configuration validation.
pub mod validation;

pub use analysis::{
    AmplitudeConfig, AmplitudeMeasure, AnalysisConfig, PhaseConfig, SlidingWindows,
};
pub use decoding::DecodingConfig;
pub use error::ConfigError;
pub use validation::{ValidationError, ValidationResult};
