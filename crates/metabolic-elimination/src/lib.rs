//! metabolic-elimination: best-feature elimination sweeps over metabolic
//! measurements, with PARADIGM pathway inference in the loop.
//!
//! The crate covers the selection round trip (vectorize, drop the `k` best
//! columns, map back to named features), the PARADIGM stage (pathway and
//! evidence files, one tool run per pathway and level, output parsing and
//! per-level aggregation) and the evaluation sweep that scores cached
//! datasets with stratified cross-validation.
pub mod config;
pub mod dataset;
pub mod elimination;
pub mod error;
pub mod feature_selection;
pub mod io;
pub mod models;
pub mod network;
pub mod paradigm;
pub mod pipeline;
pub mod preprocessing;
pub mod sweep;
pub mod validation;
pub mod vectorizer;

pub use dataset::{Dataset, FeatureRecord};
pub use error::{EliminationError, Result};
