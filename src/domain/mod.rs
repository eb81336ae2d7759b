//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - closed input catalogs (`Plan`, `Country`, `Recency`, `Frequency`)
//! - the form submission (`RawInput`) and the model-facing record (`ModelRecord`)
//! - scoring outputs (`Tier`, `ChurnRisk`, `DerivedMetrics`, `PredictionResult`)

pub mod types;

pub use types::*;
