//! The predictor interface.

use thiserror::Error;

use crate::domain::ModelRecord;

/// Failures raised inside a predictor.
///
/// The scoring core never inspects these beyond their message; they all
/// surface as `ClvError::PredictionFailed`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The record lacks something the model was trained on.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A categorical column carries a level the model has never seen.
    #[error("unknown level '{level}' for column '{column}'")]
    UnknownLevel { column: String, level: String },

    /// The artifact itself is malformed.
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("internal model error: {0}")]
    Internal(String),
}

/// A trained CLV model.
///
/// Implementations are immutable after construction and shared by reference
/// across requests and threads.
pub trait Predictor: Send + Sync {
    /// Short identifier shown in reports and logs.
    fn name(&self) -> &str;

    /// Predict the CLV of a single record.
    fn predict(&self, record: &ModelRecord) -> Result<f64, ModelError>;
}
