//! Error types.
//!
//! - `ClvError` is what the scoring pipeline returns. Each variant is recovered
//!   at the boundary nearest its origin and rendered as a message.
//! - `AppError` is the application-level error carried up to `main`, which
//!   prints it and exits with its code.

use thiserror::Error;

/// Failures of the scoring pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClvError {
    /// The model artifact is missing locally and could not be fetched or parsed.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The predictor rejected the record or failed internally.
    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    /// Lifetime and churn derivation need a strictly positive monthly amount.
    #[error("invalid monthly amount {0}: must be strictly positive")]
    InvalidMonthlyAmount(f64),
}

impl ClvError {
    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ClvError::InvalidMonthlyAmount(_) => 2,
            ClvError::ModelUnavailable(_) => 3,
            ClvError::PredictionFailed(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ClvError> for AppError {
    fn from(err: ClvError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
