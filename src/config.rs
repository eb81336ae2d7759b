//! Runtime settings.
//!
//! Values come from the process environment, after loading an optional `.env`
//! file. CLI flags override them (see `app`).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_MODEL_PATH: &str = "clv_model.json";
/// Identifier of the published model artifact in remote storage.
pub const DEFAULT_ARTIFACT_ID: &str = "1McG3vrjueVBdl5daB_2vCAEjcSY6amVU";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Download URL for a content-addressed artifact id.
pub fn artifact_url(id: &str) -> String {
    format!("https://drive.google.com/uc?export=download&id={id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Local artifact path; read-only once present.
    pub model_path: PathBuf,
    /// Where to fetch the artifact from when `model_path` is missing.
    pub model_url: String,
    pub fetch_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary key lookup.
    ///
    /// `CLV_MODEL_URL` wins over `CLV_MODEL_ID` when both are set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let model_path = lookup("CLV_MODEL_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let model_url = match lookup("CLV_MODEL_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => url,
            None => {
                let id = lookup("CLV_MODEL_ID")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_ARTIFACT_ID.to_string());
                artifact_url(id.trim())
            }
        };

        let timeout_secs = match lookup("CLV_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                AppError::new(2, format!("Invalid CLV_FETCH_TIMEOUT_SECS '{raw}': {e}"))
            })?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(Self {
            model_path,
            model_url,
            fetch_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Apply CLI overrides.
    pub fn with_overrides(mut self, model_path: Option<PathBuf>, model_url: Option<String>) -> Self {
        if let Some(path) = model_path {
            self.model_path = path;
        }
        if let Some(url) = model_url {
            self.model_url = url;
        }
        self
    }
}
