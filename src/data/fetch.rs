//! Model artifact retrieval.
//!
//! The artifact lives in remote blob storage under a fixed identifier. It is
//! downloaded once to the configured local path and only read afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::ClvError;
use crate::models::{LinearArtifact, LinearModel};

/// What `ensure_artifact` had to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The artifact was already on disk.
    Present,
    Downloaded { bytes: u64 },
}

pub struct ArtifactClient {
    client: Client,
    url: String,
}

impl ArtifactClient {
    pub fn new(settings: &Settings) -> Result<Self, ClvError> {
        let client = Client::builder()
            .timeout(settings.fetch_timeout)
            .build()
            .map_err(|e| ClvError::ModelUnavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: settings.model_url.clone(),
        })
    }

    /// Download the artifact to `dest`.
    ///
    /// Only a body that compiles as a model is written. It is staged next to
    /// `dest` and renamed into place, so a failed transfer never leaves a
    /// truncated or foreign file at `dest`.
    pub fn download_to(&self, dest: &Path) -> Result<u64, ClvError> {
        info!(url = %self.url, dest = %dest.display(), "fetching model artifact");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| ClvError::ModelUnavailable(format!("artifact request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ClvError::ModelUnavailable(format!(
                "artifact request failed with status {}",
                resp.status()
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| ClvError::ModelUnavailable(format!("failed to read artifact body: {e}")))?;

        if body.is_empty() {
            return Err(ClvError::ModelUnavailable("remote artifact is empty".to_string()));
        }
        // Shared-drive links answer with an HTML interstitial when the file is
        // private or too large to scan.
        if looks_like_html(&body) {
            return Err(ClvError::ModelUnavailable(
                "remote returned an HTML page instead of the artifact (check sharing settings)".to_string(),
            ));
        }
        check_artifact(&body)?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ClvError::ModelUnavailable(format!("failed to create '{}': {e}", parent.display()))
            })?;
        }

        let staging = staging_path(dest);
        fs::write(&staging, &body).map_err(|e| {
            ClvError::ModelUnavailable(format!("failed to write '{}': {e}", staging.display()))
        })?;
        if let Err(e) = fs::rename(&staging, dest) {
            let _ = fs::remove_file(&staging);
            return Err(ClvError::ModelUnavailable(format!(
                "failed to move artifact into '{}': {e}",
                dest.display()
            )));
        }

        Ok(body.len() as u64)
    }
}

/// Make sure the artifact exists locally, fetching it if needed.
pub fn ensure_artifact(settings: &Settings, force: bool) -> Result<FetchOutcome, ClvError> {
    if settings.model_path.is_file() && !force {
        return Ok(FetchOutcome::Present);
    }

    let client = ArtifactClient::new(settings)?;
    match client.download_to(&settings.model_path) {
        Ok(bytes) => {
            info!(bytes, path = %settings.model_path.display(), "model artifact downloaded");
            Ok(FetchOutcome::Downloaded { bytes })
        }
        Err(err) => {
            warn!(error = %err, "model artifact fetch failed");
            Err(err)
        }
    }
}

/// Reject a downloaded body that would not load as a model.
fn check_artifact(body: &[u8]) -> Result<(), ClvError> {
    let artifact: LinearArtifact = serde_json::from_slice(body)
        .map_err(|e| ClvError::ModelUnavailable(format!("downloaded file is not a model artifact: {e}")))?;
    LinearModel::from_artifact(artifact)
        .map_err(|e| ClvError::ModelUnavailable(format!("downloaded artifact rejected: {e}")))?;
    Ok(())
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

fn looks_like_html(body: &[u8]) -> bool {
    let head: Vec<u8> = body
        .iter()
        .copied()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(15)
        .map(|b| b.to_ascii_lowercase())
        .collect();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}
