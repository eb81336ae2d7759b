//! Load-once model store.
//!
//! The predictor is acquired lazily on first use and then shared as an
//! `Arc<dyn Predictor>` for the rest of the process. The slot's mutex is held
//! for the whole acquisition, so concurrent first callers wait for the single
//! in-flight load and reuse its result. A failed load leaves the slot empty;
//! the next call tries again.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, instrument};

use crate::config::Settings;
use crate::data::ensure_artifact;
use crate::error::ClvError;
use crate::io::artifact::read_artifact;
use crate::models::{LinearModel, Predictor};

type Loader = Box<dyn Fn() -> Result<Arc<dyn Predictor>, ClvError> + Send + Sync>;

pub struct ModelStore {
    loader: Loader,
    slot: Mutex<Option<Arc<dyn Predictor>>>,
}

impl ModelStore {
    /// Store backed by the local artifact, fetched from remote storage if absent.
    pub fn new(settings: Settings) -> Self {
        Self::with_loader(move || load_predictor(&settings))
    }

    pub fn with_loader(loader: impl Fn() -> Result<Arc<dyn Predictor>, ClvError> + Send + Sync + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            slot: Mutex::new(None),
        }
    }

    /// Return the shared predictor, loading it on first call.
    pub fn get(&self) -> Result<Arc<dyn Predictor>, ClvError> {
        // The slot only ever holds a fully built predictor, so a poisoned lock
        // is still consistent.
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(predictor) = slot.as_ref() {
            return Ok(Arc::clone(predictor));
        }

        let predictor = (self.loader)()?;
        *slot = Some(Arc::clone(&predictor));
        Ok(predictor)
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

/// Fetch (if needed), read, and compile the configured artifact.
#[instrument(skip_all, fields(path = %settings.model_path.display()))]
pub fn load_predictor(settings: &Settings) -> Result<Arc<dyn Predictor>, ClvError> {
    ensure_artifact(settings, false)?;
    let artifact = read_artifact(&settings.model_path)?;
    let model = LinearModel::from_artifact(artifact).map_err(|e| {
        ClvError::ModelUnavailable(format!("'{}': {e}", settings.model_path.display()))
    })?;
    info!(model = model.name(), features = model.n_features(), "model loaded");
    Ok(Arc::new(model))
}
