//! Read model artifact JSON files.
//!
//! The schema is defined by `models::LinearArtifact`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::ClvError;
use crate::models::LinearArtifact;

/// Read a model artifact.
pub fn read_artifact(path: &Path) -> Result<LinearArtifact, ClvError> {
    let file = File::open(path)
        .map_err(|e| ClvError::ModelUnavailable(format!("failed to open model artifact '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ClvError::ModelUnavailable(format!("invalid model artifact '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_minimal_artifact() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"format":"clv-linear/v1","name":"m","intercept":12.5}}"#).unwrap();
        let a = read_artifact(file.path()).unwrap();
        assert_eq!(a.name, "m");
        assert!(a.numeric.is_empty() && a.categorical.is_empty());
    }

    #[test]
    fn missing_or_garbled_files_are_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_artifact(&dir.path().join("nope.json")),
            Err(ClvError::ModelUnavailable(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04\x95pickle").unwrap();
        assert!(matches!(read_artifact(file.path()), Err(ClvError::ModelUnavailable(_))));
    }
}
