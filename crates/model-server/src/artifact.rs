//! Model Artifact Discovery

use crate::InferenceError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Conventional artifact names, tried in order
pub const CANDIDATE_NAMES: [&str; 3] = ["model.onnx", "classifier.onnx", "sample_model.onnx"];

/// Extension used by the wildcard fallback
pub const MODEL_EXTENSION: &str = "onnx";

/// Locate the model artifact inside `model_dir`.
///
/// Conventional names win over wildcard matches; among wildcard matches the
/// lexicographically first path is used.
pub fn find_model_artifact(model_dir: &Path) -> Result<PathBuf, InferenceError> {
    for name in CANDIDATE_NAMES {
        let path = model_dir.join(name);
        if path.is_file() {
            info!("Found model artifact {}", path.display());
            return Ok(path);
        }
    }

    let mut matches: Vec<PathBuf> = match std::fs::read_dir(model_dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == MODEL_EXTENSION))
            .collect(),
        Err(e) => {
            warn!("Cannot list model directory {}: {}", model_dir.display(), e);
            Vec::new()
        }
    };
    matches.sort();
    debug!("Wildcard matches in {}: {:?}", model_dir.display(), matches);

    matches
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::ModelNotFound(model_dir.display().to_string()))
}
