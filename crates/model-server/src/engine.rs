//! Model Engine
//!
//! Prediction behind the [`Model`] trait, with an ONNX implementation on
//! tract and the output encoding used by the invocation route.

use crate::InferenceError;
use ndarray::Array2;
use serde_json::{json, Value};
use service_core::JSON_CONTENT_TYPE;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, info};

/// A loaded model that maps feature rows to one prediction per row
pub trait Model: Send + Sync {
    /// Predict one value per input row
    fn predict(&self, input: &Array2<f64>) -> Result<Vec<Value>, InferenceError>;

    /// Identifier used in logs
    fn name(&self) -> &str;
}

/// ONNX model executed with tract
pub struct OnnxModel {
    plan: TypedRunnableModel<TypedModel>,
    name: String,
}

impl OnnxModel {
    /// Load and optimize the model at `path`
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Loading ONNX model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        info!("Model {} loaded successfully", name);
        Ok(Self { plan, name })
    }
}

impl Model for OnnxModel {
    fn predict(&self, input: &Array2<f64>) -> Result<Vec<Value>, InferenceError> {
        let (rows, cols) = input.dim();
        let data: Vec<f32> = input.iter().map(|v| *v as f32).collect();

        let tensor = Tensor::from_shape(&[rows, cols], &data)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let first = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".to_string()))?;
        debug!("Model output: {:?} {:?}", first.datum_type(), first.shape());

        let values = tensor_values(first)?;
        group_rows(values, first.shape(), rows)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn tensor_values(tensor: &Tensor) -> Result<Vec<Value>, InferenceError> {
    let failed = |e: TractError| InferenceError::InferenceFailed(e.to_string());

    let values = match tensor.datum_type() {
        DatumType::I64 => tensor.as_slice::<i64>().map_err(failed)?.iter().map(|v| json!(v)).collect(),
        DatumType::I32 => tensor.as_slice::<i32>().map_err(failed)?.iter().map(|v| json!(v)).collect(),
        DatumType::F32 => tensor
            .as_slice::<f32>()
            .map_err(failed)?
            .iter()
            .map(|v| Value::from(f64::from(*v)))
            .collect(),
        DatumType::F64 => tensor.as_slice::<f64>().map_err(failed)?.iter().map(|v| Value::from(*v)).collect(),
        other => {
            return Err(InferenceError::InferenceFailed(format!(
                "unsupported output type {:?}",
                other
            )))
        }
    };

    Ok(values)
}

/// One value per row for 1-D outputs (or `[rows, 1]`), one list per row otherwise
pub fn group_rows(values: Vec<Value>, shape: &[usize], rows: usize) -> Result<Vec<Value>, InferenceError> {
    let invalid = || InferenceError::InvalidOutputShape {
        rows,
        shape: format!("{:?}", shape),
    };

    if shape.len() <= 1 {
        if values.len() != rows {
            return Err(invalid());
        }
        return Ok(values);
    }
    if rows == 0 {
        return Ok(values);
    }

    let per_row = values.len() / rows;
    if per_row * rows != values.len() {
        return Err(invalid());
    }
    if per_row == 1 {
        return Ok(values);
    }

    Ok(values
        .chunks(per_row)
        .map(|chunk| Value::Array(chunk.to_vec()))
        .collect())
}

/// Encode predictions as the response body; the accept type is not consulted
pub fn encode_predictions(predictions: Vec<Value>) -> (String, &'static str) {
    (json!({ "predictions": predictions }).to_string(), JSON_CONTENT_TYPE)
}
