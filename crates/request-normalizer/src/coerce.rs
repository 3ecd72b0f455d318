//! Numeric Input Coercion
//!
//! Converts a raw request body into a 2-D `f64` matrix for in-process models.

use crate::error::CoercionError;
use crate::normalizer::select_instances;
use ndarray::Array2;
use serde_json::Value;
use tracing::debug;

/// JSON media type
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Comma separated values media type
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Coerce a request body into a numeric matrix according to its content type
pub fn coerce_input(body: &str, content_type: &str) -> Result<Array2<f64>, CoercionError> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let matrix = match media_type.as_str() {
        JSON_CONTENT_TYPE => coerce_json(body)?,
        CSV_CONTENT_TYPE => coerce_csv(body)?,
        _ => return Err(CoercionError::UnsupportedContentType(content_type.to_string())),
    };

    debug!("Coerced {} body into {:?} matrix", media_type, matrix.dim());
    Ok(matrix)
}

fn coerce_json(body: &str) -> Result<Array2<f64>, CoercionError> {
    let data: Value = serde_json::from_str(body)?;

    let rows = match data {
        Value::Object(map) => match select_instances(&map) {
            Some(instances) => instances.clone(),
            // No known key: the mapping's own values are the rows
            None => Value::Array(map.into_iter().map(|(_, v)| v).collect()),
        },
        other => other,
    };

    to_matrix(&rows)
}

fn coerce_csv(body: &str) -> Result<Array2<f64>, CoercionError> {
    let rows = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split(',').map(parse_token).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;

    build_matrix(rows)
}

fn parse_token(token: &str) -> Result<f64, CoercionError> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| CoercionError::NonNumeric(format!("{:?}", token)))
}

fn coerce_scalar(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CoercionError::NonNumeric(n.to_string())),
        Value::String(s) => parse_token(s),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Array(_) => Err(CoercionError::Shape(
            "instances nest deeper than two levels".to_string(),
        )),
        other => Err(CoercionError::NonNumeric(other.to_string())),
    }
}

/// Scalar → 1×1, flat list → one row, list of lists → matrix
fn to_matrix(value: &Value) -> Result<Array2<f64>, CoercionError> {
    let items = match value {
        Value::Array(items) => items,
        scalar => return build_matrix(vec![vec![coerce_scalar(scalar)?]]),
    };

    let nested = items.iter().filter(|item| item.is_array()).count();
    let rows = if nested == 0 {
        if items.is_empty() {
            Vec::new()
        } else {
            vec![items.iter().map(coerce_scalar).collect::<Result<Vec<_>, _>>()?]
        }
    } else if nested == items.len() {
        items
            .iter()
            .filter_map(Value::as_array)
            .map(|cells| cells.iter().map(coerce_scalar).collect())
            .collect::<Result<Vec<_>, _>>()?
    } else {
        return Err(CoercionError::Shape(
            "instances mix rows and scalar values".to_string(),
        ));
    };

    build_matrix(rows)
}

fn build_matrix(rows: Vec<Vec<f64>>) -> Result<Array2<f64>, CoercionError> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);

    if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(CoercionError::Shape(format!(
            "row {} has {} values, expected {}",
            index,
            row.len(),
            n_cols
        )));
    }

    let data: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), data)
        .map_err(|e| CoercionError::Shape(e.to_string()))
}
