//! JSON array I/O for the command-line tool
//!
//! Arrays are nested JSON lists in row-major order: `[[1, 2], [3, 4]]` is a
//! 2×2 array and a bare number is a 0-dimensional one. `null` reads as NaN,
//! and non-finite floats are written back as `null`.

use crate::errors::{DimStatsError, Result};
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Extents found by following the first element at each nesting level
fn infer_shape(mut value: &Value) -> Vec<usize> {
    let mut shape = Vec::new();
    while let Value::Array(items) = value {
        shape.push(items.len());
        match items.first() {
            Some(first) => value = first,
            None => break,
        }
    }
    shape
}

fn flatten(value: &Value, shape: &[usize], depth: usize, out: &mut Vec<f64>) -> Result<()> {
    if depth == shape.len() {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::Null => Some(f64::NAN),
            _ => None,
        };
        let Some(x) = number else {
            return Err(DimStatsError::InvalidInput(format!(
                "expected a number at depth {depth}, found {value}"
            )));
        };
        out.push(x);
        return Ok(());
    }

    match value {
        Value::Array(items) if items.len() == shape[depth] => items
            .iter()
            .try_for_each(|item| flatten(item, shape, depth + 1, out)),
        Value::Array(items) => Err(DimStatsError::InvalidInput(format!(
            "ragged array: expected {} elements at depth {depth}, found {}",
            shape[depth],
            items.len()
        ))),
        other => Err(DimStatsError::InvalidInput(format!(
            "expected a list at depth {depth}, found {other}"
        ))),
    }
}

/// Convert a parsed JSON value into an array.
///
/// # Errors
///
/// Returns [`DimStatsError::InvalidInput`] for ragged lists or non-numeric leaves.
pub fn value_to_array(value: &Value) -> Result<ArrayD<f64>> {
    let shape = infer_shape(value);
    let mut data = Vec::with_capacity(shape.iter().product());
    flatten(value, &shape, 0, &mut data)?;
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}

/// Parse an array from JSON text.
///
/// # Errors
///
/// Returns an error if the text is not JSON or not a rectangular numeric list.
pub fn parse_array(text: &str) -> Result<ArrayD<f64>> {
    value_to_array(&serde_json::from_str(text)?)
}

/// Read an array from a JSON stream.
///
/// # Errors
///
/// Returns an error if reading fails or the content is not a rectangular numeric list.
pub fn read_array<R: Read>(reader: R) -> Result<ArrayD<f64>> {
    let value: Value = serde_json::from_reader(reader)?;
    value_to_array(&value)
}

/// Read an array from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or does not hold a valid array.
pub fn read_array_file<P: AsRef<Path>>(path: P) -> Result<ArrayD<f64>> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading array");
    read_array(BufReader::new(File::open(path)?))
}

fn view_to_json<T: Clone + Into<Value>>(view: ArrayViewD<'_, T>) -> Value {
    if view.ndim() == 0 {
        return view.iter().next().cloned().map_or(Value::Null, Into::into);
    }
    Value::Array(view.outer_iter().map(view_to_json).collect())
}

/// Nested JSON lists for an array of any rank.
#[must_use]
pub fn array_to_json<T: Clone + Into<Value>>(array: &ArrayD<T>) -> Value {
    view_to_json(array.view())
}
