//! Centralized error handling for dimstats
//!
//! Every fallible call in the crate returns [`Result`], and every failure is
//! reported before any output array is produced.

use thiserror::Error;

/// Main error type for dimstats operations
#[derive(Error, Debug)]
pub enum DimStatsError {
    /// A statistic is undefined for the requested input
    /// (quantile fraction outside `[0, 1]`, corrected variance with one sample, ...)
    #[error("Domain error: {0}")]
    Domain(String),

    /// Two-array statistics called with arrays that cannot be paired
    #[error("Shape mismatch: left {left:?}, right {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    /// An axis outside `0..ndim`, reported by the strict plan resolver
    #[error("Axis {axis} is out of bounds for array with {ndim} dimensions")]
    InvalidDimension { axis: usize, ndim: usize },

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed JSON input
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Input that parsed but does not describe a numeric array or option
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DimStatsError {
    pub(crate) fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }
}

/// Result type alias for dimstats operations
pub type Result<T> = std::result::Result<T, DimStatsError>;
