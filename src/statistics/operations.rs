//! Core statistical operations and traits
//!
//! This module defines the operation selector shared by the library and the
//! command-line tool, and a trait to run any of them on an array.

use super::{extrema, moments};
use crate::errors::Result;
use crate::order;
use crate::parallel::Threading;
use crate::plan::Dims;
use crate::promote::Element;
use ndarray::{ArrayBase, ArrayD, Data, Dimension};

/// Supported single-array reductions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatOperation {
    /// Sum of values
    Sum,
    /// Arithmetic mean
    Mean,
    /// Variance, `n - 1` normalized when `corrected`
    Variance { corrected: bool },
    /// Standard deviation, `n - 1` normalized when `corrected`
    StdDev { corrected: bool },
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Median
    Median,
    /// Quantile at the given fraction
    Quantile(f64),
}

impl StatOperation {
    /// Get the string representation of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Variance { .. } => "variance",
            Self::StdDev { .. } => "standard deviation",
            Self::Min => "minimum",
            Self::Max => "maximum",
            Self::Median => "median",
            Self::Quantile(_) => "quantile",
        }
    }
}

/// Trait for arrays that can be reduced over a set of axes
pub trait StatisticalReduction<T> {
    /// Perform a statistical reduction over `dims`, reporting in the element's
    /// floating result type
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The operation is undefined for the targeted extent (empty or too short)
    /// - A quantile fraction is outside `[0, 1]`
    fn reduce_dims(
        &self,
        dims: impl Into<Dims>,
        operation: StatOperation,
        threading: Threading,
    ) -> Result<ArrayD<T>>;
}

impl<A, S, D> StatisticalReduction<A::Float> for ArrayBase<S, D>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn reduce_dims(
        &self,
        dims: impl Into<Dims>,
        operation: StatOperation,
        threading: Threading,
    ) -> Result<ArrayD<A::Float>> {
        let dims = dims.into();
        tracing::debug!(operation = operation.as_str(), ?dims, %threading, "reducing");
        match operation {
            StatOperation::Sum => Ok(moments::sum(self, dims, threading)?.mapv(A::acc_to_float)),
            StatOperation::Mean => moments::mean(self, dims, threading),
            StatOperation::Variance { corrected } => moments::var(self, dims, threading, corrected),
            StatOperation::StdDev { corrected } => moments::std(self, dims, threading, corrected),
            StatOperation::Min => Ok(extrema::minimum(self, dims, threading)?.mapv(A::to_float)),
            StatOperation::Max => Ok(extrema::maximum(self, dims, threading)?.mapv(A::to_float)),
            StatOperation::Median => order::median(self, dims, threading),
            StatOperation::Quantile(q) => order::quantile(self, q, dims, threading),
        }
    }
}
