//! Sum, mean, variance and standard deviation over arbitrary axes
//!
//! Variance is computed in two passes (lane means, then squared deviations
//! from them) rather than from a running sum of squares.

use crate::errors::{DimStatsError, Result};
use crate::kernel::{execute, into_output, prepare, LaneFold, Lanes, Prepared};
use crate::parallel::{ExecutionMode, Threading};
use crate::plan::Dims;
use crate::promote::{Element, StatFloat};
use ndarray::{ArrayBase, ArrayD, Data, Dimension};
use num_traits::{Float, Zero};
use std::ops::Range;

/// Sum of each lane in the element's accumulator type
struct SumFold<'l, 'a, A: Clone> {
    lanes: &'l Lanes<'a, A>,
}

impl<A: Element> LaneFold for SumFold<'_, '_, A> {
    type Acc = A::Acc;
    type Out = A::Acc;

    fn identity(&self) -> A::Acc {
        Zero::zero()
    }

    #[inline]
    fn fold(&self, lane: usize, span: Range<usize>, acc: A::Acc) -> A::Acc {
        self.lanes.lane(lane)[span]
            .iter()
            .fold(acc, |sum, &x| sum + x.widen())
    }

    fn combine(&self, left: A::Acc, right: A::Acc) -> A::Acc {
        left + right
    }

    fn finish(&self, _lane: usize, acc: A::Acc) -> A::Acc {
        acc
    }
}

/// Sum of squared deviations from each lane's mean, divided by `denom`
struct SquaredDeviations<'l, 'a, A: Element> {
    lanes: &'l Lanes<'a, A>,
    means: &'l [A::Float],
    denom: A::Float,
}

impl<A: Element> LaneFold for SquaredDeviations<'_, '_, A> {
    type Acc = A::Float;
    type Out = A::Float;

    fn identity(&self) -> A::Float {
        Zero::zero()
    }

    #[inline]
    fn fold(&self, lane: usize, span: Range<usize>, acc: A::Float) -> A::Float {
        let mean = self.means[lane];
        self.lanes.lane(lane)[span].iter().fold(acc, |sum, &x| {
            let d = x.to_float() - mean;
            sum + d * d
        })
    }

    fn combine(&self, left: A::Float, right: A::Float) -> A::Float {
        left + right
    }

    fn finish(&self, _lane: usize, acc: A::Float) -> A::Float {
        acc / self.denom
    }
}

/// Per-lane means; lanes must be non-empty.
pub(crate) fn lane_means<A: Element>(lanes: &Lanes<'_, A>, mode: ExecutionMode) -> Vec<A::Float> {
    let n = A::Float::from_count(lanes.lane_len());
    execute(&SumFold { lanes }, lanes.count(), lanes.lane_len(), mode)
        .into_iter()
        .map(|sum| A::acc_to_float(sum) / n)
        .collect()
}

/// Normalizer for a second-moment statistic over `n` elements.
pub(crate) fn denominator<F: StatFloat>(n: usize, corrected: bool, op: &str) -> Result<F> {
    if corrected {
        if n <= 1 {
            return Err(DimStatsError::domain(format!(
                "corrected {op} needs at least 2 elements per slice, got {n}"
            )));
        }
        Ok(F::from_count(n - 1))
    } else {
        if n == 0 {
            return Err(DimStatsError::domain(format!("{op} of an empty slice")));
        }
        Ok(F::from_count(n))
    }
}

/// Sum over `dims`, accumulated in the element's widened type.
///
/// A zero-length target yields zeros.
///
/// # Errors
///
/// Returns an error only if the output array cannot be assembled.
pub fn sum<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A::Acc>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    let Prepared { plan, lanes, mode } = prepare(array, &dims.into(), threading);
    tracing::debug!(lanes = lanes.count(), lane_len = lanes.lane_len(), ?mode, "sum");
    let sums = execute(&SumFold { lanes: &lanes }, lanes.count(), lanes.lane_len(), mode);
    into_output(&plan, sums)
}

/// Arithmetic mean over `dims`.
///
/// # Errors
///
/// Returns a domain error if the targeted extent is zero.
pub fn mean<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    let Prepared { plan, lanes, mode } = prepare(array, &dims.into(), threading);
    plan.require_non_empty("mean")?;
    into_output(&plan, lane_means(&lanes, mode))
}

/// Variance over `dims`, divided by `n - 1` when `corrected` and by `n` otherwise.
///
/// # Errors
///
/// Returns a domain error if `corrected` and the targeted extent is at most 1,
/// or if the targeted extent is zero.
pub fn var<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
    corrected: bool,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    let Prepared { plan, lanes, mode } = prepare(array, &dims.into(), threading);
    let denom = denominator(plan.target_len(), corrected, "variance")?;
    tracing::debug!(
        lanes = lanes.count(),
        lane_len = lanes.lane_len(),
        corrected,
        ?mode,
        "variance"
    );

    let means = lane_means(&lanes, mode);
    let op = SquaredDeviations {
        lanes: &lanes,
        means: &means,
        denom,
    };
    into_output(&plan, execute(&op, lanes.count(), lanes.lane_len(), mode))
}

/// Standard deviation over `dims`: the square root of [`var`].
///
/// # Errors
///
/// Same conditions as [`var`].
pub fn std<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
    corrected: bool,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    let mut out = var(array, dims, threading, corrected)?;
    out.mapv_inplace(Float::sqrt);
    Ok(out)
}
