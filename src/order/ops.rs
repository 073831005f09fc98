//! Array-level median, quantile, sort and argsort

use super::select::{quantile_mut, quantiles_mut};
use super::sort::{argsort_into, sort_values};
use crate::errors::{DimStatsError, Result};
use crate::kernel::{
    into_output, map_lanes, map_lanes_mut, prepare, with_lanes_mut, zip_lanes_mut, Prepared,
};
use crate::parallel::Threading;
use crate::plan::{Dims, ReductionPlan};
use crate::promote::Element;
use ndarray::{ArrayBase, ArrayD, Data, DataMut, Dimension};
use num_traits::Zero;

fn check_fraction(q: f64, op: &str) -> Result<()> {
    if (0.0..=1.0).contains(&q) {
        Ok(())
    } else {
        Err(DimStatsError::domain(format!(
            "{op} fraction must be in [0, 1], got {q}"
        )))
    }
}

fn quantile_lanes<A, S, D>(
    array: &ArrayBase<S, D>,
    q: f64,
    dims: &Dims,
    threading: Threading,
    op: &str,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    let Prepared { plan, lanes, mode } = prepare(array, dims, threading);
    plan.require_non_empty(op)?;
    tracing::debug!(
        op,
        q,
        lanes = lanes.count(),
        lane_len = lanes.lane_len(),
        "selecting order statistic"
    );

    let values = map_lanes(&lanes, mode, Vec::new, |buf: &mut Vec<A>, lane| {
        buf.clear();
        buf.extend_from_slice(lane);
        quantile_mut(buf, q)
    });
    into_output(&plan, values)
}

/// Median of each lane: the middle order statistic for odd lengths, the mean
/// of the two middle ones for even lengths.
///
/// # Errors
///
/// Returns a domain error if the targeted extent is zero.
pub fn median<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    quantile_lanes(array, 0.5, &dims.into(), threading, "median")
}

/// Quantile `q` of each lane, interpolating linearly at rank `q * (len - 1)`.
///
/// # Errors
///
/// Returns a domain error if `q` is outside `[0, 1]` or the targeted extent is zero.
pub fn quantile<A, S, D>(
    array: &ArrayBase<S, D>,
    q: f64,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    check_fraction(q, "quantile")?;
    quantile_lanes(array, q, &dims.into(), threading, "quantile")
}

/// Percentile `p` (in `[0, 100]`) of each lane.
///
/// # Errors
///
/// Returns a domain error if `p` is outside `[0, 100]` or the targeted extent is zero.
pub fn percentile<A, S, D>(
    array: &ArrayBase<S, D>,
    p: f64,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    if !(0.0..=100.0).contains(&p) {
        return Err(DimStatsError::domain(format!(
            "percentile must be in [0, 100], got {p}"
        )));
    }
    quantile_lanes(array, p / 100.0, &dims.into(), threading, "percentile")
}

/// Several quantiles at once. The output gains a leading axis of length
/// `qs.len()`; entry `i` along it holds quantile `qs[i]` with the shape
/// [`quantile`] would return.
///
/// # Errors
///
/// Returns a domain error if any fraction is outside `[0, 1]` or the targeted
/// extent is zero.
pub fn quantiles<A, S, D>(
    array: &ArrayBase<S, D>,
    qs: &[f64],
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    for &q in qs {
        check_fraction(q, "quantile")?;
    }
    let Prepared { plan, lanes, mode } = prepare(array, &dims.into(), threading);
    plan.require_non_empty("quantile")?;

    let per_lane = map_lanes(&lanes, mode, Vec::new, |buf: &mut Vec<A>, lane| {
        buf.clear();
        buf.extend_from_slice(lane);
        quantiles_mut(buf, qs)
    });

    let cells = per_lane.len();
    let mut data = vec![<A::Float as Zero>::zero(); qs.len() * cells];
    for (cell, values) in per_lane.into_iter().enumerate() {
        for (i, value) in values.into_iter().enumerate() {
            data[i * cells + cell] = value;
        }
    }

    let mut shape = vec![qs.len()];
    shape.extend(plan.output_shape());
    Ok(ArrayD::from_shape_vec(shape, data)?)
}

/// Quantile `q` of each lane, using `array` itself as the selection buffer.
///
/// Values within each lane are left reordered; the multiset of each lane is
/// unchanged.
///
/// # Errors
///
/// Returns a domain error if `q` is outside `[0, 1]` or the targeted extent is zero.
pub fn quantile_in_place<A, S, D>(
    array: &mut ArrayBase<S, D>,
    q: f64,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: DataMut<Elem = A>,
    D: Dimension,
{
    check_fraction(q, "quantile")?;
    let plan = ReductionPlan::resolve(array.shape(), &dims.into());
    plan.require_non_empty("quantile")?;
    let mode = threading.resolve(array.len());

    let (count, len) = (plan.kept_len(), plan.target_len());
    let values = with_lanes_mut(array, &plan, |buf| {
        map_lanes_mut(buf, count, len, mode, |lane| quantile_mut(lane, q))
    });
    into_output(&plan, values)
}

/// Median of each lane, using `array` itself as the selection buffer.
///
/// # Errors
///
/// Returns a domain error if the targeted extent is zero.
pub fn median_in_place<A, S, D>(
    array: &mut ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A::Float>>
where
    A: Element,
    S: DataMut<Elem = A>,
    D: Dimension,
{
    quantile_in_place(array, 0.5, dims, threading)
}

/// Sort `array` along its target axes, in place. Each lane (the elements
/// sharing one kept-index tuple, in row-major target order) becomes
/// non-decreasing; NaN sorts last.
pub fn sort_in_place<A, S, D>(
    array: &mut ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
)
where
    A: Copy + PartialOrd + Send + Sync,
    S: DataMut<Elem = A>,
    D: Dimension,
{
    let plan = ReductionPlan::resolve(array.shape(), &dims.into());
    let mode = threading.resolve(array.len());
    let (count, len) = (plan.kept_len(), plan.target_len());
    tracing::debug!(lanes = count, lane_len = len, ?mode, "sorting lanes");

    with_lanes_mut(array, &plan, |buf| {
        map_lanes_mut(buf, count, len, mode, sort_values::<A>);
    });
}

/// A sorted copy of `array`; see [`sort_in_place`].
#[must_use]
pub fn sort<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> ArrayD<A>
where
    A: Copy + PartialOrd + Send + Sync,
    S: Data<Elem = A>,
    D: Dimension,
{
    let mut sorted = array.as_standard_layout().into_owned().into_dyn();
    sort_in_place(&mut sorted, dims, threading);
    sorted
}

/// For each lane, the permutation of `0..lane_len` that sorts it, stored in
/// the lane's own positions. Indices count target positions in row-major
/// target order; equal values keep ascending original index.
#[must_use]
pub fn argsort<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> ArrayD<usize>
where
    A: Clone + PartialOrd + Send + Sync,
    S: Data<Elem = A>,
    D: Dimension,
{
    let Prepared { plan, lanes, mode } = prepare(array, &dims.into(), threading);
    let mut indices = ArrayD::<usize>::zeros(plan.shape());
    with_lanes_mut(&mut indices, &plan, |buf| {
        zip_lanes_mut(&lanes, buf, mode, argsort_into::<A>);
    });
    indices
}
