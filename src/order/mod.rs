//! Order statistics: median, quantiles, sort and argsort
//!
//! Every operation is applied independently to each lane of a
//! [`ReductionPlan`](crate::plan::ReductionPlan), with the same single- and
//! multi-worker split as the reductions.
//!
//! - [`select`]: quickselect and per-lane quantiles
//! - [`sort`]: quicksort / insertion sort and argsort on slices
//! - [`ops`]: array-level entry points

pub mod ops;
pub mod select;
pub mod sort;

use std::cmp::Ordering;

pub use ops::{
    argsort, median, median_in_place, percentile, quantile, quantile_in_place, quantiles, sort,
    sort_in_place,
};

/// `x` is not comparable with itself (NaN).
#[inline]
pub(crate) fn is_unordered<T: PartialOrd>(x: &T) -> bool {
    x.partial_cmp(x).is_none()
}

/// Total order over `PartialOrd` values: NaN compares equal to NaN and greater
/// than everything else.
#[inline]
pub fn total_order<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    match a.partial_cmp(b) {
        Some(ordering) => ordering,
        None => is_unordered(a).cmp(&is_unordered(b)),
    }
}
