//! Minimum and maximum over arbitrary axes

use crate::errors::{DimStatsError, Result};
use crate::kernel::{execute, into_output, prepare, LaneFold, Lanes, Prepared};
use crate::order::is_unordered;
use crate::parallel::Threading;
use crate::plan::Dims;
use crate::promote::Element;
use ndarray::{ArrayBase, ArrayD, Data, Dimension};
use std::ops::Range;

/// Running extremum; a NaN seen anywhere in the lane wins.
struct ExtremumFold<'l, 'a, A: Clone> {
    lanes: &'l Lanes<'a, A>,
    prefer: fn(&A, &A) -> bool,
}

impl<A: Element> ExtremumFold<'_, '_, A> {
    #[inline]
    fn step(&self, acc: Option<A>, x: A) -> Option<A> {
        match acc {
            None => Some(x),
            Some(best) if is_unordered(&best) => Some(best),
            Some(best) => {
                if is_unordered(&x) || (self.prefer)(&x, &best) {
                    Some(x)
                } else {
                    Some(best)
                }
            }
        }
    }
}

impl<A: Element> LaneFold for ExtremumFold<'_, '_, A> {
    type Acc = Option<A>;
    type Out = Option<A>;

    fn identity(&self) -> Option<A> {
        None
    }

    fn fold(&self, lane: usize, span: Range<usize>, acc: Option<A>) -> Option<A> {
        self.lanes.lane(lane)[span]
            .iter()
            .fold(acc, |best, &x| self.step(best, x))
    }

    fn combine(&self, left: Option<A>, right: Option<A>) -> Option<A> {
        match right {
            Some(x) => self.step(left, x),
            None => left,
        }
    }

    fn finish(&self, _lane: usize, acc: Option<A>) -> Option<A> {
        acc
    }
}

fn extremum<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: Dims,
    threading: Threading,
    op: &str,
    prefer: fn(&A, &A) -> bool,
) -> Result<ArrayD<A>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    let Prepared { plan, lanes, mode } = prepare(array, &dims, threading);
    plan.require_non_empty(op)?;
    tracing::debug!(op, lanes = lanes.count(), lane_len = lanes.lane_len(), ?mode, "extremum");

    let fold = ExtremumFold {
        lanes: &lanes,
        prefer,
    };
    let values = execute(&fold, lanes.count(), lanes.lane_len(), mode)
        .into_iter()
        .collect::<Option<Vec<A>>>()
        .ok_or_else(|| DimStatsError::domain(format!("{op} of an empty slice")))?;
    into_output(&plan, values)
}

/// Smallest element of each lane, in the element type. NaN propagates.
///
/// # Errors
///
/// Returns a domain error if the targeted extent is zero.
pub fn minimum<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    extremum(array, dims.into(), threading, "minimum", |x, best| x < best)
}

/// Largest element of each lane, in the element type. NaN propagates.
///
/// # Errors
///
/// Returns a domain error if the targeted extent is zero.
pub fn maximum<A, S, D>(
    array: &ArrayBase<S, D>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<A>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    extremum(array, dims.into(), threading, "maximum", |x, best| x > best)
}
