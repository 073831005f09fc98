//! Lane executor shared by every statistic
//!
//! A [`ReductionPlan`] splits an array into lanes: one lane per kept-index
//! tuple, holding that tuple's target elements in row-major target order.
//! [`Lanes`] lays the lanes out contiguously (borrowing the input when it is
//! already in that order) so that every statistic reduces to "apply a function
//! to each lane". Lanes are visited in lexicographic kept order, which is also
//! the standard-layout order of the output.

use crate::errors::Result;
use crate::parallel::{ExecutionMode, Threading};
use crate::plan::{Dims, ReductionPlan};
use ndarray::{ArrayBase, ArrayD, ArrayView, Data, DataMut, Dimension, IxDyn};
use rayon::prelude::*;
use std::borrow::Cow;
use std::ops::Range;

/// Target elements per block when a single lane is folded by several workers
pub const MIN_SPLIT: usize = 4096;

/// Contiguous lane storage for one operand
#[derive(Debug)]
pub struct Lanes<'a, A: Clone> {
    data: Cow<'a, [A]>,
    count: usize,
    len: usize,
}

impl<'a, A: Clone> Lanes<'a, A> {
    /// Lay out `view` lane by lane according to `plan`.
    #[must_use]
    pub fn new(view: ArrayView<'a, A, IxDyn>, plan: &ReductionPlan) -> Self {
        let permuted = view.permuted_axes(plan.axis_order());
        let data = match permuted.to_slice() {
            Some(slice) => Cow::Borrowed(slice),
            None => {
                tracing::debug!(shape = ?plan.shape(), "copying operand into lane order");
                Cow::Owned(permuted.iter().cloned().collect())
            }
        };
        Self {
            data,
            count: plan.kept_len(),
            len: plan.target_len(),
        }
    }

    /// Number of lanes
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Elements per lane
    #[must_use]
    pub fn lane_len(&self) -> usize {
        self.len
    }

    /// The target elements of lane `index`
    #[must_use]
    pub fn lane(&self, index: usize) -> &[A] {
        let start = index * self.len;
        &self.data[start..start + self.len]
    }
}

/// Everything a statistic needs once the call's arguments are resolved
#[derive(Debug)]
pub struct Prepared<'a, A: Clone> {
    pub plan: ReductionPlan,
    pub lanes: Lanes<'a, A>,
    pub mode: ExecutionMode,
}

/// Resolve the plan, lay out the lanes and pick the execution mode.
pub fn prepare<'a, A, S, D>(
    array: &'a ArrayBase<S, D>,
    dims: &Dims,
    threading: Threading,
) -> Prepared<'a, A>
where
    A: Clone + 'a,
    S: Data<Elem = A>,
    D: Dimension,
{
    let plan = ReductionPlan::resolve(array.shape(), dims);
    let mode = threading.resolve(array.len());
    let lanes = Lanes::new(array.view().into_dyn(), &plan);
    Prepared { plan, lanes, mode }
}

/// A decomposable per-lane reduction.
///
/// `fold` consumes a sub-range of a lane; partial accumulators of the same
/// lane are merged with `combine`, so a lane may be split across workers.
pub trait LaneFold: Sync {
    type Acc: Copy + Send;
    type Out: Send;

    fn identity(&self) -> Self::Acc;
    fn fold(&self, lane: usize, span: Range<usize>, acc: Self::Acc) -> Self::Acc;
    fn combine(&self, left: Self::Acc, right: Self::Acc) -> Self::Acc;
    fn finish(&self, lane: usize, acc: Self::Acc) -> Self::Out;
}

/// Run `op` over `count` lanes of `len` elements each, one output per lane.
///
/// Multi-worker execution splits the lanes into contiguous blocks. When there
/// are fewer lanes than workers, each long lane is instead folded in blocks of
/// [`MIN_SPLIT`] elements by all workers and the partials combined.
pub fn execute<F: LaneFold>(op: &F, count: usize, len: usize, mode: ExecutionMode) -> Vec<F::Out> {
    match mode {
        ExecutionMode::Serial => (0..count).map(|lane| fold_whole(op, lane, len)).collect(),
        ExecutionMode::Parallel
            if count >= rayon::current_num_threads() || len < 2 * MIN_SPLIT =>
        {
            (0..count)
                .into_par_iter()
                .map(|lane| fold_whole(op, lane, len))
                .collect()
        }
        ExecutionMode::Parallel => {
            tracing::debug!(count, len, "splitting lanes across workers");
            (0..count).map(|lane| fold_split(op, lane, len)).collect()
        }
    }
}

fn fold_whole<F: LaneFold>(op: &F, lane: usize, len: usize) -> F::Out {
    op.finish(lane, op.fold(lane, 0..len, op.identity()))
}

fn fold_split<F: LaneFold>(op: &F, lane: usize, len: usize) -> F::Out {
    let blocks = len.div_ceil(MIN_SPLIT);
    let acc = (0..blocks)
        .into_par_iter()
        .map(|block| {
            let start = block * MIN_SPLIT;
            let end = (start + MIN_SPLIT).min(len);
            op.fold(lane, start..end, op.identity())
        })
        .reduce(|| op.identity(), |left, right| op.combine(left, right));
    op.finish(lane, acc)
}

/// Map every lane through `f`, giving each worker one reusable scratch value.
pub fn map_lanes<A, T, O, I, F>(lanes: &Lanes<'_, A>, mode: ExecutionMode, init: I, f: F) -> Vec<O>
where
    A: Clone + Sync,
    O: Send,
    I: Fn() -> T + Sync + Send,
    F: Fn(&mut T, &[A]) -> O + Sync + Send,
{
    match mode {
        ExecutionMode::Serial => {
            let mut scratch = init();
            (0..lanes.count())
                .map(|lane| f(&mut scratch, lanes.lane(lane)))
                .collect()
        }
        ExecutionMode::Parallel => (0..lanes.count())
            .into_par_iter()
            .map_init(&init, |scratch, lane| f(scratch, lanes.lane(lane)))
            .collect(),
    }
}

/// Apply `f` to each lane of a lane-ordered mutable buffer.
pub fn map_lanes_mut<A, O, F>(
    buf: &mut [A],
    count: usize,
    len: usize,
    mode: ExecutionMode,
    f: F,
) -> Vec<O>
where
    A: Send,
    O: Send,
    F: Fn(&mut [A]) -> O + Sync + Send,
{
    if len == 0 {
        return (0..count).map(|_| f(&mut [])).collect();
    }
    match mode {
        ExecutionMode::Serial => buf.chunks_mut(len).map(f).collect(),
        ExecutionMode::Parallel => buf.par_chunks_mut(len).map(f).collect(),
    }
}

/// Pair each input lane with the matching lane of `out` (same lane length).
pub fn zip_lanes_mut<A, O, F>(lanes: &Lanes<'_, A>, out: &mut [O], mode: ExecutionMode, f: F)
where
    A: Clone + Sync,
    O: Send,
    F: Fn(&[A], &mut [O]) + Sync + Send,
{
    let len = lanes.lane_len();
    if len == 0 {
        return;
    }
    match mode {
        ExecutionMode::Serial => out
            .chunks_mut(len)
            .enumerate()
            .for_each(|(lane, dst)| f(lanes.lane(lane), dst)),
        ExecutionMode::Parallel => out
            .par_chunks_mut(len)
            .enumerate()
            .for_each(|(lane, dst)| f(lanes.lane(lane), dst)),
    }
}

/// Shape one value per lane into the reduction output.
///
/// # Errors
///
/// Returns an error if `values` does not hold exactly one value per lane.
pub fn into_output<T>(plan: &ReductionPlan, values: Vec<T>) -> Result<ArrayD<T>> {
    Ok(ArrayD::from_shape_vec(plan.output_shape(), values)?)
}

/// Run `f` on the lanes of a mutable operand, in place.
///
/// When the operand is already in lane order `f` sees its memory directly;
/// otherwise `f` works on a lane-ordered copy that is written back afterwards.
pub fn with_lanes_mut<A, S, D, R, F>(array: &mut ArrayBase<S, D>, plan: &ReductionPlan, f: F) -> R
where
    A: Clone,
    S: DataMut<Elem = A>,
    D: Dimension,
    F: FnOnce(&mut [A]) -> R,
{
    let mut view = array.view_mut().into_dyn().permuted_axes(plan.axis_order());
    if let Some(slice) = view.as_slice_mut() {
        return f(slice);
    }

    tracing::debug!(shape = ?plan.shape(), "working on a lane-ordered copy");
    let mut buf: Vec<A> = view.iter().cloned().collect();
    let out = f(&mut buf);
    view.iter_mut().zip(buf).for_each(|(dst, src)| *dst = src);
    out
}
