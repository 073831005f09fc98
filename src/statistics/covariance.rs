//! Covariance and correlation
//!
//! Two operands of identical shape are split into matching lanes; a first pass
//! computes both lane means and a second pass accumulates products of
//! deviations. Mixed element types are computed in the wider float type.

use super::moments::{denominator, lane_means};
use crate::errors::{DimStatsError, Result};
use crate::kernel::{execute, into_output, LaneFold, Lanes};
use crate::parallel::{ExecutionMode, Threading};
use crate::plan::{Dims, ReductionPlan};
use crate::promote::{Element, PairFloat, StatFloat, Wider};
use ndarray::{Array2, ArrayBase, ArrayD, Axis, Data, Dimension, Ix2};
use num_traits::{One, Zero};
use rayon::prelude::*;
use std::ops::Range;

#[inline]
fn lift_left<A, B>(x: A::Float) -> PairFloat<A, B>
where
    A: Element,
    B: Element,
    A::Float: Wider<B::Float>,
{
    <A::Float as Wider<B::Float>>::promote(x)
}

#[inline]
fn lift_right<A, B>(y: B::Float) -> PairFloat<A, B>
where
    A: Element,
    B: Element,
    A::Float: Wider<B::Float>,
{
    <A::Float as Wider<B::Float>>::promote_rhs(y)
}

/// Matching lanes of two operands with their lane means
struct PairedLanes<'l, 'a, 'b, A: Element, B: Element, W> {
    left: &'l Lanes<'a, A>,
    right: &'l Lanes<'b, B>,
    left_means: Vec<W>,
    right_means: Vec<W>,
}

impl<'l, 'a, 'b, A, B> PairedLanes<'l, 'a, 'b, A, B, PairFloat<A, B>>
where
    A: Element,
    B: Element,
    A::Float: Wider<B::Float>,
{
    fn new(left: &'l Lanes<'a, A>, right: &'l Lanes<'b, B>, mode: ExecutionMode) -> Self {
        let left_means = lane_means(left, mode)
            .into_iter()
            .map(lift_left::<A, B>)
            .collect();
        let right_means = lane_means(right, mode)
            .into_iter()
            .map(lift_right::<A, B>)
            .collect();
        Self {
            left,
            right,
            left_means,
            right_means,
        }
    }

    /// Fold the paired deviations of the elements in `span` of `lane`.
    #[inline]
    fn fold_deviations<T>(
        &self,
        lane: usize,
        span: Range<usize>,
        init: T,
        mut f: impl FnMut(T, PairFloat<A, B>, PairFloat<A, B>) -> T,
    ) -> T {
        let (mx, my) = (self.left_means[lane], self.right_means[lane]);
        let xs = &self.left.lane(lane)[span.clone()];
        let ys = &self.right.lane(lane)[span];
        xs.iter().zip(ys).fold(init, |acc, (&x, &y)| {
            let dx = lift_left::<A, B>(x.to_float()) - mx;
            let dy = lift_right::<A, B>(y.to_float()) - my;
            f(acc, dx, dy)
        })
    }
}

/// Σ dx·dy / denom per lane
struct CovFold<'p, 'l, 'a, 'b, A: Element, B: Element, W> {
    pairs: &'p PairedLanes<'l, 'a, 'b, A, B, W>,
    denom: W,
}

impl<A, B> LaneFold for CovFold<'_, '_, '_, '_, A, B, PairFloat<A, B>>
where
    A: Element,
    B: Element,
    A::Float: Wider<B::Float>,
{
    type Acc = PairFloat<A, B>;
    type Out = PairFloat<A, B>;

    fn identity(&self) -> Self::Acc {
        Zero::zero()
    }

    fn fold(&self, lane: usize, span: Range<usize>, acc: Self::Acc) -> Self::Acc {
        self.pairs
            .fold_deviations(lane, span, acc, |sum, dx, dy| sum + dx * dy)
    }

    fn combine(&self, left: Self::Acc, right: Self::Acc) -> Self::Acc {
        left + right
    }

    fn finish(&self, _lane: usize, acc: Self::Acc) -> Self::Out {
        acc / self.denom
    }
}

/// (Σ dx·dy, Σ dx², Σ dy²) per lane, finished as the Pearson coefficient
struct CorFold<'p, 'l, 'a, 'b, A: Element, B: Element, W> {
    pairs: &'p PairedLanes<'l, 'a, 'b, A, B, W>,
}

impl<A, B> LaneFold for CorFold<'_, '_, '_, '_, A, B, PairFloat<A, B>>
where
    A: Element,
    B: Element,
    A::Float: Wider<B::Float>,
{
    type Acc = (PairFloat<A, B>, PairFloat<A, B>, PairFloat<A, B>);
    type Out = PairFloat<A, B>;

    fn identity(&self) -> Self::Acc {
        (Zero::zero(), Zero::zero(), Zero::zero())
    }

    fn fold(&self, lane: usize, span: Range<usize>, acc: Self::Acc) -> Self::Acc {
        self.pairs.fold_deviations(lane, span, acc, |(sxy, sxx, syy), dx, dy| {
            (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
        })
    }

    fn combine(&self, left: Self::Acc, right: Self::Acc) -> Self::Acc {
        (left.0 + right.0, left.1 + right.1, left.2 + right.2)
    }

    fn finish(&self, _lane: usize, (sxy, sxx, syy): Self::Acc) -> Self::Out {
        pearson(sxy, sxx, syy)
    }
}

/// Pearson coefficient from deviation sums; NaN when either side is constant.
fn pearson<F: StatFloat>(sxy: F, sxx: F, syy: F) -> F {
    if sxx.is_zero() || syy.is_zero() {
        return F::nan();
    }
    let one = F::one();
    (sxy / (sxx * syy).sqrt()).max(-one).min(one)
}

fn check_same_shape(left: &[usize], right: &[usize]) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(DimStatsError::ShapeMismatch {
            left: left.to_vec(),
            right: right.to_vec(),
        })
    }
}

/// Covariance between `a` and `b` over `dims`, per lane.
///
/// # Errors
///
/// Returns [`DimStatsError::ShapeMismatch`] if the shapes differ, or a domain
/// error under the same count conditions as [`var`](super::var).
pub fn cov<A, B, SA, SB, DA, DB>(
    a: &ArrayBase<SA, DA>,
    b: &ArrayBase<SB, DB>,
    dims: impl Into<Dims>,
    threading: Threading,
    corrected: bool,
) -> Result<ArrayD<PairFloat<A, B>>>
where
    A: Element,
    B: Element,
    A::Float: Wider<B::Float>,
    SA: Data<Elem = A>,
    SB: Data<Elem = B>,
    DA: Dimension,
    DB: Dimension,
{
    check_same_shape(a.shape(), b.shape())?;
    let plan = ReductionPlan::resolve(a.shape(), &dims.into());
    let denom = denominator(plan.target_len(), corrected, "covariance")?;
    let mode = threading.resolve(a.len());
    tracing::debug!(
        lanes = plan.kept_len(),
        lane_len = plan.target_len(),
        corrected,
        ?mode,
        "covariance"
    );

    let left = Lanes::new(a.view().into_dyn(), &plan);
    let right = Lanes::new(b.view().into_dyn(), &plan);
    let pairs = PairedLanes::new(&left, &right, mode);
    let op = CovFold {
        pairs: &pairs,
        denom,
    };
    into_output(&plan, execute(&op, left.count(), left.lane_len(), mode))
}

/// Pearson correlation between `a` and `b` over `dims`, per lane.
///
/// A lane where either operand is constant yields NaN.
///
/// # Errors
///
/// Returns [`DimStatsError::ShapeMismatch`] if the shapes differ, or a domain
/// error if the targeted extent is below 2.
pub fn cor<A, B, SA, SB, DA, DB>(
    a: &ArrayBase<SA, DA>,
    b: &ArrayBase<SB, DB>,
    dims: impl Into<Dims>,
    threading: Threading,
) -> Result<ArrayD<PairFloat<A, B>>>
where
    A: Element,
    B: Element,
    A::Float: Wider<B::Float>,
    SA: Data<Elem = A>,
    SB: Data<Elem = B>,
    DA: Dimension,
    DB: Dimension,
{
    check_same_shape(a.shape(), b.shape())?;
    let plan = ReductionPlan::resolve(a.shape(), &dims.into());
    if plan.target_len() < 2 {
        return Err(DimStatsError::domain(format!(
            "correlation needs at least 2 elements per slice, got {}",
            plan.target_len()
        )));
    }
    let mode = threading.resolve(a.len());

    let left = Lanes::new(a.view().into_dyn(), &plan);
    let right = Lanes::new(b.view().into_dyn(), &plan);
    let pairs = PairedLanes::new(&left, &right, mode);
    into_output(&plan, execute(&CorFold { pairs: &pairs }, left.count(), left.lane_len(), mode))
}

/// Variables of a 2-D operand as centered rows of a flat buffer, plus the
/// number of observations per variable.
fn centered_rows<A, S>(
    x: &ArrayBase<S, Ix2>,
    obs_axis: usize,
) -> Result<(Vec<A::Float>, usize, usize)>
where
    A: Element,
    S: Data<Elem = A>,
{
    if obs_axis > 1 {
        return Err(DimStatsError::InvalidDimension {
            axis: obs_axis,
            ndim: 2,
        });
    }
    let var_axis = Axis(1 - obs_axis);
    let nvar = x.len_of(var_axis);
    let nobs = x.len_of(Axis(obs_axis));

    let mut rows = Vec::with_capacity(nvar * nobs);
    for variable in x.axis_iter(var_axis) {
        let start = rows.len();
        rows.extend(variable.iter().map(|&v| v.to_float()));
        let row = &mut rows[start..];
        if !row.is_empty() {
            let total = row.iter().fold(<A::Float as Zero>::zero(), |s, &v| s + v);
            let mean = total / A::Float::from_count(nobs);
            row.iter_mut().for_each(|v| *v = *v - mean);
        }
    }
    Ok((rows, nvar, nobs))
}

/// Pairwise dot products of centered rows, scaled by `1 / denom`.
fn gram<F: StatFloat>(
    rows: &[F],
    nvar: usize,
    nobs: usize,
    denom: F,
    mode: ExecutionMode,
) -> Array2<F> {
    let mut out = Array2::<F>::zeros((nvar, nvar));
    if nvar == 0 {
        return out;
    }
    let fill = |(i, dst): (usize, &mut [F])| {
        let xi = &rows[i * nobs..(i + 1) * nobs];
        for (j, cell) in dst.iter_mut().enumerate() {
            let xj = &rows[j * nobs..(j + 1) * nobs];
            let dot = xi.iter().zip(xj).fold(F::zero(), |s, (&x, &y)| s + x * y);
            *cell = dot / denom;
        }
    };

    // zeros() is standard layout, so as_slice_mut is always Some
    if let Some(flat) = out.as_slice_mut() {
        match mode {
            ExecutionMode::Serial => flat.chunks_mut(nvar).enumerate().for_each(fill),
            ExecutionMode::Parallel => flat.par_chunks_mut(nvar).enumerate().for_each(fill),
        }
    }
    out
}

/// Covariance matrix between the variables of a 2-D array.
///
/// `obs_axis` names the axis that indexes observations; the other axis
/// indexes variables, and entry `(i, j)` is the covariance of variables `i`
/// and `j`. The result is symmetric.
///
/// # Errors
///
/// Returns [`DimStatsError::InvalidDimension`] if `obs_axis > 1`, or a domain
/// error under the same count conditions as [`var`](super::var).
pub fn cov_matrix<A, S>(
    x: &ArrayBase<S, Ix2>,
    obs_axis: usize,
    threading: Threading,
    corrected: bool,
) -> Result<Array2<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
{
    let (rows, nvar, nobs) = centered_rows(x, obs_axis)?;
    let denom = denominator(nobs, corrected, "covariance")?;
    let mode = threading.resolve(x.len());
    tracing::debug!(nvar, nobs, corrected, ?mode, "covariance matrix");
    Ok(gram(&rows, nvar, nobs, denom, mode))
}

/// Correlation matrix between the variables of a 2-D array; see [`cov_matrix`].
///
/// The diagonal is 1, except for constant variables whose row and column are NaN.
///
/// # Errors
///
/// Returns [`DimStatsError::InvalidDimension`] if `obs_axis > 1`, or a domain
/// error if there are fewer than 2 observations.
pub fn cor_matrix<A, S>(
    x: &ArrayBase<S, Ix2>,
    obs_axis: usize,
    threading: Threading,
) -> Result<Array2<A::Float>>
where
    A: Element,
    S: Data<Elem = A>,
{
    let (rows, nvar, nobs) = centered_rows(x, obs_axis)?;
    if nobs < 2 {
        return Err(DimStatsError::domain(format!(
            "correlation needs at least 2 observations, got {nobs}"
        )));
    }
    let mode = threading.resolve(x.len());
    let mut cov = gram(&rows, nvar, nobs, <A::Float as One>::one(), mode);

    let diagonal: Vec<A::Float> = cov.diag().to_vec();
    for ((i, j), value) in cov.indexed_iter_mut() {
        *value = if i == j && !diagonal[i].is_zero() {
            <A::Float as One>::one()
        } else {
            pearson(*value, diagonal[i], diagonal[j])
        };
    }
    Ok(cov)
}
