//! Shape/plan resolution
//!
//! Turns an array shape and a requested set of axes into a [`ReductionPlan`]:
//! the ascending list of kept axes (which survive into the output) and the
//! ascending list of target axes (collapsed, or operated on per output cell).

use crate::errors::{DimStatsError, Result};
use ndarray::Axis;

/// The set of axes a statistic operates over
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Dims {
    /// Every axis of the operand
    #[default]
    All,
    /// An explicit, unordered set of axes
    Only(Vec<usize>),
}

impl Dims {
    /// Shorthand for [`Dims::All`]
    #[must_use]
    pub const fn all() -> Self {
        Self::All
    }
}

impl From<usize> for Dims {
    fn from(axis: usize) -> Self {
        Self::Only(vec![axis])
    }
}

impl From<Axis> for Dims {
    fn from(axis: Axis) -> Self {
        Self::Only(vec![axis.index()])
    }
}

impl From<Vec<usize>> for Dims {
    fn from(axes: Vec<usize>) -> Self {
        Self::Only(axes)
    }
}

impl From<&[usize]> for Dims {
    fn from(axes: &[usize]) -> Self {
        Self::Only(axes.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Dims {
    fn from(axes: [usize; N]) -> Self {
        Self::Only(axes.to_vec())
    }
}

impl From<Option<usize>> for Dims {
    fn from(axis: Option<usize>) -> Self {
        axis.map_or(Self::All, Self::from)
    }
}

/// Kept/target partition of an array's axes, built once per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionPlan {
    shape: Vec<usize>,
    kept: Vec<usize>,
    target: Vec<usize>,
}

impl ReductionPlan {
    /// Resolve `dims` against `shape`, silently dropping axes outside `0..ndim`.
    #[must_use]
    pub fn resolve(shape: &[usize], dims: &Dims) -> Self {
        let ndim = shape.len();
        let mut selected = vec![false; ndim];
        match dims {
            Dims::All => selected.iter_mut().for_each(|s| *s = true),
            Dims::Only(axes) => {
                for &axis in axes {
                    if axis < ndim {
                        selected[axis] = true;
                    } else {
                        tracing::warn!(axis, ndim, "ignoring out-of-range axis");
                    }
                }
            }
        }

        let (target, kept): (Vec<usize>, Vec<usize>) = (0..ndim).partition(|&a| selected[a]);
        let plan = Self {
            shape: shape.to_vec(),
            kept,
            target,
        };
        tracing::debug!(
            shape = ?plan.shape,
            kept = ?plan.kept,
            target = ?plan.target,
            "resolved reduction plan"
        );
        plan
    }

    /// Resolve `dims` against `shape`, rejecting axes outside `0..ndim`.
    ///
    /// # Errors
    ///
    /// Returns [`DimStatsError::InvalidDimension`] for the first out-of-range axis.
    pub fn resolve_strict(shape: &[usize], dims: &Dims) -> Result<Self> {
        if let Dims::Only(axes) = dims {
            if let Some(&axis) = axes.iter().find(|&&a| a >= shape.len()) {
                return Err(DimStatsError::InvalidDimension {
                    axis,
                    ndim: shape.len(),
                });
            }
        }
        Ok(Self::resolve(shape, dims))
    }

    /// Shape of the operand
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Axes that appear in the output, ascending
    #[must_use]
    pub fn kept(&self) -> &[usize] {
        &self.kept
    }

    /// Axes that are collapsed or operated on, ascending
    #[must_use]
    pub fn target(&self) -> &[usize] {
        &self.target
    }

    /// Number of output cells (lanes)
    #[must_use]
    pub fn kept_len(&self) -> usize {
        self.kept.iter().map(|&a| self.shape[a]).product()
    }

    /// Number of elements in each lane; 1 when no axis is targeted
    #[must_use]
    pub fn target_len(&self) -> usize {
        self.target.iter().map(|&a| self.shape[a]).product()
    }

    /// Extents of the target axes, in axis order
    #[must_use]
    pub fn target_shape(&self) -> Vec<usize> {
        self.target.iter().map(|&a| self.shape[a]).collect()
    }

    /// Kept axes followed by target axes
    #[must_use]
    pub fn axis_order(&self) -> Vec<usize> {
        self.kept.iter().chain(&self.target).copied().collect()
    }

    /// Every axis is targeted; the result is a single scalar
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.kept.is_empty()
    }

    /// No axis is targeted; the operation is elementwise
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.target.is_empty()
    }

    /// Fail with a domain error when lanes are empty (a targeted extent is zero).
    ///
    /// # Errors
    ///
    /// Returns [`DimStatsError::Domain`] naming `op` if `target_len() == 0`.
    pub fn require_non_empty(&self, op: &str) -> Result<()> {
        if self.target_len() == 0 {
            return Err(DimStatsError::Domain(format!(
                "{op} of an empty slice (target shape {:?})",
                self.target_shape()
            )));
        }
        Ok(())
    }

    /// Output shape of a reduction: target extents collapse to 1, and a full
    /// reduction yields a 0-dimensional array.
    #[must_use]
    pub fn output_shape(&self) -> Vec<usize> {
        if self.is_full() {
            return Vec::new();
        }
        let mut out = self.shape.clone();
        for &axis in &self.target {
            out[axis] = 1;
        }
        out
    }
}
