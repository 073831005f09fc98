//! dimstats: statistics over arbitrary subsets of array dimensions
//!
//! Sums, means, variances, standard deviations, covariances and order
//! statistics (median, quantile, sort, argsort) over N-dimensional
//! [`ndarray`] arrays, restricted to any set of axes, with automatic
//! selection between single- and multi-worker execution.
//!
//! ## Key Features
//!
//! - **Any axis subset**: every statistic takes a [`Dims`] (one axis, a list,
//!   or all of them) and treats the remaining axes as independent slices
//! - **Parallel Processing**: Rayon fork/join over slices, or within a single
//!   long slice, picked per call by a [`Threading`] policy
//! - **Type promotion**: narrow integers accumulate in 64 bits and 64-bit
//!   integers in 128; floating results are `f64`, and `f32` stays `f32`
//! - **Order statistics**: quickselect medians and quantiles, in-place or on
//!   copies, and deterministic argsort
//!
//! ## Module Organization
//!
//! - [`plan`]: resolving requested axes into kept and target axes
//! - [`promote`]: accumulator and result types per element type
//! - [`kernel`]: the lane executor shared by every statistic
//! - [`statistics`]: sum, mean, variance, std, covariance, correlation, min, max
//! - [`order`]: median, quantiles, sort and argsort
//! - [`parallel`]: threading policy and thread pool configuration
//! - [`io`]: JSON array reading and writing
//! - [`errors`]: Centralized error handling
//!
//! ## Usage Examples
//!
//! ```rust
//! use dimstats::prelude::*;
//! use ndarray::array;
//!
//! let a = array![[1.0_f64, 2.0], [3.0, 4.0]];
//!
//! // Collapse axis 0; the output keeps it with extent 1
//! let s = dimstats::sum(&a, 0, Threading::Auto).unwrap();
//! assert_eq!(s, array![[4.0, 6.0]].into_dyn());
//!
//! // Every axis: a 0-dimensional result
//! let m = dimstats::mean(&a, Dims::All, Threading::Never).unwrap();
//! assert_eq!(m, ndarray::arr0(2.5).into_dyn());
//!
//! // Median of each row
//! let med = dimstats::median(&a, 1, Threading::Always).unwrap();
//! assert_eq!(med, array![[1.5], [3.5]].into_dyn());
//! ```

// Core modules
pub mod errors;
pub mod kernel;
pub mod order;
pub mod parallel;
pub mod plan;
pub mod promote;
pub mod statistics;

// Surfaces used by the command-line tool
pub mod cli;
pub mod io;

// Direct re-exports for the public API
pub use errors::{DimStatsError, Result};
pub use order::{
    argsort, median, median_in_place, percentile, quantile, quantile_in_place, quantiles, sort,
    sort_in_place, total_order,
};
pub use parallel::{get_parallel_info, ExecutionMode, ParallelConfig, ParallelInfo, Threading};
pub use plan::{Dims, ReductionPlan};
pub use promote::{Element, PairFloat, StatFloat};
pub use statistics::{
    cor, cor_matrix, cov, cov_matrix, maximum, mean, minimum, std, sum, var, StatOperation,
    StatisticalReduction,
};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::errors::{DimStatsError, Result};
    pub use crate::parallel::{ParallelConfig, Threading};
    pub use crate::plan::Dims;
    pub use crate::promote::Element;
    pub use crate::statistics::{StatOperation, StatisticalReduction};
}
