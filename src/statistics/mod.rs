//! Statistical reductions over arbitrary subsets of axes
//!
//! # Organization
//!
//! This module is organized into submodules:
//! - [`moments`]: sum, mean, variance and standard deviation
//! - [`covariance`]: covariance and correlation, per lane and as matrices
//! - [`extrema`]: minimum and maximum
//! - [`operations`]: the operation selector and the [`StatisticalReduction`] trait

pub mod covariance;
pub mod extrema;
pub mod moments;
pub mod operations;

pub use covariance::{cor, cor_matrix, cov, cov_matrix};
pub use extrema::{maximum, minimum};
pub use moments::{mean, std, sum, var};
pub use operations::{StatOperation, StatisticalReduction};
