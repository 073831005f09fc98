//! Defines command-line interface options using `clap` for the dimstats tool.

use crate::parallel::Threading;
use crate::plan::Dims;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Statistic selected with `--op`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Sum,
    Mean,
    Var,
    Std,
    Median,
    Quantile,
    Sort,
    Argsort,
    Min,
    Max,
}

/// A CLI tool for computing statistics over dimensions of JSON arrays
#[derive(Parser, Debug)]
#[command(
    version,
    name = "dimstats",
    about = "Statistics over arbitrary dimensions of N-dimensional arrays"
)]
pub struct Args {
    /// Statistic to compute
    #[arg(long, value_enum)]
    pub op: Option<Op>,

    /// JSON file holding a nested numeric array. Reads stdin if not set.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Comma-separated 0-based axes to operate over, e.g. `0,2`. All axes if not set.
    #[arg(short, long, value_parser = parse_dims_arg, default_value = "all")]
    pub dims: Dims,

    /// Threading policy: auto, true, false, or an element-count threshold
    #[arg(long, value_parser = parse_threading_arg)]
    pub threading: Option<Threading>,

    /// Divide variance and standard deviation by n instead of n - 1
    #[arg(long, default_value_t = false)]
    pub uncorrected: bool,

    /// Quantile fraction in [0, 1] for `--op quantile`
    #[arg(short, long, default_value_t = 0.5)]
    pub q: f64,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Print thread pool information and exit
    #[arg(long)]
    pub info: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Parse `all` or a comma-separated list of axes.
///
/// # Errors
///
/// Returns a message naming the first entry that is not an axis index.
pub fn parse_dims_arg(s: &str) -> Result<Dims, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("all") {
        return Ok(Dims::All);
    }
    if s.is_empty() {
        return Ok(Dims::Only(Vec::new()));
    }
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid axis '{part}': expected a non-negative integer"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Dims::Only)
}

/// Parse a threading policy.
///
/// # Errors
///
/// Returns the policy parser's message for anything other than `auto`,
/// `true`, `false` or a threshold.
pub fn parse_threading_arg(s: &str) -> Result<Threading, String> {
    s.parse::<Threading>().map_err(|e| e.to_string())
}
