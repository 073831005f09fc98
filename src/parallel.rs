//! Parallel processing configuration and the threading policy
//!
//! [`ParallelConfig`] configures Rayon's global thread pool and the automatic
//! size threshold. [`Threading`] is the per-call policy; it is resolved once,
//! before any work starts, into an [`ExecutionMode`].

use crate::errors::{DimStatsError, Result};
use rayon::ThreadPoolBuilder;
use std::fmt;
use std::str::FromStr;

/// Element count at or above which `Threading::Auto` runs multi-worker.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Environment variable overriding the worker count
pub const THREADS_ENV: &str = "DIMSTATS_THREADS";

/// Environment variable overriding the automatic threshold
pub const THRESHOLD_ENV: &str = "DIMSTATS_AUTO_THRESHOLD";

/// Per-call threading policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Threading {
    /// Multi-worker when the input has at least [`DEFAULT_PARALLEL_THRESHOLD`] elements.
    ///
    /// This is fixed; a threshold configured through [`ParallelConfig`] or
    /// `DIMSTATS_AUTO_THRESHOLD` applies only to the policy returned by
    /// [`ParallelConfig::threading`].
    #[default]
    Auto,
    /// Always multi-worker
    Always,
    /// Always single-worker
    Never,
    /// Multi-worker when the input has at least this many elements
    Threshold(usize),
}

/// How a single call is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Serial,
    Parallel,
}

impl Threading {
    /// Resolve the policy for an input of `len` elements.
    #[must_use]
    pub fn resolve(self, len: usize) -> ExecutionMode {
        let parallel = match self {
            Self::Auto => len >= DEFAULT_PARALLEL_THRESHOLD,
            Self::Always => true,
            Self::Never => false,
            Self::Threshold(threshold) => len >= threshold,
        };
        let mode = if parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Serial
        };
        tracing::debug!(policy = %self, len, ?mode, "resolved threading policy");
        mode
    }
}

impl From<bool> for Threading {
    fn from(threaded: bool) -> Self {
        if threaded {
            Self::Always
        } else {
            Self::Never
        }
    }
}

impl FromStr for Threading {
    type Err = DimStatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "true" | "always" => Ok(Self::Always),
            "false" | "never" => Ok(Self::Never),
            other => other.parse::<usize>().map(Self::Threshold).map_err(|_| {
                DimStatsError::InvalidInput(format!(
                    "Invalid threading policy '{s}': \
                     expected 'auto', 'true', 'false' or a threshold"
                ))
            }),
        }
    }
}

impl fmt::Display for Threading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Always => write!(f, "true"),
            Self::Never => write!(f, "false"),
            Self::Threshold(n) => write!(f, "{n}"),
        }
    }
}

/// Configuration for parallel processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
    pub auto_threshold: usize,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    #[must_use]
    pub fn new(num_threads: Option<usize>) -> Self {
        Self {
            num_threads,
            auto_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Create a configuration that uses all available CPU cores
    #[must_use]
    pub fn all_cores() -> Self {
        Self::new(Some(num_cpus::get()))
    }

    /// Create a configuration that uses a specific number of threads
    #[must_use]
    pub fn with_threads(num_threads: usize) -> Self {
        Self::new(Some(num_threads))
    }

    /// Replace the automatic threshold
    #[must_use]
    pub fn with_threshold(mut self, auto_threshold: usize) -> Self {
        self.auto_threshold = auto_threshold;
        self
    }

    /// Read `DIMSTATS_THREADS` and `DIMSTATS_AUTO_THRESHOLD`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is set but is not a positive integer.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(threads) = read_env_usize(THREADS_ENV)? {
            config.num_threads = Some(threads);
        }
        if let Some(threshold) = read_env_usize(THRESHOLD_ENV)? {
            config.auto_threshold = threshold;
        }
        Ok(config)
    }

    /// The per-call policy this configuration implies: a [`Threading::Threshold`]
    /// at the configured automatic threshold.
    #[must_use]
    pub fn threading(&self) -> Threading {
        Threading::Threshold(self.auto_threshold)
    }

    /// Set up the global Rayon thread pool with the specified configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the global pool was already initialized.
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    DimStatsError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {num_threads} threads: {e}"
                    ))
                })?;

            tracing::info!(num_threads, "configured global thread pool");
        } else {
            tracing::info!("using default thread pool configuration");
        }

        Ok(())
    }

    /// Get the current number of threads being used
    #[must_use]
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

fn read_env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Ok(Some(value)),
            _ => Err(DimStatsError::InvalidInput(format!(
                "{key} must be a positive integer, got '{raw}'"
            ))),
        },
        Err(_) => Ok(None),
    }
}

/// Get information about the current parallel configuration
#[must_use]
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl fmt::Display for ParallelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parallel Processing Information:")?;
        writeln!(f, "   Current threads: {}", self.current_threads)?;
        writeln!(f, "   Available CPU cores: {}", self.available_cores)?;
        write!(f, "   Available parallelism: {}", self.available_parallelism)
    }
}
