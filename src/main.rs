//! Entry point for the dimstats command-line tool.
//! Handles CLI parsing, logging setup and input loading, and dispatches the selected statistic.

use clap::Parser;
use dimstats::cli::{Args, Op};
use dimstats::io::{array_to_json, read_array, read_array_file};
use dimstats::{
    get_parallel_info, DimStatsError, ParallelConfig, Result, StatOperation, StatisticalReduction,
};
use ndarray::ArrayD;
use serde_json::Value;
use std::io::{self, Write};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let fmt_layer = fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .map_err(|e| DimStatsError::InvalidInput(format!("Failed to initialize logging: {e}")))
}

fn load_input(args: &Args) -> Result<ArrayD<f64>> {
    match &args.input {
        Some(path) => read_array_file(path),
        None => read_array(io::stdin().lock()),
    }
}

fn run(args: &Args, op: Op) -> Result<Value> {
    let array = load_input(args)?;
    let config = ParallelConfig::from_env()?;
    let threading = args.threading.unwrap_or_else(|| config.threading());
    let dims = args.dims.clone();
    let corrected = !args.uncorrected;
    tracing::info!(shape = ?array.shape(), ?op, ?dims, %threading, "computing");

    let operation = match op {
        Op::Sort => return Ok(array_to_json(&dimstats::sort(&array, dims, threading))),
        Op::Argsort => return Ok(array_to_json(&dimstats::argsort(&array, dims, threading))),
        Op::Sum => StatOperation::Sum,
        Op::Mean => StatOperation::Mean,
        Op::Var => StatOperation::Variance { corrected },
        Op::Std => StatOperation::StdDev { corrected },
        Op::Median => StatOperation::Median,
        Op::Quantile => StatOperation::Quantile(args.q),
        Op::Min => StatOperation::Min,
        Op::Max => StatOperation::Max,
    };
    let result = array.reduce_dims(dims, operation, threading)?;
    Ok(array_to_json(&result))
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose)?;

    // Set up thread pool; --threads wins over DIMSTATS_THREADS
    let mut config = ParallelConfig::from_env()?;
    if let Some(threads) = args.threads {
        config.num_threads = Some(threads);
    }
    config.setup_global_pool()?;

    if args.info {
        println!("{}", get_parallel_info());
        return Ok(());
    }

    let Some(op) = args.op else {
        return Err(Box::new(DimStatsError::InvalidInput(
            "no statistic selected: pass --op or --info".to_string(),
        )));
    };

    let output = run(&args, op)?;
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &output)?;
    writeln!(stdout)?;
    Ok(())
}
