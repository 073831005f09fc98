//! Simple benchmark showing serial versus parallel execution of a few statistics.
//!
//! Each statistic is run over a 3-D array, once with `Threading::Never` and
//! once with `Threading::Always`, for both a slice-per-cell reduction (many
//! short lanes) and a full reduction (one long lane).

use dimstats::{Dims, Threading};
use ndarray::{Array3, ArrayD};
use std::time::Instant;

fn time<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed().as_secs_f64())
}

fn compare(
    label: &str,
    run: impl Fn(Threading) -> dimstats::Result<ArrayD<f64>>,
) -> dimstats::Result<()> {
    let (serial, seq_time) = time(|| run(Threading::Never));
    let (parallel, par_time) = time(|| run(Threading::Always));
    let (serial, parallel) = (serial?, parallel?);

    let max_diff = serial
        .iter()
        .zip(parallel.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0_f64, f64::max);

    println!("{label}");
    println!("   Serial:   {seq_time:.3} seconds");
    println!("   Parallel: {par_time:.3} seconds");
    println!("   Speedup:  {:.2}x (max difference {max_diff:.2e})\n", seq_time / par_time);
    Ok(())
}

fn main() -> dimstats::Result<()> {
    println!("dimstats Parallel Processing Benchmark");
    println!("======================================\n");
    println!("{}\n", dimstats::get_parallel_info());

    for &(a, b, c) in &[(64, 128, 128), (128, 256, 256)] {
        #[allow(clippy::cast_precision_loss)]
        let data =
            Array3::from_shape_fn((a, b, c), |(i, j, k)| ((i * b * c + j * c + k) as f64).sin());
        println!("Array shape {:?} ({} elements)", data.shape(), data.len());
        println!("--------------------------------------\n");

        compare("sum over axis 0", |t| dimstats::sum(&data, 0, t))?;
        compare("sum over all axes", |t| dimstats::sum(&data, Dims::All, t))?;
        compare("corrected variance over axes 1,2", |t| dimstats::var(&data, [1, 2], t, true))?;
        compare("median over axis 2", |t| dimstats::median(&data, 2, t))?;
    }
    Ok(())
}
