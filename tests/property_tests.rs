//! Property-based tests over random shapes, axis subsets and contents

use dimstats::{Dims, Threading};
use ndarray::{ArrayD, IxDyn};
use proptest::prelude::*;

/// A random array of rank 1..=4 with extents 1..=5, plus a random axis subset
fn array_and_dims() -> impl Strategy<Value = (ArrayD<f64>, Vec<usize>)> {
    proptest::collection::vec(1_usize..=5, 1..=4).prop_flat_map(|shape| {
        let len: usize = shape.iter().product();
        let ndim = shape.len();
        (
            proptest::collection::vec(-1e6_f64..1e6, len),
            proptest::collection::vec(0..ndim, 0..=ndim),
        )
            .prop_map(move |(data, dims)| {
                let array = ArrayD::from_shape_vec(IxDyn(&shape), data)
                    .expect("length matches shape");
                (array, dims)
            })
    })
}

/// Lanes of `a` under `dims`, via the order engine's own layout: sort each
/// lane and read back the row-major sequence of every output cell.
fn lane_values(a: &ArrayD<f64>, dims: &[usize]) -> Vec<Vec<f64>> {
    let plan = dimstats::ReductionPlan::resolve(a.shape(), &Dims::from(dims));
    let permuted = a.view().permuted_axes(plan.axis_order());
    let flat: Vec<f64> = permuted.iter().copied().collect();
    if plan.target_len() == 0 {
        return vec![Vec::new(); plan.kept_len()];
    }
    flat.chunks(plan.target_len()).map(<[f64]>::to_vec).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // --- Single- and multi-worker execution agree ---
    #[test]
    fn serial_and_parallel_agree((a, dims) in array_and_dims()) {
        let s = dimstats::sum(&a, dims.clone(), Threading::Never).unwrap();
        let p = dimstats::sum(&a, dims.clone(), Threading::Always).unwrap();
        prop_assert_eq!(s.shape(), p.shape());
        for (x, y) in s.iter().zip(p.iter()) {
            prop_assert!(close(*x, *y), "sum {} != {}", x, y);
        }

        let ms = dimstats::median(&a, dims.clone(), Threading::Never).unwrap();
        let mp = dimstats::median(&a, dims.clone(), Threading::Always).unwrap();
        prop_assert_eq!(ms, mp);
    }

    // --- Output shape is the input shape with targeted extents set to 1 ---
    #[test]
    fn output_shape_collapses_targets((a, dims) in array_and_dims()) {
        let m = dimstats::mean(&a, dims.clone(), Threading::Never).unwrap();
        let mut expected: Vec<usize> = a.shape().to_vec();
        for &d in &dims {
            expected[d] = 1;
        }
        let full = (0..a.ndim()).all(|axis| dims.contains(&axis));
        if full {
            prop_assert_eq!(m.ndim(), 0);
        } else {
            prop_assert_eq!(m.shape(), expected.as_slice());
        }
    }

    // --- Variance is non-negative ---
    #[test]
    fn variance_non_negative((a, dims) in array_and_dims()) {
        let v = dimstats::var(&a, dims, Threading::Auto, false).unwrap();
        prop_assert!(v.iter().all(|&x| x >= 0.0));
    }

    // --- quantile(0) = min, quantile(1) = max, and quantiles are monotonic ---
    #[test]
    fn quantile_bounds_and_monotonicity(
        (a, dims) in array_and_dims(),
        p1 in 0.0_f64..=1.0,
        p2 in 0.0_f64..=1.0
    ) {
        let (lo, hi) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
        let q0 = dimstats::quantile(&a, 0.0, dims.clone(), Threading::Never).unwrap();
        let q1 = dimstats::quantile(&a, 1.0, dims.clone(), Threading::Never).unwrap();
        let min = dimstats::minimum(&a, dims.clone(), Threading::Never).unwrap();
        let max = dimstats::maximum(&a, dims.clone(), Threading::Never).unwrap();
        prop_assert_eq!(q0, min);
        prop_assert_eq!(q1, max);

        let qs = dimstats::quantiles(&a, &[lo, hi], dims, Threading::Never).unwrap();
        let half = qs.len() / 2;
        let low: Vec<f64> = qs.iter().take(half).copied().collect();
        let high: Vec<f64> = qs.iter().skip(half).copied().collect();
        for (l, h) in low.iter().zip(&high) {
            prop_assert!(*l <= *h + 1e-9 * h.abs().max(1.0), "quantiles should be monotonic");
        }
    }

    // --- Sorting yields non-decreasing lanes with the same contents ---
    #[test]
    fn sort_lanes_are_sorted_permutations((a, dims) in array_and_dims()) {
        let sorted = dimstats::sort(&a, dims.clone(), Threading::Auto);
        let before = lane_values(&a, &dims);
        let after = lane_values(&sorted, &dims);
        for (b, s) in before.iter().zip(&after) {
            prop_assert!(s.windows(2).all(|w| w[0] <= w[1]));
            let mut expected = b.clone();
            expected.sort_by(f64::total_cmp);
            prop_assert_eq!(&expected, s);
        }
    }

    // --- Argsort is a permutation that sorts each lane ---
    #[test]
    fn argsort_is_sorting_permutation((a, dims) in array_and_dims()) {
        let perm = dimstats::argsort(&a, dims.clone(), Threading::Always);
        let plan = dimstats::ReductionPlan::resolve(a.shape(), &Dims::from(dims.as_slice()));
        let indices: Vec<usize> = perm
            .view()
            .permuted_axes(plan.axis_order())
            .iter()
            .copied()
            .collect();
        let lanes = lane_values(&a, &dims);
        for (lane, idx) in lanes.iter().zip(indices.chunks(plan.target_len().max(1))) {
            let mut seen = idx.to_vec();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..lane.len()).collect::<Vec<_>>());
            prop_assert!(idx
                .windows(2)
                .all(|w| lane[w[0]] < lane[w[1]] || (lane[w[0]] == lane[w[1]] && w[0] < w[1])));
        }
    }

    // --- The in-place median matches the copying one ---
    #[test]
    fn median_in_place_matches_median((a, dims) in array_and_dims()) {
        let expected = dimstats::median(&a, dims.clone(), Threading::Never).unwrap();
        let mut scratch = a.clone();
        let actual = dimstats::median_in_place(&mut scratch, dims, Threading::Always).unwrap();
        prop_assert_eq!(expected, actual);

        let mut original: Vec<f64> = a.iter().copied().collect();
        let mut reordered: Vec<f64> = scratch.iter().copied().collect();
        original.sort_by(f64::total_cmp);
        reordered.sort_by(f64::total_cmp);
        prop_assert_eq!(original, reordered);
    }
}
