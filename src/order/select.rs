//! Quickselect and per-lane quantiles

use super::sort::{insertion_sort_by, median_of_three, partition3, INSERTION_THRESHOLD};
use super::{is_unordered, total_order};
use crate::promote::{Element, StatFloat};
use num_traits::Float;

/// Rearrange `v` so that `v[k]` holds the element of rank `k`, everything
/// before it compares `<=` and everything after it `>=`. Returns `v[k]`.
///
/// Only the sub-range containing `k` is partitioned on each step, so the
/// expected cost is linear in `v.len()`. Panics if `k >= v.len()`.
pub fn select_nth<T: Copy + PartialOrd>(v: &mut [T], k: usize) -> T {
    assert!(k < v.len(), "select_nth: rank {k} out of bounds for length {}", v.len());
    let cmp = &mut total_order::<T>;
    let (mut lo, mut hi) = (0, v.len());
    loop {
        let range = &mut v[lo..hi];
        if range.len() <= INSERTION_THRESHOLD {
            insertion_sort_by(range, cmp);
            return v[k];
        }
        let pivot = median_of_three(range, cmp);
        let (lt, gt) = partition3(range, &pivot, cmp);
        let (lt, gt) = (lo + lt, lo + gt);
        if k < lt {
            hi = lt;
        } else if k >= gt {
            lo = gt;
        } else {
            return v[k];
        }
    }
}

/// Linear interpolation between adjacent order statistics.
pub(crate) fn interpolate<F: StatFloat>(low: F, high: F, fraction: f64) -> F {
    if low == high || fraction == 0.0 {
        low
    } else {
        low + (high - low) * F::from_fraction(fraction)
    }
}

/// Quantile `q` of a non-empty lane, reordering the lane in place.
///
/// The rank `q * (len - 1)` is interpolated linearly between the order
/// statistics on either side. A lane containing NaN yields NaN.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantile_mut<T: Element>(v: &mut [T], q: f64) -> T::Float {
    debug_assert!(!v.is_empty() && (0.0..=1.0).contains(&q));
    if v.iter().any(is_unordered) {
        return <T::Float as Float>::nan();
    }
    let last = v.len() - 1;
    let rank = q * last as f64;
    let k = (rank.floor() as usize).min(last);
    let fraction = rank - k as f64;

    let low = select_nth(v, k).to_float();
    if fraction == 0.0 || k == last {
        return low;
    }
    // everything right of k is >= v[k]; the next order statistic is its minimum
    let high = v[k + 1..]
        .iter()
        .copied()
        .fold(v[k + 1], |m, x| if x < m { x } else { m })
        .to_float();
    interpolate(low, high, fraction)
}

/// Several quantiles of one lane, sharing the partially partitioned buffer.
pub fn quantiles_mut<T: Element>(v: &mut [T], qs: &[f64]) -> Vec<T::Float> {
    qs.iter().map(|&q| quantile_mut(v, q)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_every_rank() {
        let data: Vec<i64> = (0..100).map(|i| (i * 37) % 101).collect();
        let mut sorted = data.clone();
        sorted.sort_unstable();
        for k in 0..data.len() {
            let mut work = data.clone();
            assert_eq!(select_nth(&mut work, k), sorted[k]);
            assert!(work[..k].iter().all(|&x| x <= sorted[k]));
            assert!(work[k + 1..].iter().all(|&x| x >= sorted[k]));
        }
    }

    #[test]
    fn test_select_with_duplicates() {
        let mut v = vec![5u8; 64];
        v[10] = 1;
        v[40] = 9;
        assert_eq!(select_nth(&mut v.clone(), 0), 1);
        assert_eq!(select_nth(&mut v.clone(), 63), 9);
        assert_eq!(select_nth(&mut v, 30), 5);
    }

    #[test]
    fn test_quantile_interpolation() {
        let mut v = [4.0_f64, 1.0, 3.0, 2.0];
        // rank = 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1)
        let q: f64 = quantile_mut(&mut v, 0.25);
        assert!((q - 1.75).abs() < 1e-15);
        assert_eq!(quantile_mut(&mut v, 0.0), 1.0);
        assert_eq!(quantile_mut(&mut v, 1.0), 4.0);
        assert_eq!(quantile_mut(&mut v, 0.5), 2.5);
    }

    #[test]
    fn test_quantile_integers_promote() {
        let mut v = [1i32, 2];
        let median: f64 = quantile_mut(&mut v, 0.5);
        assert_eq!(median, 1.5);
    }

    #[test]
    fn test_quantile_nan_lane() {
        let mut v = [1.0f32, f32::NAN, 3.0];
        assert!(quantile_mut(&mut v, 0.5).is_nan());
    }

    #[test]
    fn test_quantile_infinite_endpoints() {
        let mut v = [f64::INFINITY, f64::INFINITY];
        assert_eq!(quantile_mut(&mut v, 0.5), f64::INFINITY);
    }
}
