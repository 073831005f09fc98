//! Slice sorting: quicksort with a median-of-three pivot and three-way
//! partition, falling back to insertion sort on short ranges.

use super::total_order;
use std::cmp::Ordering;

/// Ranges at or below this length are insertion sorted
pub const INSERTION_THRESHOLD: usize = 16;

/// Stable insertion sort; used for short ranges only.
pub fn insertion_sort_by<T, F>(v: &mut [T], cmp: &mut F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..v.len() {
        let current = v[i];
        let mut j = i;
        while j > 0 && cmp(&v[j - 1], &current) == Ordering::Greater {
            v[j] = v[j - 1];
            j -= 1;
        }
        v[j] = current;
    }
}

/// Median of the first, middle and last element.
pub(crate) fn median_of_three<T, F>(v: &[T], cmp: &mut F) -> T
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let (a, b, c) = (v[0], v[v.len() / 2], v[v.len() - 1]);
    if cmp(&a, &b) == Ordering::Greater {
        // b < a
        if cmp(&b, &c) != Ordering::Less {
            b
        } else if cmp(&a, &c) == Ordering::Greater {
            c
        } else {
            a
        }
    } else if cmp(&b, &c) != Ordering::Greater {
        b
    } else if cmp(&a, &c) == Ordering::Greater {
        a
    } else {
        c
    }
}

/// Dutch-flag partition around `pivot`.
///
/// Returns `(lt, gt)` such that `v[..lt] < pivot`, `v[lt..gt] == pivot` and
/// `v[gt..] > pivot`.
pub(crate) fn partition3<T, F>(v: &mut [T], pivot: &T, cmp: &mut F) -> (usize, usize)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let (mut lt, mut i, mut gt) = (0, 0, v.len());
    while i < gt {
        match cmp(&v[i], pivot) {
            Ordering::Less => {
                v.swap(lt, i);
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                gt -= 1;
                v.swap(i, gt);
            }
            Ordering::Equal => i += 1,
        }
    }
    (lt, gt)
}

/// Sort `v` with `cmp`. Recursion only descends into the smaller side, so the
/// stack depth stays logarithmic even on adversarial input.
pub fn quicksort_by<T, F>(v: &mut [T], cmp: &mut F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut v = v;
    loop {
        if v.len() <= INSERTION_THRESHOLD {
            insertion_sort_by(v, cmp);
            return;
        }
        let pivot = median_of_three(v, cmp);
        let (lt, gt) = partition3(v, &pivot, cmp);
        let (left, rest) = std::mem::take(&mut v).split_at_mut(lt);
        let right = &mut rest[gt - lt..];
        if left.len() < right.len() {
            quicksort_by(left, cmp);
            v = right;
        } else {
            quicksort_by(right, cmp);
            v = left;
        }
    }
}

/// Sort values in non-decreasing order; NaN sorts last.
pub fn sort_values<T: Copy + PartialOrd>(v: &mut [T]) {
    quicksort_by(v, &mut total_order::<T>);
}

/// Write into `out` the permutation that sorts `values`.
///
/// Equal values keep their original relative order, so the permutation is
/// fully determined by the input.
pub fn argsort_into<T: PartialOrd>(values: &[T], out: &mut [usize]) {
    debug_assert_eq!(values.len(), out.len());
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = i;
    }
    quicksort_by(out, &mut |&i: &usize, &j: &usize| {
        total_order(&values[i], &values[j]).then(i.cmp(&j))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_short_and_long() {
        let mut short = [3, 1, 2];
        sort_values(&mut short);
        assert_eq!(short, [1, 2, 3]);

        let mut long: Vec<i32> = (0..200).map(|i| (i * 7919) % 211 - 100).collect();
        let mut expected = long.clone();
        expected.sort_unstable();
        sort_values(&mut long);
        assert_eq!(long, expected);
    }

    #[test]
    fn test_sort_many_duplicates() {
        let mut v: Vec<u8> = (0..500).map(|i| (i % 3) as u8).collect();
        sort_values(&mut v);
        assert!(v.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(v.iter().filter(|&&x| x == 1).count(), 167);
    }

    #[test]
    fn test_sort_already_sorted_and_reversed() {
        let mut asc: Vec<f64> = (0..1000).map(f64::from).collect();
        let mut desc: Vec<f64> = asc.iter().rev().copied().collect();
        sort_values(&mut asc);
        sort_values(&mut desc);
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_sort_nan_last() {
        let mut v = [2.0, f64::NAN, -1.0, 0.5];
        sort_values(&mut v);
        assert_eq!(&v[..3], &[-1.0, 0.5, 2.0]);
        assert!(v[3].is_nan());
    }

    #[test]
    fn test_argsort_ties_by_index() {
        let values = [2, 1, 2, 1, 0];
        let mut out = [0; 5];
        argsort_into(&values, &mut out);
        assert_eq!(out, [4, 1, 3, 0, 2]);
    }

    #[test]
    fn test_median_of_three() {
        let mut cmp = |a: &i32, b: &i32| a.cmp(b);
        assert_eq!(median_of_three(&[1, 5, 3], &mut cmp), 3);
        assert_eq!(median_of_three(&[3, 1, 5], &mut cmp), 3);
        assert_eq!(median_of_three(&[5, 3, 1], &mut cmp), 3);
        assert_eq!(median_of_three(&[2, 2, 1], &mut cmp), 2);
    }
}
