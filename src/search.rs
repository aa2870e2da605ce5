use core::cmp::Ordering;

use crate::range::Range;

/// Return the number of elements in `0..n` for which `f` holds, assuming `f`
/// is partitioned (true for a prefix, false afterwards).
#[inline]
fn lower_bound(mut n: usize, mut f: impl FnMut(usize) -> bool) -> usize {
    let mut i = 0;

    while n > 0 {
        let half = n / 2;
        if f(i + half) {
            i += n - half;
        }
        n = half;
    }

    i
}

/// Leftmost index `i` in `range` with `array[i] >= *value` (first position
/// `value` could be inserted at while keeping earlier equal elements
/// earlier). Assumes `range` is sorted.
pub(crate) unsafe fn binary_first<T, F>(
    base: *const T,
    value: *const T,
    range: Range,
    cmp: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    range.start + lower_bound(range.len(), |x| cmp(&*base.add(range.start + x), &*value) != Ordering::Less)
}

/// Rightmost index (plus one) in `range` with `array[i] <= *value`. Assumes
/// `range` is sorted.
pub(crate) unsafe fn binary_last<T, F>(
    base: *const T,
    value: *const T,
    range: Range,
    cmp: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    range.start + lower_bound(range.len(), |x| cmp(&*value, &*base.add(range.start + x)) == Ordering::Less)
}

/// Combine a linear search (with stride `max(len/unique, 1)`) with a final
/// binary search, to reduce comparisons when `unique` is a good estimate of
/// how many distinct values lie ahead of `value` in `range`.
pub(crate) unsafe fn find_first_forward<T, F>(
    base: *const T,
    value: *const T,
    range: Range,
    unique: usize,
    cmp: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    if range.len() == 0 {
        return range.start;
    }
    let skip = usize::max(range.len() / unique, 1);

    let mut index = range.start + skip;
    while cmp(&*base.add(index - 1), &*value) == Ordering::Less {
        if index >= range.end - skip {
            return binary_first(base, value, Range::new(index, range.end), cmp);
        }
        index += skip;
    }

    binary_first(base, value, Range::new(index - skip, index), cmp)
}

pub(crate) unsafe fn find_last_forward<T, F>(
    base: *const T,
    value: *const T,
    range: Range,
    unique: usize,
    cmp: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    if range.len() == 0 {
        return range.start;
    }
    let skip = usize::max(range.len() / unique, 1);

    let mut index = range.start + skip;
    while cmp(&*value, &*base.add(index - 1)) != Ordering::Less {
        if index >= range.end - skip {
            return binary_last(base, value, Range::new(index, range.end), cmp);
        }
        index += skip;
    }

    binary_last(base, value, Range::new(index - skip, index), cmp)
}

pub(crate) unsafe fn find_first_backward<T, F>(
    base: *const T,
    value: *const T,
    range: Range,
    unique: usize,
    cmp: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    if range.len() == 0 {
        return range.start;
    }
    let skip = usize::max(range.len() / unique, 1);

    let mut index = range.end - skip;
    while index > range.start && cmp(&*base.add(index - 1), &*value) != Ordering::Less {
        if index < range.start + skip {
            return binary_first(base, value, Range::new(range.start, index), cmp);
        }
        index -= skip;
    }

    binary_first(base, value, Range::new(index, index + skip), cmp)
}

pub(crate) unsafe fn find_last_backward<T, F>(
    base: *const T,
    value: *const T,
    range: Range,
    unique: usize,
    cmp: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    if range.len() == 0 {
        return range.start;
    }
    let skip = usize::max(range.len() / unique, 1);

    let mut index = range.end - skip;
    while index > range.start && cmp(&*value, &*base.add(index - 1)) == Ordering::Less {
        if index < range.start + skip {
            return binary_last(base, value, Range::new(range.start, index), cmp);
        }
        index -= skip;
    }

    binary_last(base, value, Range::new(index, index + skip), cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn naive_first(v: &[i32], value: i32) -> usize {
        v.iter().position(|&x| x >= value).unwrap_or(v.len())
    }

    fn naive_last(v: &[i32], value: i32) -> usize {
        v.iter().position(|&x| x > value).unwrap_or(v.len())
    }

    #[test]
    fn binary_first_and_last_match_naive_on_duplicate_heavy_input() {
        let v: Vec<i32> = (0..40).map(|x| x / 3).collect();
        let range = Range::new(0, v.len());
        for value in -1..=15 {
            let got = unsafe { binary_first(v.as_ptr(), &value, range, &mut i32::cmp) };
            assert_eq!(got, naive_first(&v, value), "binary_first value={value}");

            let got = unsafe { binary_last(v.as_ptr(), &value, range, &mut i32::cmp) };
            assert_eq!(got, naive_last(&v, value), "binary_last value={value}");
        }
    }

    #[test]
    fn hybrid_forward_backward_match_binary_variants() {
        let v: Vec<i32> = (0..100).map(|x| x / 7).collect();
        let range = Range::new(10, 90);
        for value in 0..15 {
            for unique in [1usize, 2, 5, 13, 80] {
                let expect_first = unsafe { binary_first(v.as_ptr(), &value, range, &mut i32::cmp) };
                let got_first =
                    unsafe { find_first_forward(v.as_ptr(), &value, range, unique, &mut i32::cmp) };
                assert_eq!(got_first, expect_first, "find_first_forward unique={unique} value={value}");

                let expect_last = unsafe { binary_last(v.as_ptr(), &value, range, &mut i32::cmp) };
                let got_last =
                    unsafe { find_last_forward(v.as_ptr(), &value, range, unique, &mut i32::cmp) };
                assert_eq!(got_last, expect_last, "find_last_forward unique={unique} value={value}");

                let got_first_back =
                    unsafe { find_first_backward(v.as_ptr(), &value, range, unique, &mut i32::cmp) };
                assert_eq!(got_first_back, expect_first, "find_first_backward unique={unique} value={value}");

                let got_last_back =
                    unsafe { find_last_backward(v.as_ptr(), &value, range, unique, &mut i32::cmp) };
                assert_eq!(got_last_back, expect_last, "find_last_backward unique={unique} value={value}");
            }
        }
    }

    #[test]
    fn empty_range_returns_start() {
        let v = [1, 2, 3];
        let range = Range::new(1, 1);
        let value = 5;
        for unique in [1usize, 4] {
            assert_eq!(
                unsafe { find_first_forward(v.as_ptr(), &value, range, unique, &mut i32::cmp) },
                1
            );
            assert_eq!(
                unsafe { find_last_backward(v.as_ptr(), &value, range, unique, &mut i32::cmp) },
                1
            );
        }
    }
}
