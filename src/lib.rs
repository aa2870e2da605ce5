#![no_std]

#[cfg(test)]
extern crate std;

//! A stable, in-place, comparison-based sort with worst-case `O(n log n)`
//! time and `O(1)` extra memory: a bottom-up block merge sort in the style
//! of WikiSort. Every level of the merge harvests a handful of distinct
//! elements from the slice itself to use as scratch space, rather than
//! allocating a buffer proportional to `n`.
//!
//! An optional trace mode additionally produces a permutation map recording,
//! for each final position, which input index the element now there came
//! from.

use core::cmp::Ordering;

mod block;
mod elem;
mod iter;
mod merge;
mod range;
mod search;
mod small;

use elem::Target;
use iter::LevelIter;
use range::Range;

/// Sort `v`.
#[inline(always)]
pub fn sort<T: Ord>(v: &mut [T]) {
    sort_core(v, None, &mut |a, b| a.cmp(b));
}

/// Sort `v`, writing to `map` the original index of the element now at each
/// position. `map` must have the same length as `v`.
#[inline(always)]
pub fn sort_with_trace<T: Ord>(v: &mut [T], map: &mut [usize]) {
    sort_core(v, Some(map), &mut |a, b| a.cmp(b));
}

/// Sort `v` with a three-way comparator `compare`.
#[inline(always)]
pub fn sort_by<T, F: FnMut(&T, &T) -> Ordering>(v: &mut [T], mut compare: F) {
    sort_core(v, None, &mut compare);
}

/// Sort `v` with a three-way comparator `compare`, tracing the permutation
/// into `map`. `map` must have the same length as `v`.
#[inline(always)]
pub fn sort_by_with_trace<T, F: FnMut(&T, &T) -> Ordering>(v: &mut [T], mut compare: F, map: &mut [usize]) {
    sort_core(v, Some(map), &mut compare);
}

/// Sort `v` by a key extracted with `f`.
#[inline(always)]
pub fn sort_by_key<T, K: Ord, F: FnMut(&T) -> K>(v: &mut [T], mut f: F) {
    sort_core(v, None, &mut |a, b| f(a).cmp(&f(b)));
}

/// Sort `v` by a key extracted with `f`, tracing the permutation into `map`.
/// `map` must have the same length as `v`.
#[inline(always)]
pub fn sort_by_key_with_trace<T, K: Ord, F: FnMut(&T) -> K>(v: &mut [T], mut f: F, map: &mut [usize]) {
    sort_core(v, Some(map), &mut |a, b| f(a).cmp(&f(b)));
}

#[inline(always)]
fn sort_core<T, F: FnMut(&T, &T) -> Ordering>(v: &mut [T], map: Option<&mut [usize]>, cmp: &mut F) {
    let n = v.len();

    let map_ptr = match map {
        Some(map) => {
            debug_assert_eq!(map.len(), n);
            for (i, slot) in map.iter_mut().enumerate() {
                *slot = i;
            }
            Some(map.as_mut_ptr())
        }
        None => None,
    };

    // Ignore ZSTs: every comparison and move is a no-op, and there is
    // nothing for a trace map to distinguish between (the map is already
    // identity from the loop above).
    if core::mem::size_of::<T>() == 0 {
        return;
    }

    if n < 2 {
        return;
    }

    let base = v.as_mut_ptr();
    let t = Target::new(base, map_ptr);

    unsafe {
        if n < 4 {
            small::sort_tiny(t, base, Range::new(0, n), cmp);
            return;
        }

        let mut it = LevelIter::new(n, 4);
        it.begin();
        while !it.finished() {
            let range = it.next_range();
            small::sort_small_runs(t, base, range, cmp);
        }

        if n < 8 {
            return;
        }

        loop {
            block::merge_level(t, base, &mut it, cmp);
            if !it.next_level() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let mut v: [i32; 0] = [];
        let mut map: [usize; 0] = [];
        sort_with_trace(&mut v, &mut map);
        assert_eq!(v, []);
        assert_eq!(map, []);
    }

    #[test]
    fn three_elements() {
        let mut v = [3, 1, 2];
        let mut map = [0usize; 3];
        sort_with_trace(&mut v, &mut map);
        assert_eq!(v, [1, 2, 3]);
        assert_eq!(map, [1, 2, 0]);
    }

    #[test]
    fn stable_on_secondary_field() {
        let mut v = [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)];
        let mut map = [0usize; 5];
        sort_by_with_trace(&mut v, |a, b| a.0.cmp(&b.0), &mut map);
        assert_eq!(v, [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)]);
        assert_eq!(map, [0, 2, 4, 1, 3]);
    }

    #[test]
    fn strictly_decreasing_reverses() {
        let mut v = [5, 4, 3, 2, 1, 0, -1, -2];
        let mut map = [0usize; 8];
        sort_with_trace(&mut v, &mut map);
        assert_eq!(v, [-2, -1, 0, 1, 2, 3, 4, 5]);
        assert_eq!(map, [7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn all_equal_is_identity_in_trace() {
        let mut v = [7, 7, 7, 7];
        let mut map = [0usize; 4];
        sort_with_trace(&mut v, &mut map);
        assert_eq!(v, [7, 7, 7, 7]);
        assert_eq!(map, [0, 1, 2, 3]);
    }

    #[test]
    fn sort_by_key_orders_on_extracted_key() {
        let mut v = [(3, "c"), (1, "a"), (2, "b")];
        sort_by_key(&mut v, |x| x.0);
        assert_eq!(v, [(1, "a"), (2, "b"), (3, "c")]);
    }

    #[test]
    fn already_sorted_is_untouched() {
        let mut v: Vec<i32> = (0..200).collect();
        let mut map: Vec<usize> = vec![0; 200];
        sort_with_trace(&mut v, &mut map);
        assert!(v.iter().copied().eq(0..200));
        assert!(map.iter().copied().eq(0..200));
    }

    #[test]
    fn zero_sized_type_is_a_no_op() {
        let mut v = [(), (), ()];
        sort(&mut v);
        assert_eq!(v, [(), (), ()]);
    }
}
