use core::cmp::Ordering;

use crate::elem::{lift, Hole, Target};
use crate::range::Range;

/// Sort `range` with insertion sort, assuming nothing about the existing
/// order. Used both to finish off runs shorter than the sorting-network
/// threshold and, via `iter::LevelIter`, to build the base runs that the
/// block merger then doubles.
///
/// The inner loop advances by two slots at a time and only falls back to a
/// single step once the double-step's second comparison fails, roughly
/// halving the number of comparisons against a naive single-step shift.
pub(crate) unsafe fn insertion_sort<T, F>(t: Target<T>, base: *mut T, range: Range, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let s = base.add(range.start);
    let n = range.len();

    for i in 1..n {
        let p = s.add(i);
        let idx = t.read_map(p);
        let tmp = lift(p);
        let mut hole = Hole::new(t, p, &*tmp, idx);

        while hole.pos > s.add(1) && cmp(&tmp, &*hole.pos.sub(2)) == Ordering::Less {
            t.copy(hole.pos, hole.pos.sub(1));
            t.copy(hole.pos.sub(1), hole.pos.sub(2));
            hole.pos = hole.pos.sub(2);
        }

        if hole.pos > s {
            let odd = cmp(&tmp, &*hole.pos.sub(1)) == Ordering::Less;
            t.copy(hole.pos, hole.pos.sub(1));
            hole.pos = hole.pos.sub(odd as usize);
        }
    }
}

/// Hard-coded sorts for the sizes too small for the sorting networks below
/// (`range.len() < 4`). Does nothing for 0 or 1 elements.
pub(crate) unsafe fn sort_tiny<T, F>(t: Target<T>, base: *mut T, range: Range, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    match range.len() {
        0 | 1 => {}
        2 => {
            let a = base.add(range.start);
            let b = base.add(range.start + 1);
            if cmp(&*b, &*a) == Ordering::Less {
                t.swap(a, b);
            }
        }
        3 => {
            let a = base.add(range.start);
            let b = base.add(range.start + 1);
            let c = base.add(range.start + 2);
            if cmp(&*b, &*a) == Ordering::Less {
                t.swap(a, b);
            }
            if cmp(&*c, &*b) == Ordering::Less {
                t.swap(b, c);
                if cmp(&*b, &*a) == Ordering::Less {
                    t.swap(a, b);
                }
            }
        }
        _ => unreachable!("sort_tiny called on range of length >= 4"),
    }
}

/// Apply a fixed comparator network to the (at most 8) elements of `range`,
/// swapping position `x` and `y` (both relative to `range.start`) whenever
/// they compare out of order, or compare equal but have already drifted out
/// of their original relative order. `order` starts as `[0, 1, ..., 7]` and
/// is permuted in lockstep with the array so that an `Equal` comparison
/// never causes a swap unless one is already needed to restore the original
/// ordering — this is what makes an otherwise-unstable sorting network
/// produce a stable sort.
#[inline]
unsafe fn network_swap<T, F>(
    t: Target<T>,
    base: *mut T,
    range: Range,
    order: &mut [u8; 8],
    x: usize,
    y: usize,
    cmp: &mut F,
) where
    F: FnMut(&T, &T) -> Ordering,
{
    let px = base.add(range.start + x);
    let py = base.add(range.start + y);
    let c = cmp(&*px, &*py);
    if c == Ordering::Greater || (order[x] > order[y] && c != Ordering::Less) {
        order.swap(x, y);
        t.swap(px, py);
    }
}

/// Sort every `[4, 8]`-length run the iterator at its base level hands back,
/// via a Bose-Nelson-style fixed comparator network rather than insertion
/// sort: fewer comparisons on average, and every comparison/swap pair is
/// known in advance so there is no data-dependent branching in the common
/// case.
pub(crate) unsafe fn sort_small_runs<T, F>(t: Target<T>, base: *mut T, range: Range, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut order: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
    macro_rules! sw {
        ($x:expr, $y:expr) => {
            network_swap(t, base, range, &mut order, $x, $y, cmp)
        };
    }

    match range.len() {
        4 => {
            sw!(0, 1);
            sw!(2, 3);
            sw!(0, 2);
            sw!(1, 3);
            sw!(1, 2);
        }
        5 => {
            sw!(0, 1);
            sw!(3, 4);
            sw!(2, 4);
            sw!(2, 3);
            sw!(1, 4);
            sw!(0, 3);
            sw!(0, 2);
            sw!(1, 3);
            sw!(1, 2);
        }
        6 => {
            sw!(1, 2);
            sw!(4, 5);
            sw!(0, 2);
            sw!(3, 5);
            sw!(0, 1);
            sw!(3, 4);
            sw!(2, 5);
            sw!(0, 3);
            sw!(1, 4);
            sw!(2, 4);
            sw!(1, 3);
            sw!(2, 3);
        }
        7 => {
            sw!(1, 2);
            sw!(3, 4);
            sw!(5, 6);
            sw!(0, 2);
            sw!(3, 5);
            sw!(4, 6);
            sw!(0, 1);
            sw!(4, 5);
            sw!(2, 6);
            sw!(0, 4);
            sw!(1, 5);
            sw!(0, 3);
            sw!(2, 5);
            sw!(1, 3);
            sw!(2, 4);
            sw!(2, 3);
        }
        8 => {
            sw!(0, 1);
            sw!(2, 3);
            sw!(4, 5);
            sw!(6, 7);
            sw!(0, 2);
            sw!(1, 3);
            sw!(4, 6);
            sw!(5, 7);
            sw!(1, 2);
            sw!(5, 6);
            sw!(0, 4);
            sw!(3, 7);
            sw!(1, 5);
            sw!(2, 6);
            sw!(1, 4);
            sw!(3, 6);
            sw!(2, 4);
            sw!(3, 5);
            sw!(3, 4);
        }
        _ => unreachable!("sort_small_runs called on range outside [4, 8]"),
    }
}
