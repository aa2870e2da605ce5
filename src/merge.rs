use core::cmp::Ordering;

use crate::elem::Target;
use crate::range::{rotate, Range};
use crate::search::{binary_first, binary_last};

/// Merge `a` and `b` (adjacent, `a` immediately before `b`) using `buffer`
/// as scratch space holding a copy of `a`'s elements. `buffer` must be at
/// least as long as `a` and is left scrambled (it keeps its original
/// elements, just reordered) on return.
///
/// Every output slot is produced by swapping the buffer's front element
/// with whichever real element (from the buffer's logical front, standing
/// in for the remainder of `a`, or from `b`) belongs there. That keeps the
/// buffer's contents a permutation of `a`'s original elements throughout,
/// rather than requiring a separate write-out pass.
pub(crate) unsafe fn merge_internal<T, F>(
    t: Target<T>,
    base: *mut T,
    a: Range,
    b: Range,
    buffer: Range,
    cmp: &mut F,
) where
    F: FnMut(&T, &T) -> Ordering,
{
    let a_len = a.len();
    let b_len = b.len();

    let mut a_count = 0usize;
    let mut b_count = 0usize;

    let mut pa = base.add(a.start);
    let mut pbuf = base.add(buffer.start);

    if a_len > 0 && b_len > 0 {
        let mut pb = base.add(b.start);
        loop {
            if cmp(&*pb, &*pbuf) != Ordering::Less {
                t.swap(pa, pbuf);
                pa = pa.add(1);
                pbuf = pbuf.add(1);
                a_count += 1;
                if a_count >= a_len {
                    break;
                }
            } else {
                t.swap(pa, pb);
                pa = pa.add(1);
                pb = pb.add(1);
                b_count += 1;
                if b_count >= b_len {
                    break;
                }
            }
        }
    }

    t.blockswap(pbuf, pa, a_len - a_count);
}

/// Merge adjacent ranges `a` and `b` with no scratch space, by repeatedly
/// finding where `a`'s first element belongs in `b` and rotating it into
/// place.
///
/// This is only ever invoked once neither `a` nor `b` contains enough
/// distinct keys to have earned an internal buffer (see `block::merge_level`),
/// which bounds the number of rotations this performs to `O(sqrt(n))` over
/// the whole level, keeping the overall pass `O(n)`.
pub(crate) unsafe fn merge_in_place<T, F>(t: Target<T>, base: *mut T, mut a: Range, mut b: Range, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if a.len() == 0 || b.len() == 0 {
        return;
    }

    loop {
        let mid = binary_first(base, base.add(a.start), b, cmp);

        let amount = mid - a.end;
        rotate(t, base, Range::new(a.start, mid), a.len());
        if b.end == mid {
            break;
        }

        b.start = mid;
        a = Range::new(a.start + amount, b.start);
        a.start = binary_last(base, base.add(a.start), a, cmp);
        if a.len() == 0 {
            break;
        }
    }
}
