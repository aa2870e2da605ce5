use core::cmp::Ordering;

use crate::elem::Target;
use crate::iter::LevelIter;
use crate::merge::{merge_in_place, merge_internal};
use crate::range::{rotate, Range};
use crate::search::{binary_first, find_first_backward, find_first_forward, find_last_backward, find_last_forward};

/// Integer square root via the classic binary digit-by-digit algorithm
/// (http://www.codecodex.com/wiki/Calculate_an_integer_square_root),
/// ported rather than approximated through `f64` so it stays exact at the
/// sizes this engine actually runs at.
pub(crate) fn isqrt(x: usize) -> usize {
    let mut op = x;
    let mut res: usize = 0;
    let mut one: usize = 1usize << (usize::BITS - 2);

    while one > op {
        one >>= 2;
    }

    while one != 0 {
        if op >= res + one {
            op -= res + one;
            res += one << 1;
        }
        res >>= 1;
        one >>= 2;
    }

    res
}

/// Bookkeeping for one internal-buffer extraction: `count` unique values
/// were found starting at array position `from`, to be pulled out to
/// position `to` (the start of an A subarray if `to < from`, or the end of
/// a B subarray if `to > from`). `range` bounds the A+B subarray pair this
/// extraction happened within, and is later used to know when a subarray's
/// own buffer needs to be skipped over during merging and to know how far
/// the values can be redistributed back across once merging is done.
#[derive(Clone, Copy)]
struct Pull {
    from: usize,
    to: usize,
    count: usize,
    range: Range,
}

impl Pull {
    const fn empty() -> Self {
        Pull {
            from: 0,
            to: 0,
            count: 0,
            range: Range::new(0, 0),
        }
    }
}

/// Run one level of the bottom-up block merge sort: double every adjacent
/// `A`/`B` run pair that `it` currently iterates over.
///
/// This extracts one or two internal buffers of up to `sqrt(level_len)`
/// distinct keys from the array itself (stealing no extra memory), uses
/// them to merge each `A`/`B` pair block-at-a-time, then puts the buffer
/// contents back where they came from. When the array doesn't contain
/// enough distinct keys to fill even one buffer, every merge in this level
/// falls back to the rotation-based `merge_in_place`, which is slower
/// per-element but needs no buffer at all.
pub(crate) unsafe fn merge_level<T, F>(t: Target<T>, base: *mut T, it: &mut LevelIter, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let level_len = it.level_len();
    let mut block_size = isqrt(level_len);
    let buffer_size_target = level_len / block_size + 1;

    let mut buffer1 = Range::new(0, 0);
    let mut buffer2 = Range::new(0, 0);
    let mut pull = [Pull::empty(), Pull::empty()];
    let mut pull_index = 0usize;

    let mut find = buffer_size_target + buffer_size_target;
    let mut find_separately = false;
    if find > level_len {
        find = buffer_size_target;
        find_separately = true;
    }

    // Step 1: find one or two internal buffers of `buffer_size_target`
    // unique values each, reusing them for every A/B pair at this level.
    it.begin();
    'find: while !it.finished() {
        let a = it.next_range();
        let b = it.next_range();

        let mut last = a.start;
        let mut count = 1usize;
        while count < find {
            let index = find_last_forward(base, base.add(last), Range::new(last + 1, a.end), find - count, cmp);
            if index == a.end {
                break;
            }
            last = index;
            count += 1;
        }
        let index = last;

        if count >= buffer_size_target {
            pull[pull_index] = Pull {
                range: Range::new(a.start, b.end),
                count,
                from: index,
                to: a.start,
            };
            pull_index = 1;

            if count == buffer_size_target + buffer_size_target {
                buffer1 = Range::new(a.start, a.start + buffer_size_target);
                buffer2 = Range::new(a.start + buffer_size_target, a.start + count);
                break 'find;
            } else if find == buffer_size_target + buffer_size_target {
                buffer1 = Range::new(a.start, a.start + count);
                find = buffer_size_target;
            } else if find_separately {
                buffer1 = Range::new(a.start, a.start + count);
                find_separately = false;
            } else {
                buffer2 = Range::new(a.start, a.start + count);
                break 'find;
            }
        } else if pull_index == 0 && count > buffer1.len() {
            buffer1 = Range::new(a.start, a.start + count);
            pull[0] = Pull {
                range: Range::new(a.start, b.end),
                count,
                from: index,
                to: a.start,
            };
        }

        let mut last = b.end - 1;
        let mut count = 1usize;
        while count < find {
            let index = find_first_backward(base, base.add(last), Range::new(b.start, last), find - count, cmp);
            if index == b.start {
                break;
            }
            last = index - 1;
            count += 1;
        }
        let index = last;

        if count >= buffer_size_target {
            pull[pull_index] = Pull {
                range: Range::new(a.start, b.end),
                count,
                from: index,
                to: b.end,
            };
            pull_index = 1;

            if count == buffer_size_target + buffer_size_target {
                buffer1 = Range::new(b.end - count, b.end - buffer_size_target);
                buffer2 = Range::new(b.end - buffer_size_target, b.end);
                break 'find;
            } else if find == buffer_size_target + buffer_size_target {
                buffer1 = Range::new(b.end - count, b.end);
                find = buffer_size_target;
            } else if find_separately {
                buffer1 = Range::new(b.end - count, b.end);
                find_separately = false;
            } else {
                if pull[0].range.start == a.start {
                    pull[0].range.end -= pull[1].count;
                }
                buffer2 = Range::new(b.end - count, b.end);
                break 'find;
            }
        } else if pull_index == 0 && count > buffer1.len() {
            buffer1 = Range::new(b.end - count, b.end);
            pull[0] = Pull {
                range: Range::new(a.start, b.end),
                count,
                from: index,
                to: b.end,
            };
        }
    }

    // Step 1a: pull the chosen ranges out to the edges of their subarrays
    // so they can serve as scratch space.
    for p in pull.iter_mut() {
        let length = p.count;

        if p.to < p.from {
            let mut index = p.from;
            for count in 1..length {
                index = find_first_backward(
                    base,
                    base.add(index - 1),
                    Range::new(p.to, p.from - (count - 1)),
                    length - count,
                    cmp,
                );
                let range = Range::new(index + 1, p.from + 1);
                rotate(t, base, range, range.len() - count);
                p.from = index + count;
            }
        } else if p.to > p.from {
            let mut index = p.from + 1;
            for count in 1..length {
                index = find_last_forward(base, base.add(index), Range::new(index, p.to), length - count, cmp);
                let range = Range::new(p.from, index - 1);
                rotate(t, base, range, count);
                p.from = index - 1 - count;
            }
        }
    }

    // The buffers we actually got might be smaller than hoped for; derive
    // the real block size from what's available.
    let buffer_size = buffer1.len();
    block_size = level_len / buffer_size + 1;
    debug_assert!((level_len + block_size - 1) / block_size <= buffer_size);

    // Step 2-6: merge every A/B pair at this level.
    it.begin();
    while !it.finished() {
        let mut a = it.next_range();
        let mut b = it.next_range();

        let start = a.start;
        if start == pull[0].range.start {
            if pull[0].from > pull[0].to {
                a.start += pull[0].count;
                if a.len() == 0 {
                    continue;
                }
            } else if pull[0].from < pull[0].to {
                b.end -= pull[0].count;
                if b.len() == 0 {
                    continue;
                }
            }
        }
        if start == pull[1].range.start {
            if pull[1].from > pull[1].to {
                a.start += pull[1].count;
                if a.len() == 0 {
                    continue;
                }
            } else if pull[1].from < pull[1].to {
                b.end -= pull[1].count;
                if b.len() == 0 {
                    continue;
                }
            }
        }

        if cmp(&*base.add(b.end - 1), &*base.add(a.start)) == Ordering::Less {
            // A and B are fully out of order: a single rotation suffices.
            rotate(t, base, Range::new(a.start, b.end), a.len());
            continue;
        }
        if cmp(&*base.add(a.end), &*base.add(a.end - 1)) != Ordering::Less {
            // Already in order.
            continue;
        }

        // Step 3: split the remainder of A into `block_size` blocks, with
        // `first_a` the uneven-sized leftover block at the front.
        let mut block_a = Range::new(a.start, a.end);
        let first_a = Range::new(a.start, a.start + block_a.len() % block_size);

        // Step 4: tag each full A block with the value currently at the
        // front of buffer1, so later comparisons on the rolled blocks can
        // still tell which original A block a value came from.
        {
            let mut index_a = buffer1.start;
            let mut index = first_a.end;
            while index < block_a.end {
                t.swap(base.add(index_a), base.add(index));
                index_a += 1;
                index += block_size;
            }
        }

        let mut last_a = first_a;
        let mut last_b = Range::new(0, 0);
        let mut block_b = Range::new(b.start, b.start + usize::min(block_size, b.len()));
        block_a.start += first_a.len();
        let mut index_a = buffer1.start;

        if buffer2.len() > 0 {
            t.blockswap(base.add(last_a.start), base.add(buffer2.start), last_a.len());
        }

        // Step 5-6: roll the A blocks through the B blocks, dropping each
        // one into place and merging it with whatever B values follow it.
        if block_a.len() > 0 {
            loop {
                let drop_min = (last_b.len() > 0
                    && cmp(&*base.add(last_b.end - 1), &*base.add(index_a)) != Ordering::Less)
                    || block_b.len() == 0;

                if drop_min {
                    let b_split = binary_first(base, base.add(index_a), last_b, cmp);
                    let b_remaining = last_b.end - b_split;

                    let mut min_a = block_a.start;
                    let mut find_a = min_a + block_size;
                    while find_a < block_a.end {
                        if cmp(&*base.add(find_a), &*base.add(min_a)) == Ordering::Less {
                            min_a = find_a;
                        }
                        find_a += block_size;
                    }
                    t.blockswap(base.add(block_a.start), base.add(min_a), block_size);

                    t.swap(base.add(block_a.start), base.add(index_a));
                    index_a += 1;

                    if buffer2.len() > 0 {
                        merge_internal(t, base, last_a, Range::new(last_a.end, b_split), buffer2, cmp);
                    } else {
                        merge_in_place(t, base, last_a, Range::new(last_a.end, b_split), cmp);
                    }

                    if buffer2.len() > 0 {
                        t.blockswap(base.add(block_a.start), base.add(buffer2.start), block_size);
                        t.blockswap(
                            base.add(b_split),
                            base.add(block_a.start + block_size - b_remaining),
                            b_remaining,
                        );
                    } else {
                        rotate(
                            t,
                            base,
                            Range::new(b_split, block_a.start + block_size),
                            block_a.start - b_split,
                        );
                    }

                    last_a = Range::new(block_a.start - b_remaining, block_a.start - b_remaining + block_size);
                    last_b = Range::new(last_a.end, last_a.end + b_remaining);

                    block_a.start += block_size;
                    if block_a.len() == 0 {
                        break;
                    }
                } else if block_b.len() < block_size {
                    rotate(t, base, Range::new(block_a.start, block_b.end), block_b.start - block_a.start);

                    last_b = Range::new(block_a.start, block_a.start + block_b.len());
                    block_a.start += block_b.len();
                    block_a.end += block_b.len();
                    block_b.end = block_b.start;
                } else {
                    t.blockswap(base.add(block_a.start), base.add(block_b.start), block_size);
                    last_b = Range::new(block_a.start, block_a.start + block_size);

                    block_a.start += block_size;
                    block_a.end += block_size;
                    block_b.start += block_size;

                    if block_b.end > b.end - block_size {
                        block_b.end = b.end;
                    } else {
                        block_b.end += block_size;
                    }
                }
            }
        }

        if buffer2.len() > 0 {
            merge_internal(t, base, last_a, Range::new(last_a.end, b.end), buffer2, cmp);
        } else {
            merge_in_place(t, base, last_a, Range::new(last_a.end, b.end), cmp);
        }
    }

    // Step 7-8: the second buffer (if any) is left jumbled; sort it, then
    // put both buffers back where they were pulled from.
    crate::small::insertion_sort(t, base, buffer2, cmp);

    redistribute_pulls(t, base, &pull, cmp);
}

/// Step 7: for each pull in order, unwind the extraction — repeatedly find
/// the next position where a buffer element belongs and rotate one element
/// out into place, until the whole buffer has been returned.
unsafe fn redistribute_pulls<T, F>(t: Target<T>, base: *mut T, pull: &[Pull; 2], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for p in pull.iter() {
        let mut unique = p.count * 2;

        if p.from > p.to {
            let mut buffer = Range::new(p.range.start, p.range.start + p.count);
            while buffer.len() > 0 {
                let index = find_first_forward(base, base.add(buffer.start), Range::new(buffer.end, p.range.end), unique, cmp);
                let amount = index - buffer.end;
                rotate(t, base, Range::new(buffer.start, index), buffer.len());
                buffer.start += amount + 1;
                buffer.end += amount;
                unique -= 2;
            }
        } else if p.from < p.to {
            let mut buffer = Range::new(p.range.end - p.count, p.range.end);
            while buffer.len() > 0 {
                let index = find_last_backward(base, base.add(buffer.end - 1), Range::new(p.range.start, buffer.start), unique, cmp);
                let amount = buffer.start - index;
                rotate(t, base, Range::new(index, buffer.end), amount);
                buffer.start -= amount;
                buffer.end -= amount + 1;
                unique -= 2;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_matches_definition() {
        for x in 0..5000usize {
            let r = isqrt(x);
            assert!(r * r <= x, "isqrt({x}) = {r}, but {r}*{r} > {x}");
            assert!((r + 1) * (r + 1) > x, "isqrt({x}) = {r}, but {r}+1 squared is not > {x}");
        }
    }

    #[test]
    fn isqrt_perfect_squares() {
        for r in 0..80usize {
            assert_eq!(isqrt(r * r), r);
        }
    }
}
