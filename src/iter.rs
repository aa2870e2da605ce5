use crate::range::Range;

/// Largest power of two `<= x` (0 maps to 0).
pub(crate) const fn pow2_floor(x: usize) -> usize {
    if x == 0 {
        return 0;
    }
    let mut y = x;
    let mut shift = 1;
    while shift < usize::BITS as usize {
        y |= y >> shift;
        shift <<= 1;
    }
    y - (y >> 1)
}

/// Walks the array level by level for a bottom-up merge sort, handing out
/// same-level run boundaries via `next_range` and doubling the run length
/// via `next_level`.
///
/// Real array sizes are rarely powers of two, so runs can't all be exactly
/// `level_len` long: the iterator scales the power-of-two-sized "ideal"
/// iteration space down to `size` with a Bresenham-style fraction
/// (`numerator`/`denominator`), accumulating the remainder in `decimal` so
/// that every few ranges absorb one extra element instead of leaving a
/// ragged short run at the end.
pub(crate) struct LevelIter {
    size: usize,
    denominator: usize,
    numerator: usize,
    decimal: usize,
    numerator_step: usize,
    decimal_step: usize,
}

impl LevelIter {
    /// `min_level` is the smallest run length the caller wants to start
    /// merging at (the engine calls this with 4, since runs shorter than
    /// that are handled by `small::sort_small_runs` beforehand).
    pub(crate) fn new(size: usize, min_level: usize) -> Self {
        let power_of_two = pow2_floor(size);
        let denominator = power_of_two / min_level;
        LevelIter {
            size,
            denominator,
            numerator: 0,
            decimal: 0,
            numerator_step: size % denominator,
            decimal_step: size / denominator,
        }
    }

    pub(crate) fn begin(&mut self) {
        self.numerator = 0;
        self.decimal = 0;
    }

    pub(crate) fn finished(&self) -> bool {
        self.decimal >= self.size
    }

    pub(crate) fn next_range(&mut self) -> Range {
        let start = self.decimal;

        self.decimal += self.decimal_step;
        self.numerator += self.numerator_step;
        if self.numerator >= self.denominator {
            self.numerator -= self.denominator;
            self.decimal += 1;
        }

        Range::new(start, self.decimal)
    }

    /// Double the run length for the next pass. Returns `false` once the
    /// run length would reach or exceed `size`, meaning the array is fully
    /// merged.
    pub(crate) fn next_level(&mut self) -> bool {
        self.decimal_step += self.decimal_step;
        self.numerator_step += self.numerator_step;
        if self.numerator_step >= self.denominator {
            self.numerator_step -= self.denominator;
            self.decimal_step += 1;
        }

        self.decimal_step < self.size
    }

    pub(crate) fn level_len(&self) -> usize {
        self.decimal_step
    }
}
