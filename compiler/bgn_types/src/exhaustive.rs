//! Integer coverage of `match` patterns.
//!
//! A [`Coverage`] starts as the whole value domain of the scrutinee type
//! and has each constant pattern's interval removed from it. What remains
//! are the values no branch handles.

use std::fmt;

/// Inclusive interval of integer values.
///
/// `i128` holds every value of both `u64` and `i64` domains.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    pub start: i128,
    pub end: i128,
}

impl Interval {
    pub const fn new(start: i128, end: i128) -> Self {
        Interval { start, end }
    }

    pub const fn point(value: i128) -> Self {
        Interval::new(value, value)
    }

    pub const fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub const fn contains(&self, value: i128) -> bool {
        self.start <= value && value <= self.end
    }

    const fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..={}", self.start, self.end)
        }
    }
}

/// Values not yet handled, as sorted disjoint intervals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coverage {
    gaps: Vec<Interval>,
}

impl Coverage {
    pub fn new(domain: Interval) -> Self {
        let gaps = if domain.is_empty() { Vec::new() } else { vec![domain] };
        Coverage { gaps }
    }

    /// Value domain of an integer type. Widths are clamped to 1..=64.
    pub fn domain(bit_size: u64, is_signed: bool) -> Interval {
        let bits = u32::try_from(bit_size.clamp(1, 64)).unwrap_or(64);
        if is_signed {
            let half = 1i128 << (bits - 1);
            Interval::new(-half, half - 1)
        } else {
            Interval::new(0, (1i128 << bits) - 1)
        }
    }

    /// Remove `covered`. Returns whether any value was still uncovered.
    pub fn subtract(&mut self, covered: Interval) -> bool {
        if covered.is_empty() {
            return false;
        }
        let mut removed = false;
        let mut next = Vec::with_capacity(self.gaps.len() + 1);
        for gap in self.gaps.drain(..) {
            if !gap.overlaps(&covered) {
                next.push(gap);
                continue;
            }
            removed = true;
            if gap.start < covered.start {
                next.push(Interval::new(gap.start, covered.start - 1));
            }
            if gap.end > covered.end {
                next.push(Interval::new(covered.end + 1, gap.end));
            }
        }
        self.gaps = next;
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn gaps(&self) -> &[Interval] {
        &self.gaps
    }

    pub fn into_gaps(self) -> Vec<Interval> {
        self.gaps
    }
}

#[cfg(test)]
mod tests;
