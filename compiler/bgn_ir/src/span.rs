//! Source locations.
//!
//! A [`Loc`] is what every node carries: the byte range inside its file plus
//! the 1-based line/column the external lexer computed, and the index of the
//! originating file in the program's file list (imports add files).

use std::fmt;

/// Byte range inside one source file.
///
/// Layout: 8 bytes, `end` is exclusive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span for nodes synthesized by the compiler.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if another span lies fully inside this one.
    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Full source location of a node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Loc {
    pub span: Span,
    /// Index into the program's file list.
    pub file: u32,
    pub line: u32,
    pub col: u32,
}

impl Loc {
    pub const DUMMY: Loc = Loc {
        span: Span::DUMMY,
        file: 0,
        line: 0,
        col: 0,
    };

    pub const fn new(span: Span, file: u32, line: u32, col: u32) -> Self {
        Loc {
            span,
            file,
            line,
            col,
        }
    }

    /// Location covering `self` through `other`, keeping `self`'s line/col.
    #[must_use]
    pub fn to(self, other: Loc) -> Loc {
        if self.file != other.file {
            return self;
        }
        Loc {
            span: self.span.merge(other.span),
            ..self
        }
    }
}

impl fmt::Debug for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}@{:?}",
            self.file, self.line, self.col, self.span
        )
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{Loc, Span};
    crate::static_assert_size!(Span, 8);
    crate::static_assert_size!(Loc, 20);
}
