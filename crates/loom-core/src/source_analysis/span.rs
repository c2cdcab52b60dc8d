// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Source location tracking.
//!
//! Every token and AST node carries a `Span` identifying the region of the
//! source file it was produced from. Spans are the sole mechanism of source
//! provenance in the pipeline: token text is recovered by slicing the source
//! with the token's span, and diagnostics point at spans.

use std::ops::Range;

/// A span of source code, represented as a `[start, end)` byte-offset range
/// into a single source file.
///
/// Spans are used throughout the compiler to track the source location of
/// tokens, AST nodes, and error messages. Which file a span refers to is
/// carried separately (see [`FileId`](crate::source::FileId)).
///
/// # Examples
///
/// ```
/// use loom_core::source_analysis::Span;
///
/// let span = Span::new(0, 10);
/// assert_eq!(span.start(), 0);
/// assert_eq!(span.end(), 10);
/// assert_eq!(span.len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: u32,
    end: u32,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    ///
    /// Requires `start <= end` (checked in debug builds). The lexer and
    /// parser only ever build spans from token cursors and [`Span::merge`],
    /// which preserve the ordering; the check exists for callers that
    /// construct spans from independently computed offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start must be <= end");
        Self { start, end }
    }

    /// Creates an empty span at the given offset.
    #[must_use]
    pub const fn empty(at: u32) -> Self {
        Self { start: at, end: at }
    }

    /// Returns the start byte offset.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// Returns the end byte offset (exclusive).
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns true if `offset` falls within `self`.
    #[must_use]
    pub const fn contains_offset(self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns true if `other` is fully contained within `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Creates a span that covers both `self` and `other`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Extracts the text this span covers from the originating source.
    #[must_use]
    pub fn slice(self, source: &str) -> &str {
        &source[self.as_range()]
    }

    /// Converts to a `Range<usize>` for indexing into source text.
    #[must_use]
    pub const fn as_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<u32>> for Span {
    fn from(range: Range<u32>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Range<usize>> for Span {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 1 GiB are rejected by the source manager"
    )]
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.as_range()
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start as usize, span.len() as usize).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Offsets below refer to this statement:
    //
    //   let total = base + offset;
    //   0   4     10 12   17 19   25
    const SRC: &str = "let total = base + offset;";

    const KW_LET: Span = Span::new(0, 3);
    const LHS: Span = Span::new(4, 9); // total
    const BASE: Span = Span::new(12, 16);
    const PLUS: Span = Span::new(17, 18);
    const OFFSET: Span = Span::new(19, 25);

    #[test]
    fn accessors_match_token_offsets() {
        assert_eq!(LHS.start(), 4);
        assert_eq!(LHS.end(), 9);
        assert_eq!(LHS.len(), 5);
        assert!(!LHS.is_empty());
    }

    #[test]
    fn eof_spans_are_empty() {
        // The lexer hands out a zero-length span at the end offset for Eof.
        let eof = Span::empty(SRC.len() as u32);
        assert!(eof.is_empty());
        assert_eq!(eof.len(), 0);
        assert_eq!(eof.slice(SRC), "");
    }

    #[test]
    fn merge_covers_binary_expression() {
        // A Binary node's span is the merge of its operand spans.
        let binary = BASE.merge(OFFSET);
        assert_eq!(binary.slice(SRC), "base + offset");
        assert_eq!(binary, OFFSET.merge(BASE));

        // Merging with an inner span changes nothing.
        assert_eq!(binary.merge(PLUS), binary);
    }

    #[test]
    fn containment_is_half_open() {
        let statement = Span::new(0, SRC.len() as u32);
        assert!(statement.contains(BASE));
        assert!(statement.contains(statement));
        assert!(!BASE.contains(statement));
        assert!(!KW_LET.contains(LHS));

        assert!(BASE.contains_offset(12));
        assert!(BASE.contains_offset(15));
        assert!(!BASE.contains_offset(16)); // end is exclusive
    }

    #[test]
    fn slice_recovers_token_text() {
        assert_eq!(KW_LET.slice(SRC), "let");
        assert_eq!(LHS.slice(SRC), "total");
        assert_eq!(PLUS.slice(SRC), "+");
    }

    #[test]
    fn range_conversions_round_trip() {
        let from_u32: Span = (12u32..16u32).into();
        let from_usize: Span = (12usize..16usize).into();
        assert_eq!(from_u32, BASE);
        assert_eq!(from_usize, BASE);

        let range: Range<usize> = OFFSET.into();
        assert_eq!(range, 19..25);
        assert_eq!(&SRC[OFFSET.as_range()], "offset");
    }
}
