//! Byte ranges into the source text.

/// A range of bytes in the source text.
///
/// Spans are always byte offsets, never character counts.
///
/// # Example
///
/// ```
/// use quill_syntax::SourceSpan;
///
/// let span = SourceSpan::new(2, 3);
/// assert_eq!(span.end(), 5);
/// assert_eq!(span.slice("ab\\b{}"), "\\b{");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceSpan {
    /// Offset of the first byte.
    pub begin: usize,
    /// Number of bytes.
    pub length: usize,
}

impl SourceSpan {
    #[must_use]
    pub const fn new(begin: usize, length: usize) -> Self {
        Self { begin, length }
    }

    /// Offset one past the last byte.
    #[must_use]
    pub const fn end(self) -> usize {
        self.begin + self.length
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.length == 0
    }

    /// Returns `true` if `index` lies within `begin..end`.
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index >= self.begin && index < self.end()
    }

    /// The text covered by this span.
    ///
    /// # Panics
    ///
    /// Panics if the span is out of bounds or splits a character.
    #[must_use]
    pub fn slice(self, source: &str) -> &str {
        &source[self.begin..self.end()]
    }

    /// Like [`slice`](Self::slice), but for raw bytes.
    #[must_use]
    pub fn slice_bytes(self, source: &[u8]) -> &[u8] {
        &source[self.begin..self.end()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_and_contains() {
        let span = SourceSpan::new(4, 2);
        assert_eq!(span.end(), 6);
        assert!(!span.contains(3));
        assert!(span.contains(4));
        assert!(span.contains(5));
        assert!(!span.contains(6));
    }

    #[test]
    fn test_empty_span_contains_nothing() {
        let span = SourceSpan::new(3, 0);
        assert!(span.is_empty());
        assert!(!span.contains(3));
    }
}
