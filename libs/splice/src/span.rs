//! Byte spans within a document

use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` byte range into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside the span.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basics() {
        let span = Span::new(3, 10);
        assert_eq!(span.len(), 7);
        assert!(!span.is_empty());
        assert!(span.contains(3));
        assert!(span.contains(9));
        assert!(!span.contains(10));
    }

    #[test]
    fn test_empty_span() {
        let span = Span::new(5, 5);
        assert!(span.is_empty());
        assert!(!span.contains(5));
    }
}
