use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A byte range into the original source text.
///
/// The checker never reads source text itself; spans travel with tree nodes
/// so that diagnostics can point back into whatever the host parsed. A tree
/// built programmatically (e.g. in tests) can leave spans at their default
/// empty value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span covering `start..end`.
    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Whether this span covers no text (the default for synthetic nodes).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The span as a `Range<usize>` for slicing source text.
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_span_is_empty() {
        assert!(Span::default().is_empty());
        assert!(!Span::new(2, 5).is_empty());
    }

    #[test]
    fn range_conversion() {
        assert_eq!(Span::new(3, 9).range(), 3..9);
    }
}
