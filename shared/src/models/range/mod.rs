use std::fmt;

use serde::{Deserialize, Serialize};

/// Half-open interval `[lower, upper)` of canvas rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRange {
    pub lower: u32,
    pub upper: u32,
}

impl RowRange {
    pub fn new(lower: u32, upper: u32) -> Self {
        debug_assert!(lower <= upper, "inverted row range {lower}..{upper}");
        Self { lower, upper }
    }

    pub fn len(&self) -> u32 {
        self.upper.saturating_sub(self.lower)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, row: u32) -> bool {
        self.lower <= row && row < self.upper
    }

    /// True when `other` is a well-formed range starting and ending inside `self`.
    pub fn covers(&self, other: &RowRange) -> bool {
        self.lower <= other.lower && other.lower <= other.upper && other.upper <= self.upper
    }

    pub fn rows(&self) -> std::ops::Range<u32> {
        self.lower..self.upper
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lower, self.upper)
    }
}
