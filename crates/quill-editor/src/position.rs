//! Cursor coordinates in the compose buffer.
//!
//! Both fields are 0-indexed. `col` counts code points within the row, so
//! the column equal to the row's length is the append position.

use std::fmt;

/// A `(row, col)` location in a [`LineBuffer`](crate::buffer::LineBuffer).
///
/// Ordered row first, then column.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self { row: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.row, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for the status line.
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_row_major() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
    }

    #[test]
    fn from_tuple() {
        assert_eq!(Position::from((3, 4)), Position::new(3, 4));
    }

    #[test]
    fn display_is_one_indexed() {
        assert_eq!(Position::ZERO.to_string(), "1:1");
        assert_eq!(format!("{:?}", Position::new(1, 2)), "Pos(1:2)");
    }
}
