//! Cursor navigation.
//!
//! Movement is computed from the lines and a starting position and never
//! touches content. Left and Right wrap across rows: Right off the end of a
//! row lands at the start of the next, Left off the start of a row lands at
//! the end of the previous one.

use crate::line::CodepointLine;
use crate::position::Position;

/// A cursor-only movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Home,
    End,
}

impl Motion {
    /// Where the cursor ends up after this motion from `from`.
    ///
    /// `from` must be a valid position in `lines`; the result always is.
    #[must_use]
    pub fn apply(self, lines: &[CodepointLine], from: Position) -> Position {
        let len_of = |row: usize| lines.get(row).map_or(0, CodepointLine::len);
        let Position { row, col } = from;

        match self {
            Self::Right if col < len_of(row) => Position::new(row, col + 1),
            Self::Right if row + 1 < lines.len() => Position::new(row + 1, 0),
            Self::Left if col > 0 => Position::new(row, col - 1),
            Self::Left if row > 0 => Position::new(row - 1, len_of(row - 1)),
            Self::Home => Position::new(row, 0),
            Self::End => Position::new(row, len_of(row)),
            Self::Left | Self::Right => from,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<CodepointLine> {
        text.iter().map(|t| CodepointLine::from_text(t)).collect()
    }

    // -- Right --------------------------------------------------------------

    #[test]
    fn right_within_row() {
        let l = lines(&["abc"]);
        assert_eq!(Motion::Right.apply(&l, Position::new(0, 1)), Position::new(0, 2));
    }

    #[test]
    fn right_reaches_append_position() {
        let l = lines(&["abc"]);
        assert_eq!(Motion::Right.apply(&l, Position::new(0, 2)), Position::new(0, 3));
    }

    #[test]
    fn right_wraps_to_next_row() {
        let l = lines(&["abc", "de"]);
        assert_eq!(Motion::Right.apply(&l, Position::new(0, 3)), Position::new(1, 0));
    }

    #[test]
    fn right_at_very_end_is_noop() {
        let l = lines(&["abc", "de"]);
        assert_eq!(Motion::Right.apply(&l, Position::new(1, 2)), Position::new(1, 2));
    }

    // -- Left ---------------------------------------------------------------

    #[test]
    fn left_within_row() {
        let l = lines(&["abc"]);
        assert_eq!(Motion::Left.apply(&l, Position::new(0, 2)), Position::new(0, 1));
    }

    #[test]
    fn left_wraps_to_end_of_previous_row() {
        let l = lines(&["abcd", "ef"]);
        assert_eq!(Motion::Left.apply(&l, Position::new(1, 0)), Position::new(0, 4));
    }

    #[test]
    fn left_at_origin_is_noop() {
        let l = lines(&["abc"]);
        assert_eq!(Motion::Left.apply(&l, Position::ZERO), Position::ZERO);
    }

    #[test]
    fn left_then_right_across_rows_round_trips() {
        let l = lines(&["abcd", "ef"]);
        let start = Position::new(1, 0);
        let back = Motion::Left.apply(&l, start);
        assert_eq!(Motion::Right.apply(&l, back), start);
    }

    // -- Home / End ---------------------------------------------------------

    #[test]
    fn home_and_end() {
        let l = lines(&["hello"]);
        let mid = Position::new(0, 2);
        assert_eq!(Motion::Home.apply(&l, mid), Position::new(0, 0));
        assert_eq!(Motion::End.apply(&l, mid), Position::new(0, 5));
    }

    #[test]
    fn multibyte_rows_count_code_points() {
        let l = lines(&["日本語"]);
        assert_eq!(Motion::End.apply(&l, Position::ZERO), Position::new(0, 3));
    }
}
