use std::fmt;

use anyhow::{anyhow, Result};

use super::{Piece, Position, Square};

/// A single move on a Xiangqi board: which piece went where, and what it captured.
///
/// Moves are displayed in the `"{from}>{to}"` form, such as `3-2>10-2`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    piece: Piece,
    captured: Option<Piece>,
}

impl Move {
    /// Creates a new [`Move`].
    pub const fn new(from: Square, to: Square, piece: Piece, captured: Option<Piece>) -> Self {
        Self {
            from,
            to,
            piece,
            captured,
        }
    }

    /// Creates a [`Move`] between two squares, reading the mover and any captured piece off `position`.
    ///
    /// Fails if `from` is empty. Legality is not checked.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Move, Position, Piece};
    /// let position = Position::default();
    /// let mv = Move::between(&position, "3-2".parse().unwrap(), "10-2".parse().unwrap()).unwrap();
    /// assert_eq!(mv.piece(), Piece::RED_CANNON);
    /// assert_eq!(mv.captured(), Some(Piece::BLACK_KNIGHT));
    /// ```
    pub fn between(position: &Position, from: Square, to: Square) -> Result<Self> {
        let piece = position
            .piece_at(from)
            .ok_or(anyhow!("Invalid move {from}>{to}: no piece on {from}"))?;

        Ok(Self::new(from, to, piece, position.piece_at(to)))
    }

    /// Parses a move in `"{from}>{to}"` form (or `"{from} {to}"`) against `position`.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Move, Position};
    /// let position = Position::default();
    /// let mv = Move::parse(&position, "1-2>3-3").unwrap();
    /// assert_eq!(mv.to_string(), "1-2>3-3");
    /// assert!(Move::parse(&position, "5-5>6-5").is_err());
    /// ```
    pub fn parse(position: &Position, text: &str) -> Result<Self> {
        let (from, to) = text
            .trim()
            .split_once(['>', ' '])
            .ok_or(anyhow!("Invalid move {text:?}: expected \"<from>><to>\""))?;

        Self::between(position, from.parse()?, to.parse()?)
    }

    /// Where the piece started.
    pub const fn from(&self) -> Square {
        self.from
    }

    /// Where the piece ended up.
    pub const fn to(&self) -> Square {
        self.to
    }

    /// The piece that moved.
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    /// The piece that was removed from [`Move::to`], if any.
    pub const fn captured(&self) -> Option<Piece> {
        self.captured
    }

    /// Returns `true` if this move removes a piece from the board.
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// A human-readable description, such as `"red cannon 3-2>10-2 captures black knight"`.
    pub fn describe(&self) -> String {
        match self.captured {
            Some(captured) => format!("{} {self} captures {}", self.piece.name(), captured.name()),
            None => format!("{} {self}", self.piece.name()),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("{}>{}", self.from, self.to);
        // Forward alignment flags, so tables of moves line up
        if let Some(width) = f.width() {
            write!(f, "{s:>width$}")
        } else {
            write!(f, "{s}")
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self, self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_mentions_capture() {
        let quiet = Move::new(
            Square::new(1, 2).unwrap(),
            Square::new(3, 3).unwrap(),
            Piece::RED_KNIGHT,
            None,
        );
        assert_eq!(quiet.describe(), "red knight 1-2>3-3");

        let capture = Move::new(
            Square::new(3, 2).unwrap(),
            Square::new(10, 2).unwrap(),
            Piece::RED_CANNON,
            Some(Piece::BLACK_KNIGHT),
        );
        assert!(capture.is_capture());
        assert_eq!(
            capture.describe(),
            "red cannon 3-2>10-2 captures black knight"
        );
    }

    #[test]
    fn display_pads_to_width() {
        let mv = Move::new(
            Square::new(1, 2).unwrap(),
            Square::new(3, 3).unwrap(),
            Piece::RED_KNIGHT,
            None,
        );
        assert_eq!(format!("{mv:>9}"), "  1-2>3-3");
    }
}
