use std::{fmt, ops::Not};

use super::{Side, Square};

/// A [`Bitboard`] represents a set of squares on a Xiangqi board as a set of bits.
///
/// The board has 90 intersections, so the internal representation is a 128-bit number of which only the
/// low 90 bits are ever set. Bit `n` corresponds to the [`Square`] with index `n`, so the low bits are
/// Red's side of the board and the high bits are Black's.
///
/// A bitboard of the first row looks like this:
/// ```text
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// X X X X X X X X X
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Bitboard(u128);

impl Bitboard {
    pub const EMPTY_BOARD: Self = Self(0);
    pub const FULL_BOARD: Self = Self((1 << Square::COUNT) - 1);
    /// Rows 1-5.
    pub const RED_SIDE: Self = Self((1 << (Square::COUNT / 2)) - 1);
    /// Rows 6-10.
    pub const BLACK_SIDE: Self = Self(Self::FULL_BOARD.0 ^ Self::RED_SIDE.0);
    /// Columns 4-6 of rows 1-3.
    pub const RED_PALACE: Self = Self(0b000111000_000111000_000111000);
    /// Columns 4-6 of rows 8-10.
    pub const BLACK_PALACE: Self = Self(Self::RED_PALACE.0 << 63);

    /// Constructs a new [`Bitboard`] from the provided bit pattern, discarding bits beyond the 90th.
    ///
    /// # Example
    /// ```
    /// # use types::Bitboard;
    /// let board = Bitboard::new(0b111);
    /// assert_eq!(board.population(), 3);
    /// assert_eq!(Bitboard::new(u128::MAX), Bitboard::FULL_BOARD);
    /// ```
    pub const fn new(bits: u128) -> Self {
        Self(bits & Self::FULL_BOARD.0)
    }

    /// Constructs a new [`Bitboard`] with only the bit of the provided [`Square`] set.
    pub const fn from_square(square: Square) -> Self {
        Self(1 << square.index())
    }

    /// Constructs a [`Bitboard`] of every square on `row`, in `[1,10]`.
    ///
    /// # Example
    /// ```
    /// # use types::Bitboard;
    /// assert_eq!(Bitboard::from_row(1).population(), 9);
    /// assert_eq!(Bitboard::from_row(1).inner(), 0b111111111);
    /// ```
    pub const fn from_row(row: u8) -> Self {
        debug_assert!(row >= 1 && row <= Square::ROWS, "Row must be between [1,10]");
        Self(0b111111111 << ((row - 1) * Square::COLUMNS))
    }

    /// Constructs a [`Bitboard`] of every square on `column`, in `[1,9]`.
    pub const fn from_column(column: u8) -> Self {
        debug_assert!(
            column >= 1 && column <= Square::COLUMNS,
            "Column must be between [1,9]"
        );
        let mut bits = 0;
        let mut row = 0;
        while row < Square::ROWS {
            bits |= 1 << (row * Square::COLUMNS + column - 1);
            row += 1;
        }
        Self(bits)
    }

    /// The half of the board `side` starts on.
    pub const fn home_side(side: Side) -> Self {
        match side {
            Side::Red => Self::RED_SIDE,
            Side::Black => Self::BLACK_SIDE,
        }
    }

    /// The nine palace squares of `side`.
    ///
    /// # Example
    /// ```
    /// # use types::{Bitboard, Side, Square};
    /// let palace = Bitboard::palace(Side::Black);
    /// assert_eq!(palace.population(), 9);
    /// assert!(palace.get(Square::new(9, 5).unwrap()));
    /// ```
    pub const fn palace(side: Side) -> Self {
        match side {
            Side::Red => Self::RED_PALACE,
            Side::Black => Self::BLACK_PALACE,
        }
    }

    /// Returns the inner `u128` of this [`Bitboard`].
    pub const fn inner(&self) -> u128 {
        self.0
    }

    /// Returns `true` if there are no set bits.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if there is at least one set bit.
    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    /// Returns `true` if `self` and `other` share at least one square.
    pub const fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Sets the bit of the provided [`Square`].
    ///
    /// # Example
    /// ```
    /// # use types::{Bitboard, Square};
    /// let mut board = Bitboard::default();
    /// board.set(Square::new(1, 2).unwrap());
    /// assert_eq!(board.inner(), 0b10);
    /// ```
    pub fn set(&mut self, square: Square) {
        self.0 |= 1 << square.index();
    }

    /// Gets the value of the bit of the provided [`Square`].
    pub const fn get(&self, square: Square) -> bool {
        self.0 & (1 << square.index()) != 0
    }

    /// Clears the bit of the provided [`Square`].
    pub fn clear(&mut self, square: Square) {
        self.0 &= !(1 << square.index());
    }

    /// Returns the lowest set bit of this [`Bitboard`], as a [`Square`].
    pub const fn lsb(&self) -> Option<Square> {
        if self.is_empty() {
            None
        } else {
            Some(Square::from_index_unchecked(self.0.trailing_zeros() as usize))
        }
    }

    /// Pops and returns the lowest set bit of this [`Bitboard`], as a [`Square`].
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let lsb = self.lsb();
        self.clear_lsb();
        lsb
    }

    /// Clears the lowest set bit, if there is one.
    pub fn clear_lsb(&mut self) {
        self.0 &= self.0.wrapping_sub(1);
    }

    /// Returns a [`BitboardIter`] over all of the set bits as [`Square`]s.
    pub const fn iter(&self) -> BitboardIter {
        BitboardIter { bb: *self }
    }

    /// Yields the total number of set bits.
    ///
    /// # Example
    /// ```
    /// # use types::Bitboard;
    /// assert_eq!(Bitboard::FULL_BOARD.population(), 90);
    /// assert_eq!(Bitboard::RED_SIDE.population(), 45);
    /// ```
    pub const fn population(&self) -> u32 {
        self.0.count_ones()
    }

    /// `const` analogue of [`std::ops::BitAnd`].
    pub const fn and(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// `const` analogue of [`std::ops::BitOr`].
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

macro_rules! impl_bitwise_op {
    ($op:tt, $op_assign:tt, $func:ident, $func_assign:ident, $op_tok:tt) => {
        impl std::ops::$op for Bitboard {
            type Output = Self;
            fn $func(self, rhs: Self) -> Self::Output {
                Self(self.0 $op_tok rhs.0)
            }
        }

        impl std::ops::$op_assign for Bitboard {
            fn $func_assign(&mut self, rhs: Self) {
                *self = *self $op_tok rhs;
            }
        }
    };
}

impl_bitwise_op!(BitAnd, BitAndAssign, bitand, bitand_assign, &);
impl_bitwise_op!(BitOr, BitOrAssign, bitor, bitor_assign, |);
impl_bitwise_op!(BitXor, BitXorAssign, bitxor, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Self;
    /// Complements within the 90 board squares.
    fn not(self) -> Self::Output {
        Self(!self.0 & Self::FULL_BOARD.0)
    }
}

impl<T> From<Option<T>> for Bitboard
where
    Self: From<T>,
{
    /// If `value` is `None`, this yields an empty [`Bitboard`].
    fn from(value: Option<T>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

impl From<Square> for Bitboard {
    fn from(value: Square) -> Self {
        Self::from_square(value)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY_BOARD, |bb, square| bb | square.bitboard())
    }
}

impl Extend<Square> for Bitboard {
    fn extend<I: IntoIterator<Item = Square>>(&mut self, iter: I) {
        for square in iter {
            self.set(square);
        }
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board = String::with_capacity(Square::COUNT * 2 + Square::ROWS as usize);

        for row in (1..=Square::ROWS).rev() {
            for column in 1..=Square::COLUMNS {
                let square = Square::new_unchecked(row, column);
                board.push(if self.get(square) { 'X' } else { '.' });
                board.push(if column == Square::COLUMNS { '\n' } else { ' ' });
            }
        }

        write!(f, "{board}")
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board = String::with_capacity(256);

        for row in (1..=Square::ROWS).rev() {
            board += &format!("{row:>2}| ");
            for column in 1..=Square::COLUMNS {
                let square = Square::new_unchecked(row, column);
                let occupant = if self.get(square) { 'X' } else { '.' };
                board += &format!("{occupant} ");
            }
            board += "\n";
        }
        board += "   +";
        board += &"--".repeat(Square::COLUMNS as usize);
        board += "\n     ";
        for column in 1..=Square::COLUMNS {
            board += &format!("{column} ");
        }

        write!(f, "{board}")
    }
}

/// Iterates over the set bits of a [`Bitboard`], lowest index first.
pub struct BitboardIter {
    bb: Bitboard,
}

impl Iterator for BitboardIter {
    type Item = Square;
    fn next(&mut self) -> Option<Self::Item> {
        self.bb.pop_lsb()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.bb.population() as usize;
        (size, Some(size))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter { bb: self }
    }
}

impl IntoIterator for &Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter { bb: *self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitboard_to_string() {
        let expected = ". . . . . . . . .\n\
                        . . . . . . . . .\n\
                        . . . . . . . . .\n\
                        . . . . . . . . .\n\
                        . . . . . . . . .\n\
                        . . . . . . . . .\n\
                        . . . . . . . . .\n\
                        . . . X X X . . .\n\
                        . . . X X X . . .\n\
                        . . . X X X . . .\n";
        assert_eq!(Bitboard::RED_PALACE.to_string(), expected);
    }

    #[test]
    fn palaces_match_square_predicate() {
        for side in Side::iter() {
            let expected: Bitboard = Square::iter().filter(|sq| sq.is_in_palace(side)).collect();
            assert_eq!(Bitboard::palace(side), expected, "{side:?} palace");
        }
    }

    #[test]
    fn halves_partition_the_board() {
        assert_eq!(Bitboard::RED_SIDE | Bitboard::BLACK_SIDE, Bitboard::FULL_BOARD);
        assert!(!Bitboard::RED_SIDE.intersects(Bitboard::BLACK_SIDE));
        assert_eq!(!Bitboard::RED_SIDE, Bitboard::BLACK_SIDE);
        assert_eq!(Bitboard::from_row(5) | Bitboard::from_row(6), {
            let mut rows = Bitboard::from_row(5);
            rows.extend(Bitboard::from_row(6));
            rows
        });
    }

    #[test]
    fn rows_and_columns() {
        for row in 1..=Square::ROWS {
            assert_eq!(Bitboard::from_row(row).population(), 9);
        }
        for column in 1..=Square::COLUMNS {
            let bb = Bitboard::from_column(column);
            assert_eq!(bb.population(), 10);
            assert!(bb.iter().all(|sq| sq.column() == column));
        }
    }

    #[test]
    fn iteration_yields_squares_in_index_order() {
        let squares = [
            Square::new(10, 9).unwrap(),
            Square::new(1, 1).unwrap(),
            Square::new(5, 5).unwrap(),
        ];
        let bb: Bitboard = squares.into_iter().collect();
        let collected: Vec<_> = bb.into_iter().collect();
        assert_eq!(
            collected,
            vec![squares[1], squares[2], squares[0]],
            "iteration should be ascending by index"
        );

        let mut bb = bb;
        assert_eq!(bb.pop_lsb(), Some(squares[1]));
        assert_eq!(bb.population(), 2);
    }
}
