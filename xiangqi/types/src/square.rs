use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{anyhow, bail, Context, Result};

use super::{Bitboard, Side};

/// Represents a single intersection ("square") on a Xiangqi board.
///
/// Squares are addressed by a `row` in `[1,10]` and a `column` in `[1,9]`.
/// Row 1 is Red's back rank and row 10 is Black's.
///
/// Internally, this is the index `(row - 1) * 9 + (column - 1)`, so `0` is `1-1` and `89` is `10-9`.
///
/// The string form of a [`Square`] is `"{row}-{column}"`, which is also its unique key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// Number of rows on the board.
    pub const ROWS: u8 = 10;
    /// Number of columns on the board.
    pub const COLUMNS: u8 = 9;
    /// Number of squares on the board.
    pub const COUNT: usize = (Self::ROWS * Self::COLUMNS) as usize;

    /// Creates a new [`Square`] from a row and column, both 1-indexed.
    ///
    /// # Example
    /// ```
    /// # use types::Square;
    /// let sq = Square::new(10, 5).unwrap();
    /// assert_eq!(sq.index(), 85);
    /// assert!(Square::new(11, 5).is_err());
    /// assert!(Square::new(1, 0).is_err());
    /// ```
    pub fn new(row: u8, column: u8) -> Result<Self> {
        if !(1..=Self::ROWS).contains(&row) {
            bail!("Invalid row for Square: rows must be between [1,10]. Got {row}");
        }
        if !(1..=Self::COLUMNS).contains(&column) {
            bail!("Invalid column for Square: columns must be between [1,9]. Got {column}");
        }

        Ok(Self::new_unchecked(row, column))
    }

    /// Creates a new [`Square`] from a row and column, without bounds checks.
    ///
    /// # Panics
    /// If the row or column is out of bounds and debug assertions are enabled.
    pub const fn new_unchecked(row: u8, column: u8) -> Self {
        debug_assert!(row >= 1 && row <= Self::ROWS, "Row must be between [1,10]");
        debug_assert!(
            column >= 1 && column <= Self::COLUMNS,
            "Column must be between [1,9]"
        );
        Self((row - 1) * Self::COLUMNS + (column - 1))
    }

    /// Creates a new [`Square`] from an index in `[0,89]`, without bounds checks.
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < Self::COUNT, "Index must be between [0,89]");
        Self(index as u8)
    }

    /// An iterator over all squares, from `1-1` to `10-9`.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..Self::COUNT as u8).map(Self)
    }

    /// The row of this [`Square`], in `[1,10]`.
    pub const fn row(&self) -> u8 {
        self.0 / Self::COLUMNS + 1
    }

    /// The column of this [`Square`], in `[1,9]`.
    pub const fn column(&self) -> u8 {
        self.0 % Self::COLUMNS + 1
    }

    /// Returns this [`Square`] as a `usize`, for indexing into lists.
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Offsets this [`Square`] by `row_delta` rows and `column_delta` columns.
    ///
    /// Returns [`None`] if the result would be off the board.
    ///
    /// # Example
    /// ```
    /// # use types::Square;
    /// let sq = Square::new(1, 1).unwrap();
    /// assert_eq!(sq.offset(2, 1), Square::new(3, 2).ok());
    /// assert_eq!(sq.offset(-1, 0), None);
    /// assert_eq!(sq.offset(0, 9), None);
    /// ```
    pub fn offset(&self, row_delta: i8, column_delta: i8) -> Option<Self> {
        let row = self.row().checked_add_signed(row_delta)?;
        let column = self.column().checked_add_signed(column_delta)?;

        Self::new(row, column).ok()
    }

    /// Moves this [`Square`] `n` rows towards the opponent of `side`, if possible.
    ///
    /// # Example
    /// ```
    /// # use types::{Square, Side};
    /// let sq = Square::new(4, 3).unwrap();
    /// assert_eq!(sq.forward_by(Side::Red, 1), Square::new(5, 3).ok());
    /// assert_eq!(sq.forward_by(Side::Black, 1), Square::new(3, 3).ok());
    /// ```
    pub fn forward_by(&self, side: Side, n: i8) -> Option<Self> {
        self.offset(n * side.forward(), 0)
    }

    /// Returns `true` if this [`Square`] lies on `side`'s half of the board.
    ///
    /// Red's half is rows 1-5, Black's is rows 6-10. The river runs between rows 5 and 6.
    pub const fn is_on_home_side(&self, side: Side) -> bool {
        match side {
            Side::Red => self.row() <= 5,
            Side::Black => self.row() >= 6,
        }
    }

    /// Returns `true` if a piece of `side` standing here has crossed the river.
    ///
    /// # Example
    /// ```
    /// # use types::{Square, Side};
    /// let sq = Square::new(6, 1).unwrap();
    /// assert!(sq.has_crossed_river(Side::Red));
    /// assert!(!sq.has_crossed_river(Side::Black));
    /// ```
    pub const fn has_crossed_river(&self, side: Side) -> bool {
        !self.is_on_home_side(side)
    }

    /// Returns `true` if this [`Square`] is inside `side`'s palace.
    ///
    /// The palace is columns 4-6 of rows 1-3 (Red) or rows 8-10 (Black).
    ///
    /// # Example
    /// ```
    /// # use types::{Square, Side};
    /// let sq = Square::new(2, 5).unwrap();
    /// assert!(sq.is_in_palace(Side::Red));
    /// assert!(!sq.is_in_palace(Side::Black));
    /// ```
    pub const fn is_in_palace(&self, side: Side) -> bool {
        let column = self.column();
        let row = self.row();
        let in_rows = match side {
            Side::Red => row <= 3,
            Side::Black => row >= 8,
        };
        in_rows && column >= 4 && column <= 6
    }

    /// A [`Bitboard`] containing only this [`Square`].
    pub const fn bitboard(&self) -> Bitboard {
        Bitboard::from_square(*self)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    /// Parses the `"{row}-{column}"` key form of a [`Square`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, column) = s
            .trim()
            .split_once('-')
            .ok_or(anyhow!("Invalid Square {s:?}: expected \"<row>-<column>\""))?;

        let row = row
            .parse()
            .with_context(|| format!("Invalid row in Square {s:?}"))?;
        let column = column
            .parse()
            .with_context(|| format!("Invalid column in Square {s:?}"))?;

        Self::new(row, column)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row(), self.column())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}
