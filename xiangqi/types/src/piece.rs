use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
    str::FromStr,
};

use anyhow::{bail, Result};

/// Represents the side of a player or piece on a Xiangqi board.
///
/// Red traditionally moves first, and therefore [`Side`] defaults to [`Side::Red`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Side {
    #[default]
    Red,
    Black,
}

impl Side {
    /// Number of side variants.
    pub const COUNT: usize = 2;

    /// An array of both sides, starting with Red.
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::Red, Self::Black]
    }

    /// An iterator over both sides, starting with Red.
    pub fn iter() -> impl Iterator<Item = Self> {
        Self::all().into_iter()
    }

    /// Creates a new [`Side`] from a set of bits, ignoring safety checks.
    ///
    /// # Panics
    /// If `bits` is greater than `1` and debug assertions are enabled.
    pub const fn from_bits_unchecked(bits: u8) -> Self {
        debug_assert!(bits <= 1, "Invalid bits for Side: Bits must be between [0,1]");

        match bits {
            0 => Self::Red,
            _ => Self::Black,
        }
    }

    /// Creates a new [`Side`] from a `bool`, where `false = Red`.
    pub const fn from_bool(side: bool) -> Self {
        Self::from_bits_unchecked(side as u8)
    }

    /// The row delta of one step "forward" for this side.
    ///
    /// Red starts on rows 1-3 and advances upwards; Black starts on rows 8-10 and advances downwards.
    ///
    /// # Example
    /// ```
    /// # use types::Side;
    /// assert_eq!(Side::Red.forward(), 1);
    /// assert_eq!(Side::Black.forward(), -1);
    /// ```
    pub const fn forward(&self) -> i8 {
        match self {
            Self::Red => 1,
            Self::Black => -1,
        }
    }

    /// Returns this [`Side`]'s opponent.
    ///
    /// # Example
    /// ```
    /// # use types::Side;
    /// assert_eq!(Side::Red.opponent(), Side::Black);
    /// assert_eq!(Side::Black.opponent(), Side::Red);
    /// ```
    pub const fn opponent(&self) -> Self {
        Self::from_bits_unchecked(self.bits() ^ 1)
    }

    /// Returns this [`Side`] as a `usize`, for indexing into lists.
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Returns this [`Side`] as a `u8`.
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Creates a [`Side`] from the turn marker of a FEN string.
    ///
    /// `w` stands for Red (the side that moves first), `b` for Black.
    ///
    /// # Example
    /// ```
    /// # use types::Side;
    /// assert_eq!(Side::from_fen('w').unwrap(), Side::Red);
    /// assert_eq!(Side::from_fen('b').unwrap(), Side::Black);
    /// assert!(Side::from_fen('x').is_err());
    /// ```
    pub fn from_fen(side: char) -> Result<Self> {
        match side {
            'w' | 'W' | 'r' | 'R' => Ok(Self::Red),
            'b' | 'B' => Ok(Self::Black),
            _ => bail!("Side must be either 'w' or 'b' (case-insensitive). Found {side}"),
        }
    }

    /// Creates a [`Side`] based on the ASCII case of the provided character, with uppercase being Red and lowercase being Black.
    ///
    /// # Example
    /// ```
    /// # use types::Side;
    /// assert_eq!(Side::from_case('k'), Side::Black);
    /// assert_eq!(Side::from_case('C'), Side::Red);
    /// ```
    pub const fn from_case(c: char) -> Self {
        Self::from_bool(c.is_ascii_lowercase())
    }

    /// Converts this [`Side`] to its FEN turn marker.
    pub const fn to_fen(&self) -> char {
        match self {
            Self::Red => 'w',
            Self::Black => 'b',
        }
    }

    /// Converts this [`Side`] to a `str` holding its FEN turn marker.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "w",
            Self::Black => "b",
        }
    }

    /// Fetches a human-readable name for this [`Side`].
    ///
    /// # Example
    /// ```
    /// # use types::Side;
    /// assert_eq!(Side::Black.name(), "black");
    /// ```
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Black => "black",
        }
    }
}

impl Neg for Side {
    type Output = Self;
    /// Negating [`Side::Red`] yields [`Side::Black`] and vice versa.
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

/// Represents the kind of a Xiangqi piece.
///
/// English names follow the FEN letters: the General is `King` (`k`), the Elephant is `Bishop` (`b`),
/// the Horse is `Knight` (`n`) and the Chariot is `Rook` (`r`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    King,
    Advisor,
    Bishop,
    Knight,
    Rook,
    Cannon,
    Pawn,
}

impl PieceKind {
    /// Number of piece variants.
    pub const COUNT: usize = 7;

    /// An array of all 7 [`PieceKind`]s.
    pub const fn all() -> [Self; Self::COUNT] {
        use PieceKind::*;
        [King, Advisor, Bishop, Knight, Rook, Cannon, Pawn]
    }

    /// An iterator over all [`PieceKind`]s, starting with King.
    pub fn iter() -> impl Iterator<Item = Self> {
        Self::all().into_iter()
    }

    /// Creates a new [`PieceKind`] from a set of bits, ignoring safety checks.
    ///
    /// # Panics
    /// If `bits` is greater than `6` when debug assertions are enabled.
    pub const fn from_bits_unchecked(bits: u8) -> Self {
        debug_assert!(
            bits <= 6,
            "Invalid bits for PieceKind: Bits must be between [0,6]"
        );

        match bits {
            0 => Self::King,
            1 => Self::Advisor,
            2 => Self::Bishop,
            3 => Self::Knight,
            4 => Self::Rook,
            5 => Self::Cannon,
            _ => Self::Pawn,
        }
    }

    /// Fetches the internal bit value of this [`PieceKind`].
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Returns this [`PieceKind`] as a `usize`, for indexing into lists.
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Creates a new [`PieceKind`] from a FEN character (case-insensitive).
    ///
    /// # Example
    /// ```
    /// # use types::PieceKind;
    /// assert_eq!(PieceKind::from_fen('C').unwrap(), PieceKind::Cannon);
    /// assert_eq!(PieceKind::from_fen('n').unwrap(), PieceKind::Knight);
    /// assert!(PieceKind::from_fen('q').is_err());
    /// ```
    pub fn from_fen(kind: char) -> Result<Self> {
        match kind {
            'K' | 'k' => Ok(Self::King),
            'A' | 'a' => Ok(Self::Advisor),
            'B' | 'b' => Ok(Self::Bishop),
            'N' | 'n' => Ok(Self::Knight),
            'R' | 'r' => Ok(Self::Rook),
            'C' | 'c' => Ok(Self::Cannon),
            'P' | 'p' => Ok(Self::Pawn),
            _ => bail!("Invalid char for PieceKind: Got {kind:?}."),
        }
    }

    /// Fetches a human-readable name for this [`PieceKind`].
    pub const fn name(&self) -> &'static str {
        match self {
            Self::King => "king",
            Self::Advisor => "advisor",
            Self::Bishop => "bishop",
            Self::Knight => "knight",
            Self::Rook => "rook",
            Self::Cannon => "cannon",
            Self::Pawn => "pawn",
        }
    }

    /// Converts this [`PieceKind`] to its (lowercase) FEN character.
    pub const fn to_fen(&self) -> char {
        match self {
            Self::King => 'k',
            Self::Advisor => 'a',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Rook => 'r',
            Self::Cannon => 'c',
            Self::Pawn => 'p',
        }
    }

    /// Alias for [`PieceKind::to_fen`].
    pub const fn char(&self) -> char {
        self.to_fen()
    }

    /// Converts this [`PieceKind`] to a `str` holding its (lowercase) FEN character.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::King => "k",
            Self::Advisor => "a",
            Self::Bishop => "b",
            Self::Knight => "n",
            Self::Rook => "r",
            Self::Cannon => "c",
            Self::Pawn => "p",
        }
    }
}

/// Represents a Xiangqi piece on the game board.
///
/// Internally, this is represented as a `u8` with the following bit pattern:
///
/// ```text
///     0000 0 000
///      |   |  |
///      |   |  +- Represents the PieceKind.
///      |   +- Represents the Side. `0` for Red, `1` for Black.
///      +- Unused.
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Piece(u8);

impl Piece {
    pub const RED_KING: Self = Self::new(Side::Red, PieceKind::King);
    pub const RED_ADVISOR: Self = Self::new(Side::Red, PieceKind::Advisor);
    pub const RED_BISHOP: Self = Self::new(Side::Red, PieceKind::Bishop);
    pub const RED_KNIGHT: Self = Self::new(Side::Red, PieceKind::Knight);
    pub const RED_ROOK: Self = Self::new(Side::Red, PieceKind::Rook);
    pub const RED_CANNON: Self = Self::new(Side::Red, PieceKind::Cannon);
    pub const RED_PAWN: Self = Self::new(Side::Red, PieceKind::Pawn);

    pub const BLACK_KING: Self = Self::new(Side::Black, PieceKind::King);
    pub const BLACK_ADVISOR: Self = Self::new(Side::Black, PieceKind::Advisor);
    pub const BLACK_BISHOP: Self = Self::new(Side::Black, PieceKind::Bishop);
    pub const BLACK_KNIGHT: Self = Self::new(Side::Black, PieceKind::Knight);
    pub const BLACK_ROOK: Self = Self::new(Side::Black, PieceKind::Rook);
    pub const BLACK_CANNON: Self = Self::new(Side::Black, PieceKind::Cannon);
    pub const BLACK_PAWN: Self = Self::new(Side::Black, PieceKind::Pawn);

    /// Number of unique piece variants.
    pub const COUNT: usize = Side::COUNT * PieceKind::COUNT;

    /// Mask for the side bit.
    const SIDE_MASK: u8 = 0b0000_1000;
    /// Start index of the side bit.
    const SIDE_BITS: u8 = 3;

    /// Creates a new [`Piece`] from the given [`Side`] and [`PieceKind`].
    ///
    /// # Example
    /// ```
    /// # use types::{Piece, Side, PieceKind};
    /// let red_cannon = Piece::new(Side::Red, PieceKind::Cannon);
    /// assert_eq!(red_cannon.to_string(), "C");
    /// ```
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self(side.bits() << Self::SIDE_BITS | kind.bits())
    }

    /// Fetches the [`Side`] of this [`Piece`].
    pub const fn side(&self) -> Side {
        Side::from_bits_unchecked(self.0 >> Self::SIDE_BITS)
    }

    /// Returns `true` if this [`Piece`] belongs to Red.
    pub const fn is_red(&self) -> bool {
        self.0 >> Self::SIDE_BITS == 0
    }

    /// Fetches the [`PieceKind`] of this [`Piece`].
    pub const fn kind(&self) -> PieceKind {
        // Clear the side bit
        PieceKind::from_bits_unchecked(self.0 & !Self::SIDE_MASK)
    }

    /// Fetches the [`Side`] and [`PieceKind`] of this [`Piece`].
    pub const fn parts(&self) -> (Side, PieceKind) {
        (self.side(), self.kind())
    }

    /// Returns the index value of this [`Piece`], as a `usize`.
    ///
    /// Useful for indexing into lists of size 14.
    pub const fn index(&self) -> usize {
        self.side().index() * PieceKind::COUNT + self.kind().index()
    }

    /// Creates a new [`Piece`] from a FEN character: uppercase is Red, lowercase is Black.
    ///
    /// # Example
    /// ```
    /// # use types::{Piece, Side, PieceKind};
    /// let black_horse = Piece::from_fen('n').unwrap();
    /// assert_eq!(black_horse.parts(), (Side::Black, PieceKind::Knight));
    /// assert!(Piece::from_fen('1').is_err());
    /// ```
    pub fn from_fen(piece: char) -> Result<Self> {
        let kind = PieceKind::from_fen(piece)?;
        let side = Side::from_case(piece);
        Ok(Self::new(side, kind))
    }

    /// Converts this [`Piece`] into its FEN character.
    ///
    /// # Example
    /// ```
    /// # use types::Piece;
    /// assert_eq!(Piece::RED_ROOK.to_fen(), 'R');
    /// assert_eq!(Piece::BLACK_ADVISOR.to_fen(), 'a');
    /// ```
    pub const fn to_fen(&self) -> char {
        if self.is_red() {
            self.kind().char().to_ascii_uppercase()
        } else {
            self.kind().char()
        }
    }

    /// Alias for [`Piece::to_fen`].
    pub const fn char(&self) -> char {
        self.to_fen()
    }

    /// Converts this [`Piece`] to a `str` holding its FEN character.
    pub const fn as_str(&self) -> &'static str {
        match self.side() {
            Side::Red => match self.kind() {
                PieceKind::King => "K",
                PieceKind::Advisor => "A",
                PieceKind::Bishop => "B",
                PieceKind::Knight => "N",
                PieceKind::Rook => "R",
                PieceKind::Cannon => "C",
                PieceKind::Pawn => "P",
            },
            Side::Black => match self.kind() {
                PieceKind::King => "k",
                PieceKind::Advisor => "a",
                PieceKind::Bishop => "b",
                PieceKind::Knight => "n",
                PieceKind::Rook => "r",
                PieceKind::Cannon => "c",
                PieceKind::Pawn => "p",
            },
        }
    }

    /// Human-readable name, such as `"red cannon"`.
    pub fn name(&self) -> String {
        format!("{} {}", self.side().name(), self.kind().name())
    }
}

macro_rules! impl_common_traits {
    ($type:ty) => {
        impl<T> Index<$type> for [T; <$type>::COUNT] {
            type Output = T;
            fn index(&self, index: $type) -> &Self::Output {
                &self[index.index()]
            }
        }

        impl<T> IndexMut<$type> for [T; <$type>::COUNT] {
            fn index_mut(&mut self, index: $type) -> &mut Self::Output {
                &mut self[index.index()]
            }
        }

        impl FromStr for $type {
            type Err = anyhow::Error;
            /// Does the same as [`Self::from_fen`], but only if `s` is one character in length.
            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::from_fen(c),
                    _ => bail!(
                        "Invalid str for {}: Must be a str of len 1. Got {s:?}",
                        stringify!($type)
                    ),
                }
            }
        }

        impl AsRef<str> for $type {
            /// Alias for [`Self::as_str`].
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_fen())
            }
        }

        impl fmt::Debug for $type {
            /// Debug formatting displays a value as its FEN char and index value.
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "\"{self}\" ({})", self.index())
            }
        }
    };
}

impl_common_traits!(Piece);
impl_common_traits!(PieceKind);
impl_common_traits!(Side);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_bits_round_trip_every_variant() {
        for side in Side::iter() {
            for kind in PieceKind::iter() {
                let piece = Piece::new(side, kind);
                assert_eq!(piece.parts(), (side, kind));
                assert_eq!(Piece::from_fen(piece.to_fen()).unwrap(), piece);
                assert_eq!(piece.as_str(), piece.to_string());
            }
        }
    }

    #[test]
    fn piece_indices_are_unique() {
        let mut seen = [false; Piece::COUNT];
        for side in Side::iter() {
            for kind in PieceKind::iter() {
                let index = Piece::new(side, kind).index();
                assert!(!seen[index], "duplicate index {index}");
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn side_parsing_and_names() {
        assert_eq!("b".parse::<Side>().unwrap(), Side::Black);
        assert!("wb".parse::<Side>().is_err());
        assert_eq!(-Side::Red, Side::Black);
        assert_eq!(Piece::BLACK_CANNON.name(), "black cannon");
    }
}
