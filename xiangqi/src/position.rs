use std::{
    fmt,
    ops::{Deref, Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

use super::{
    legal_targets, Bitboard, Move, Piece, PieceKind, PieceMoves, Side, Square, FEN_RANKS,
    FEN_RANK_CHARS, FEN_STARTPOS,
};

/// Checks that `fen` is a well-formed board description, without decoding it.
///
/// The rules are purely structural:
/// * The text must be non-empty once trimmed.
/// * There must be exactly 10 `/`-separated ranks.
/// * Anything after the first whitespace of the last rank (the turn marker) is ignored.
/// * Every rank, once the digits `2`-`9` are expanded into runs of `1`, must be exactly
///   9 characters long and only contain `krncabp`, `KRNCABP` or `1`.
///
/// Piece counts, the presence of generals and whether a side is already lost are *not* checked.
///
/// # Example
/// ```
/// # use xiangqi::{validate_fen, FEN_STARTPOS};
/// assert!(validate_fen(FEN_STARTPOS).is_ok());
/// assert!(validate_fen("rnbakabnr/9/1c5c1").is_err());
/// assert!(validate_fen("rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNRR w").is_err());
/// ```
pub fn validate_fen(fen: &str) -> Result<()> {
    let fen = fen.trim();
    if fen.is_empty() {
        bail!("Invalid FEN string: FEN string must not be empty.");
    }

    let ranks = placement_ranks(fen)?;
    for (i, rank) in ranks.iter().enumerate() {
        let expanded = expand_rank(rank)?;
        let len = expanded.chars().count();
        if len != Square::COLUMNS as usize {
            bail!(
                "Invalid FEN string: rank {} ({rank:?}) describes {len} squares instead of 9.",
                i + 1
            );
        }
    }

    Ok(())
}

/// Returns `true` if [`validate_fen`] accepts `fen`.
pub fn is_valid_fen(fen: &str) -> bool {
    validate_fen(fen).is_ok()
}

/// Splits a trimmed FEN string into its 10 ranks, with the turn marker removed from the last one.
fn placement_ranks(fen: &str) -> Result<Vec<&str>> {
    let mut ranks = fen.split('/').collect::<Vec<_>>();
    if ranks.len() != FEN_RANKS {
        bail!(
            "Invalid FEN string: expected {FEN_RANKS} ranks separated by '/'. Got {}.",
            ranks.len()
        );
    }

    if let Some(last) = ranks.last_mut() {
        *last = last.split_whitespace().next().unwrap_or_default();
    }

    Ok(ranks)
}

/// Expands every digit `2`-`9` in `rank` to that many `1`s, rejecting any character that isn't a piece or a digit.
fn expand_rank(rank: &str) -> Result<String> {
    let mut expanded = String::with_capacity(Square::COLUMNS as usize);

    for c in rank.chars() {
        match c {
            '2'..='9' => {
                let run = c.to_digit(10).unwrap_or_default() as usize;
                expanded.extend(std::iter::repeat('1').take(run));
            }
            _ if FEN_RANK_CHARS.contains(c) => expanded.push(c),
            _ => bail!("Invalid FEN string: found illegal character {c:?} in rank {rank:?}."),
        }
    }

    Ok(expanded)
}

/// Reads the turn marker out of a FEN string: `b` is Black, anything else (or nothing at all) is Red.
fn turn_marker(fen: &str) -> Side {
    let marker = fen
        .trim()
        .rsplit('/')
        .next()
        .and_then(|last| last.split_whitespace().nth(1));

    if marker == Some("b") {
        Side::Black
    } else {
        Side::Red
    }
}

/// Represents the state of a game of Xiangqi: where every piece stands, and whose turn it is.
///
/// Analogous to a FEN string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Bitboard representation of the game board.
    board: Board,

    /// The [`Side`] of the current player.
    side_to_move: Side,
}

impl Position {
    /// Creates a new, empty [`Position`] with Red to move.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::Position;
    /// let position = Position::new();
    /// assert_eq!(position.to_fen(), "9/9/9/9/9/9/9/9/9/9 w");
    /// ```
    pub const fn new() -> Self {
        Self {
            board: Board::new(),
            side_to_move: Side::Red,
        }
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// The string is validated with [`validate_fen`] first, so a malformed string never produces a partial board.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Position, Side};
    /// let position = Position::from_fen("4k4/9/9/9/9/9/9/9/9/4K4 b").unwrap();
    /// assert_eq!(position.side_to_move(), Side::Black);
    /// assert!(Position::from_fen("4k4/9/9").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        validate_fen(fen)?;

        Ok(Self {
            board: Board::from_fen(fen)?,
            side_to_move: turn_marker(fen),
        })
    }

    /// Consumes `self` and returns a [`Position`] after having applied the provided [`Move`].
    pub fn with_move_made(mut self, mv: Move) -> Self {
        self.make_move(mv);
        self
    }

    /// Generates a FEN string from this [`Position`]: the placements followed by `w` or `b`.
    pub fn to_fen(&self) -> String {
        format!("{} {}", self.board().to_fen(), self.side_to_move().to_fen())
    }

    /// The [`Side`] whose turn it is.
    pub const fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Hands the turn to the other side.
    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Fetches this position's [`Board`].
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Fetches a mutable reference to this position's [`Board`].
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Legal destinations of the piece on `from`, regardless of whose turn it is.
    ///
    /// Empty if `from` is empty.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Position, Square};
    /// let position = Position::default();
    /// let cannon = "3-2".parse::<Square>().unwrap();
    /// assert_eq!(position.legal_targets(cannon).population(), 12);
    /// ```
    pub fn legal_targets(&self, from: Square) -> Bitboard {
        self.piece_at(from)
            .map(|piece| legal_targets(self.board(), piece, from))
            .unwrap_or_default()
    }

    /// All legal [`Move`]s of the piece on `from`.
    pub fn legal_moves_from(&self, from: Square) -> PieceMoves {
        let Some(piece) = self.piece_at(from) else {
            return PieceMoves::new();
        };

        legal_targets(self.board(), piece, from)
            .into_iter()
            .map(|to| Move::new(from, to, piece, self.piece_at(to)))
            .collect()
    }

    /// All legal [`Move`]s available to the side to move, grouped by origin square.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.side(self.side_to_move())
            .into_iter()
            .flat_map(|from| self.legal_moves_from(from))
            .collect()
    }

    /// Returns `true` if the side to move has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        self.side(self.side_to_move())
            .into_iter()
            .any(|from| self.legal_targets(from).is_nonempty())
    }

    /// Checks if the provided move is legal to perform.
    ///
    /// If `Ok()`, the move is legal.
    /// If `Err(msg)`, then `msg` will be a reason as to why it's not legal.
    pub fn check_legality_of(&self, mv: Move) -> Result<()> {
        let (from, to) = (mv.from(), mv.to());

        let Some(piece) = self.piece_at(from) else {
            bail!("Illegal move {mv}: no piece on {from} to move");
        };

        if piece.side() != self.side_to_move() {
            bail!("Illegal move {mv}: tried to move a piece that wasn't yours");
        }

        if piece != mv.piece() {
            bail!("Illegal move {mv}: expected {} on {from}, found {}", mv.piece().name(), piece.name());
        }

        if self.side_at(to) == Some(piece.side()) {
            bail!("Illegal move {mv}: tried to capture your own piece");
        }

        if !self.legal_targets(from).get(to) {
            bail!("Illegal move {mv}: {} cannot reach {to}", piece.name());
        }

        Ok(())
    }

    /// Applies the move, if it is legal to make. If it is not legal, returns an `Err` explaining why.
    pub fn make_move_checked(&mut self, mv: Move) -> Result<()> {
        self.check_legality_of(mv)?;
        self.make_move(mv);
        Ok(())
    }

    /// Applies the move and hands the turn over. No enforcement of legality.
    ///
    /// Returns the captured piece, if any.
    pub fn make_move(&mut self, mv: Move) -> Option<Piece> {
        // Exit early if there is nothing to move
        let piece = self.board_mut().take(mv.from())?;

        let captured = self.board_mut().take(mv.to());
        self.board_mut().place(piece, mv.to());
        self.toggle_side_to_move();

        captured
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Deref for Position {
    type Target = Board;
    fn deref(&self) -> &Self::Target {
        self.board()
    }
}

impl Default for Position {
    fn default() -> Self {
        // Safe unwrap because the FEN for startpos is always valid
        Self::from_fen(FEN_STARTPOS).unwrap()
    }
}

impl fmt::Display for Position {
    /// Display this position's FEN string
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board_str = String::with_capacity(512);
        for row in (1..=Square::ROWS).rev() {
            board_str += &format!("{row:>2}|");
            for column in 1..=Square::COLUMNS {
                let piece = self.piece_at(Square::new_unchecked(row, column));
                let piece_char = piece.map(|p| p.char()).unwrap_or('.');
                board_str += &format!(" {piece_char}");
            }

            if row == 8 {
                board_str += &format!("      FEN: {}", self.to_fen());
            } else if row == 7 {
                board_str += &format!("     Side: {}", self.side_to_move().name());
            }
            board_str += "\n";
        }
        board_str += "  +";
        board_str += &"--".repeat(Square::COLUMNS as usize);
        board_str += "\n    ";
        for column in 1..=Square::COLUMNS {
            board_str += &format!("{column} ");
        }

        write!(f, "{board_str}")
    }
}

/// Represents all pieces and their locations on a Xiangqi board.
///
/// Has no knowledge of whose turn it is. If you need that, see [`Position`].
///
/// Internally uses a collection of [`Bitboard`]s to keep track of piece/side locations.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// All squares occupied by a specific side
    sides: [Bitboard; Side::COUNT],

    /// All squares occupied by a specific piece kind
    pieces: [Bitboard; PieceKind::COUNT],
}

impl Board {
    /// Creates a new, empty [`Board`] containing no pieces.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::Board;
    /// let board = Board::new();
    /// assert_eq!(board.to_fen(), "9/9/9/9/9/9/9/9/9/9");
    /// ```
    pub const fn new() -> Self {
        Self {
            sides: [Bitboard::EMPTY_BOARD; Side::COUNT],
            pieces: [Bitboard::EMPTY_BOARD; PieceKind::COUNT],
        }
    }

    /// Constructs a [`Board`] from the placements of the provided FEN string, ignoring the turn marker.
    ///
    /// The first rank of the string is row 10 and the last is row 1.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut board = Self::new();

        for (i, rank) in placement_ranks(fen.trim())?.into_iter().enumerate() {
            let row = (FEN_RANKS - i) as u8;
            let expanded = expand_rank(rank)?;
            if expanded.chars().count() != Square::COLUMNS as usize {
                bail!("Invalid FEN string: rank {rank:?} does not describe 9 squares.");
            }

            for (column, c) in (1..=Square::COLUMNS).zip(expanded.chars()) {
                if c == '1' {
                    continue;
                }
                let piece = Piece::from_fen(c)?;
                board.place(piece, Square::new(row, column)?);
            }
        }

        Ok(board)
    }

    /// Places the provided [`Piece`] on the supplied [`Square`].
    ///
    /// The square is assumed to be empty.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Board, Piece, Square};
    /// let mut board = Board::new();
    /// board.place(Piece::RED_CANNON, "3-2".parse::<Square>().unwrap());
    /// assert_eq!(board.to_fen(), "9/9/9/9/9/9/9/1C7/9/9");
    /// ```
    pub fn place(&mut self, piece: Piece, square: Square) {
        self[piece.side()].set(square);
        self[piece.kind()].set(square);
    }

    /// Clears the supplied [`Square`] of any pieces.
    pub fn clear(&mut self, square: Square) {
        if let Some(piece) = self.piece_at(square) {
            self[piece.side()].clear(square);
            self[piece.kind()].clear(square);
        }
    }

    /// Takes the [`Piece`] from a given [`Square`], if there is one present.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Board, Piece, Square};
    /// let mut board = Board::default();
    /// let taken = board.take("1-5".parse::<Square>().unwrap());
    /// assert_eq!(taken, Some(Piece::RED_KING));
    /// assert_eq!(board.to_fen(), "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBA1ABNR");
    /// ```
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.piece_at(square)?;
        self.clear(square);

        Some(piece)
    }

    /// Fetches the [`Side`] of the piece at the provided [`Square`], if there is one.
    pub const fn side_at(&self, square: Square) -> Option<Side> {
        let mut i = 0;
        while i < Side::COUNT {
            if self.sides[i].get(square) {
                return Some(Side::from_bits_unchecked(i as u8));
            }
            i += 1;
        }

        None
    }

    /// Fetches the [`PieceKind`] of the piece at the provided [`Square`], if there is one.
    pub const fn kind_at(&self, square: Square) -> Option<PieceKind> {
        let mut i = 0;
        while i < PieceKind::COUNT {
            if self.pieces[i].get(square) {
                return Some(PieceKind::from_bits_unchecked(i as u8));
            }
            i += 1;
        }

        None
    }

    /// Fetches the [`Piece`] at the provided [`Square`], if there is one.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Board, Piece, Square};
    /// let board = Board::default();
    /// assert_eq!(board.piece_at("10-2".parse::<Square>().unwrap()), Some(Piece::BLACK_KNIGHT));
    /// assert!(board.piece_at("5-5".parse::<Square>().unwrap()).is_none());
    /// ```
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let kind = self.kind_at(square)?;
        let side = self.side_at(square)?;
        Some(Piece::new(side, kind))
    }

    /// Fetches the [`Bitboard`] of every piece of the supplied [`PieceKind`].
    pub const fn kind(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()]
    }

    /// Fetches the [`Bitboard`] of every piece of the supplied [`Side`].
    pub const fn side(&self, side: Side) -> Bitboard {
        self.sides[side.index()]
    }

    /// Fetches a [`Bitboard`] of all occupied squares on the board.
    pub const fn occupied(&self) -> Bitboard {
        self.side(Side::Red).or(self.side(Side::Black))
    }

    /// Fetches the [`Bitboard`] of every occurrence of the supplied [`Piece`].
    pub const fn piece(&self, piece: Piece) -> Bitboard {
        self.piece_parts(piece.side(), piece.kind())
    }

    /// Analogous to [`Board::piece`] with a [`Piece`]'s individual components.
    pub const fn piece_parts(&self, side: Side, kind: PieceKind) -> Bitboard {
        self.side(side).and(self.kind(kind))
    }

    /// Fetches the [`Bitboard`] of the general(s) of the provided side.
    ///
    /// Positions decoded from FEN may hold zero or several generals per side.
    pub const fn king(&self, side: Side) -> Bitboard {
        self.piece_parts(side, PieceKind::King)
    }

    /// Creates a [`BoardIter`] to iterate over all occupied [`Square`]s in this [`Board`].
    pub const fn iter(&self) -> BoardIter<'_> {
        BoardIter {
            board: self,
            occupancy: self.occupied(),
        }
    }

    /// Returns an iterator over all of the pieces of `side` on this board along with their locations.
    pub const fn all_for(&self, side: Side) -> BoardIter<'_> {
        BoardIter {
            board: self,
            occupancy: self.side(side),
        }
    }

    /// Generates the placement field of a FEN string of this [`Board`], row 10 first.
    pub fn to_fen(&self) -> String {
        let mut placements: [String; FEN_RANKS] = Default::default();

        for (i, row) in (1..=Square::ROWS).rev().enumerate() {
            let mut empty_spaces = 0;
            for column in 1..=Square::COLUMNS {
                if let Some(piece) = self.piece_at(Square::new_unchecked(row, column)) {
                    if empty_spaces != 0 {
                        placements[i] += &empty_spaces.to_string();
                        empty_spaces = 0;
                    }
                    placements[i] += piece.as_ref();
                } else {
                    empty_spaces += 1;
                }
            }

            if empty_spaces != 0 {
                placements[i] += &empty_spaces.to_string();
            }
        }

        placements.join("/")
    }
}

impl Default for Board {
    fn default() -> Self {
        // Safe unwrap because the FEN for startpos is always valid
        Self::from_fen(FEN_STARTPOS).unwrap()
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board = String::with_capacity(256);

        for row in (1..=Square::ROWS).rev() {
            board += &format!("{row:>2}| ");

            for column in 1..=Square::COLUMNS {
                let occupant = self
                    .piece_at(Square::new_unchecked(row, column))
                    .map(|piece| piece.char())
                    .unwrap_or('.');

                board += &format!("{occupant} ");
            }

            board += "\n";
        }
        board += "  +";
        board += &"--".repeat(Square::COLUMNS as usize);
        board += "\n    ";
        for column in 1..=Square::COLUMNS {
            board += &format!("{column} ");
        }

        write!(f, "{board}")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Index<PieceKind> for Board {
    type Output = Bitboard;
    fn index(&self, index: PieceKind) -> &Self::Output {
        &self.pieces[index]
    }
}

impl IndexMut<PieceKind> for Board {
    fn index_mut(&mut self, index: PieceKind) -> &mut Self::Output {
        &mut self.pieces[index]
    }
}

impl Index<Side> for Board {
    type Output = Bitboard;
    fn index(&self, index: Side) -> &Self::Output {
        &self.sides[index]
    }
}

impl IndexMut<Side> for Board {
    fn index_mut(&mut self, index: Side) -> &mut Self::Output {
        &mut self.sides[index]
    }
}

impl<'a> IntoIterator for &'a Board {
    type IntoIter = BoardIter<'a>;
    type Item = <BoardIter<'a> as Iterator>::Item;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over a set of squares on a [`Board`].
///
/// Calls to [`Iterator::next`] will yield a tuple of a [`Square`] and a [`Piece`].
pub struct BoardIter<'a> {
    /// The board to retrieve pieces from.
    board: &'a Board,

    /// The list of squares to iterate over.
    occupancy: Bitboard,
}

impl<'a> Iterator for BoardIter<'a> {
    type Item = (Square, Piece);

    fn next(&mut self) -> Option<Self::Item> {
        let lsb = self.occupancy.pop_lsb()?;
        let piece = self.board.piece_at(lsb)?;
        Some((lsb, piece))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.occupancy.population() as usize;
        (size, Some(size))
    }
}

impl<'a> ExactSizeIterator for BoardIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_round_trips() {
        let position = Position::default();
        assert_eq!(position.to_fen(), FEN_STARTPOS);
        assert_eq!(position.occupied().population(), 32);
        assert_eq!(position.side_to_move(), Side::Red);
    }

    #[test]
    fn rank_index_maps_to_row() {
        let position = Position::from_fen("r8/9/9/9/9/9/9/9/9/8R w").unwrap();
        assert_eq!(
            position.piece_at(Square::new(10, 1).unwrap()),
            Some(Piece::BLACK_ROOK)
        );
        assert_eq!(
            position.piece_at(Square::new(1, 9).unwrap()),
            Some(Piece::RED_ROOK)
        );
    }

    #[test]
    fn turn_marker_defaults_to_red() {
        let placements = "4k4/9/9/9/9/9/9/9/9/4K4";
        assert_eq!(turn_marker(placements), Side::Red);
        assert_eq!(turn_marker(&format!("{placements} w")), Side::Red);
        assert_eq!(turn_marker(&format!("{placements} x")), Side::Red);
        assert_eq!(turn_marker(&format!("{placements} b")), Side::Black);
    }

    #[test]
    fn turn_marker_tolerates_extra_whitespace() {
        let placements = "4k4/9/9/9/9/9/9/9/9/4K4";
        assert_eq!(turn_marker(&format!("{placements}  b")), Side::Black);
        assert_eq!(turn_marker(&format!("{placements}\tb")), Side::Black);

        let position = Position::from_fen(&format!("{placements}  b")).unwrap();
        assert_eq!(position.side_to_move(), Side::Black);
        assert_eq!(position.to_fen(), format!("{placements} b"));

        assert!(is_valid_fen(&format!("{placements}\tb")));
    }

    #[test]
    fn make_move_returns_capture_and_flips_turn() {
        let mut position = Position::default();
        let from = Square::new(3, 2).unwrap();
        let to = Square::new(10, 2).unwrap();
        let mv = Move::new(from, to, Piece::RED_CANNON, Some(Piece::BLACK_KNIGHT));

        assert!(position.check_legality_of(mv).is_ok());
        assert_eq!(position.make_move(mv), Some(Piece::BLACK_KNIGHT));
        assert_eq!(position.side_to_move(), Side::Black);
        assert_eq!(position.piece_at(to), Some(Piece::RED_CANNON));
        assert!(position.piece_at(from).is_none());
    }

    #[test]
    fn checked_moves_reject_wrong_side() {
        let mut position = Position::default();
        let from = Square::new(8, 2).unwrap();
        let to = Square::new(8, 5).unwrap();
        let mv = Move::new(from, to, Piece::BLACK_CANNON, None);

        assert!(position.make_move_checked(mv).is_err());
        assert_eq!(position, Position::default(), "position must be untouched");
    }
}
