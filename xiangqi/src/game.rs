use std::ops::Deref;

use anyhow::{bail, Result};
use log::{debug, warn};

use super::{legal_targets, Bitboard, Move, Piece, PieceKind, Position, Side, Square};

/// What the player currently has picked up, if anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    /// Nothing is selected; the next click picks a piece.
    #[default]
    Idle,

    /// A piece of the side to move is selected, along with its legal destinations.
    PieceSelected {
        from: Square,
        piece: Piece,
        targets: Bitboard,
    },
}

impl Selection {
    /// `0` while idle, `1` while a piece is selected.
    pub const fn counter(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::PieceSelected { .. } => 1,
        }
    }

    /// The legal destinations of the selected piece, or an empty set.
    pub const fn targets(&self) -> Bitboard {
        match self {
            Self::Idle => Bitboard::EMPTY_BOARD,
            Self::PieceSelected { targets, .. } => *targets,
        }
    }

    /// The square of the selected piece, if any.
    pub const fn from(&self) -> Option<Square> {
        match self {
            Self::Idle => None,
            Self::PieceSelected { from, .. } => Some(*from),
        }
    }
}

/// The outcome of [`Game::handle_click`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Click {
    /// Nothing happened.
    Ignored,

    /// A piece was (re)selected; `targets` are its legal destinations.
    Selected { from: Square, targets: Bitboard },

    /// The previous selection was dropped. The board is untouched.
    Cancelled,

    /// The selected piece was moved.
    Moved(Move),
}

/// A view of a single square, as a board renderer would draw it.
///
/// Cells are computed on demand from the state of a [`Game`] and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub square: Square,
    pub piece: Option<Piece>,
    /// The selected piece stands here.
    pub selected: bool,
    /// The selected piece may legally move here.
    pub available: bool,
    /// The last move ended here.
    pub just_moved: bool,
    /// The last move started here.
    pub previously_moved: bool,
}

/// A game of Xiangqi as a player interacts with it: the authoritative [`Position`] plus selection,
/// captured pieces, move history and the notification flags a front-end displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    position: Position,
    selection: Selection,
    last_move: Option<Move>,
    captured: Vec<Piece>,
    history: Vec<Move>,
    flipped: bool,
    game_over: bool,
    error: bool,
}

impl Game {
    /// Creates a new [`Game`] starting from `position`.
    pub fn new(position: Position) -> Self {
        let mut game = Self {
            position,
            selection: Selection::Idle,
            last_move: None,
            captured: Vec::with_capacity(32),
            history: Vec::with_capacity(128),
            flipped: false,
            game_over: false,
            error: false,
        };
        game.game_over = game.is_game_over();

        game
    }

    /// Creates a new [`Game`] from the provided FEN string.
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::new(Position::from_fen(fen)?))
    }

    /// The current [`Position`].
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// The current [`Selection`].
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// `0` while nothing is selected, `1` while a piece is selected.
    pub const fn counter(&self) -> u8 {
        self.selection.counter()
    }

    /// Drives the selection state machine with a click on `square`.
    ///
    /// * Clicking a piece of the side to move selects it (or reselects, if something was already selected).
    /// * Clicking one of the selected piece's legal destinations moves it there.
    /// * Clicking anything else while a piece is selected cancels the selection.
    /// * Clicking anything else while idle does nothing.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Game, Click, Side};
    /// let mut game = Game::default();
    /// let cannon = "3-2".parse().unwrap();
    /// assert!(matches!(game.handle_click(cannon), Click::Selected { .. }));
    /// assert_eq!(game.counter(), 1);
    ///
    /// let click = game.handle_click("3-5".parse().unwrap());
    /// assert!(matches!(click, Click::Moved(_)));
    /// assert_eq!(game.counter(), 0);
    /// assert_eq!(game.side_to_move(), Side::Black);
    /// ```
    pub fn handle_click(&mut self, square: Square) -> Click {
        let occupant = self.piece_at(square);

        if let Some(piece) = occupant.filter(|p| p.side() == self.side_to_move()) {
            return self.select(square, piece);
        }

        match self.selection {
            Selection::Idle => Click::Ignored,

            Selection::PieceSelected {
                from,
                piece,
                targets,
            } if targets.get(square) => {
                let mv = Move::new(from, square, piece, occupant);
                self.commit(mv);
                Click::Moved(mv)
            }

            Selection::PieceSelected { from, .. } => {
                debug!("Cancelled selection of {from}");
                self.selection = Selection::Idle;
                Click::Cancelled
            }
        }
    }

    fn select(&mut self, from: Square, piece: Piece) -> Click {
        let targets = legal_targets(self.position.board(), piece, from);
        debug!(
            "Selected {} on {from} with {} legal targets",
            piece.name(),
            targets.population()
        );

        self.selection = Selection::PieceSelected {
            from,
            piece,
            targets,
        };

        Click::Selected { from, targets }
    }

    /// Moves the selected piece to `to`.
    ///
    /// Fails without changing anything if no piece is selected or `to` is not one of its legal destinations.
    /// Returns the captured piece, if any.
    pub fn apply_move(&mut self, to: Square) -> Result<Option<Piece>> {
        let Selection::PieceSelected {
            from,
            piece,
            targets,
        } = self.selection
        else {
            bail!("Illegal move: no piece is selected");
        };

        if !targets.get(to) {
            bail!("Illegal move {from}>{to}: {} cannot move there", piece.name());
        }

        let mv = Move::new(from, to, piece, self.piece_at(to));
        Ok(self.commit(mv))
    }

    /// Moves the piece on `from` to `to`, as if both squares had been clicked in turn.
    ///
    /// Fails without changing anything if the move is not legal for the side to move.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Game, Piece};
    /// let mut game = Game::default();
    /// let mv = game.play("3-2".parse().unwrap(), "10-2".parse().unwrap()).unwrap();
    /// assert_eq!(mv.captured(), Some(Piece::BLACK_KNIGHT));
    /// assert_eq!(game.captured_pieces(), &[Piece::BLACK_KNIGHT]);
    ///
    /// // Black's turn now, so this red cannon cannot move
    /// assert!(game.play("3-8".parse().unwrap(), "3-7".parse().unwrap()).is_err());
    /// ```
    pub fn play(&mut self, from: Square, to: Square) -> Result<Move> {
        let mv = Move::between(&self.position, from, to)?;
        self.position.check_legality_of(mv)?;

        self.commit(mv);
        Ok(mv)
    }

    /// Applies an already-validated move and updates every piece of bookkeeping that depends on it.
    fn commit(&mut self, mv: Move) -> Option<Piece> {
        let captured = self.position.make_move(mv);
        debug!("Applied {}", mv.describe());

        if let Some(piece) = captured {
            self.captured.push(piece);
        }
        self.history.push(mv);
        self.last_move = Some(mv);
        self.selection = Selection::Idle;

        self.game_over = self.is_game_over();
        if self.game_over {
            debug!(
                "{} has no legal moves; {} wins",
                self.side_to_move().name(),
                self.side_to_move().opponent().name()
            );
        }

        captured
    }

    /// Legal destinations of a piece of `kind` and `side` standing on `square`.
    ///
    /// The piece does not need to actually be on `square`; the rest of the board is taken as-is.
    pub fn legal_targets_for(&self, kind: PieceKind, side: Side, square: Square) -> Bitboard {
        legal_targets(self.position.board(), Piece::new(side, kind), square)
    }

    /// Returns `true` if no piece of the side to move has a legal destination.
    ///
    /// This is computed from the board; see [`Game::game_over`] for the (dismissible) flag.
    pub fn is_game_over(&self) -> bool {
        !self.position.has_legal_moves()
    }

    /// The game-over notification flag. Set after a move or load leaves the side to move without legal moves.
    pub const fn game_over(&self) -> bool {
        self.game_over
    }

    /// The side that won, if the side to move has no legal moves.
    pub fn winner(&self) -> Option<Side> {
        self.is_game_over()
            .then(|| self.side_to_move().opponent())
    }

    /// The error notification flag. Set when [`Game::load_position`] rejects its input.
    pub const fn error(&self) -> bool {
        self.error
    }

    /// Clears the error flag if it is set, or else the game-over flag.
    pub fn dismiss_notification(&mut self) {
        if self.error {
            self.error = false;
        } else if self.game_over {
            self.game_over = false;
        }
    }

    /// Replaces the board and side to move with those described by `fen`.
    ///
    /// On failure, the error flag is set and the game is left untouched.
    /// Captured pieces and move history are kept.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::Game;
    /// let mut game = Game::default();
    /// assert!(game.load_position("4k4/9/9").is_err());
    /// assert!(game.error());
    ///
    /// game.load_position("4k4/9/9/9/9/9/9/9/9/4K4 b").unwrap();
    /// assert_eq!(game.current_fen(), "4k4/9/9/9/9/9/9/9/9/4K4 b");
    /// ```
    pub fn load_position(&mut self, fen: &str) -> Result<()> {
        match Position::from_fen(fen) {
            Ok(position) => {
                debug!("Loaded position {position}");
                self.position = position;
                self.selection = Selection::Idle;
                self.last_move = None;
                self.game_over = self.is_game_over();
                Ok(())
            }
            Err(e) => {
                warn!("Rejected position {fen:?}: {e}");
                self.error = true;
                Err(e)
            }
        }
    }

    /// The FEN string of the current position.
    pub fn current_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Every piece captured since the last [`Game::reset`], in order.
    pub fn captured_pieces(&self) -> &[Piece] {
        &self.captured
    }

    /// Every move made since the last [`Game::reset`], in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// The most recent move, unless a position has been loaded since.
    pub const fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Toggles whether [`Game::cells`] lists the board from Black's point of view.
    pub fn flip_board(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Returns `true` if the board is being shown from Black's point of view.
    pub const fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Starts over from the opening position, clearing captured pieces, history and every flag.
    pub fn reset(&mut self) {
        debug!("Resetting game");
        *self = Self::default();
    }

    /// A view of `square`.
    pub fn cell(&self, square: Square) -> Cell {
        Cell {
            square,
            piece: self.piece_at(square),
            selected: self.selection.from() == Some(square),
            available: self.selection.targets().get(square),
            just_moved: self.last_move.is_some_and(|mv| mv.to() == square),
            previously_moved: self.last_move.is_some_and(|mv| mv.from() == square),
        }
    }

    /// Views of every square in display order: row 10 down to row 1, columns 1 to 9.
    ///
    /// When the board is flipped, the order is reversed. The squares themselves are always true coordinates.
    pub fn cells(&self) -> Vec<Cell> {
        let order = (1..=Square::ROWS)
            .rev()
            .flat_map(|row| (1..=Square::COLUMNS).map(move |column| Square::new_unchecked(row, column)));

        let mut cells = order.map(|square| self.cell(square)).collect::<Vec<_>>();
        if self.flipped {
            cells.reverse();
        }

        cells
    }
}

impl Deref for Game {
    type Target = Position;
    fn deref(&self) -> &Self::Target {
        &self.position
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Position::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(key: &str) -> Square {
        key.parse().unwrap()
    }

    #[test]
    fn clicking_empty_square_while_idle_is_ignored() {
        let mut game = Game::default();
        assert_eq!(game.handle_click(sq("5-5")), Click::Ignored);
        assert_eq!(game.handle_click(sq("10-1")), Click::Ignored, "opponent's piece");
        assert_eq!(game.counter(), 0);
    }

    #[test]
    fn reselecting_own_piece_switches_selection() {
        let mut game = Game::default();
        game.handle_click(sq("3-2"));
        let click = game.handle_click(sq("1-2"));
        assert!(matches!(click, Click::Selected { from, .. } if from == sq("1-2")));
        assert_eq!(game.selection().from(), Some(sq("1-2")));
        assert_eq!(game.counter(), 1);
    }

    #[test]
    fn cancelled_selection_resets_counter() {
        let mut game = Game::default();
        game.handle_click(sq("3-2"));
        assert_eq!(game.handle_click(sq("6-6")), Click::Cancelled);
        assert_eq!(game.counter(), 0);
        assert_eq!(game.current_fen(), Position::default().to_fen());
    }

    #[test]
    fn apply_move_without_selection_fails() {
        let mut game = Game::default();
        assert!(game.apply_move(sq("4-2")).is_err());
        game.handle_click(sq("3-2"));
        assert!(game.apply_move(sq("9-2")).is_err(), "beyond the screen");
        assert_eq!(game, {
            let mut expected = Game::default();
            expected.handle_click(sq("3-2"));
            expected
        });
    }

    #[test]
    fn cells_flag_selection_and_last_move() {
        let mut game = Game::default();
        game.handle_click(sq("3-2"));
        assert!(game.cell(sq("3-2")).selected);
        assert!(game.cell(sq("10-2")).available);
        assert!(!game.cell(sq("9-2")).available);

        game.handle_click(sq("3-5"));
        let from = game.cell(sq("3-2"));
        let to = game.cell(sq("3-5"));
        assert!(from.previously_moved && !from.just_moved);
        assert!(to.just_moved && !to.previously_moved);
        assert_eq!(to.piece, Some(Piece::RED_CANNON));
        assert!(game.cells().iter().all(|cell| !cell.available && !cell.selected));
    }

    #[test]
    fn dismiss_clears_error_before_game_over() {
        let mut game = Game::default();
        game.load_position("4k4/9/9/9/9/9/9/9/9/R8 w").unwrap();
        assert!(game.game_over());
        assert!(game.load_position("nonsense").is_err());

        game.dismiss_notification();
        assert!(!game.error());
        assert!(game.game_over());

        game.dismiss_notification();
        assert!(!game.game_over());
        assert_eq!(game.winner(), Some(Side::Black), "still decided by the board");
    }
}
