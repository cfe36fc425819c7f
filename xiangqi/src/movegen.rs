use super::{
    Bitboard, Board, Move, Piece, PieceKind, Side, Square, DIAGONAL_DELTAS, KNIGHT_DELTAS,
    MAX_PIECE_MOVES, ORTHOGONAL_DELTAS,
};

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_PIECE_MOVES`] moves: every move of a single piece.
pub type PieceMoves = arrayvec::ArrayVec<Move, MAX_PIECE_MOVES>;

/// Every square reached by repeatedly stepping `delta` away from `from`, stopping at the edge of the board.
///
/// `from` itself is not included.
fn ray(from: Square, (dr, dc): (i8, i8)) -> impl Iterator<Item = Square> {
    std::iter::successors(from.offset(dr, dc), move |sq| sq.offset(dr, dc))
}

/// Pseudo-legal destinations of a Pawn of `side` on `from`.
///
/// A Pawn steps one square forward. Once it has crossed the river it may also step one square sideways.
/// It never moves backwards.
///
/// # Example
/// ```
/// # use xiangqi::{pawn_targets, Side, Square};
/// let home = "4-1".parse::<Square>().unwrap();
/// assert_eq!(pawn_targets(Side::Red, home).population(), 1);
///
/// let crossed = "6-5".parse::<Square>().unwrap();
/// assert_eq!(pawn_targets(Side::Red, crossed).population(), 3);
/// ```
pub fn pawn_targets(side: Side, from: Square) -> Bitboard {
    let mut targets = Bitboard::from(from.forward_by(side, 1));

    if from.has_crossed_river(side) {
        targets |= Bitboard::from(from.offset(0, -1));
        targets |= Bitboard::from(from.offset(0, 1));
    }

    targets
}

/// Pseudo-legal destinations of an Advisor of `side` on `from`: one diagonal step, without leaving the palace.
pub fn advisor_targets(side: Side, from: Square) -> Bitboard {
    DIAGONAL_DELTAS
        .into_iter()
        .filter_map(|(dr, dc)| from.offset(dr, dc))
        .filter(|to| to.is_in_palace(side))
        .collect()
}

/// Pseudo-legal destinations of a Bishop (Elephant) of `side` on `from`.
///
/// A Bishop moves exactly two squares diagonally. It is blocked if the square it passes over (its "eye")
/// is occupied, and it may not cross the river.
///
/// # Example
/// ```
/// # use xiangqi::{bishop_targets, Board, Side, Square};
/// let board = Board::default();
/// let bishop = "1-3".parse::<Square>().unwrap();
/// let targets = bishop_targets(&board, Side::Red, bishop);
/// assert_eq!(targets.population(), 2);
/// assert!(targets.get("3-1".parse().unwrap()));
/// assert!(targets.get("3-5".parse().unwrap()));
/// ```
pub fn bishop_targets(board: &Board, side: Side, from: Square) -> Bitboard {
    let blockers = board.occupied();

    let targets: Bitboard = DIAGONAL_DELTAS
        .into_iter()
        .filter_map(|(dr, dc)| {
            let eye = from.offset(dr, dc)?;
            if blockers.get(eye) {
                return None;
            }
            eye.offset(dr, dc)
        })
        .collect();

    targets & Bitboard::home_side(side)
}

/// Pseudo-legal destinations of a King (General) of `side` on `from`: one orthogonal step, without leaving the palace.
pub fn king_targets(side: Side, from: Square) -> Bitboard {
    ORTHOGONAL_DELTAS
        .into_iter()
        .filter_map(|(dr, dc)| from.offset(dr, dc))
        .filter(|to| to.is_in_palace(side))
        .collect()
}

/// Pseudo-legal destinations of a Rook (Chariot) on `from`.
///
/// In each of the four directions, every empty square up to and including the first occupied one.
/// The first occupant is included regardless of its side.
pub fn rook_targets(board: &Board, from: Square) -> Bitboard {
    let blockers = board.occupied();
    let mut targets = Bitboard::EMPTY_BOARD;

    for delta in ORTHOGONAL_DELTAS {
        for to in ray(from, delta) {
            targets.set(to);
            if blockers.get(to) {
                break;
            }
        }
    }

    targets
}

/// Pseudo-legal destinations of a Cannon of `side` on `from`.
///
/// In each direction, the Cannon slides over empty squares up to the first occupant (the "screen").
/// It may not land on the screen. The next occupant beyond the screen is a target only if it belongs to the opponent.
///
/// # Example
/// ```
/// # use xiangqi::{cannon_targets, Board, Side, Square};
/// let board = Board::default();
/// let cannon = "3-2".parse::<Square>().unwrap();
/// let targets = cannon_targets(&board, Side::Red, cannon);
/// // Jumps the black cannon on 8-2 to capture the knight on 10-2
/// assert!(targets.get("10-2".parse().unwrap()));
/// assert!(!targets.get("9-2".parse().unwrap()));
/// assert!(!targets.get("8-2".parse().unwrap()));
/// ```
pub fn cannon_targets(board: &Board, side: Side, from: Square) -> Bitboard {
    let blockers = board.occupied();
    let mut targets = Bitboard::EMPTY_BOARD;

    for delta in ORTHOGONAL_DELTAS {
        let mut ray = ray(from, delta);

        // Quiet moves, up to the screen
        for to in ray.by_ref() {
            if blockers.get(to) {
                break;
            }
            targets.set(to);
        }

        // Captures, just beyond the screen
        if let Some(to) = ray.find(|sq| blockers.get(*sq)) {
            if board.side_at(to) == Some(side.opponent()) {
                targets.set(to);
            }
        }
    }

    targets
}

/// Pseudo-legal destinations of a Knight (Horse) on `from`.
///
/// A Knight moves one square orthogonally and then one diagonally outwards. It is hobbled if the
/// orthogonal square it moves through (its "leg") is occupied.
///
/// # Example
/// ```
/// # use xiangqi::{knight_targets, Board, Square};
/// let board = Board::default();
/// let knight = "1-2".parse::<Square>().unwrap();
/// // 2-4 is out of reach: the bishop on 1-3 hobbles the knight
/// let targets = knight_targets(&board, knight);
/// assert_eq!(targets.population(), 2);
/// ```
pub fn knight_targets(board: &Board, from: Square) -> Bitboard {
    let blockers = board.occupied();

    KNIGHT_DELTAS
        .into_iter()
        .filter_map(|((dr, dc), (lr, lc))| {
            let leg = from.offset(lr, lc)?;
            if blockers.get(leg) {
                return None;
            }
            from.offset(dr, dc)
        })
        .collect()
}

/// Pseudo-legal destinations of `piece` standing on `from`.
///
/// These are legal by movement pattern only: they may include squares held by the mover's own side,
/// and they ignore whether the mover's general is left exposed.
pub fn targets_for(board: &Board, piece: Piece, from: Square) -> Bitboard {
    let side = piece.side();
    match piece.kind() {
        PieceKind::King => king_targets(side, from),
        PieceKind::Advisor => advisor_targets(side, from),
        PieceKind::Bishop => bishop_targets(board, side, from),
        PieceKind::Knight => knight_targets(board, from),
        PieceKind::Rook => rook_targets(board, from),
        PieceKind::Cannon => cannon_targets(board, side, from),
        PieceKind::Pawn => pawn_targets(side, from),
    }
}

/// Returns `true` if a piece of `side` standing on `square` could be captured by the opponent's next move.
///
/// Along each orthogonal ray, the nearest occupant threatens `square` if it is an opposing Rook, an opposing
/// Pawn that can step onto `square`, or an opposing King (the two generals may never face each other on an
/// open line). The occupant after that threatens if it is an opposing Cannon. Opposing Knights threaten
/// unless their leg is blocked.
///
/// Advisors and Bishops are not consulted: neither can ever reach the other side's palace.
///
/// # Example
/// ```
/// # use xiangqi::{is_threatened, Board, Side, Square};
/// // Black's general stares down an open file at Red's.
/// let board: Board = "4k4/9/9/9/9/9/9/9/9/4K4".parse().unwrap();
/// assert!(is_threatened(&board, Side::Red, "1-5".parse().unwrap()));
///
/// let board: Board = "4k4/9/9/9/4p4/9/9/9/9/4K4".parse().unwrap();
/// assert!(!is_threatened(&board, Side::Red, "1-5".parse().unwrap()));
/// ```
pub fn is_threatened(board: &Board, side: Side, square: Square) -> bool {
    let enemy = side.opponent();
    let blockers = board.occupied();

    for delta in ORTHOGONAL_DELTAS {
        let mut ray = ray(square, delta);

        let Some(first) = ray.find(|sq| blockers.get(*sq)) else {
            continue;
        };

        if let Some(piece) = board.piece_at(first) {
            if piece.side() == enemy {
                match piece.kind() {
                    PieceKind::Rook | PieceKind::King => return true,
                    PieceKind::Pawn if pawn_targets(enemy, first).get(square) => return true,
                    _ => {}
                }
            }
        }

        if let Some(second) = ray.find(|sq| blockers.get(*sq)) {
            if board.piece_at(second) == Some(Piece::new(enemy, PieceKind::Cannon)) {
                return true;
            }
        }
    }

    // Every knight that could land on `square` passes through one of its diagonal neighbours
    let knight = Piece::new(enemy, PieceKind::Knight);
    for (dr, dc) in DIAGONAL_DELTAS {
        let Some(leg) = square.offset(dr, dc) else {
            continue;
        };
        if blockers.get(leg) {
            continue;
        }

        let sources = [leg.offset(dr, 0), leg.offset(0, dc)];
        if sources
            .into_iter()
            .flatten()
            .any(|src| board.piece_at(src) == Some(knight))
        {
            return true;
        }
    }

    false
}

/// Legal destinations of `piece` standing on `from`.
///
/// Each pseudo-legal destination not held by the mover's own side is tried on a scratch copy of `board`.
/// It is kept only if, afterwards, the mover's side still has a general and none of its generals is threatened.
///
/// # Example
/// ```
/// # use xiangqi::{legal_targets, Board, Piece, Square};
/// // The red rook is pinned to its general by the black rook behind it.
/// let board: Board = "4r4/9/9/9/9/9/9/9/4R4/4K4".parse().unwrap();
/// let targets = legal_targets(&board, Piece::RED_ROOK, "2-5".parse().unwrap());
/// assert!(targets.iter().all(|sq| sq.column() == 5));
/// assert_eq!(targets.population(), 8);
/// ```
pub fn legal_targets(board: &Board, piece: Piece, from: Square) -> Bitboard {
    let side = piece.side();
    let candidates = targets_for(board, piece, from) & !board.side(side);

    candidates
        .into_iter()
        .filter(|&to| {
            let mut scratch = *board;
            scratch.clear(from);
            scratch.clear(to);
            scratch.place(piece, to);

            let generals = scratch.king(side);
            generals.is_nonempty()
                && generals
                    .into_iter()
                    .all(|general| !is_threatened(&scratch, side, general))
        })
        .collect()
}
