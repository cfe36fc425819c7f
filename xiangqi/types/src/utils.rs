/// FEN string for the standard opening position of Xiangqi.
pub const FEN_STARTPOS: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w";

/// Number of ranks in a board FEN.
pub const FEN_RANKS: usize = 10;

/// Every character allowed in a rank once digits have been expanded to runs of `1`.
pub const FEN_RANK_CHARS: &str = "krncabpKRNCABP1";

/// Most destinations a single piece can have: a rook or cannon on an open board reaches 9 + 8 squares.
pub const MAX_PIECE_MOVES: usize = 17;

/// `(row, column)` deltas for the Rook, Cannon, King and (sideways-moving) Pawn.
pub const ORTHOGONAL_DELTAS: [(i8, i8); 4] = [(1, 0), (0, -1), (-1, 0), (0, 1)];

/// `(row, column)` deltas for the Advisor, and the "eye" of the Bishop.
pub const DIAGONAL_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// `(row, column)` deltas for the Knight, each paired with the delta of the leg that must be empty.
///
/// The leg is the orthogonal neighbour in the direction of the two-step part of the jump.
pub const KNIGHT_DELTAS: [((i8, i8), (i8, i8)); 8] = [
    ((2, 1), (1, 0)),
    ((2, -1), (1, 0)),
    ((-2, 1), (-1, 0)),
    ((-2, -1), (-1, 0)),
    ((1, 2), (0, 1)),
    ((-1, 2), (0, 1)),
    ((1, -2), (0, -1)),
    ((-1, -2), (0, -1)),
];
