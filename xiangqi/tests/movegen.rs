use xiangqi::{
    is_threatened, targets_for, Bitboard, Board, Piece, PieceKind, Position, Side, Square,
    FEN_STARTPOS,
};

/// Positions with no generals, advisors or bishops, so every threat comes from a piece whose
/// pseudo-legal targets already describe it.
const SKIRMISHES: &[&str] = &[
    "2r1n4/3P5/1c2p1C2/p3N4/2R3p2/P1c3n2/4r4/2N1P1C2/9/1R3p3",
    "9/9/4c4/9/4P4/4R4/9/4n4/9/4C4",
    "r7r/9/9/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/R7R",
    "1n5n1/9/1c5c1/p1p1p1p1p/9/2N6/P1P1P1P1P/1C5C1/9/1N5N1",
    "9/3P1p3/9/2n1N4/3p1P3/9/4c4/4C4/4r4/4R4",
];

/// Every square the pieces of `side` could move to by pattern alone.
fn pseudo_legal_reach(board: &Board, side: Side) -> Bitboard {
    board
        .all_for(side)
        .map(|(from, piece)| targets_for(board, piece, from))
        .fold(Bitboard::EMPTY_BOARD, |acc, targets| acc | targets)
}

#[test]
fn threat_scan_matches_enemy_reach() {
    for fen in SKIRMISHES {
        let board: Board = fen.parse().unwrap();
        assert!(board.kind(PieceKind::King).is_empty());
        assert!(board.kind(PieceKind::Advisor).is_empty());
        assert!(board.kind(PieceKind::Bishop).is_empty());

        for side in Side::all() {
            let reach = pseudo_legal_reach(&board, side.opponent());

            for square in board.side(side) {
                assert_eq!(
                    is_threatened(&board, side, square),
                    reach.get(square),
                    "{} on {square} in {fen:?}",
                    side.name()
                );
            }
        }
    }
}

#[test]
fn no_legal_move_leaves_own_general_threatened() {
    let fens = [
        FEN_STARTPOS,
        "3akab2/9/4b4/4N4/2r6/9/4C4/4B4/4A4/3AK4 w",
        "4k4/4a4/9/9/9/9/9/9/4R4/3K5 b",
        "4k4/9/9/9/4c4/9/4P4/9/9/4K4 w",
    ];

    for fen in fens {
        let position = Position::from_fen(fen).unwrap();
        let side = position.side_to_move();

        for mv in position.legal_moves() {
            let after = position.with_move_made(mv);
            for general in after.king(side) {
                assert!(
                    !is_threatened(after.board(), side, general),
                    "{mv} leaves {} in check in {fen:?}",
                    side.name()
                );
            }
        }
    }
}

#[test]
fn pinned_piece_stays_on_the_file() {
    // The red cannon on 4-5 is all that stands between the black rook on 6-5 and the red general.
    let position = Position::from_fen("3k5/9/9/9/4r4/9/4C4/9/9/4K4 w").unwrap();
    let cannon = "4-5".parse().unwrap();
    let targets = position.legal_targets(cannon);

    assert!(targets.iter().all(|sq| sq.column() == 5));
    assert_eq!(targets.population(), 3);
}

#[test]
fn moving_a_screen_along_the_file_does_not_escape_a_cannon() {
    // The red pawn on 4-5 is the screen through which the black cannon on 6-5 checks the red general.
    let position = Position::from_fen("4k4/9/9/9/4c4/9/4P4/9/9/4K4 w").unwrap();
    let pawn = "4-5".parse().unwrap();
    assert!(position.legal_targets(pawn).is_empty());
    assert!(position.has_legal_moves());
}

#[test]
fn generals_cannot_face_each_other() {
    let position = Position::from_fen("3k5/9/9/9/9/9/9/9/9/4K4 w").unwrap();
    let general = "1-5".parse().unwrap();
    let targets = position.legal_targets(general);

    assert!(!targets.get("1-4".parse().unwrap()));
    assert!(targets.get("1-6".parse().unwrap()));
    assert!(targets.get("2-5".parse().unwrap()));
}

#[test]
fn every_side_has_legal_moves_at_the_start() {
    let position = Position::default();
    assert_eq!(position.legal_moves().len(), 44);

    let mut position = position;
    position.toggle_side_to_move();
    assert_eq!(position.legal_moves().len(), 44);
}

#[test]
fn palace_pieces_never_leave_the_palace() {
    let board = Board::default();

    for side in Side::all() {
        let palace = Bitboard::palace(side);
        for square in Square::iter() {
            for kind in [PieceKind::King, PieceKind::Advisor] {
                let targets = targets_for(&board, Piece::new(side, kind), square);
                assert!(
                    (targets & !palace).is_empty(),
                    "{} {} on {square} leaves the palace",
                    side.name(),
                    kind.name()
                );
            }
        }
    }
}

#[test]
fn sliders_reach_whole_row_and_column_on_empty_board() {
    let board = Board::new();

    for square in Square::iter() {
        let lines = (Bitboard::from_row(square.row()) | Bitboard::from_column(square.column()))
            & !Bitboard::from_square(square);

        for kind in [PieceKind::Rook, PieceKind::Cannon] {
            let targets = targets_for(&board, Piece::new(Side::Red, kind), square);
            assert_eq!(targets, lines, "{} on {square}", kind.name());
        }
    }
}
