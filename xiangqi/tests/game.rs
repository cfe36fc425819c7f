use xiangqi::{
    is_threatened, is_valid_fen, Click, Game, Piece, PieceKind, Position, Side, Square,
    FEN_STARTPOS,
};

fn sq(key: &str) -> Square {
    key.parse().unwrap()
}

#[test]
fn fen_round_trips() {
    let fens = [
        FEN_STARTPOS,
        "4k4/9/9/9/9/9/9/9/9/4K4 b",
        "r1bakab1r/9/1cn3nc1/p1p1p1p1p/9/9/P1P1P1P1P/1CN3NC1/9/R1BAKAB1R w",
        "9/9/9/9/9/9/9/9/9/9 w",
    ];

    for fen in fens {
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(position.to_fen(), fen);
    }
}

#[test]
fn fen_turn_marker_is_lenient() {
    let position = Position::from_fen("4k4/9/9/9/9/9/9/9/9/4K4").unwrap();
    assert_eq!(position.side_to_move(), Side::Red);

    let position = Position::from_fen("4k4/9/9/9/9/9/9/9/9/4K4 x").unwrap();
    assert_eq!(position.side_to_move(), Side::Red);

    let position = Position::from_fen("  4k4/9/9/9/9/9/9/9/9/4K4 b  ").unwrap();
    assert_eq!(position.side_to_move(), Side::Black);
}

#[test]
fn malformed_fens_are_rejected() {
    let fens = [
        "",
        "   ",
        "0",
        "4k4/9/9/9/9/9/9/9/9 w",
        "4k4/9/9/9/9/9/9/9/9/9/4K4 w",
        "4k4/9/9/9/9/9/9/9/9/4K5 w",
        "4k4/9/9/9/9/9/9/9/9/4K3 w",
        "4q4/9/9/9/9/9/9/9/9/4K4 w",
        "4k4/9/9/9/9/0/9/9/9/4K4 w",
    ];

    for fen in fens {
        assert!(!is_valid_fen(fen), "{fen:?} should be rejected");
        assert!(Position::from_fen(fen).is_err(), "{fen:?} should be rejected");
    }
}

#[test]
fn failed_load_sets_error_and_keeps_board() {
    let mut game = Game::default();
    game.play(sq("3-2"), sq("3-5")).unwrap();
    let before = game.current_fen();

    assert!(game.load_position("rnbakabnr/9/1c5c1 w").is_err());
    assert!(game.error());
    assert_eq!(game.current_fen(), before);
    assert_eq!(game.history().len(), 1);

    game.dismiss_notification();
    assert!(!game.error());
}

#[test]
fn captures_and_history_survive_loads_until_reset() {
    let mut game = Game::default();
    game.play(sq("3-2"), sq("10-2")).unwrap();
    assert_eq!(game.captured_pieces(), &[Piece::BLACK_KNIGHT]);

    game.load_position(FEN_STARTPOS).unwrap();
    assert_eq!(game.captured_pieces(), &[Piece::BLACK_KNIGHT]);
    assert_eq!(game.history().len(), 1);
    assert_eq!(game.last_move(), None);
    assert_eq!(game.side_to_move(), Side::Red);

    game.reset();
    assert!(game.captured_pieces().is_empty());
    assert!(game.history().is_empty());
    assert_eq!(game, Game::default());
}

#[test]
fn flipping_changes_only_the_view() {
    let mut game = Game::default();
    let cells = game.cells();
    game.flip_board();
    let flipped = game.cells();

    assert_eq!(game.current_fen(), FEN_STARTPOS);
    assert_eq!(cells.len(), Square::COUNT);
    assert_eq!(cells[0].square, sq("10-1"));
    assert_eq!(flipped[0].square, sq("1-9"));
    assert_eq!(
        cells.iter().rev().copied().collect::<Vec<_>>(),
        flipped,
        "a flipped board lists the same cells in reverse"
    );

    game.flip_board();
    assert!(!game.is_flipped());
    assert_eq!(game.cells(), cells);
}

#[test]
fn clicking_through_a_move() {
    let mut game = Game::default();

    // Empty square while idle
    assert_eq!(game.handle_click(sq("5-5")), Click::Ignored);

    // Black piece on Red's turn
    assert_eq!(game.handle_click(sq("10-1")), Click::Ignored);

    // Select, then reselect a different piece
    assert!(matches!(game.handle_click(sq("1-1")), Click::Selected { .. }));
    let Click::Selected { from, targets } = game.handle_click(sq("4-5")) else {
        panic!("expected the pawn to be selected");
    };
    assert_eq!(from, sq("4-5"));
    assert_eq!(targets.population(), 1);
    assert!(game.cell(sq("4-5")).selected);
    assert!(game.cell(sq("5-5")).available);

    // Somewhere the pawn can't go cancels
    assert_eq!(game.handle_click(sq("9-9")), Click::Cancelled);
    assert_eq!(game.counter(), 0);

    game.handle_click(sq("4-5"));
    let Click::Moved(mv) = game.handle_click(sq("5-5")) else {
        panic!("expected the pawn to move");
    };
    assert_eq!(mv.piece(), Piece::RED_PAWN);
    assert_eq!(game.last_move(), Some(mv));
    assert!(game.cell(sq("5-5")).just_moved);
    assert!(game.cell(sq("4-5")).previously_moved);
    assert_eq!(game.side_to_move(), Side::Black);
}

#[test]
fn apply_move_needs_a_selection() {
    let mut game = Game::default();
    assert!(game.apply_move(sq("5-5")).is_err());

    game.handle_click(sq("4-5"));
    assert!(game.apply_move(sq("6-5")).is_err());
    assert_eq!(game.counter(), 1);

    assert_eq!(game.apply_move(sq("5-5")).unwrap(), None);
    assert_eq!(game.counter(), 0);
}

#[test]
fn checkmate_ends_the_game() {
    // The rook on 9-9 holds the 9th row while the other rook checks along the 10th.
    let mut game = Game::from_fen("4k4/8R/R8/9/9/9/9/9/9/3K5 w").unwrap();
    assert!(!game.game_over());
    assert_eq!(game.winner(), None);

    game.play(sq("8-1"), sq("10-1")).unwrap();
    assert!(game.is_game_over());
    assert!(game.game_over());
    assert_eq!(game.winner(), Some(Side::Red));

    game.dismiss_notification();
    assert!(!game.game_over());
    assert!(game.is_game_over());
}

#[test]
fn stalemate_ends_the_game() {
    // Black's general is not in check, but every step is covered by the rook or the other general.
    let game = Game::from_fen("3k5/8R/9/9/9/9/9/9/9/4K4 b").unwrap();
    assert!(!is_threatened(game.board(), Side::Black, sq("10-4")));

    assert!(game.legal_moves().is_empty());
    assert!(game.is_game_over());
    assert!(game.game_over());
    assert_eq!(game.winner(), Some(Side::Red));
}

#[test]
fn legal_targets_for_any_piece_on_any_square() {
    let game = Game::default();
    let cannon = sq("3-2");

    assert_eq!(
        game.legal_targets_for(PieceKind::Cannon, Side::Red, cannon),
        game.legal_targets(cannon)
    );
    assert_eq!(game.legal_moves().len(), 44);

    // An imaginary red rook on an empty square of the river bank
    let targets = game.legal_targets_for(PieceKind::Rook, Side::Red, sq("5-2"));
    assert!(targets.get(sq("8-2")), "captures the black cannon");
    assert!(targets.get(sq("4-2")));
    assert!(!targets.get(sq("3-2")), "own cannon");
    assert!(!targets.get(sq("9-2")), "beyond the capture");
}

#[test]
fn loading_a_lost_position_raises_game_over() {
    let mut game = Game::default();
    game.load_position("4k4/9/9/9/9/9/9/9/9/R8 w").unwrap();
    assert!(game.game_over());
    assert_eq!(game.winner(), Some(Side::Black));
}
