//! Engine scenarios played through the public API.

use squares::games::squares::rules::find_square;
use squares::{
    Board, Color, MatchConfig, MatchEngine, MatchError, MatchStatus, Mode, Outcome, Position,
    Square,
};

fn p(x: usize, y: usize) -> Position {
    Position::new(x, y)
}

/// Plays `moves` alternately starting with White and returns the engine.
fn play(size: usize, moves: &[(usize, usize)]) -> MatchEngine {
    let mut engine = MatchEngine::new();
    engine.start(MatchConfig::new(size, Mode::PvP)).unwrap();
    let mut color = Color::White;
    for &(x, y) in moves {
        engine.apply_move(p(x, y), color).unwrap();
        color = color.opponent();
    }
    engine
}

#[test]
fn test_axis_aligned_square_wins() {
    // White: (0,0) (0,3) (3,3) (3,0); Black fills the middle.
    let engine = play(4, &[(0, 0), (1, 1), (0, 3), (1, 2), (3, 3), (2, 1), (3, 0)]);

    let expected = Square::new([p(0, 0), p(3, 0), p(0, 3), p(3, 3)]);
    assert_eq!(
        engine.status(),
        MatchStatus::Won {
            winner: Color::White,
            square: Some(expected)
        }
    );
    let board = engine.current().unwrap().board();
    assert_eq!(find_square(board, Color::White), Some(expected));
}

#[test]
fn test_tilted_square_wins() {
    // Edge vector (2,1); Black stays on the diagonal.
    let engine = play(4, &[(1, 0), (0, 0), (3, 1), (1, 1), (2, 3), (2, 2), (0, 2)]);

    match engine.status() {
        MatchStatus::Won {
            winner: Color::White,
            square: Some(square),
        } => {
            for corner in [p(1, 0), p(3, 1), p(2, 3), p(0, 2)] {
                assert!(square.contains(corner), "missing {corner}");
            }
        }
        other => panic!("Expected White to win, got {other:?}"),
    }
}

#[test]
fn test_full_board_without_square_is_draw() {
    let engine = play(
        3,
        &[(0, 0), (0, 1), (1, 0), (0, 2), (2, 0), (1, 1), (1, 2), (2, 1), (2, 2)],
    );

    assert_eq!(engine.status(), MatchStatus::Draw);
    let current = engine.current().unwrap();
    assert!(current.board().is_full());
    assert_eq!(current.history().len(), 9);
}

#[test]
fn test_full_board_completed_by_square_is_won_not_draw() {
    let engine = play(
        3,
        &[(0, 0), (2, 0), (1, 0), (2, 1), (0, 1), (0, 2), (2, 2), (1, 2), (1, 1)],
    );

    assert!(engine.current().unwrap().board().is_full());
    assert!(matches!(
        engine.status(),
        MatchStatus::Won {
            winner: Color::White,
            ..
        }
    ));
}

#[test]
fn test_occupied_cell_rejected_without_mutation() {
    let mut engine = play(4, &[(1, 1)]);
    let before = engine.snapshot();

    let err = engine.apply_move(p(1, 1), Color::Black).unwrap_err();

    assert_eq!(err, MatchError::CellOccupied(p(1, 1)));
    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.status(), MatchStatus::Active { to_move: Color::Black });
}

#[test]
fn test_out_of_bounds_and_wrong_turn_rejected() {
    let mut engine = play(3, &[]);

    assert_eq!(
        engine.apply_move(p(3, 0), Color::White),
        Err(MatchError::OutOfBounds(p(3, 0), 3))
    );
    assert_eq!(
        engine.apply_move(p(0, 0), Color::Black),
        Err(MatchError::WrongTurn {
            expected: Color::White,
            actual: Color::Black
        })
    );
    assert!(engine.current().unwrap().history().is_empty());
}

#[test]
fn test_invalid_sizes_rejected_at_start() {
    let mut engine = MatchEngine::new();
    for size in [0, 1, 2, 11, 100] {
        assert_eq!(
            engine.start(MatchConfig::new(size, Mode::PvP)),
            Err(MatchError::InvalidSize(size))
        );
    }
    assert_eq!(engine.status(), MatchStatus::NotStarted);

    for size in 3..=10 {
        assert!(engine.start(MatchConfig::new(size, Mode::PvP)).is_ok());
    }
}

#[test]
fn test_terminal_status_is_monotonic() {
    let mut engine = play(4, &[(0, 0), (1, 1), (0, 3), (1, 2), (3, 3), (2, 1), (3, 0)]);
    let finished = engine.snapshot();

    for color in [Color::White, Color::Black] {
        for pos in Board::new(4).unwrap().positions() {
            assert_eq!(engine.apply_move(pos, color), Err(MatchError::NotActive));
        }
    }
    assert_eq!(
        engine.conclude(Outcome::Draw),
        Err(MatchError::NotActive)
    );
    assert_eq!(engine.snapshot(), finished);
}

#[test]
fn test_history_sequence_numbers() {
    let engine = play(5, &[(0, 0), (4, 4), (2, 2)]);
    let history = engine.current().unwrap().history();

    let sequences: Vec<u32> = history.moves().iter().map(|m| m.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert_eq!(history.moves()[1].player, Color::Black);
    assert_eq!(history.moves()[1].position, p(4, 4));
}

#[test]
fn test_reset_clears_board_and_bumps_generation() {
    let mut engine = play(5, &[(0, 0), (4, 4)]);
    let generation = engine.generation();

    engine.reset().unwrap();

    assert_eq!(engine.generation(), generation + 1);
    assert!(!engine.is_current(generation));
    let current = engine.current().unwrap();
    assert!(current.history().is_empty());
    assert_eq!(current.board().empty_positions().len(), 25);
    assert_eq!(*current.config().size(), 5);
    assert_eq!(engine.status(), MatchStatus::Active { to_move: Color::White });
}

#[test]
fn test_set_never_succeeds_twice() {
    for size in 3..=10 {
        let mut board = Board::new(size).unwrap();
        let positions: Vec<Position> = board.positions().collect();
        for (i, pos) in positions.iter().enumerate() {
            let color = if i % 2 == 0 { Color::White } else { Color::Black };
            assert!(board.set(*pos, color).is_ok());
            assert_eq!(board.set(*pos, color), Err(MatchError::CellOccupied(*pos)));
            assert_eq!(
                board.set(*pos, color.opponent()),
                Err(MatchError::CellOccupied(*pos))
            );
        }
        assert!(board.is_full());
    }
}
