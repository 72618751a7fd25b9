//! Properties of the square detector.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use squares::games::squares::rules::{find_square, is_draw};
use squares::{Board, Color, MatchConfig, MatchEngine, MatchStatus, Mode, Position};

fn p(x: usize, y: usize) -> Position {
    Position::new(x, y)
}

/// Squares of several sizes and tilts that fit in rows 0..9 of a 10x10 board.
fn sample_squares() -> Vec<[Position; 4]> {
    vec![
        [p(0, 0), p(1, 0), p(1, 1), p(0, 1)],
        [p(2, 2), p(7, 2), p(7, 7), p(2, 7)],
        [p(1, 0), p(3, 1), p(2, 3), p(0, 2)],
        [p(3, 0), p(6, 3), p(3, 6), p(0, 3)],
        [p(4, 1), p(8, 2), p(7, 6), p(3, 5)],
    ]
}

fn permutations(corners: [Position; 4]) -> Vec<[Position; 4]> {
    let mut out = Vec::new();
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                for d in 0..4 {
                    let idx = [a, b, c, d];
                    let distinct = (0..4).all(|i| (i + 1..4).all(|j| idx[i] != idx[j]));
                    if distinct {
                        out.push(idx.map(|i| corners[i]));
                    }
                }
            }
        }
    }
    out
}

#[test]
fn test_detection_independent_of_play_order() {
    // Black fillers on the bottom row never form a square.
    let fillers = [p(0, 9), p(1, 9), p(2, 9)];

    for corners in sample_squares() {
        for order in permutations(corners) {
            let mut engine = MatchEngine::new();
            engine.start(MatchConfig::new(10, Mode::PvP)).unwrap();
            for (i, pos) in order.iter().enumerate() {
                let status = *engine.apply_move(*pos, Color::White).unwrap();
                if i < 3 {
                    assert_eq!(status, MatchStatus::Active { to_move: Color::Black });
                    engine.apply_move(fillers[i], Color::Black).unwrap();
                } else {
                    let MatchStatus::Won { winner, square } = status else {
                        panic!("order {order:?} did not win");
                    };
                    assert_eq!(winner, Color::White);
                    let square = square.unwrap();
                    for corner in corners {
                        assert!(square.contains(corner));
                    }
                }
            }
        }
    }
}

#[test]
fn test_fewer_than_four_cells_never_square() {
    let mut rng = StdRng::seed_from_u64(7);
    for size in 3..=10 {
        let board = Board::new(size).unwrap();
        let mut cells: Vec<Position> = board.positions().collect();
        for _ in 0..20 {
            cells.shuffle(&mut rng);
            for count in 0..4 {
                let mut board = Board::new(size).unwrap();
                for pos in &cells[..count] {
                    board.set(*pos, Color::Black).unwrap();
                }
                assert_eq!(find_square(&board, Color::Black), None);
            }
        }
    }
}

#[test]
fn test_non_square_shapes_not_detected() {
    let shapes = [
        // Rectangle
        [p(0, 0), p(2, 0), p(0, 1), p(2, 1)],
        // Rhombus
        [p(0, 0), p(2, 1), p(3, 3), p(1, 2)],
        // Parallelogram
        [p(0, 0), p(2, 0), p(3, 1), p(1, 1)],
        // Line
        [p(0, 0), p(1, 0), p(2, 0), p(3, 0)],
    ];
    for shape in shapes {
        let mut board = Board::new(5).unwrap();
        for pos in shape {
            board.set(pos, Color::White).unwrap();
        }
        assert_eq!(find_square(&board, Color::White), None, "{shape:?}");
    }
}

#[test]
fn test_detection_ignores_other_color() {
    let mut board = Board::new(4).unwrap();
    for pos in [p(0, 0), p(1, 0), p(0, 1)] {
        board.set(pos, Color::White).unwrap();
    }
    board.set(p(1, 1), Color::Black).unwrap();

    assert_eq!(find_square(&board, Color::White), None);
    assert_eq!(find_square(&board, Color::Black), None);
}

#[test]
fn test_detection_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let size = rng.random_range(3..=10);
        let mut board = Board::new(size).unwrap();
        let mut cells: Vec<Position> = board.positions().collect();
        cells.shuffle(&mut rng);
        let filled = rng.random_range(0..=cells.len());
        for (i, pos) in cells[..filled].iter().enumerate() {
            let color = if i % 2 == 0 { Color::White } else { Color::Black };
            board.set(*pos, color).unwrap();
        }

        for color in [Color::White, Color::Black] {
            let first = find_square(&board, color);
            let second = find_square(&board, color);
            assert_eq!(first, second);
            if let Some(square) = first {
                for vertex in square.vertices() {
                    assert_eq!(board.get(*vertex), Some(squares::Cell::Occupied(color)));
                }
            }
        }
    }
}

#[test]
fn test_is_draw_requires_full_board() {
    let mut board = Board::new(3).unwrap();
    let moves = [(0, 0), (0, 1), (1, 0), (0, 2), (2, 0), (1, 1), (1, 2), (2, 1)];
    let mut color = Color::White;
    for (x, y) in moves {
        board.set(p(x, y), color).unwrap();
        assert!(!is_draw(&board, color));
        color = color.opponent();
    }
    board.set(p(2, 2), Color::White).unwrap();
    assert!(is_draw(&board, Color::White));
}
