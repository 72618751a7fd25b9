//! Square detection.
//!
//! Any two same-colored tokens are a candidate edge. Rotating the edge
//! vector by 90° in both directions gives the two squares that share that
//! edge; a square is complete when both derived vertices are on the board
//! and hold the same color. This covers every size and orientation, with
//! axis-aligned squares as the case where one component of the edge is 0.

use super::super::{Board, Cell, Color, Position, Square};
use tracing::instrument;

/// Finds a completed square for `color`, if any.
///
/// Pairs are scanned in row-major order of their tokens (`i < j`), and the
/// `(-dy, dx)` rotation is tried before `(dy, -dx)`, so the result is
/// deterministic for a given board. O(k²) in the number of `color` tokens.
#[instrument(skip(board), fields(size = board.size()))]
pub fn find_square(board: &Board, color: Color) -> Option<Square> {
    let cells = board.occupied_by(color);
    if cells.len() < 4 {
        return None;
    }

    for (i, &p1) in cells.iter().enumerate() {
        for &p2 in &cells[i + 1..] {
            let dx = p2.x as i64 - p1.x as i64;
            let dy = p2.y as i64 - p1.y as i64;

            for (vx, vy) in [(-dy, dx), (dy, -dx)] {
                let Some(p3) = board.position_at(p1.x as i64 + vx, p1.y as i64 + vy) else {
                    continue;
                };
                let Some(p4) = board.position_at(p2.x as i64 + vx, p2.y as i64 + vy) else {
                    continue;
                };
                if holds(board, p3, color) && holds(board, p4, color) {
                    return Some(Square::new([p1, p2, p3, p4]));
                }
            }
        }
    }

    None
}

fn holds(board: &Board, pos: Position, color: Color) -> bool {
    board.get(pos) == Some(Cell::Occupied(color))
}
