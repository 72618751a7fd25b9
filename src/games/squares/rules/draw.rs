//! Draw detection.

use super::super::{Board, Color};
use super::square::find_square;
use tracing::instrument;

/// A full board where the color that just moved has no square.
#[instrument(skip(board), fields(size = board.size()))]
pub fn is_draw(board: &Board, just_moved: Color) -> bool {
    board.is_full() && find_square(board, just_moved).is_none()
}
