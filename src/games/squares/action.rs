//! Rejections raised when a move or match setup is invalid.
//!
//! Every variant leaves the match untouched: the call that produced it had
//! no effect on the board, the history or the status.

use super::board::{MAX_SIZE, MIN_SIZE};
use super::{Color, Position};

/// Error returned by board and engine operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MatchError {
    /// Board size outside the supported range.
    #[display("Board size {} is outside {}..={}", _0, MIN_SIZE, MAX_SIZE)]
    InvalidSize(usize),

    /// Position is not on the board.
    #[display("Position {} is outside the {}x{} board", _0, _1, _1)]
    OutOfBounds(Position, usize),

    /// Cell already holds a token.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(Position),

    /// A color tried to move out of turn.
    #[display("It's {expected}'s turn, not {actual}'s")]
    WrongTurn {
        /// Color whose turn it is.
        expected: Color,
        /// Color that attempted the move.
        actual: Color,
    },

    /// No match is running, or it has already finished.
    #[display("Match is not active")]
    NotActive,

    /// The color is played by the oracle and cannot take direct moves.
    #[display("{} is controlled by the oracle", _0)]
    OracleControlled(Color),
}

impl std::error::Error for MatchError {}
