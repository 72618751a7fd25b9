//! External move oracle.
//!
//! The oracle is an opaque service: given a board and the color to move it
//! answers with a move or a terminal verdict. Failures never reach the
//! caller as fatal errors; the orchestrator turns them into fallbacks.

mod http;
mod offline;
mod wire;

pub use http::HttpOracle;
pub use offline::OfflineOracle;
pub use wire::{OracleRequest, OracleResponse};

use crate::games::squares::{Board, Color, Position, Square};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal verdict asserted by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Someone has won. The winner is `None` when the oracle did not say
    /// which color.
    Won {
        /// Winning color, if named.
        winner: Option<Color>,
        /// Winning square, if supplied.
        square: Option<Square>,
    },
    /// Drawn game.
    Draw,
}

/// Successful oracle answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleResult {
    /// The oracle picked a cell for the color to move.
    Move {
        /// Chosen cell. Not yet validated against the board.
        position: Position,
        /// Square the oracle says this move completes.
        claimed_square: Option<Square>,
    },
    /// The oracle says the game is already over.
    Verdict(Verdict),
}

/// Why an oracle call produced no usable answer.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum OracleError {
    /// Connection or I/O failure.
    #[display("Oracle unreachable: {}", _0)]
    Transport(String),
    /// Non-2xx HTTP status.
    #[display("Oracle returned HTTP {}", _0)]
    Status(u16),
    /// Body could not be understood.
    #[display("Malformed oracle response: {}", _0)]
    Malformed(String),
    /// No answer within the configured bound.
    #[display("Oracle did not answer within {:?}", _0)]
    Timeout(Duration),
}

impl std::error::Error for OracleError {}

/// Request/response access to a move oracle.
#[async_trait::async_trait]
pub trait MoveOracle: Send + Sync {
    /// Asks for a move for `next` on `board`.
    async fn request_move(&self, board: &Board, next: Color) -> Result<OracleResult, OracleError>;

    /// Display name for logs.
    fn name(&self) -> &str;
}
