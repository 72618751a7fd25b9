//! Squares: place tokens on an N×N grid; four of your tokens on the corners
//! of any square (any size, any rotation) wins.

mod action;
mod board;
mod engine;
mod history;
pub mod rules;
mod types;

pub use action::MatchError;
pub use board::{Board, MAX_SIZE, MIN_SIZE};
pub use engine::{
    Match, MatchConfig, MatchEngine, MatchSnapshot, MatchStatus, Mode, OracleTurn, Outcome,
};
pub use history::{Move, MoveHistory};
pub use types::{Cell, Color, Position, Square};
