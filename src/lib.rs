//! Squares match engine.
//!
//! Two players alternately place tokens on an N×N grid; whoever owns the
//! four corners of a square of any size and rotation wins. Either side may
//! be played by an external move oracle reached over HTTP.
//!
//! # Architecture
//!
//! - **Games**: board, square detection and the turn state machine
//!   ([`MatchEngine`]); pure and synchronous.
//! - **Oracle**: the [`MoveOracle`] seam plus the HTTP client and wire types.
//! - **Orchestrator**: [`MatchDriver`], which serialises access to a match
//!   and plays oracle turns with timeout, pacing and random fallback.
//! - **Console**: a line-oriented front end over the driver.
//!
//! # Example
//!
//! ```no_run
//! use squares::{DriverSettings, HttpOracle, MatchConfig, MatchDriver, Mode, Position, Color};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let oracle = Arc::new(HttpOracle::new("http://127.0.0.1:8080/api/nextMove"));
//! let driver = MatchDriver::new(oracle, DriverSettings::default());
//! driver.start(MatchConfig::new(5, Mode::PvC)).await?;
//! let snapshot = driver.apply_move(Position::new(2, 2), Color::White).await?;
//! println!("{:?}", snapshot.status());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod console;
pub mod games;
pub mod oracle;
pub mod orchestrator;

// Crate-level exports - Game types
pub use games::squares::{
    Board, Cell, Color, Match, MatchConfig, MatchEngine, MatchError, MatchSnapshot, MatchStatus,
    Mode, Move, MoveHistory, OracleTurn, Outcome, Position, Square, MAX_SIZE, MIN_SIZE,
};

// Crate-level exports - Oracle
pub use oracle::{
    HttpOracle, MoveOracle, OfflineOracle, OracleError, OracleRequest, OracleResponse,
    OracleResult, Verdict,
};

// Crate-level exports - Orchestration
pub use orchestrator::{DriverSettings, FallbackReason, MatchDriver, MatchEvent};

// Crate-level exports - Configuration and console
pub use config::{ConfigError, SquaresConfig};
pub use console::{Console, Flow};
