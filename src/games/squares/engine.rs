//! Match state machine.
//!
//! `NotStarted → Active(to_move) → {Won, Draw}`. Terminal states are never
//! left except by starting a new match, which also bumps the generation
//! counter so late oracle answers for the old match can be recognised.
//!
//! The engine itself performs no I/O. Oracle-controlled turns are surfaced
//! through [`MatchEngine::oracle_turn`] and run by the orchestrator.

use super::rules::{find_square, is_draw};
use super::{Board, Color, MatchError, Move, MoveHistory, Position, Square};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Who controls each side.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mode {
    /// Human vs human.
    PvP,
    /// Human vs oracle.
    PvC,
    /// Oracle vs oracle.
    CvC,
}

/// Match setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MatchConfig {
    size: usize,
    mode: Mode,
    white_is_oracle: bool,
    black_is_oracle: bool,
}

impl MatchConfig {
    /// Config for a mode. In [`Mode::PvC`] the human plays White and
    /// the oracle plays Black.
    #[instrument]
    pub fn new(size: usize, mode: Mode) -> Self {
        let (white_is_oracle, black_is_oracle) = match mode {
            Mode::PvP => (false, false),
            Mode::PvC => (false, true),
            Mode::CvC => (true, true),
        };
        Self {
            size,
            mode,
            white_is_oracle,
            black_is_oracle,
        }
    }

    /// Config from explicit side assignments; the mode is derived.
    #[instrument]
    pub fn with_sides(size: usize, white_is_oracle: bool, black_is_oracle: bool) -> Self {
        let mode = match (white_is_oracle, black_is_oracle) {
            (false, false) => Mode::PvP,
            (true, true) => Mode::CvC,
            _ => Mode::PvC,
        };
        Self {
            size,
            mode,
            white_is_oracle,
            black_is_oracle,
        }
    }

    /// Whether `color` is played by the oracle.
    pub fn is_oracle(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_is_oracle,
            Color::Black => self.black_is_oracle,
        }
    }
}

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// No match has been started.
    NotStarted,
    /// Waiting for `to_move`.
    Active {
        /// Color whose turn it is.
        to_move: Color,
    },
    /// `winner` completed a square. The square is unknown when the result
    /// came from an oracle verdict without one.
    Won {
        /// Winning color.
        winner: Color,
        /// Vertices of the winning square.
        square: Option<Square>,
    },
    /// Board filled with no square.
    Draw,
}

impl MatchStatus {
    /// Whether the match has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Won { .. } | MatchStatus::Draw)
    }

    /// Color to move, if the match is active.
    pub fn to_move(&self) -> Option<Color> {
        match self {
            MatchStatus::Active { to_move } => Some(*to_move),
            _ => None,
        }
    }
}

/// Terminal result declared from outside the engine (oracle verdicts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A color won.
    Won {
        /// Winning color.
        winner: Color,
        /// Winning square, when known.
        square: Option<Square>,
    },
    /// Drawn game.
    Draw,
}

/// One running match: board, history, status and setup.
#[derive(Debug, Clone, Getters)]
pub struct Match {
    config: MatchConfig,
    board: Board,
    history: MoveHistory,
    status: MatchStatus,
}

/// Everything the oracle needs to choose a move, tagged with the
/// generation it was issued under.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct OracleTurn {
    generation: u64,
    color: Color,
    board: Board,
}

/// Read-only view for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct MatchSnapshot {
    generation: u64,
    status: MatchStatus,
    config: Option<MatchConfig>,
    board: Option<Board>,
    history: Vec<Move>,
}

/// Turn-sequencing state machine for one match slot.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    current: Option<Match>,
    generation: u64,
}

impl MatchEngine {
    /// Creates an engine with no match started.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh match; White moves first.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidSize`] if the configured size is unsupported. The
    /// previous match, if any, is kept in that case.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn start(&mut self, config: MatchConfig) -> Result<&MatchStatus, MatchError> {
        let board = Board::new(*config.size())?;
        self.generation += 1;
        info!(
            generation = self.generation,
            size = config.size(),
            mode = %config.mode(),
            "Match started"
        );
        let current = self.current.insert(Match {
            config,
            board,
            history: MoveHistory::new(),
            status: MatchStatus::Active {
                to_move: Color::White,
            },
        });
        Ok(&current.status)
    }

    /// Discards the current match and starts a new one with the same config.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotActive`] if no match was ever started.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn reset(&mut self) -> Result<&MatchStatus, MatchError> {
        let config = self
            .current
            .as_ref()
            .map(|m| m.config)
            .ok_or(MatchError::NotActive)?;
        self.start(config)
    }

    /// Places a token for `color` and advances the state machine.
    ///
    /// On success the returned status is `Won` if `color` completed a square,
    /// `Draw` if the board is now full, otherwise `Active` for the opponent.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotActive`], [`MatchError::WrongTurn`],
    /// [`MatchError::OutOfBounds`] or [`MatchError::CellOccupied`]. Nothing
    /// is mutated on error.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn apply_move(&mut self, position: Position, color: Color) -> Result<&MatchStatus, MatchError> {
        let current = self.current.as_mut().ok_or(MatchError::NotActive)?;
        let MatchStatus::Active { to_move } = current.status else {
            debug!(status = ?current.status, "Move rejected, match is not active");
            return Err(MatchError::NotActive);
        };
        if color != to_move {
            warn!(expected = %to_move, actual = %color, "Move out of turn");
            return Err(MatchError::WrongTurn {
                expected: to_move,
                actual: color,
            });
        }

        current.board.set(position, color)?;
        let entry = current.history.record(color, position);
        debug!(sequence = entry.sequence, %position, %color, "Move applied");

        current.status = if let Some(square) = find_square(&current.board, color) {
            info!(winner = %color, %square, "Square completed");
            MatchStatus::Won {
                winner: color,
                square: Some(square),
            }
        } else if is_draw(&current.board, color) {
            info!("Board full, match drawn");
            MatchStatus::Draw
        } else {
            MatchStatus::Active {
                to_move: color.opponent(),
            }
        };

        Ok(&current.status)
    }

    /// Ends an active match with an externally declared outcome.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotActive`] if there is no active match.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn conclude(&mut self, outcome: Outcome) -> Result<&MatchStatus, MatchError> {
        let current = self
            .current
            .as_mut()
            .filter(|m| !m.status.is_terminal())
            .ok_or(MatchError::NotActive)?;
        current.status = match outcome {
            Outcome::Won { winner, square } => MatchStatus::Won { winner, square },
            Outcome::Draw => MatchStatus::Draw,
        };
        info!(status = ?current.status, "Match concluded by verdict");
        Ok(&current.status)
    }

    /// The pending oracle turn, if the color to move is oracle-controlled.
    pub fn oracle_turn(&self) -> Option<OracleTurn> {
        let current = self.current.as_ref()?;
        let color = current.status.to_move()?;
        current
            .config
            .is_oracle(color)
            .then(|| OracleTurn::new(self.generation, color, current.board.clone()))
    }

    /// Whether `generation` still identifies the current match.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current.is_some() && self.generation == generation
    }

    /// Current generation; bumped by every start or reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current status, `NotStarted` before the first match.
    pub fn status(&self) -> MatchStatus {
        self.current
            .as_ref()
            .map_or(MatchStatus::NotStarted, |m| m.status)
    }

    /// The running match, if any.
    pub fn current(&self) -> Option<&Match> {
        self.current.as_ref()
    }

    /// Read-only copy of the externally visible state.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            generation: self.generation,
            status: self.status(),
            config: self.current.as_ref().map(|m| m.config),
            board: self.current.as_ref().map(|m| m.board.clone()),
            history: self
                .current
                .as_ref()
                .map(|m| m.history.moves().to_vec())
                .unwrap_or_default(),
        }
    }
}
