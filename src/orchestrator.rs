//! Match orchestration between human callers and the oracle.
//!
//! [`MatchDriver`] owns one [`MatchEngine`] behind a mutex and is the only
//! entry point a presentation layer talks to. Human moves go through
//! [`MatchDriver::apply_move`]; whenever the side to move is
//! oracle-controlled the driver asks the oracle before returning, so a
//! call only completes once it is a human's turn again or the match is
//! over.
//!
//! Oracle requests run without holding the engine lock. Each request is
//! tagged with the generation it was issued under: a reset bumps the
//! generation, cancels the in-flight request, and any answer that still
//! arrives for an old generation is dropped.

use crate::games::squares::{
    Board, Color, MatchConfig, MatchEngine, MatchError, MatchSnapshot, MatchStatus, Move,
    OracleTurn, Outcome, Position,
};
use crate::oracle::{MoveOracle, OracleError, OracleResult, Verdict};
use derive_getters::Getters;
use derive_setters::Setters;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Timing knobs for oracle turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct DriverSettings {
    /// Upper bound on one oracle call; expiry counts as an oracle failure.
    oracle_timeout: Duration,
    /// Minimum time between asking the oracle and applying its move.
    move_delay: Duration,
}

impl DriverSettings {
    /// No pacing delay, default timeout. For tests and batch play.
    pub fn instant() -> Self {
        Self::default().with_move_delay(Duration::ZERO)
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            oracle_timeout: Duration::from_secs(5),
            move_delay: Duration::from_millis(500),
        }
    }
}

/// Why an oracle move was replaced by a random one.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum FallbackReason {
    /// The oracle named a cell that is off the board or occupied.
    #[display("Oracle named illegal cell {}", _0)]
    ProtocolViolation(Position),
    /// The oracle call failed or timed out.
    #[display("{}", _0)]
    OracleFailed(OracleError),
}

/// Notifications for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// A match began.
    Started {
        /// Generation of the new match.
        generation: u64,
    },
    /// A token was placed, by a human or the oracle.
    MoveApplied {
        /// The recorded move.
        entry: Move,
        /// Board after the move.
        board: Board,
    },
    /// The oracle's answer was unusable and a random cell was played.
    OracleFallback {
        /// Color the oracle was playing.
        color: Color,
        /// What went wrong.
        reason: FallbackReason,
    },
    /// The oracle ended the match with a verdict.
    VerdictAdopted {
        /// Adopted result.
        outcome: Outcome,
    },
    /// An oracle answer arrived for a match that no longer exists.
    StaleResponseDiscarded {
        /// Generation the request was issued under.
        generation: u64,
    },
    /// The match reached `Won` or `Draw`.
    Finished {
        /// Terminal status.
        status: MatchStatus,
    },
}

struct DriverState {
    engine: MatchEngine,
    rng: StdRng,
}

/// Serialized access to one match plus the oracle that plays its
/// oracle-controlled sides.
///
/// Cloning shares the same match.
#[derive(Clone)]
pub struct MatchDriver {
    state: Arc<Mutex<DriverState>>,
    oracle: Arc<dyn MoveOracle>,
    settings: DriverSettings,
    generation_tx: Arc<watch::Sender<u64>>,
    events: Option<mpsc::UnboundedSender<MatchEvent>>,
}

impl std::fmt::Debug for MatchDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchDriver")
            .field("oracle", &self.oracle.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl MatchDriver {
    /// Creates a driver with no match started.
    #[instrument(skip(oracle), fields(oracle = oracle.name()))]
    pub fn new(oracle: Arc<dyn MoveOracle>, settings: DriverSettings) -> Self {
        Self::with_rng(oracle, settings, StdRng::from_os_rng())
    }

    /// Like [`MatchDriver::new`] with a fixed seed for fallback moves.
    #[instrument(skip(oracle), fields(oracle = oracle.name()))]
    pub fn with_seed(oracle: Arc<dyn MoveOracle>, settings: DriverSettings, seed: u64) -> Self {
        Self::with_rng(oracle, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(oracle: Arc<dyn MoveOracle>, settings: DriverSettings, rng: StdRng) -> Self {
        let (generation_tx, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(DriverState {
                engine: MatchEngine::new(),
                rng,
            })),
            oracle,
            settings,
            generation_tx: Arc::new(generation_tx),
            events: None,
        }
    }

    /// Sends [`MatchEvent`]s to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<MatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn lock(&self) -> MutexGuard<'_, DriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: MatchEvent) {
        if let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }

    /// Starts a new match, replacing any current one. If White is
    /// oracle-controlled the oracle turns are played before returning.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidSize`]; the current match is kept in that case.
    #[instrument(skip(self))]
    pub async fn start(&self, config: MatchConfig) -> Result<MatchSnapshot, MatchError> {
        let generation = {
            let mut state = self.lock();
            state.engine.start(config)?;
            self.begin_generation(&state.engine)
        };
        self.run_oracle_turns(generation).await;
        Ok(self.snapshot())
    }

    /// Starts a new round with the current config. Any outstanding oracle
    /// request for the old round is cancelled.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotActive`] if no match was ever started.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<MatchSnapshot, MatchError> {
        let generation = {
            let mut state = self.lock();
            state.engine.reset()?;
            self.begin_generation(&state.engine)
        };
        self.run_oracle_turns(generation).await;
        Ok(self.snapshot())
    }

    // Called with the engine lock held so no turn can observe the new
    // match before cancellation is signalled.
    fn begin_generation(&self, engine: &MatchEngine) -> u64 {
        let generation = engine.generation();
        self.generation_tx.send_replace(generation);
        self.emit(MatchEvent::Started { generation });
        generation
    }

    /// Plays a human move for `color`, then any oracle turns that follow.
    ///
    /// # Errors
    ///
    /// [`MatchError::OracleControlled`] if `color` belongs to the oracle,
    /// otherwise whatever [`MatchEngine::apply_move`] rejects. The match is
    /// unchanged on error.
    #[instrument(skip(self))]
    pub async fn apply_move(&self, position: Position, color: Color) -> Result<MatchSnapshot, MatchError> {
        let generation = {
            let mut state = self.lock();
            let config = state
                .engine
                .current()
                .map(|m| *m.config())
                .ok_or(MatchError::NotActive)?;
            if config.is_oracle(color) && state.engine.status().to_move().is_some() {
                warn!(%color, "Direct move for oracle-controlled side rejected");
                return Err(MatchError::OracleControlled(color));
            }
            let status = *state.engine.apply_move(position, color)?;
            self.after_move(&state.engine, status);
            state.engine.generation()
        };
        self.run_oracle_turns(generation).await;
        Ok(self.snapshot())
    }

    /// Current externally visible state.
    pub fn snapshot(&self) -> MatchSnapshot {
        self.lock().engine.snapshot()
    }

    fn after_move(&self, engine: &MatchEngine, status: MatchStatus) {
        if let Some(entry) = engine.current().and_then(|m| m.history().last().copied()) {
            let board = engine.current().map(|m| m.board().clone());
            if let Some(board) = board {
                self.emit(MatchEvent::MoveApplied { entry, board });
            }
        }
        if status.is_terminal() {
            self.emit(MatchEvent::Finished { status });
        }
    }

    /// Plays oracle turns for `generation` until a human is to move, the
    /// match ends, or the match is replaced.
    async fn run_oracle_turns(&self, generation: u64) {
        loop {
            let turn = {
                let state = self.lock();
                if !state.engine.is_current(generation) {
                    return;
                }
                match state.engine.oracle_turn() {
                    Some(turn) => turn,
                    None => return,
                }
            };
            if !self.take_oracle_turn(turn).await {
                return;
            }
        }
    }

    /// Asks the oracle, waits out the pacing delay, and applies the result.
    /// Returns false when the turn was discarded or could not be applied.
    #[instrument(skip(self, turn), fields(generation = turn.generation(), color = %turn.color()))]
    async fn take_oracle_turn(&self, turn: OracleTurn) -> bool {
        let generation = *turn.generation();
        let mut generation_rx = self.generation_tx.subscribe();
        let started = Instant::now();
        let timeout = self.settings.oracle_timeout;
        let delay = self.settings.move_delay;

        let answer = async {
            let result =
                match tokio::time::timeout(timeout, self.oracle.request_move(turn.board(), *turn.color()))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(OracleError::Timeout(timeout)),
                };
            tokio::time::sleep_until(started + delay).await;
            result
        };

        let result = tokio::select! {
            result = answer => result,
            _ = superseded(&mut generation_rx, generation) => {
                info!("Match replaced, oracle request cancelled");
                self.emit(MatchEvent::StaleResponseDiscarded { generation });
                return false;
            }
        };

        let mut state = self.lock();
        self.resolve(&mut state, &turn, result)
    }

    fn resolve(
        &self,
        state: &mut DriverState,
        turn: &OracleTurn,
        result: Result<OracleResult, OracleError>,
    ) -> bool {
        if !state.engine.is_current(*turn.generation()) {
            info!(generation = turn.generation(), "Discarding stale oracle answer");
            self.emit(MatchEvent::StaleResponseDiscarded {
                generation: *turn.generation(),
            });
            return false;
        }
        let color = *turn.color();

        match result {
            Ok(OracleResult::Move {
                position,
                claimed_square,
            }) => {
                let legal = state
                    .engine
                    .current()
                    .is_some_and(|m| m.board().is_empty(position));
                if !legal {
                    warn!(%position, oracle = self.oracle.name(), "Oracle named an illegal cell");
                    return self.fall_back(state, color, FallbackReason::ProtocolViolation(position));
                }
                let applied = self.play(state, position, color);
                if let Some(claimed) = claimed_square {
                    let detected = matches!(
                        state.engine.status(),
                        MatchStatus::Won { square: Some(sq), .. } if sq == claimed
                    );
                    if !detected {
                        debug!(%claimed, "Oracle claimed a square the engine did not detect");
                    }
                }
                applied
            }
            Ok(OracleResult::Verdict(verdict)) => {
                let outcome = match verdict {
                    Verdict::Won { winner, square } => Outcome::Won {
                        winner: winner.unwrap_or(color.opponent()),
                        square,
                    },
                    Verdict::Draw => Outcome::Draw,
                };
                self.conclude(state, outcome)
            }
            Err(e) => {
                warn!(error = %e, oracle = self.oracle.name(), "Oracle failed, falling back");
                self.fall_back(state, color, FallbackReason::OracleFailed(e))
            }
        }
    }

    fn fall_back(&self, state: &mut DriverState, color: Color, reason: FallbackReason) -> bool {
        let empties = state
            .engine
            .current()
            .map(|m| m.board().empty_positions())
            .unwrap_or_default();
        self.emit(MatchEvent::OracleFallback { color, reason });
        match empties.choose(&mut state.rng).copied() {
            Some(position) => {
                debug!(%position, "Playing random fallback move");
                self.play(state, position, color)
            }
            None => {
                warn!("No empty cell left for fallback, declaring a draw");
                self.finish(state, Outcome::Draw).is_some()
            }
        }
    }

    fn play(&self, state: &mut DriverState, position: Position, color: Color) -> bool {
        match state.engine.apply_move(position, color) {
            Ok(status) => {
                let status = *status;
                self.after_move(&state.engine, status);
                true
            }
            Err(e) => {
                error!(error = %e, %position, "Validated oracle move was rejected");
                false
            }
        }
    }

    /// Adopts an oracle verdict.
    fn conclude(&self, state: &mut DriverState, outcome: Outcome) -> bool {
        if state.engine.status().to_move().is_none() {
            error!("Could not adopt verdict, match is not active");
            return false;
        }
        self.emit(MatchEvent::VerdictAdopted { outcome });
        self.finish(state, outcome).is_some()
    }

    /// Ends the match with `outcome` and reports `Finished`.
    fn finish(&self, state: &mut DriverState, outcome: Outcome) -> Option<MatchStatus> {
        match state.engine.conclude(outcome) {
            Ok(status) => {
                let status = *status;
                self.emit(MatchEvent::Finished { status });
                Some(status)
            }
            Err(e) => {
                error!(error = %e, "Could not end match");
                None
            }
        }
    }
}

/// Resolves once the published generation differs from `generation`.
async fn superseded(rx: &mut watch::Receiver<u64>, generation: u64) {
    let changed = rx.wait_for(|current| *current != generation).await.is_ok();
    if !changed {
        // Sender dropped: nothing can replace the match any more.
        std::future::pending::<()>().await;
    }
}
