//! Line-oriented console front end.
//!
//! Commands (case-insensitive):
//!
//! ```text
//! GAME N, TYPE C, TYPE C   start a match; TYPE is user|comp, C is W|B
//! MOVE X, Y                play the human move for the color to move
//! RESET                    new round with the same players
//! BOARD | HISTORY          show the board or the move list
//! HELP | EXIT
//! ```
//!
//! The console holds no game logic: it parses commands, forwards them to a
//! [`MatchDriver`] and prints the events the driver reports.

use crate::games::squares::{Color, MatchConfig, MatchStatus, Position};
use crate::orchestrator::{MatchDriver, MatchEvent};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

const HELP: &str = "\
Available commands:
GAME N, U1, U2 - start a new game
  N: board size (3-10)
  U1, U2: player parameters (TYPE C)
    TYPE: 'user' or 'comp'
    C: color ('W' or 'B')
MOVE X, Y - make a move
RESET - start a new round with the same players
BOARD - show the board
HISTORY - show the moves played
EXIT - exit program
HELP - show this help message";

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands.
    Continue,
    /// Stop.
    Exit,
}

/// Parses commands and renders match events to `out`.
pub struct Console<W> {
    driver: MatchDriver,
    events: mpsc::UnboundedReceiver<MatchEvent>,
    out: W,
}

impl<W: Write> Console<W> {
    /// Wraps `driver`, printing to `out`.
    pub fn new(driver: MatchDriver, out: W) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        Self {
            driver: driver.with_events(tx),
            events,
            out,
        }
    }

    /// Output written so far.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Reads commands until `EXIT` or end of input.
    #[instrument(skip_all)]
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> std::io::Result<()> {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if self.process(&line).await? == Flow::Exit {
                break;
            }
            self.out.flush()?;
        }
        Ok(())
    }

    /// Executes one command line.
    #[instrument(skip(self))]
    pub async fn process(&mut self, line: &str) -> std::io::Result<Flow> {
        let trimmed = line.trim();
        let (command, args) = match trimmed.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (trimmed, ""),
        };

        match command.to_ascii_uppercase().as_str() {
            "GAME" => self.game(args).await?,
            "MOVE" => self.play(args).await?,
            "RESET" => self.reset().await?,
            "BOARD" => self.board()?,
            "HISTORY" => self.history()?,
            "HELP" => writeln!(self.out, "{}", HELP)?,
            "EXIT" => return Ok(Flow::Exit),
            _ => self.incorrect()?,
        }
        Ok(Flow::Continue)
    }

    async fn game(&mut self, args: &str) -> std::io::Result<()> {
        let Some(config) = parse_game(args) else {
            return self.incorrect();
        };
        match self.driver.start(config).await {
            Ok(_) => {
                writeln!(self.out, "New game started")?;
                self.drain_events()
            }
            Err(e) => {
                debug!(error = %e, "Start rejected");
                self.incorrect()
            }
        }
    }

    async fn play(&mut self, args: &str) -> std::io::Result<()> {
        let Some(color) = self.driver.snapshot().status().to_move() else {
            return writeln!(self.out, "Game not started");
        };
        let Some(position) = parse_move(args) else {
            return self.incorrect();
        };
        match self.driver.apply_move(position, color).await {
            Ok(_) => self.drain_events(),
            Err(e) => {
                debug!(error = %e, "Move rejected");
                self.incorrect()
            }
        }
    }

    async fn reset(&mut self) -> std::io::Result<()> {
        match self.driver.reset().await {
            Ok(_) => {
                writeln!(self.out, "New round started")?;
                self.drain_events()
            }
            Err(_) => writeln!(self.out, "Game not started"),
        }
    }

    fn board(&mut self) -> std::io::Result<()> {
        match self.driver.snapshot().board() {
            Some(board) => write!(self.out, "{}", board),
            None => writeln!(self.out, "Game not started"),
        }
    }

    fn history(&mut self) -> std::io::Result<()> {
        let snapshot = self.driver.snapshot();
        if snapshot.history().is_empty() {
            return writeln!(self.out, "No moves yet");
        }
        for entry in snapshot.history() {
            writeln!(self.out, "{}", entry)?;
        }
        Ok(())
    }

    fn incorrect(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "Incorrect command")
    }

    fn drain_events(&mut self) -> std::io::Result<()> {
        while let Ok(event) = self.events.try_recv() {
            match event {
                MatchEvent::MoveApplied { entry, board } => {
                    writeln!(self.out, "{} {}", entry.player, entry.position)?;
                    write!(self.out, "{}", board)?;
                }
                MatchEvent::OracleFallback { color, reason } => {
                    writeln!(self.out, "{} plays a random move: {}", color, reason)?;
                }
                MatchEvent::Finished { status } => self.finished(status)?,
                MatchEvent::Started { .. }
                | MatchEvent::VerdictAdopted { .. }
                | MatchEvent::StaleResponseDiscarded { .. } => {}
            }
        }
        Ok(())
    }

    fn finished(&mut self, status: MatchStatus) -> std::io::Result<()> {
        match status {
            MatchStatus::Won { winner, square } => {
                writeln!(self.out, "Game finished. {} wins!", winner)?;
                if let Some(square) = square {
                    writeln!(self.out, "Winning square coordinates: {}", square)?;
                }
                Ok(())
            }
            MatchStatus::Draw => writeln!(self.out, "Game finished. Draw"),
            MatchStatus::NotStarted | MatchStatus::Active { .. } => Ok(()),
        }
    }
}

/// Parses `N, TYPE C, TYPE C`.
fn parse_game(args: &str) -> Option<MatchConfig> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let [size, first, second] = parts.as_slice() else {
        return None;
    };
    let size = size.parse().ok()?;
    let (first_color, first_comp) = parse_player(first)?;
    let (second_color, second_comp) = parse_player(second)?;
    if first_color == second_color {
        return None;
    }
    let (white_comp, black_comp) = match first_color {
        Color::White => (first_comp, second_comp),
        Color::Black => (second_comp, first_comp),
    };
    Some(MatchConfig::with_sides(size, white_comp, black_comp))
}

/// Parses `TYPE C` into the color and whether it is computer-controlled.
fn parse_player(spec: &str) -> Option<(Color, bool)> {
    let mut words = spec.split_whitespace();
    let kind = words.next()?.to_ascii_lowercase();
    let color = words.next()?;
    if words.next().is_some() {
        return None;
    }
    let comp = match kind.as_str() {
        "user" => false,
        "comp" => true,
        _ => return None,
    };
    let mut chars = color.chars();
    let color = Color::from_symbol(chars.next()?)?;
    chars.next().is_none().then_some((color, comp))
}

/// Parses `X, Y` or `X Y`.
fn parse_move(args: &str) -> Option<Position> {
    let normalized = args.replace(',', " ");
    let coords: Vec<&str> = normalized.split_whitespace().collect();
    let [x, y] = coords.as_slice() else {
        return None;
    };
    Some(Position::new(x.parse().ok()?, y.parse().ok()?))
}
