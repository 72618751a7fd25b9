//! Append-only move log.
//!
//! The log is for display and auditing. Game state is always read from the
//! live board; the history is never replayed to recompute it.

use super::{Color, Position};
use serde::{Deserialize, Serialize};

/// A token placed by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Color that moved.
    pub player: Color,
    /// Cell the token went to.
    pub position: Position,
    /// 1-based sequence number within the match.
    pub sequence: u32,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {} {}", self.sequence, self.player, self.position)
    }
}

/// Ordered moves of one match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistory {
    moves: Vec<Move>,
}

impl MoveHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a move with the next sequence number and returns it.
    pub(crate) fn record(&mut self, player: Color, position: Position) -> Move {
        let entry = Move {
            player,
            position,
            sequence: self.moves.len() as u32 + 1,
        };
        self.moves.push(entry);
        entry
    }

    /// All moves, oldest first.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Most recent move.
    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Number of moves played.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether no move has been played.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_one_and_increments() {
        let mut history = MoveHistory::new();
        let first = history.record(Color::White, Position::new(0, 0));
        let second = history.record(Color::Black, Position::new(1, 0));
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.last(), Some(&second));
        assert_eq!(second.to_string(), "2. B (1, 0)");
    }
}
