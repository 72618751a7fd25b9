//! Core domain types for Squares.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Token color. White always moves first.
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
)]
pub enum Color {
    /// White tokens (`W` on the wire).
    #[strum(to_string = "W")]
    White,
    /// Black tokens (`B` on the wire).
    #[strum(to_string = "B")]
    Black,
}

impl Color {
    /// Returns the other color.
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Board character for a cell occupied by this color.
    pub fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }

    /// Parses `W`/`B` in either case.
    #[instrument]
    pub fn from_symbol(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'B' => Some(Color::Black),
            _ => None,
        }
    }
}

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// No token.
    #[default]
    Empty,
    /// Token of the given color.
    Occupied(Color),
}

impl Cell {
    /// Wire character: `.` for empty, `W`/`B` otherwise.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Occupied(color) => color.symbol(),
        }
    }
}

/// A board coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl Position {
    /// Creates a position.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four vertices of a winning square.
///
/// Vertices are kept in detection order: the two seed points of the edge
/// first, then the two points derived by rotating that edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square([Position; 4]);

impl Square {
    /// Creates a square from its vertices in traversal order.
    pub const fn new(vertices: [Position; 4]) -> Self {
        Self(vertices)
    }

    /// Vertices in traversal order.
    pub fn vertices(&self) -> &[Position; 4] {
        &self.0
    }

    /// Whether `pos` is one of the vertices.
    pub fn contains(&self, pos: Position) -> bool {
        self.0.contains(&pos)
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| format!("({},{})", p.x, p.y)).collect();
        write!(f, "{}", parts.join(" "))
    }
}
