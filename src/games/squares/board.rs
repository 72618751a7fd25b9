//! Fixed-size Squares board.

use super::{Cell, Color, MatchError, Position};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Smallest supported board side.
pub const MIN_SIZE: usize = 3;
/// Largest supported board side.
pub const MAX_SIZE: usize = 10;

/// N×N grid of cells, stored row-major (`index = y * size + x`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidSize`] unless `MIN_SIZE <= size <= MAX_SIZE`.
    #[instrument]
    pub fn new(size: usize) -> Result<Self, MatchError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(MatchError::InvalidSize(size));
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
        })
    }

    /// Parses the wire form produced by [`Board::encode`].
    ///
    /// Accepts `.` or a space for empty cells and `W`/`B` in either case.
    /// Returns `None` on a wrong length or an unknown character.
    #[instrument]
    pub fn decode(size: usize, data: &str) -> Option<Self> {
        let mut board = Self::new(size).ok()?;
        let chars: Vec<char> = data.chars().collect();
        if chars.len() != size * size {
            return None;
        }
        for (cell, c) in board.cells.iter_mut().zip(chars) {
            *cell = match c {
                '.' | ' ' => Cell::Empty,
                other => Cell::Occupied(Color::from_symbol(other)?),
            };
        }
        Some(board)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `pos` lies on the board.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// Converts signed coordinates into a position on this board.
    pub fn position_at(&self, x: i64, y: i64) -> Option<Position> {
        let size = self.size as i64;
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Some(Position::new(x as usize, y as usize))
        } else {
            None
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.y * self.size + pos.x)
    }

    /// Gets the cell at `pos`, or `None` if off the board.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Whether `pos` is on the board and empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    /// Places a token.
    ///
    /// # Errors
    ///
    /// [`MatchError::OutOfBounds`] for a position off the board,
    /// [`MatchError::CellOccupied`] if the cell is not empty. The board is
    /// unchanged on error.
    #[instrument(skip(self), fields(size = self.size))]
    pub fn set(&mut self, pos: Position, color: Color) -> Result<(), MatchError> {
        let idx = self
            .index(pos)
            .ok_or(MatchError::OutOfBounds(pos, self.size))?;
        if self.cells[idx] != Cell::Empty {
            return Err(MatchError::CellOccupied(pos));
        }
        self.cells[idx] = Cell::Occupied(color);
        Ok(())
    }

    /// True iff no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// Positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |y| (0..self.size).map(move |x| Position::new(x, y)))
    }

    /// Positions holding `color`, in row-major order.
    pub fn occupied_by(&self, color: Color) -> Vec<Position> {
        self.positions()
            .filter(|p| self.get(*p) == Some(Cell::Occupied(color)))
            .collect()
    }

    /// Empty positions in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.positions().filter(|p| self.is_empty(*p)).collect()
    }

    /// Deterministic wire form: one character per cell, row-major.
    pub fn encode(&self) -> String {
        self.cells.iter().map(|c| c.symbol()).collect()
    }
}

impl std::fmt::Display for Board {
    /// Column header followed by one line per row.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header: Vec<String> = (0..self.size).map(|x| x.to_string()).collect();
        writeln!(f, "  {}", header.join(" "))?;
        for y in 0..self.size {
            let row: Vec<String> = (0..self.size)
                .map(|x| self.cells[y * self.size + x].symbol().to_string())
                .collect();
            writeln!(f, "{} {}", y, row.join(" "))?;
        }
        Ok(())
    }
}
