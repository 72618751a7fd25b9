//! Game rules for Squares.
//!
//! Pure functions over a [`Board`](super::Board); the engine calls them
//! after every move and never keeps derived state of its own.

pub mod draw;
pub mod square;

pub use draw::is_draw;
pub use square::find_square;
