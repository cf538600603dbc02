use serde::{Deserialize, Serialize};

pub mod control;
pub mod entity;
pub mod map;
pub mod maze;
pub mod movement;
pub mod render;
pub mod session;
pub mod walker;

/// Represents a 2D grid coordinate, row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
