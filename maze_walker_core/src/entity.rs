use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Position,
    maze::{CellId, Maze},
    movement::Direction,
};

/// The movable marker: position, trail of visited cells and walking speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    position: Position,
    /// Visited cell ids, oldest first. Never holds the same id twice in a row.
    history: Vec<CellId>,
    /// Autonomous steps per second. Always at least 1.
    ticks_per_second: u32,
    /// The opposite of the direction last moved.
    pub last_move: Direction,
}

impl Entity {
    pub fn new(position: Position, ticks_per_second: u32) -> Self {
        Entity {
            position,
            history: Vec::new(),
            ticks_per_second: ticks_per_second.max(1),
            last_move: Direction::Up,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn history(&self) -> &[CellId] {
        &self.history
    }

    #[inline]
    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Time between two autonomous steps at the current speed.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second
    }

    /// Appends the current cell to the history unless it is already the last entry.
    /// Returns whether anything was appended.
    pub fn record_visit(&mut self, maze: &Maze) -> bool {
        let Some(cell) = maze.cell_at(self.position.row, self.position.col) else {
            return false;
        };
        if self.history.last() == Some(&cell.id) {
            return false;
        }
        self.history.push(cell.id);
        true
    }

    /// The last `n` visited ids, most recent first.
    pub fn recent_history(&self, n: usize) -> impl Iterator<Item = CellId> + '_ {
        self.history.iter().rev().take(n).copied()
    }

    /// Changes the speed by `delta`, never going below one tick per second.
    pub fn adjust_speed(&mut self, delta: i32) -> u32 {
        let adjusted = self.ticks_per_second.saturating_add_signed(delta);
        self.ticks_per_second = adjusted.max(1);
        self.ticks_per_second
    }

    pub fn speed_up(&mut self) -> u32 {
        self.adjust_speed(1)
    }

    pub fn speed_down(&mut self) -> u32 {
        self.adjust_speed(-1)
    }
}
