//! Collision and legality rules for one-cell steps through a [`Maze`].
//!
//! The bound check is one-sided: a vertical step needs
//! `row < height - 1` and a horizontal step needs `col < width - 1`,
//! whichever way the step goes. Steps below index 0 are simply not valid
//! indices. Mazes with a wall border never notice; open outer rows do.

use serde::{Deserialize, Serialize};

use crate::{
    Position,
    entity::Entity,
    maze::{CellKind, Maze},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit `(row, col)` delta of a step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Coordinate one step away, if the axis bound check lets the step be examined.
fn step_target(maze: &Maze, pos: Position, direction: Direction) -> Option<Position> {
    let (dr, dc) = direction.delta();
    let in_axis = match direction {
        Direction::Up | Direction::Down => pos.row < maze.height() - 1,
        Direction::Left | Direction::Right => pos.col < maze.width() - 1,
    };
    if !in_axis {
        return None;
    }
    Some(Position {
        row: pos.row.checked_add_signed(dr)?,
        col: pos.col.checked_add_signed(dc)?,
    })
}

/// Returns the destination of a legal step, or `None` when the step is blocked.
pub fn destination(maze: &Maze, pos: Position, direction: Direction) -> Option<Position> {
    let target = step_target(maze, pos, direction)?;
    match maze.cell_at(target.row, target.col) {
        Some(cell) if cell.kind != CellKind::Wall => Some(target),
        _ => None,
    }
}

/// Whether a step is legal, ignoring momentum.
pub fn is_legal(maze: &Maze, pos: Position, direction: Direction) -> bool {
    destination(maze, pos, direction).is_some()
}

/// Legal directions from `pos`, in [`Direction::ALL`] order.
///
/// When `momentum` is itself legal the result is narrowed to just that
/// direction; the full set only comes back once it is blocked.
pub fn legal_directions(maze: &Maze, pos: Position, momentum: Option<Direction>) -> Vec<Direction> {
    if let Some(heading) = momentum {
        if is_legal(maze, pos, heading) {
            return vec![heading];
        }
    }
    Direction::ALL
        .into_iter()
        .filter(|&direction| is_legal(maze, pos, direction))
        .collect()
}

/// Moves the entity one cell if the step is legal, otherwise leaves it in place.
/// Returns the resulting position.
pub fn apply_move(entity: &mut Entity, maze: &Maze, direction: Direction) -> Position {
    if let Some(target) = destination(maze, entity.position(), direction) {
        entity.set_position(target);
    }
    entity.position()
}

pub fn is_at_exit(maze: &Maze, pos: Position) -> bool {
    maze.cell_at(pos.row, pos.col)
        .is_some_and(|cell| cell.kind == CellKind::Exit)
}
