use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::{
    Position,
    map::{Grid, GridError},
};

/// The built-in maze, in the text map format understood by [`parse_map`].
pub const CLASSIC_MAP: &str = include_str!("../maps/classic.txt");

/// Represents the static kind of a maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Open,
    Wall,
    Exit,
}

/// Opaque token identifying one cell, unique across every maze built by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId(u64);

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

impl CellId {
    fn fresh() -> Self {
        CellId(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub id: CellId,
    pub kind: CellKind,
}

/// Errors raised while loading a maze and its start position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid layout: {0}")]
    Shape(#[from] GridError),
    #[error("Unknown map code '{code}' at position ({row}, {col})")]
    UnknownCode {
        code: String,
        row: usize,
        col: usize,
    },
    #[error("Multiple start positions ('ST') found")]
    MultipleStarts,
    #[error("Start position {start} is outside the {height}x{width} maze")]
    StartOutOfBounds {
        start: Position,
        width: usize,
        height: usize,
    },
    #[error("Start position {0} is inside a wall")]
    StartInWall(Position),
}

/// The maze: an immutable grid of cells.
#[derive(Debug, Clone)]
pub struct Maze {
    cells: Grid<Cell>,
}

impl Maze {
    /// Builds a maze from rows of cell kinds, giving every cell a fresh id.
    pub fn build<R>(layout: impl IntoIterator<Item = R>) -> Result<Self, LayoutError>
    where
        R: IntoIterator<Item = CellKind>,
    {
        let cells = Grid::from_rows(layout.into_iter().map(|row| {
            row.into_iter()
                .map(|kind| Cell {
                    id: CellId::fresh(),
                    kind,
                })
                .collect::<Vec<_>>()
        }))?;
        Ok(Maze { cells })
    }

    /// Builds the built-in maze along with its start position.
    pub fn classic() -> Result<(Self, Option<Position>), LayoutError> {
        let parsed = parse_map(CLASSIC_MAP)?;
        Ok((Maze::build(parsed.layout)?, parsed.start))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.cells.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// Returns the cell at the given coordinates, or `None` when out of range.
    /// Callers decide what an out-of-range neighbour means.
    #[inline]
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row, col)
    }

    pub fn grid(&self) -> &Grid<Cell> {
        &self.cells
    }

    /// Checks that `start` can hold the entity.
    pub fn validate_start(&self, start: Position) -> Result<(), LayoutError> {
        match self.cell_at(start.row, start.col) {
            None => Err(LayoutError::StartOutOfBounds {
                start,
                width: self.width(),
                height: self.height(),
            }),
            Some(cell) if cell.kind == CellKind::Wall => Err(LayoutError::StartInWall(start)),
            Some(_) => Ok(()),
        }
    }
}

/// A map file after parsing, before cells get their ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMap {
    pub layout: Vec<Vec<CellKind>>,
    pub start: Option<Position>,
}

/// Parses a text map: one row per line, whitespace separated codes.
///
/// `WL`/`WA` wall, `BL` open, `EX` exit, `ST` open cell marking the start.
pub fn parse_map(map_string: &str) -> Result<ParsedMap, LayoutError> {
    let mut start = None;
    let mut layout = Vec::new();

    for (row, line) in map_string.trim().lines().enumerate() {
        let mut kinds = Vec::new();
        for (col, token) in line.split_whitespace().enumerate() {
            let kind = match token {
                "WL" | "WA" => CellKind::Wall,
                "BL" => CellKind::Open,
                "EX" => CellKind::Exit,
                "ST" => {
                    if start.is_some() {
                        return Err(LayoutError::MultipleStarts);
                    }
                    start = Some(Position::new(row, col));
                    CellKind::Open
                }
                unknown => {
                    return Err(LayoutError::UnknownCode {
                        code: unknown.to_string(),
                        row,
                        col,
                    });
                }
            };
            kinds.push(kind);
        }
        layout.push(kinds);
    }

    // Shape errors surface here rather than at build time so callers get them early.
    Grid::from_rows(layout.iter().map(|row| row.iter().copied()))?;

    Ok(ParsedMap { layout, start })
}
