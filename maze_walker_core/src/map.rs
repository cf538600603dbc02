use serde::{Deserialize, Serialize};

use crate::Position;

/// Represents errors raised while shaping a grid from rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Layout has no rows")]
    Empty,
    #[error("Layout has zero width")]
    ZeroWidth,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    Jagged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A generic, read-only 2D grid.
///
/// Stores elements of type `T` in a flat vector using row-major order.
/// Once built, the shape never changes and no cell can be replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Builds a grid from a list of rows.
    ///
    /// Fails if there are no rows, if the first row is empty, or if any row
    /// length differs from the first.
    pub fn from_rows<R>(rows: impl IntoIterator<Item = R>) -> Result<Self, GridError>
    where
        R: IntoIterator<Item = T>,
    {
        let mut cells = Vec::new();
        let mut width = 0;
        let mut height = 0;

        for (row, values) in rows.into_iter().enumerate() {
            let before = cells.len();
            cells.extend(values);
            let found = cells.len() - before;
            if row == 0 {
                if found == 0 {
                    return Err(GridError::ZeroWidth);
                }
                width = found;
            } else if found != width {
                return Err(GridError::Jagged {
                    row,
                    expected: width,
                    found,
                });
            }
            height += 1;
        }

        if height == 0 {
            return Err(GridError::Empty);
        }

        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    /// Returns the number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if self.is_valid(row, col) {
            Some(row * self.width + col)
        } else {
            None
        }
    }

    /// Checks if the given coordinates are within the grid boundaries.
    #[inline]
    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    /// Gets the cell at the given coordinates, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.index_of(row, col).map(|index| &self.cells[index])
    }

    /// Returns an iterator over the rows, each as a slice.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width)
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Position::new(index / width, index % width), cell))
    }
}
