use std::io;

use crate::{
    Position,
    entity::Entity,
    maze::{CellKind, Maze},
};

/// Marker placed in front of each trail line.
pub const TRAIL_MARKER: char = '>';

/// One line of text drawn below (or over) the maze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLine {
    pub line: usize,
    pub text: String,
}

/// Everything a renderer needs to paint one screen.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub maze: &'a Maze,
    pub entity: Position,
    pub overlay: Vec<OverlayLine>,
}

impl<'a> Frame<'a> {
    /// Composes the frame for the current state: a status line right below
    /// the maze, then up to `history_len` trail entries, most recent first.
    pub fn compose(maze: &'a Maze, entity: &Entity, won: bool, history_len: usize) -> Self {
        let status_line = maze.height();
        let status = if won {
            "You win!".to_string()
        } else {
            format!("acc:{}", entity.ticks_per_second())
        };

        let mut overlay = vec![OverlayLine {
            line: status_line,
            text: status,
        }];
        overlay.extend(
            entity
                .recent_history(history_len)
                .enumerate()
                .map(|(i, id)| OverlayLine {
                    line: status_line + 1 + i,
                    text: format!("{TRAIL_MARKER}{id}"),
                }),
        );

        Frame {
            maze,
            entity: entity.position(),
            overlay,
        }
    }

    /// Glyphs row by row, with the entity drawn over its cell.
    pub fn glyph_rows(&self) -> impl Iterator<Item = Vec<Glyph>> + '_ {
        self.maze
            .grid()
            .rows()
            .enumerate()
            .map(move |(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(col, cell)| {
                        if Position::new(row, col) == self.entity {
                            Glyph::Entity
                        } else {
                            Glyph::from(cell.kind)
                        }
                    })
                    .collect()
            })
    }

    /// The maze as plain text, one string per row.
    pub fn text_rows(&self) -> Vec<String> {
        self.glyph_rows()
            .map(|glyphs| glyphs.into_iter().map(Glyph::symbol).collect())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Open,
    Wall,
    Exit,
    Entity,
}

impl From<CellKind> for Glyph {
    fn from(kind: CellKind) -> Self {
        match kind {
            CellKind::Open => Glyph::Open,
            CellKind::Wall => Glyph::Wall,
            CellKind::Exit => Glyph::Exit,
        }
    }
}

impl Glyph {
    pub fn symbol(self) -> char {
        match self {
            Glyph::Open => ' ',
            Glyph::Wall => 'W',
            Glyph::Exit => 'S',
            Glyph::Entity => 'T',
        }
    }
}

/// Paints frames onto some output surface.
pub trait Renderer {
    fn draw_frame(&mut self, frame: &Frame<'_>) -> io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::CellKind::{Exit as E, Open as O, Wall as W};
    use crate::movement::{Direction, apply_move};

    fn maze() -> Maze {
        Maze::build(vec![
            vec![W, W, W, W],
            vec![W, O, O, W],
            vec![W, O, E, W],
            vec![W, W, W, W],
        ])
        .unwrap()
    }

    #[test]
    fn draws_symbols() {
        let maze = maze();
        let entity = Entity::new(Position::new(1, 1), 10);
        let frame = Frame::compose(&maze, &entity, false, 10);
        assert_eq!(frame.text_rows(), vec!["WWWW", "WT W", "W SW", "WWWW"]);
        let rows: Vec<Vec<Glyph>> = frame.glyph_rows().collect();
        assert_eq!(rows[1][1], Glyph::Entity);
        assert_eq!(rows[2][2], Glyph::Exit);
        assert_eq!(rows[0][0], Glyph::from(CellKind::Wall));
    }

    #[test]
    fn status_line_sits_below_the_maze() {
        let maze = maze();
        let entity = Entity::new(Position::new(1, 1), 7);
        let frame = Frame::compose(&maze, &entity, false, 10);
        assert_eq!(
            frame.overlay,
            vec![OverlayLine {
                line: 4,
                text: "acc:7".into()
            }]
        );
        let won = Frame::compose(&maze, &entity, true, 10);
        assert_eq!(won.overlay[0].text, "You win!");
    }

    #[test]
    fn trail_lines_are_most_recent_first() {
        let maze = maze();
        let mut entity = Entity::new(Position::new(1, 1), 10);
        entity.record_visit(&maze);
        apply_move(&mut entity, &maze, Direction::Right);
        entity.record_visit(&maze);

        let frame = Frame::compose(&maze, &entity, false, 10);
        let newest = maze.cell_at(1, 2).unwrap().id;
        let oldest = maze.cell_at(1, 1).unwrap().id;
        assert_eq!(frame.overlay.len(), 3);
        assert_eq!(frame.overlay[1].line, 5);
        assert_eq!(frame.overlay[1].text, format!(">{newest}"));
        assert_eq!(frame.overlay[2].line, 6);
        assert_eq!(frame.overlay[2].text, format!(">{oldest}"));

        let short = Frame::compose(&maze, &entity, false, 1);
        assert_eq!(short.overlay.len(), 2);
    }
}
