use std::io::{self, Stdout};

use maze_walker_core::render::{Frame as MazeFrame, Glyph, Renderer};
use ratatui::{prelude::*, widgets::*};

const HELP: &str = "Arrows move | Ctrl+S/+ faster | Ctrl+A/- slower | Esc/q quit";

/// Paints maze frames onto the terminal.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalRenderer {
    pub fn new(terminal: Terminal<CrosstermBackend<Stdout>>) -> Self {
        Self { terminal }
    }
}

impl Renderer for TerminalRenderer {
    fn draw_frame(&mut self, frame: &MazeFrame<'_>) -> io::Result<()> {
        self.terminal.draw(|f| ui(f, frame))?;
        Ok(())
    }
}

/// Renders the maze, its overlay and the key help.
fn ui(frame: &mut Frame, maze_frame: &MazeFrame<'_>) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(frame.area());

    let maze = Paragraph::new(maze_lines(maze_frame))
        .block(Block::default().title("Maze Walker").borders(Borders::ALL));
    frame.render_widget(maze, main_layout[0]);

    let help = Paragraph::new(HELP)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, main_layout[1]);
}

fn glyph_style(glyph: Glyph) -> Style {
    match glyph {
        Glyph::Open => Style::default(),
        Glyph::Wall => Style::default().fg(Color::Black).bg(Color::Yellow),
        Glyph::Exit => Style::default().fg(Color::Red).bg(Color::LightGreen),
        Glyph::Entity => Style::default().fg(Color::Green).bold(),
    }
}

/// One line per maze row, then the overlay lines at their own line numbers.
pub fn maze_lines(frame: &MazeFrame<'_>) -> Vec<Line<'static>> {
    let height = frame.maze.height();

    let mut lines: Vec<Line<'static>> = frame
        .glyph_rows()
        .map(|glyphs| {
            let spans: Vec<Span<'static>> = glyphs
                .into_iter()
                .map(|glyph| Span::styled(glyph.symbol().to_string(), glyph_style(glyph)))
                .collect();
            Line::from(spans)
        })
        .collect();

    for overlay in &frame.overlay {
        if lines.len() <= overlay.line {
            lines.resize(overlay.line + 1, Line::default());
        }
        let style = if overlay.line == height {
            Style::default().fg(Color::Black).bg(Color::LightMagenta)
        } else {
            Style::default()
        };
        lines[overlay.line] = Line::from(Span::styled(overlay.text.clone(), style));
    }

    lines
}
