use std::{io, thread, time::Duration};

use maze_walker_core::{movement::Direction, session::Command};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long a poll waits before checking for shutdown again.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Maps a key press to a command, if it is bound to one.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Up => Some(Command::Move(Direction::Up)),
        KeyCode::Down => Some(Command::Move(Direction::Down)),
        KeyCode::Left => Some(Command::Move(Direction::Left)),
        KeyCode::Right => Some(Command::Move(Direction::Right)),
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key.
        KeyCode::Char('c') if ctrl => Some(Command::Quit),
        KeyCode::Char('s') if ctrl => Some(Command::SpeedUp),
        KeyCode::Char('a') if ctrl => Some(Command::SpeedDown),
        KeyCode::Char('+') => Some(Command::SpeedUp),
        KeyCode::Char('-') => Some(Command::SpeedDown),
        _ => None,
    }
}

/// Reads terminal key events on a dedicated thread and forwards them as commands.
///
/// Stops when `shutdown` is cancelled or the receiving side goes away.
pub fn spawn_key_reader(
    commands: mpsc::Sender<Command>,
    shutdown: CancellationToken,
) -> thread::JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        while !shutdown.is_cancelled() {
            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(command) = command_for(key) {
                debug!(?command, "key pressed");
                if commands.blocking_send(command).is_err() {
                    break;
                }
            }
        }
        Ok(())
    })
}
