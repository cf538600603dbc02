mod input;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use maze_walker_core::{
    Position,
    control::run,
    maze::{Maze, parse_map},
    session::{Session, SessionConfig},
};
use ratatui::{
    crossterm::{
        cursor::Show,
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
};
use std::{
    fs::File,
    io::{self, Stdout, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::ui::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Map file to load (the built-in maze when omitted)
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,

    /// Autonomous steps per second
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    speed: u32,

    /// Seed for the random walk
    #[arg(long)]
    seed: Option<u64>,

    /// Start row, overriding the map's start
    #[arg(long, requires = "start_col")]
    start_row: Option<usize>,

    /// Start column, overriding the map's start
    #[arg(long, requires = "start_row")]
    start_col: Option<usize>,

    /// Number of trail entries shown below the maze
    #[arg(long, default_value_t = 10)]
    history: usize,

    /// Quit as soon as the exit is reached
    #[arg(long)]
    exit_on_win: bool,

    /// Pick among all legal directions every step instead of keeping straight
    #[arg(long)]
    no_momentum: bool,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn session_config(&self, map_start: Option<Position>) -> SessionConfig {
        let defaults = SessionConfig::default();
        let start = match (self.start_row, self.start_col) {
            (Some(row), Some(col)) => Position::new(row, col),
            _ => map_start.unwrap_or(defaults.start),
        };
        SessionConfig {
            start,
            ticks_per_second: self.speed,
            seed: self.seed,
            history_len: self.history,
            exit_on_win: self.exit_on_win,
            momentum: !self.no_momentum,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let (maze, map_start) = load_maze(args.map.as_deref())?;
    let session = Session::new(Arc::new(maze), args.session_config(map_start))
        .context("Failed to place the walker")?;

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    // Set up the terminal
    let terminal = setup_terminal()?;

    let (commands, received) = mpsc::channel(32);
    let reader = input::spawn_key_reader(commands, shutdown.clone());

    // Run the control loop until quit, interrupt or win
    let result = run(
        session,
        TerminalRenderer::new(terminal),
        received,
        shutdown.clone(),
    )
    .await;
    shutdown.cancel();
    let reader_result = reader.join();

    // Restore the terminal state before reporting anything
    restore_terminal()?;

    let summary = result?;
    match reader_result {
        Ok(read) => read.context("Failed to read terminal input")?,
        Err(_) => anyhow::bail!("Key reader thread panicked"),
    }

    println!(
        "{} at {} after {} ticks, {} cells in the trail",
        if summary.won { "Escaped" } else { "Stopped" },
        summary.position,
        summary.ticks,
        summary.visited
    );
    Ok(())
}

/// Installs a file-backed subscriber; stdout belongs to the terminal UI.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Loads the maze from a map file, or the built-in one.
fn load_maze(map_file: Option<&Path>) -> Result<(Maze, Option<Position>)> {
    let Some(path) = map_file else {
        return Maze::classic().context("Built-in maze is invalid");
    };
    let map_string = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file {}", path.display()))?;
    let parsed = parse_map(&map_string)
        .with_context(|| format!("Failed to load map {}", path.display()))?;
    let maze = Maze::build(parsed.layout)?;
    info!(path = %path.display(), height = maze.height(), width = maze.width(), "map loaded");
    Ok((maze, parsed.start))
}

/// Cancels `shutdown` on an interrupt or termination signal.
async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupt received"),
        _ = terminate => info!("termination signal received"),
        _ = shutdown.cancelled() => return,
    }
    shutdown.cancel();
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    enter_alternate_screen(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Switches to the alternate screen, leaving raw mode again if that fails.
fn enter_alternate_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, EnterAlternateScreen).inspect_err(|error| {
        warn!(%error, "cannot enter the alternate screen");
        if let Err(error) = disable_raw_mode() {
            warn!(%error, "cannot leave raw mode");
        }
    })
}

/// Restores the terminal to its original state.
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_map_start() {
        let args = Args::try_parse_from(["maze-walker"]).unwrap();
        let config = args.session_config(Some(Position::new(3, 4)));
        assert_eq!(config.start, Position::new(3, 4));
        assert_eq!(config.ticks_per_second, 10);
        assert_eq!(config.history_len, 10);
        assert!(config.momentum);
        assert!(!config.exit_on_win);
        assert_eq!(
            args.session_config(None).start,
            SessionConfig::default().start
        );
    }

    #[test]
    fn explicit_start_wins() {
        let args = Args::try_parse_from([
            "maze-walker",
            "--start-row",
            "5",
            "--start-col",
            "6",
            "--speed",
            "3",
            "--no-momentum",
        ])
        .unwrap();
        let config = args.session_config(Some(Position::new(1, 1)));
        assert_eq!(config.start, Position::new(5, 6));
        assert_eq!(config.ticks_per_second, 3);
        assert!(!config.momentum);
    }

    #[test]
    fn rejects_zero_speed_and_half_a_start() {
        assert!(Args::try_parse_from(["maze-walker", "--speed", "0"]).is_err());
        assert!(Args::try_parse_from(["maze-walker", "--start-row", "2"]).is_err());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_screen_switch_leaves_raw_mode() {
        let error = enter_alternate_screen(&mut ClosedPipe).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
        assert!(!ratatui::crossterm::terminal::is_raw_mode_enabled().unwrap());
    }

    #[test]
    fn built_in_maze_loads() {
        let (maze, start) = load_maze(None).unwrap();
        assert_eq!(start, Some(Position::new(1, 1)));
        assert_eq!(maze.width(), 25);
    }
}
