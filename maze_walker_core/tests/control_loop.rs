use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use maze_walker_core::{
    Position,
    control::{ControlError, run},
    maze::{CellKind, Maze},
    movement::Direction,
    render::{Frame, Renderer},
    session::{Command, Session, SessionConfig},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use maze_walker_core::maze::CellKind::{Exit as E, Open as O, Wall as W};

/// Keeps the text of every frame it is asked to draw.
#[derive(Clone, Default)]
struct Recorder {
    frames: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Recorder {
    fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    fn last(&self) -> Vec<String> {
        self.frames.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl Renderer for Recorder {
    fn draw_frame(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let mut lines = frame.text_rows();
        lines.extend(frame.overlay.iter().map(|line| line.text.clone()));
        self.frames.lock().unwrap().push(lines);
        Ok(())
    }
}

struct Broken;

impl Renderer for Broken {
    fn draw_frame(&mut self, _frame: &Frame<'_>) -> io::Result<()> {
        Err(io::Error::other("screen gone"))
    }
}

fn session(layout: Vec<Vec<CellKind>>, config: SessionConfig) -> Session {
    Session::new(Arc::new(Maze::build(layout).unwrap()), config).unwrap()
}

fn enclosed() -> Vec<Vec<CellKind>> {
    vec![vec![W, W, W], vec![W, O, W], vec![W, W, W]]
}

fn corridor_to_exit() -> Vec<Vec<CellKind>> {
    vec![
        vec![W, W, W, W, W, W],
        vec![W, O, O, O, E, W],
        vec![W, W, W, W, W, W],
    ]
}

#[tokio::test(start_paused = true)]
async fn quit_command_stops_both_tasks() {
    let recorder = Recorder::default();
    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(run(
        session(enclosed(), SessionConfig::default()),
        recorder.clone(),
        rx,
        CancellationToken::new(),
    ));

    tx.send(Command::Quit).await.unwrap();
    let summary = handle.await.unwrap().unwrap();
    assert_eq!(summary.position, Position::new(1, 1));
    assert!(!summary.won);
    // The initial frame is always drawn.
    assert!(recorder.count() >= 1);
    assert_eq!(recorder.last()[1], "WTW");
}

#[tokio::test(start_paused = true)]
async fn ticks_follow_the_adjustable_rate() {
    let (tx, rx) = mpsc::channel(32);
    let handle = tokio::spawn(run(
        session(enclosed(), SessionConfig::default()),
        Recorder::default(),
        rx,
        CancellationToken::new(),
    ));

    // 10 ticks per second for a second.
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    // Down to 1 tick per second for three more seconds.
    for _ in 0..9 {
        tx.send(Command::SpeedDown).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(3_000)).await;
    tx.send(Command::Quit).await.unwrap();

    let summary = handle.await.unwrap().unwrap();
    assert!(
        (11..=15).contains(&summary.ticks),
        "unexpected tick count {}",
        summary.ticks
    );
}

#[tokio::test(start_paused = true)]
async fn external_shutdown_is_observed() {
    let shutdown = CancellationToken::new();
    let (_tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(run(
        session(enclosed(), SessionConfig::default()),
        Recorder::default(),
        rx,
        shutdown.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(250)).await;
    shutdown.cancel();
    let summary = handle.await.unwrap().unwrap();
    assert!(summary.ticks >= 1);
}

#[tokio::test(start_paused = true)]
async fn closed_input_ends_the_run() {
    let (tx, rx) = mpsc::channel(8);
    drop(tx);
    let shutdown = CancellationToken::new();
    run(
        session(enclosed(), SessionConfig::default()),
        Recorder::default(),
        rx,
        shutdown.clone(),
    )
    .await
    .unwrap();
    assert!(shutdown.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn walker_win_ends_the_run_when_configured() {
    let recorder = Recorder::default();
    let (_tx, rx) = mpsc::channel(8);
    let config = SessionConfig {
        seed: Some(1),
        exit_on_win: true,
        ..SessionConfig::default()
    };
    let summary = run(
        session(corridor_to_exit(), config),
        recorder.clone(),
        rx,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(summary.won);
    assert_eq!(summary.position, Position::new(1, 4));
    assert_eq!(summary.visited, 3);
    let last = recorder.last();
    assert_eq!(last[1], "W   TW");
    assert_eq!(last[3], "You win!");
}

#[tokio::test(start_paused = true)]
async fn keyboard_moves_are_drawn() {
    let recorder = Recorder::default();
    let (tx, rx) = mpsc::channel(8);
    let config = SessionConfig {
        // Slow enough that the walker does not move before the keys land.
        ticks_per_second: 1,
        exit_on_win: true,
        ..SessionConfig::default()
    };
    let handle = tokio::spawn(run(
        session(corridor_to_exit(), config),
        recorder.clone(),
        rx,
        CancellationToken::new(),
    ));

    for _ in 0..3 {
        tx.send(Command::Move(Direction::Right)).await.unwrap();
    }
    let summary = handle.await.unwrap().unwrap();
    assert!(summary.won);
    assert_eq!(summary.ticks, 0);
    assert_eq!(recorder.count(), 4);
}

#[tokio::test(start_paused = true)]
async fn renderer_failure_is_reported() {
    let (_tx, rx) = mpsc::channel(8);
    let result = run(
        session(enclosed(), SessionConfig::default()),
        Broken,
        rx,
        CancellationToken::new(),
    )
    .await;
    assert!(matches!(result, Err(ControlError::Render(_))));
}
