//! The control loop: a walker timer and an input handler sharing one session.
//!
//! Both tasks go through a single `tokio::sync::Mutex` holding the session
//! and the renderer, so a mutation and the redraw that follows it happen
//! as one step. Shutdown goes through a `CancellationToken`; every task
//! cancels it on the way out, so when one stops the other follows.

use std::{io, sync::Arc};

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinError,
    time,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    Position,
    render::Renderer,
    session::{Command, CommandOutcome, Session},
    walker::StepOutcome,
};

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("Renderer failed: {0}")]
    Render(#[from] io::Error),
    #[error("Control task failed: {0}")]
    Task(#[from] JoinError),
}

/// Final state once the loop has stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub position: Position,
    pub won: bool,
    pub ticks: u64,
    pub visited: usize,
}

struct Shared<R> {
    session: Session,
    renderer: R,
    ticks: u64,
}

impl<R: Renderer> Shared<R> {
    fn redraw(&mut self) -> io::Result<()> {
        let frame = self.session.frame();
        self.renderer.draw_frame(&frame)
    }
}

type SharedState<R> = Arc<Mutex<Shared<R>>>;

/// Runs the walker and the input handler until `shutdown` is cancelled, a
/// [`Command::Quit`] arrives, the command channel closes, or (with
/// `exit_on_win`) the exit is reached. Both tasks are joined before returning.
pub async fn run<R>(
    session: Session,
    renderer: R,
    commands: mpsc::Receiver<Command>,
    shutdown: CancellationToken,
) -> Result<RunSummary, ControlError>
where
    R: Renderer + Send + 'static,
{
    let exit_on_win = session.config().exit_on_win;
    let shared = Arc::new(Mutex::new(Shared {
        session,
        renderer,
        ticks: 0,
    }));
    shared.lock().await.redraw()?;
    info!("control loop started");

    let ticker = tokio::spawn(tick_loop(
        Arc::clone(&shared),
        shutdown.clone(),
        exit_on_win,
    ));
    let input = tokio::spawn(input_loop(
        Arc::clone(&shared),
        commands,
        shutdown.clone(),
        exit_on_win,
    ));

    let (ticked, handled) = tokio::join!(ticker, input);
    ticked??;
    handled??;

    let state = shared.lock().await;
    let summary = RunSummary {
        position: state.session.entity().position(),
        won: state.session.is_won(),
        ticks: state.ticks,
        visited: state.session.entity().history().len(),
    };
    info!(?summary, "control loop stopped");
    Ok(summary)
}

async fn tick_loop<R>(
    shared: SharedState<R>,
    shutdown: CancellationToken,
    exit_on_win: bool,
) -> Result<(), ControlError>
where
    R: Renderer + Send + 'static,
{
    let _stop_all = shutdown.clone().drop_guard();
    loop {
        // Re-read every time so speed changes apply from the next tick.
        let interval = shared.lock().await.session.entity().tick_interval();
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = time::sleep(interval) => {}
        }

        let mut state = shared.lock().await;
        state.ticks += 1;
        let outcome = state.session.tick();
        match outcome {
            StepOutcome::Moved(_) | StepOutcome::Won => state.redraw()?,
            StepOutcome::Idle | StepOutcome::Stalled | StepOutcome::AlreadyWon => {}
        }
        if outcome == StepOutcome::Won && exit_on_win {
            break;
        }
    }
    debug!("ticker stopped");
    Ok(())
}

async fn input_loop<R>(
    shared: SharedState<R>,
    mut commands: mpsc::Receiver<Command>,
    shutdown: CancellationToken,
    exit_on_win: bool,
) -> Result<(), ControlError>
where
    R: Renderer + Send + 'static,
{
    let _stop_all = shutdown.clone().drop_guard();
    loop {
        let command = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = commands.recv() => match received {
                Some(command) => command,
                None => {
                    info!("input closed");
                    break;
                }
            },
        };

        let mut state = shared.lock().await;
        match state.session.apply(command) {
            CommandOutcome::Quit => {
                info!("quit requested");
                break;
            }
            CommandOutcome::Ignored => {}
            CommandOutcome::Won => {
                state.redraw()?;
                if exit_on_win {
                    break;
                }
            }
            CommandOutcome::Moved(_) | CommandOutcome::SpeedChanged(_) => state.redraw()?,
        }
    }
    debug!("input handler stopped");
    Ok(())
}
