use std::sync::Arc;

use rand::random;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Position,
    entity::Entity,
    maze::{LayoutError, Maze},
    movement::{Direction, apply_move, is_at_exit},
    render::Frame,
    walker::{RandomWalker, StepOutcome, WalkerState},
};

/// Settings for one maze run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub start: Position,
    pub ticks_per_second: u32,
    /// Walker seed; random when unset.
    pub seed: Option<u64>,
    /// How many trail entries each frame shows.
    pub history_len: usize,
    /// Shut the control loop down as soon as the exit is reached.
    pub exit_on_win: bool,
    /// Let the walker keep going straight while it can.
    pub momentum: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            start: Position::new(1, 1),
            ticks_per_second: 10,
            seed: None,
            history_len: 10,
            exit_on_win: false,
            momentum: true,
        }
    }
}

/// Requests coming from the keyboard (or any other input source).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    SpeedUp,
    SpeedDown,
    Quit,
}

/// What applying a [`Command`] did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Moved(Position),
    /// The exit was already reached; moves are ignored.
    Ignored,
    Won,
    SpeedChanged(u32),
    Quit,
}

/// The single mutable state shared by the walker timer and the input handler.
#[derive(Debug)]
pub struct Session {
    maze: Arc<Maze>,
    entity: Entity,
    walker: RandomWalker,
    config: SessionConfig,
}

impl Session {
    /// Places the entity at the configured start and starts the walker.
    pub fn new(maze: Arc<Maze>, config: SessionConfig) -> Result<Self, LayoutError> {
        maze.validate_start(config.start)?;
        let seed = config.seed.unwrap_or_else(random);
        let mut entity = Entity::new(config.start, config.ticks_per_second);
        let mut walker = RandomWalker::new(seed).with_momentum(config.momentum);
        walker.start(&maze, &mut entity);
        info!(start = %config.start, seed, speed = entity.ticks_per_second(), "session created");

        Ok(Session {
            maze,
            entity,
            walker,
            config,
        })
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_won(&self) -> bool {
        self.walker.state() == WalkerState::Won
    }

    /// Runs one autonomous walker step.
    pub fn tick(&mut self) -> StepOutcome {
        self.walker.step(&self.maze, &mut self.entity)
    }

    /// Applies a user command.
    ///
    /// A move records the departed cell and stores the opposite direction
    /// in `last_move`, exactly like an autonomous step.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        let outcome = match command {
            Command::Move(direction) => self.user_move(direction),
            Command::SpeedUp => CommandOutcome::SpeedChanged(self.entity.speed_up()),
            Command::SpeedDown => CommandOutcome::SpeedChanged(self.entity.speed_down()),
            Command::Quit => CommandOutcome::Quit,
        };
        debug!(?command, ?outcome, "command applied");
        outcome
    }

    fn user_move(&mut self, direction: Direction) -> CommandOutcome {
        if self.is_won() || is_at_exit(&self.maze, self.entity.position()) {
            self.walker.mark_won();
            return CommandOutcome::Ignored;
        }
        self.entity.record_visit(&self.maze);
        self.entity.last_move = direction.opposite();
        let position = apply_move(&mut self.entity, &self.maze, direction);
        if is_at_exit(&self.maze, position) {
            self.walker.mark_won();
            info!(%position, "exit reached by hand");
            return CommandOutcome::Won;
        }
        CommandOutcome::Moved(position)
    }

    /// The frame describing the current state.
    pub fn frame(&self) -> Frame<'_> {
        Frame::compose(
            &self.maze,
            &self.entity,
            self.is_won(),
            self.config.history_len,
        )
    }
}
