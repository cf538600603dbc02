use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::{
    entity::Entity,
    maze::Maze,
    movement::{Direction, apply_move, is_at_exit, legal_directions},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkerState {
    Idle,
    Ticking,
    Won,
}

/// What a single timer tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The walker has not been started.
    Idle,
    Moved(Direction),
    /// No legal direction from here.
    Stalled,
    /// This tick reached the exit.
    Won,
    /// The exit was reached earlier; nothing happens any more.
    AlreadyWon,
}

/// Wanders the maze one uniformly random legal step per tick.
#[derive(Debug)]
pub struct RandomWalker {
    rng: StdRng,
    state: WalkerState,
    /// Keep heading straight while that stays legal.
    momentum: bool,
}

impl RandomWalker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            state: WalkerState::Idle,
            momentum: true,
        }
    }

    /// Turns momentum narrowing on or off. Without it every tick picks
    /// among all legal directions.
    pub fn with_momentum(mut self, momentum: bool) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn state(&self) -> WalkerState {
        self.state
    }

    /// Moves from Idle to Ticking and seeds `last_move` with a random legal direction.
    pub fn start(&mut self, maze: &Maze, entity: &mut Entity) {
        if self.state != WalkerState::Idle {
            return;
        }
        let options = legal_directions(maze, entity.position(), None);
        if let Some(&direction) = self.pick(&options) {
            entity.last_move = direction;
        }
        self.state = if is_at_exit(maze, entity.position()) {
            WalkerState::Won
        } else {
            WalkerState::Ticking
        };
        info!(position = %entity.position(), last_move = ?entity.last_move, "walker started");
    }

    /// Performs one autonomous step.
    ///
    /// The visit is recorded before moving, so the history tracks the cell
    /// being left. `last_move` ends up as the opposite of the chosen
    /// direction, and its opposite is the heading used for momentum.
    pub fn step(&mut self, maze: &Maze, entity: &mut Entity) -> StepOutcome {
        match self.state {
            WalkerState::Idle => return StepOutcome::Idle,
            WalkerState::Won => return StepOutcome::AlreadyWon,
            WalkerState::Ticking => {}
        }

        // The entity may have been steered onto the exit by hand.
        if is_at_exit(maze, entity.position()) {
            self.state = WalkerState::Won;
            return StepOutcome::AlreadyWon;
        }

        let heading = self.momentum.then(|| entity.last_move.opposite());
        let options = legal_directions(maze, entity.position(), heading);
        let Some(&direction) = self.pick(&options) else {
            warn!(position = %entity.position(), "no legal direction, stalling");
            return StepOutcome::Stalled;
        };

        entity.record_visit(maze);
        entity.last_move = direction.opposite();
        let position = apply_move(entity, maze, direction);
        debug!(%position, direction = direction.as_str(), "walker moved");

        if is_at_exit(maze, position) {
            self.state = WalkerState::Won;
            info!(%position, "walker reached the exit");
            return StepOutcome::Won;
        }
        StepOutcome::Moved(direction)
    }

    /// Notes that the exit was reached by some other means.
    pub fn mark_won(&mut self) {
        self.state = WalkerState::Won;
    }

    fn pick<'a>(&mut self, options: &'a [Direction]) -> Option<&'a Direction> {
        if options.is_empty() {
            None
        } else {
            options.get(self.rng.random_range(0..options.len()))
        }
    }
}
