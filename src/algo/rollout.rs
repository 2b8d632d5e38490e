use rand::{seq::SliceRandom, Rng};

use crate::env::{Action, Environment};

use super::{Hashable, QTable};

/// Step cap after which a rollout gives up
pub const DEFAULT_ROLLOUT_CAP: u32 = 200;

/// Progress of a [`Rollout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutStatus<S> {
    /// Moved to the contained state and is still going
    Moving(S),
    /// Reached the goal
    Reached { steps: u32 },
    /// Entered a non-goal terminal state
    Caught { steps: u32 },
    /// Stood on a state the table knows nothing about
    Undefined { state: S },
    /// Took more than the step cap without ending
    Stuck { steps: u32 },
}

impl<S> RolloutStatus<S> {
    pub fn is_finished(&self) -> bool {
        !matches!(self, RolloutStatus::Moving(_))
    }
}

/// Plays a trained Q-table greedily, one step per tick, without learning
///
/// Ties between best actions are broken uniformly at random.
#[derive(Debug, Clone)]
pub struct Rollout<S> {
    pos: S,
    steps: u32,
    cap: u32,
    path: Vec<Action>,
    finished: Option<RolloutStatus<S>>,
}

impl<S: Hashable> Rollout<S> {
    pub fn new<E>(env: &E, cap: u32) -> Self
    where
        E: Environment<State = S>,
    {
        Self {
            pos: env.start(),
            steps: 0,
            cap,
            path: Vec::new(),
            finished: None,
        }
    }

    pub fn position(&self) -> S {
        self.pos
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Actions taken so far
    pub fn path(&self) -> &[Action] {
        &self.path
    }

    /// The final status, once the rollout has ended
    pub fn finished(&self) -> Option<RolloutStatus<S>> {
        self.finished
    }

    /// Take one greedy step
    ///
    /// Once finished, every further call returns the same final status.
    pub fn tick<E, R>(&mut self, env: &E, table: &QTable<S>, rng: &mut R) -> RolloutStatus<S>
    where
        E: Environment<State = S>,
        R: Rng + ?Sized,
    {
        if let Some(status) = self.finished {
            return status;
        }

        let status = self.advance(env, table, rng);
        if status.is_finished() {
            self.finished = Some(status);
        }
        status
    }

    /// Tick until the rollout ends
    pub fn run<E, R>(&mut self, env: &E, table: &QTable<S>, rng: &mut R) -> RolloutStatus<S>
    where
        E: Environment<State = S>,
        R: Rng + ?Sized,
    {
        loop {
            let status = self.tick(env, table, rng);
            if status.is_finished() {
                return status;
            }
        }
    }

    fn advance<E, R>(&mut self, env: &E, table: &QTable<S>, rng: &mut R) -> RolloutStatus<S>
    where
        E: Environment<State = S>,
        R: Rng + ?Sized,
    {
        if let Some(status) = self.classify(env) {
            return status;
        }

        let Some(action) = table
            .best_actions(&self.pos)
            .and_then(|best| best.choose(rng).copied())
        else {
            return RolloutStatus::Undefined { state: self.pos };
        };

        self.path.push(action);
        self.pos = env.attempt_move(self.pos, action);
        self.steps += 1;

        if let Some(status) = self.classify(env) {
            status
        } else if self.steps > self.cap {
            RolloutStatus::Stuck { steps: self.steps }
        } else {
            RolloutStatus::Moving(self.pos)
        }
    }

    fn classify<E>(&self, env: &E) -> Option<RolloutStatus<S>>
    where
        E: Environment<State = S>,
    {
        let steps = self.steps;
        if env.is_goal(self.pos) {
            Some(RolloutStatus::Reached { steps })
        } else if env.is_terminal(self.pos) {
            Some(RolloutStatus::Caught { steps })
        } else {
            None
        }
    }
}
