use std::time::Duration;

use thiserror::Error;

use crate::{
    algo::{
        rollout::DEFAULT_ROLLOUT_CAP,
        trainer::{LearningParams, TrainerConfig, UndefinedStatePolicy},
    },
    decay::{Decay, Schedule},
    grid::{Grid, GridError},
    stats::DEFAULT_WINDOW,
    util::in_unit_interval,
};

/// What a [`TrainingSession`](crate::session::TrainingSession) does on each tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Train indefinitely, alternating fast batches with paced showcase episodes
    #[default]
    Train,
    /// Pretrain, then play the learned policy greedily; getting caught starts over on a new grid
    Demo,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{name}` must be in the interval [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f32 },
    #[error("`{0}` must be non-zero")]
    Zero(&'static str),
    #[error("training needs pacing or a non-zero batch size")]
    NoCadence,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Every tunable of a session
///
/// ### Example
/// ```
/// use cheese_chase::config::Config;
///
/// let config = Config {
///     agents: 4,
///     batch_size: 0,
///     seed: Some(7),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// **Default**: `10`
    pub rows: usize,
    /// **Default**: `15`
    pub cols: usize,
    /// Number of cats placed on generated grids
    ///
    /// **Default**: `14`
    pub hazards: usize,
    /// A fixed layout used instead of generating grids from `rows`, `cols` and `hazards`
    ///
    /// **Default**: `None`
    pub layout: Option<Grid>,
    /// Learning rate
    ///
    /// **Default**: `0.5`
    pub alpha: f32,
    /// Discount factor
    ///
    /// **Default**: `0.9`
    pub gamma: f32,
    /// Exploration rate schedule, evaluated at each agent's episode index
    ///
    /// **Default**: a constant `0.3`
    pub exploration: Schedule,
    /// **Default**: `100`
    pub max_steps: u32,
    /// Per-agent episode limit
    ///
    /// **Default**: `None` (unbounded)
    pub max_episodes: Option<u32>,
    /// Fast episodes per agent between two showcase episodes
    ///
    /// **Default**: `1000`
    pub batch_size: u32,
    /// Whether ticks advance agents step by step between batches
    ///
    /// **Default**: `true`
    pub paced: bool,
    /// **Default**: `1`
    pub agents: usize,
    /// Interval at which a scheduler should call [`tick`](crate::session::TrainingSession::tick)
    ///
    /// **Default**: 50 ms
    pub tick_interval: Duration,
    /// Outcomes kept for the success rate
    ///
    /// **Default**: `20`
    pub history_window: usize,
    /// Step cap for demo rollouts
    ///
    /// **Default**: `200`
    pub rollout_cap: u32,
    /// Fast episodes run before each demo rollout
    ///
    /// **Default**: `1000`
    pub pretrain_episodes: u32,
    /// **Default**: penalize with `-10`
    pub undefined_state: UndefinedStatePolicy,
    /// Seed for every random choice of the session, `None` to seed from entropy
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
    /// **Default**: [`Mode::Train`]
    pub mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 15,
            hazards: 14,
            layout: None,
            alpha: 0.5,
            gamma: 0.9,
            exploration: Schedule::default(),
            max_steps: 100,
            max_episodes: None,
            batch_size: 1000,
            paced: true,
            agents: 1,
            tick_interval: Duration::from_millis(50),
            history_window: DEFAULT_WINDOW,
            rollout_cap: DEFAULT_ROLLOUT_CAP,
            pretrain_episodes: 1000,
            undefined_state: UndefinedStatePolicy::default(),
            seed: None,
            mode: Mode::Train,
        }
    }
}

impl Config {
    /// Check every value a session relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = [
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("epsilon", self.exploration.initial()),
            ("epsilon", self.exploration.evaluate(f32::MAX)),
        ];
        if let Some(&(name, value)) = unit.iter().find(|(_, v)| !in_unit_interval(*v)) {
            return Err(ConfigError::OutOfRange { name, value });
        }

        let nonzero = [
            ("agents", self.agents),
            ("max_steps", self.max_steps as usize),
            ("history_window", self.history_window),
            ("rollout_cap", self.rollout_cap as usize),
        ];
        if let Some(&(name, _)) = nonzero.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero(name));
        }

        if !self.paced && self.batch_size == 0 {
            return Err(ConfigError::NoCadence);
        }

        if self.layout.is_none() {
            // Same checks generation will run, without consuming randomness
            let grid = Grid::empty(self.rows, self.cols)?;
            let available = grid.rows() * grid.cols() - 2;
            if self.hazards > available {
                return Err(GridError::TooManyHazards {
                    requested: self.hazards,
                    available,
                }
                .into());
            }
        }

        Ok(())
    }

    pub fn learning_params(&self) -> LearningParams {
        LearningParams {
            alpha: self.alpha,
            gamma: self.gamma,
            max_steps: self.max_steps,
            undefined_state: self.undefined_state,
        }
    }

    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            paced: self.paced,
            batch_size: self.batch_size,
            max_episodes: self.max_episodes,
        }
    }
}
