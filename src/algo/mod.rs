pub mod q_table;
pub mod rollout;
pub mod trainer;

pub use q_table::QTable;
pub use rollout::{Rollout, RolloutStatus};
pub use trainer::{Agent, EpisodeReport, Outcome, Step, Tick, Trainer, TrainerConfig};

/// A trait for state types that can be used as keys in a [`HashMap`](std::collections::HashMap)
pub trait Hashable: Copy + Eq + std::hash::Hash + std::fmt::Debug {}

impl<T> Hashable for T where T: Copy + Eq + std::hash::Hash + std::fmt::Debug {}
