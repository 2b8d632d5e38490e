//! A gridworld where a mouse learns, by tabular Q-learning, to reach the cheese without meeting
//! a cat.
//!
//! ```
//! use cheese_chase::{config::Config, session::TrainingSession};
//!
//! let mut session = TrainingSession::new(Config {
//!     seed: Some(42),
//!     ..Default::default()
//! })
//! .unwrap();
//! session.train_fast(100, &mut ());
//! assert_eq!(session.agents()[0].episode(), 100);
//! ```

/// Q-table, trainer and greedy rollout
pub mod algo;

/// Seams to the renderer and the diagnostics sink
pub mod collab;

/// Session configuration
pub mod config;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Exploration policies
pub mod exploration;

/// The gridworld
pub mod grid;

/// The aggregate that owns a game
pub mod session;

/// Success-rate bookkeeping
pub mod stats;

/// Terminal front-end
#[cfg(feature = "viz")]
pub mod viz;

mod util;
