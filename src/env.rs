use strum::{Display, EnumIter, FromRepr, VariantArray};

use crate::algo::Hashable;

/// A move the mouse can attempt
///
/// The discriminant doubles as the column index into a Q-table row.
#[derive(EnumIter, VariantArray, FromRepr, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// Number of actions, and so the width of a Q-table row
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }

    /// `(row, col)` displacement of this move
    pub fn offset(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }
}

/// A deterministic, episodic environment with a discrete state space and the four [`Action`]s
///
/// Implementations are pure: every method reads the environment without changing it, so one
/// environment can be shared by any number of learning agents. The agent position is owned by the
/// agent, not by the environment.
pub trait Environment {
    /// A representation of a state that can key a Q-table
    type State: Hashable;

    /// The state every episode begins in
    fn start(&self) -> Self::State;

    /// Every state a Q-table must hold a row for
    fn states(&self) -> Vec<Self::State>;

    /// Reward for entering `state`
    fn reward(&self, state: Self::State) -> f32;

    /// The state reached by attempting `action` from `state`
    ///
    /// Illegal moves are not errors: they leave the agent where it was.
    fn attempt_move(&self, state: Self::State, action: Action) -> Self::State;

    /// Whether an episode ends upon entering `state`
    fn is_terminal(&self, state: Self::State) -> bool;

    /// Whether `state` counts as reaching the goal
    fn is_goal(&self, state: Self::State) -> bool;
}
