use rand::{seq::SliceRandom, Rng};
use strum::VariantArray;

use crate::{
    algo::{Hashable, QTable},
    assert_interval,
    decay::{Constant, Decay},
    env::Action,
};

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
///
/// Exploitation picks uniformly among every action tied for the highest value, so a fresh table
/// (all zeros) gives no direction an advantage.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Exploration rate for the given episode
    pub fn epsilon(&self, episode: u32) -> f32 {
        self.epsilon.evaluate(episode as f32)
    }

    /// Invoke epsilon greedy policy for current episode
    pub fn choose<R: Rng + ?Sized>(&self, episode: u32, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon(episode) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Pick an action for `state`
    ///
    /// A state missing from the table has no best actions, so exploitation falls back to a
    /// uniformly random action.
    pub fn select_action<S, R>(
        &self,
        table: &QTable<S>,
        state: S,
        episode: u32,
        rng: &mut R,
    ) -> Action
    where
        S: Hashable,
        R: Rng + ?Sized,
    {
        let best = match self.choose(episode, rng) {
            Choice::Explore => None,
            Choice::Exploit => table.best_actions(&state),
        };

        best.as_deref()
            .unwrap_or(Action::VARIANTS)
            .choose(rng)
            .copied()
            .expect("there is always at least one action to choose from")
    }
}

impl EpsilonGreedy<Constant> {
    /// A fixed exploration rate
    ///
    /// **Panics** if `epsilon` is not in the interval `[0,1]`
    pub fn constant(epsilon: f32) -> Self {
        assert_interval!(epsilon, 0.0, 1.0);
        Self::new(Constant::new(epsilon))
    }
}
