use std::collections::{hash_map, HashMap};

use strum::VariantArray;

use crate::env::{Action, Environment};

use super::Hashable;

/// Estimated returns for each [`Action`], indexed by [`Action::index`]
pub type ActionValues = [f32; Action::COUNT];

/// A tabular action-value function
///
/// Holds one row of [`ActionValues`] for every state of the environment it was built from, all
/// starting at zero. Rows are never added or removed afterwards, and [`update`](Self::update) is
/// the only way values change.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable<S: Hashable> {
    table: HashMap<S, ActionValues>,
}

impl<S: Hashable> QTable<S> {
    /// Build a zeroed table covering every state of `env`
    pub fn new<E>(env: &E) -> Self
    where
        E: Environment<State = S>,
    {
        Self {
            table: env
                .states()
                .into_iter()
                .map(|s| (s, [0.0; Action::COUNT]))
                .collect(),
        }
    }

    pub fn contains(&self, state: &S) -> bool {
        self.table.contains_key(state)
    }

    pub fn get(&self, state: &S) -> Option<&ActionValues> {
        self.table.get(state)
    }

    pub fn value(&self, state: &S, action: Action) -> Option<f32> {
        self.table.get(state).map(|row| row[action.index()])
    }

    /// The highest action value for `state`
    pub fn max_value(&self, state: &S) -> Option<f32> {
        self.table
            .get(state)
            .map(|row| row.iter().copied().fold(f32::NEG_INFINITY, f32::max))
    }

    /// Every action whose value equals the maximum for `state`, in [`Action`] order
    ///
    /// Never empty for a known state. Returns `None` for a state missing from the table.
    pub fn best_actions(&self, state: &S) -> Option<Vec<Action>> {
        let row = self.table.get(state)?;
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Some(
            Action::VARIANTS
                .iter()
                .copied()
                .filter(|a| row[a.index()] == max)
                .collect(),
        )
    }

    /// The first of the [`best_actions`](Self::best_actions), for display
    pub fn greedy_action(&self, state: &S) -> Option<Action> {
        self.best_actions(state)?.first().copied()
    }

    /// Temporal-difference update
    ///
    /// Q(s,a) ← Q(s,a) + α(r + γ·max Q(s') − Q(s,a))
    ///
    /// Returns `false`, leaving the table untouched, if `state` has no row.
    pub fn update(
        &mut self,
        state: S,
        action: Action,
        reward: f32,
        next_max: f32,
        alpha: f32,
        gamma: f32,
    ) -> bool {
        let Some(row) = self.table.get_mut(&state) else {
            return false;
        };
        let q = &mut row[action.index()];
        *q += alpha * (reward + gamma * next_max - *q);
        true
    }

    /// Number of states in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterate over all rows in arbitrary order
    pub fn iter(&self) -> hash_map::Iter<'_, S, ActionValues> {
        self.table.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn initialized_to_zero() {
        let grid: Grid = "
            ..#.
            #...
            ...C
        "
        .parse()
        .unwrap();
        let table = QTable::new(&grid);

        assert_eq!(table.len(), 10, "one row per non-wall cell");
        assert!(!table.contains(&(0, 2)));
        assert!(!table.contains(&(1, 0)));
        for (_, row) in table.iter() {
            assert_eq!(row, &[0.0; 4]);
        }
    }

    #[test]
    fn best_actions_never_empty() {
        let grid = Grid::empty(4, 5).unwrap();
        let mut table = QTable::new(&grid);
        assert_eq!(
            table.best_actions(&(0, 0)).unwrap(),
            Action::VARIANTS.to_vec(),
            "all actions tie at initialization"
        );

        table.update((0, 0), Action::Down, -1.0, 0.0, 0.5, 0.9);
        table.update((0, 0), Action::Right, 5.0, 0.0, 0.5, 0.9);
        table.update((1, 1), Action::Up, -3.0, 0.0, 1.0, 0.9);

        for state in grid.positions() {
            let best = table.best_actions(&state).unwrap();
            assert!(!best.is_empty(), "no best action for {state:?}");
        }
        assert_eq!(table.best_actions(&(0, 0)).unwrap(), [Action::Right]);
        assert_eq!(
            table.best_actions(&(1, 1)).unwrap(),
            [Action::Down, Action::Left, Action::Right]
        );
        assert_eq!(table.best_actions(&(9, 9)), None);
    }

    #[test]
    fn bellman_update() {
        let grid = Grid::empty(2, 2).unwrap();
        let mut table = QTable::new(&grid);

        assert!(table.update((0, 0), Action::Right, -1.0, 10.0, 0.5, 0.9));
        // 0 + 0.5 * (-1 + 0.9 * 10 - 0)
        assert_eq!(table.value(&(0, 0), Action::Right), Some(4.0));

        assert!(table.update((0, 0), Action::Right, -1.0, 10.0, 0.5, 0.9));
        // 4 + 0.5 * (8 - 4)
        assert_eq!(table.value(&(0, 0), Action::Right), Some(6.0));
        assert_eq!(table.max_value(&(0, 0)), Some(6.0));
        assert_eq!(table.greedy_action(&(0, 0)), Some(Action::Right));
    }

    #[test]
    fn unknown_state_update_is_ignored() {
        let grid: Grid = ".#\n.C".parse().unwrap();
        let mut table = QTable::new(&grid);
        let before = table.clone();

        assert!(!table.update((0, 1), Action::Up, 100.0, 0.0, 0.5, 0.9));
        assert_eq!(table, before);
        assert_eq!(table.max_value(&(0, 1)), None);
    }
}
