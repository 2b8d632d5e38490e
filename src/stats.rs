use crate::ds::RingBuffer;

/// Number of recent episodes the success rate is computed over
pub const DEFAULT_WINDOW: usize = 20;

/// A sliding window of episode outcomes, `true` meaning the goal was reached
#[derive(Debug, Clone)]
pub struct SuccessHistory {
    outcomes: RingBuffer<bool>,
}

impl SuccessHistory {
    /// **Panics** if `window` is zero
    pub fn new(window: usize) -> Self {
        Self {
            outcomes: RingBuffer::new(window),
        }
    }

    /// Record an outcome, evicting the oldest one once the window is full
    pub fn record(&mut self, success: bool) {
        self.outcomes.push(success);
    }

    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|&&s| s).count()
    }

    /// Number of outcomes currently held, never more than [`window`](Self::window)
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.len() == 0
    }

    pub fn window(&self) -> usize {
        self.outcomes.capacity()
    }

    /// Fraction of recorded outcomes that were successes, in `[0, 1]`
    ///
    /// An empty history has a rate of zero.
    pub fn rate(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.successes() as f32 / self.len() as f32
    }

    /// Outcomes from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.outcomes.iter().copied()
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }
}

impl Default for SuccessHistory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_zero_rate() {
        let history = SuccessHistory::default();
        assert_eq!(history.rate(), 0.0);
        assert_eq!(history.window(), DEFAULT_WINDOW);
    }

    #[test]
    fn rate_over_partial_window() {
        let mut history = SuccessHistory::new(4);
        history.record(true);
        history.record(false);
        history.record(true);
        assert_eq!(history.len(), 3);
        assert!((history.rate() - 2.0 / 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn bounded_by_window() {
        let mut history = SuccessHistory::new(DEFAULT_WINDOW);
        for i in 0..1000 {
            history.record(i % 3 == 0);
            assert!(history.len() <= DEFAULT_WINDOW, "never exceeds window");
            let rate = history.rate();
            assert!((0.0..=1.0).contains(&rate), "rate {rate} out of range");
        }
        assert_eq!(history.len(), DEFAULT_WINDOW);
    }

    #[test]
    fn oldest_outcomes_are_evicted() {
        let mut history = SuccessHistory::new(3);
        for outcome in [true, true, true, false, false] {
            history.record(outcome);
        }
        assert_eq!(history.iter().collect::<Vec<_>>(), [true, false, false]);
        assert_eq!(history.successes(), 1);
    }
}
