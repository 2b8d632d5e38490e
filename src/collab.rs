use log::{debug, info};

use crate::{
    algo::EpisodeReport,
    grid::{Grid, Pos},
};

/// What a [`Renderer`] needs to know about one agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentView {
    pub id: usize,
    pub pos: Pos,
}

/// Draws the grid and the agents on it
///
/// Called once per tick with a read-only view of the session. Nothing flows back into learning.
pub trait Renderer {
    fn render(&mut self, grid: &Grid, agents: &[AgentView]);
}

/// Receives training progress
///
/// Both methods default to doing nothing, and `()` is the sink that ignores everything.
pub trait Diagnostics {
    /// Called after every finished episode
    fn episode(&mut self, _report: &EpisodeReport) {}

    /// Called periodically with the success rate over the last `window` recorded outcomes
    fn success_rate(&mut self, _agent: usize, _rate: f32, _window: usize) {}
}

impl Diagnostics for () {}

/// Writes diagnostics through the [`log`] facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn episode(&mut self, report: &EpisodeReport) {
        debug!(
            "agent {} episode {} done. Steps: {} {:?} (reward {:.1})",
            report.agent, report.episode, report.steps, report.outcome, report.reward
        );
    }

    fn success_rate(&mut self, agent: usize, rate: f32, window: usize) {
        info!(
            "agent {agent} success rate (last {window}): {:.1}%",
            rate * 100.0
        );
    }
}
