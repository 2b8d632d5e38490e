use log::{error, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    algo::{Agent, EpisodeReport, Rollout, RolloutStatus, Tick, Trainer},
    collab::{AgentView, Diagnostics, Renderer},
    config::{Config, ConfigError, Mode},
    exploration::EpsilonGreedy,
    grid::{Grid, GridError, Pos},
};

/// What a call to [`TrainingSession::tick`] did
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Ran `episodes` fast episodes across all agents
    Trained { episodes: u32 },
    /// Advanced every agent by one step
    Stepped { finished: Vec<EpisodeReport> },
    /// Advanced the demo rollout
    Rollout(RolloutStatus<Pos>),
    /// Stopped, nothing happened
    Idle,
}

/// Everything one game of cheese-chase owns: configuration, grid, agents and randomness
///
/// A session is driven from the outside. Call [`train_fast`](Self::train_fast) to learn without
/// pacing, or hand [`tick`](Self::tick) to a scheduler and [`render`](Self::render) to a renderer.
#[derive(Debug)]
pub struct TrainingSession {
    config: Config,
    rng: StdRng,
    grid: Grid,
    trainer: Trainer<Pos>,
    rollout: Option<Rollout<Pos>>,
    resets: u32,
    running: bool,
}

impl TrainingSession {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let grid = build_grid(&config, &mut rng)?;
        let trainer = build_trainer(&config, &grid, &mut rng);

        info!(
            "new session: {}x{} grid, {} hazards, {} agent(s)",
            grid.rows(),
            grid.cols(),
            grid.hazards().count(),
            config.agents
        );

        Ok(Self {
            config,
            rng,
            grid,
            trainer,
            rollout: None,
            resets: 0,
            running: true,
        })
    }

    /// Start over on a fresh grid with untrained agents
    pub fn reset(&mut self) -> Result<(), GridError> {
        self.grid = build_grid(&self.config, &mut self.rng)?;
        self.trainer = build_trainer(&self.config, &self.grid, &mut self.rng);
        self.rollout = None;
        self.resets += 1;
        self.running = true;
        info!(
            "reset #{}: {} hazards placed",
            self.resets,
            self.grid.hazards().count()
        );
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn trainer(&self) -> &Trainer<Pos> {
        &self.trainer
    }

    pub fn agents(&self) -> &[Agent<Pos>] {
        self.trainer.agents()
    }

    /// The demo rollout in progress, if any
    pub fn rollout(&self) -> Option<&Rollout<Pos>> {
        self.rollout.as_ref()
    }

    /// Number of full resets so far
    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.trainer.stop();
    }

    pub fn is_running(&self) -> bool {
        match self.config.mode {
            Mode::Train => self.running && self.trainer.is_running(),
            Mode::Demo => self.running,
        }
    }

    /// Run up to `episodes` fast episodes per agent
    pub fn train_fast<X>(&mut self, episodes: u32, sink: &mut X) -> u32
    where
        X: Diagnostics + ?Sized,
    {
        self.trainer.train(&self.grid, episodes, sink)
    }

    /// Handle one scheduler event
    pub fn tick<X>(&mut self, sink: &mut X) -> SessionEvent
    where
        X: Diagnostics + ?Sized,
    {
        if !self.is_running() {
            return SessionEvent::Idle;
        }

        match self.config.mode {
            Mode::Train => match self.trainer.tick(&self.grid, sink) {
                Tick::Batch { episodes } => SessionEvent::Trained { episodes },
                Tick::Stepped { finished } => SessionEvent::Stepped { finished },
                Tick::Idle => SessionEvent::Idle,
            },
            Mode::Demo => self.demo_tick(sink),
        }
    }

    fn demo_tick<X>(&mut self, sink: &mut X) -> SessionEvent
    where
        X: Diagnostics + ?Sized,
    {
        let Some(rollout) = self.rollout.as_mut() else {
            let episodes = self
                .trainer
                .train(&self.grid, self.config.pretrain_episodes, sink);
            self.rollout = Some(Rollout::new(&self.grid, self.config.rollout_cap));
            return SessionEvent::Trained { episodes };
        };

        let table = self.trainer.agents()[0].q_table();
        let status = rollout.tick(&self.grid, table, &mut self.rng);

        match status {
            RolloutStatus::Moving(_) => {}
            RolloutStatus::Reached { steps } => {
                info!("got the cheese in {steps} steps");
                self.running = false;
            }
            RolloutStatus::Caught { steps } => {
                info!("eaten by a cat after {steps} steps, starting over");
                if let Err(e) = self.reset() {
                    error!("reset failed: {e}");
                    self.running = false;
                }
            }
            RolloutStatus::Undefined { state } => {
                error!("rollout reached undefined state {state:?}, stopping");
                self.running = false;
            }
            RolloutStatus::Stuck { steps } => {
                warn!("mouse got stuck after {steps} steps");
                self.running = false;
            }
        }

        SessionEvent::Rollout(status)
    }

    /// Positions to draw: the rollout's in demo mode, every agent's otherwise
    pub fn agent_views(&self) -> Vec<AgentView> {
        match &self.rollout {
            Some(rollout) => vec![AgentView {
                id: 0,
                pos: rollout.position(),
            }],
            None => self.trainer.views(),
        }
    }

    pub fn render<R>(&self, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        renderer.render(&self.grid, &self.agent_views());
    }
}

fn build_grid<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<Grid, GridError> {
    match &config.layout {
        Some(layout) => Ok(layout.clone()),
        None => Grid::generate(config.rows, config.cols, config.hazards, rng),
    }
}

/// Every agent gets its own random stream, split off the session's
fn build_trainer<R: Rng + ?Sized>(config: &Config, grid: &Grid, rng: &mut R) -> Trainer<Pos> {
    let agents = (0..config.agents)
        .map(|id| {
            Agent::new(
                id,
                grid,
                EpsilonGreedy::new(config.exploration),
                config.history_window,
                StdRng::seed_from_u64(rng.gen()),
            )
        })
        .collect();
    Trainer::new(agents, config.learning_params(), config.trainer_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collab::LogDiagnostics, grid::Cell};

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(usize, Vec<AgentView>)>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, grid: &Grid, agents: &[AgentView]) {
            self.frames.push((grid.hazards().count(), agents.to_vec()));
        }
    }

    #[derive(Default)]
    struct Counter {
        episodes: usize,
        rates: Vec<f32>,
    }

    impl Diagnostics for Counter {
        fn episode(&mut self, _report: &EpisodeReport) {
            self.episodes += 1;
        }

        fn success_rate(&mut self, _agent: usize, rate: f32, _window: usize) {
            self.rates.push(rate);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            gamma: 2.0,
            ..Default::default()
        };
        assert!(TrainingSession::new(config).is_err());
    }

    #[test]
    fn seeded_sessions_match() {
        let config = Config {
            seed: Some(1234),
            ..Default::default()
        };
        let mut a = TrainingSession::new(config.clone()).unwrap();
        let mut b = TrainingSession::new(config).unwrap();
        assert_eq!(a.grid(), b.grid());

        a.train_fast(50, &mut ());
        b.train_fast(50, &mut ());
        assert_eq!(a.agents()[0].q_table(), b.agents()[0].q_table());
    }

    #[test]
    fn train_mode_reports_progress() {
        let config = Config {
            rows: 4,
            cols: 4,
            hazards: 2,
            batch_size: 20,
            seed: Some(5),
            ..Default::default()
        };
        let mut session = TrainingSession::new(config).unwrap();
        let mut sink = Counter::default();

        assert_eq!(
            session.tick(&mut sink),
            SessionEvent::Trained { episodes: 20 }
        );
        assert_eq!(sink.episodes, 20);
        assert!(matches!(session.tick(&mut sink), SessionEvent::Stepped { .. }));
        assert!(sink.rates.iter().all(|r| (0.0..=1.0).contains(r)));

        session.stop();
        assert_eq!(session.tick(&mut sink), SessionEvent::Idle);
    }

    #[test]
    fn renders_every_agent() {
        let config = Config {
            agents: 3,
            seed: Some(8),
            ..Default::default()
        };
        let session = TrainingSession::new(config).unwrap();
        let mut recorder = Recorder::default();
        session.render(&mut recorder);

        let (hazards, agents) = &recorder.frames[0];
        assert_eq!(*hazards, 14);
        assert_eq!(agents.len(), 3);
        assert!(agents.iter().all(|a| a.pos == (0, 0)));
    }

    #[test]
    fn demo_reaches_cheese_on_open_corridor() {
        let config = Config {
            layout: Some("....C".parse().unwrap()),
            mode: Mode::Demo,
            pretrain_episodes: 300,
            exploration: crate::decay::Schedule::Constant(crate::decay::Constant::new(0.1)),
            seed: Some(3),
            ..Default::default()
        };
        let mut session = TrainingSession::new(config).unwrap();

        assert_eq!(
            session.tick(&mut LogDiagnostics),
            SessionEvent::Trained { episodes: 300 }
        );
        let mut last = SessionEvent::Idle;
        while session.is_running() {
            last = session.tick(&mut ());
        }
        assert_eq!(
            last,
            SessionEvent::Rollout(RolloutStatus::Reached { steps: 4 })
        );
        assert_eq!(session.tick(&mut ()), SessionEvent::Idle);
    }

    #[test]
    fn demo_resets_after_being_caught() {
        // Every path off the start cell leads into a cat, and an untrained table breaks every tie
        // at random
        let config = Config {
            layout: Some(".X\nX.\n.C".parse().unwrap()),
            mode: Mode::Demo,
            pretrain_episodes: 0,
            seed: Some(21),
            ..Default::default()
        };
        let mut session = TrainingSession::new(config).unwrap();
        session.tick(&mut ());

        let mut caught = false;
        for _ in 0..500 {
            if let SessionEvent::Rollout(RolloutStatus::Caught { .. }) = session.tick(&mut ()) {
                caught = true;
                break;
            }
        }
        assert!(caught, "greedy mouse never reached a cat");
        assert_eq!(session.resets(), 1);
        assert!(session.rollout().is_none(), "retraining starts over");
        assert_eq!(session.agents()[0].episode(), 0);
        assert_eq!(session.grid().cell((0, 1)), Cell::Hazard);
        assert!(session.is_running());
    }
}
