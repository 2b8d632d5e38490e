use log::{info, trace};
use rand::rngs::StdRng;

use crate::{
    collab::{AgentView, Diagnostics},
    decay::{Decay, Schedule},
    env::Environment,
    exploration::EpsilonGreedy,
    grid::Pos,
    stats::SuccessHistory,
};

use super::{Hashable, QTable};

/// Reward used by [`UndefinedStatePolicy::Penalize`] unless configured otherwise
pub const DEFAULT_UNDEFINED_PENALTY: f32 = -10.0;

/// What to do when a move lands in a state the Q-table has no row for
///
/// This cannot happen on a [`Grid`](crate::grid::Grid), whose walls are excluded from both movement
/// and the table, but environments with a partial state space can produce it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UndefinedStatePolicy {
    /// Skip the update and stay put. The step still counts toward the episode cap.
    Stall,
    /// Treat the move as a no-op transition with reward `penalty` and learn from it
    Penalize { penalty: f32 },
}

impl Default for UndefinedStatePolicy {
    fn default() -> Self {
        Self::Penalize {
            penalty: DEFAULT_UNDEFINED_PENALTY,
        }
    }
}

/// Hyperparameters shared by every agent of a [`Trainer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningParams {
    /// Learning rate
    pub alpha: f32,
    /// Discount factor
    pub gamma: f32,
    /// Step cap after which an episode times out
    pub max_steps: u32,
    pub undefined_state: UndefinedStatePolicy,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            max_steps: 100,
            undefined_state: UndefinedStatePolicy::default(),
        }
    }
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Reached the goal
    Success,
    /// Entered a non-goal terminal state
    Failure,
    /// Hit the step cap
    Timeout,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

/// Summary of a finished episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    pub agent: usize,
    /// Zero-based episode index of this agent
    pub episode: u32,
    pub steps: u32,
    pub outcome: Outcome,
    /// Sum of the rewards learned from during the episode
    pub reward: f32,
}

/// Result of advancing an agent by one step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Running,
    Finished(EpisodeReport),
}

/// A Q-learning agent: a position, its own Q-table, exploration policy and random stream
///
/// Agents never share mutable state, so any number of them can learn side by side on one
/// environment.
#[derive(Debug, Clone)]
pub struct Agent<S: Hashable, D: Decay = Schedule> {
    id: usize,
    pos: S,
    steps: u32,
    episode: u32,
    episode_reward: f32,
    q_table: QTable<S>,
    exploration: EpsilonGreedy<D>,
    history: SuccessHistory,
    rng: StdRng,
}

impl<S: Hashable, D: Decay> Agent<S, D> {
    /// Place a new agent on the start state of `env` with a zeroed table
    ///
    /// **Panics** if `window` is zero
    pub fn new<E>(
        id: usize,
        env: &E,
        exploration: EpsilonGreedy<D>,
        window: usize,
        rng: StdRng,
    ) -> Self
    where
        E: Environment<State = S>,
    {
        Self {
            id,
            pos: env.start(),
            steps: 0,
            episode: 0,
            episode_reward: 0.0,
            q_table: QTable::new(env),
            exploration,
            history: SuccessHistory::new(window),
            rng,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn position(&self) -> S {
        self.pos
    }

    /// Steps taken in the current episode
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Number of finished episodes
    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn q_table(&self) -> &QTable<S> {
        &self.q_table
    }

    pub fn history(&self) -> &SuccessHistory {
        &self.history
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon(self.episode)
    }

    /// Advance the current episode by exactly one step
    ///
    /// When the episode ends the agent is already back on the start state, ready for the next one.
    pub fn step<E>(&mut self, env: &E, params: &LearningParams) -> Step
    where
        E: Environment<State = S>,
    {
        if env.is_terminal(self.pos) {
            return Step::Finished(self.finish(env));
        }

        let state = self.pos;
        let action = self
            .exploration
            .select_action(&self.q_table, state, self.episode, &mut self.rng);
        let mut next = env.attempt_move(state, action);
        let mut reward = Some(env.reward(next));

        if !self.q_table.contains(&next) {
            match params.undefined_state {
                UndefinedStatePolicy::Penalize { penalty } => reward = Some(penalty),
                UndefinedStatePolicy::Stall => {
                    trace!("agent {} stalled: {next:?} is not in the table", self.id);
                    reward = None;
                }
            }
            next = state;
        }

        if let Some(reward) = reward {
            let next_max = self.q_table.max_value(&next).unwrap_or(0.0);
            self.q_table
                .update(state, action, reward, next_max, params.alpha, params.gamma);
            self.episode_reward += reward;
        }

        self.pos = next;
        self.steps += 1;

        if env.is_terminal(next) || self.steps >= params.max_steps {
            Step::Finished(self.finish(env))
        } else {
            Step::Running
        }
    }

    /// Run the current episode to completion
    pub fn run_episode<E>(&mut self, env: &E, params: &LearningParams) -> EpisodeReport
    where
        E: Environment<State = S>,
    {
        loop {
            if let Step::Finished(report) = self.step(env, params) {
                return report;
            }
        }
    }

    fn finish<E>(&mut self, env: &E) -> EpisodeReport
    where
        E: Environment<State = S>,
    {
        let outcome = if env.is_goal(self.pos) {
            Outcome::Success
        } else if env.is_terminal(self.pos) {
            Outcome::Failure
        } else {
            Outcome::Timeout
        };
        self.history.record(outcome.is_success());

        let report = EpisodeReport {
            agent: self.id,
            episode: self.episode,
            steps: self.steps,
            outcome,
            reward: self.episode_reward,
        };

        self.episode += 1;
        self.steps = 0;
        self.episode_reward = 0.0;
        self.pos = env.start();
        report
    }
}

impl<D: Decay> Agent<Pos, D> {
    pub fn view(&self) -> AgentView {
        AgentView {
            id: self.id,
            pos: self.pos,
        }
    }
}

/// Cadence settings for a [`Trainer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Advance agents one step per [`tick`](Trainer::tick) between batches
    pub paced: bool,
    /// Fast episodes per agent run by each batch. Zero disables batching.
    pub batch_size: u32,
    /// Per-agent episode limit, `None` for unbounded
    pub max_episodes: Option<u32>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            paced: true,
            batch_size: 1000,
            max_episodes: None,
        }
    }
}

/// What a call to [`Trainer::tick`] did
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Ran a batch of fast episodes, `episodes` in total across all agents
    Batch { episodes: u32 },
    /// Advanced every agent by one step; lists the episodes that ended
    Stepped { finished: Vec<EpisodeReport> },
    /// Stopped or out of episodes
    Idle,
}

/// Trains a group of independent agents on a shared, read-only environment
///
/// One engine covers every cadence. [`train`](Self::train) runs whole episodes back to back,
/// [`tick`](Self::tick) is meant to be called by an external scheduler. With `paced` set each tick
/// moves every agent one step (round-robin, in id order), and once every agent has finished a
/// showcase episode the next tick runs a batch of `batch_size` fast episodes. Without `paced` every
/// tick runs a batch.
#[derive(Debug, Clone)]
pub struct Trainer<S: Hashable, D: Decay = Schedule> {
    agents: Vec<Agent<S, D>>,
    params: LearningParams,
    config: TrainerConfig,
    showcased: Vec<bool>,
    batch_due: bool,
    running: bool,
}

impl<S: Hashable, D: Decay> Trainer<S, D> {
    pub fn new(agents: Vec<Agent<S, D>>, params: LearningParams, config: TrainerConfig) -> Self {
        let showcased = vec![false; agents.len()];
        Self {
            agents,
            params,
            config,
            showcased,
            batch_due: true,
            running: true,
        }
    }

    pub fn agents(&self) -> &[Agent<S, D>] {
        &self.agents
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Request a cooperative stop; subsequent training calls do nothing
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.is_exhausted()
    }

    /// Whether every agent has used up its episode limit
    pub fn is_exhausted(&self) -> bool {
        self.agents.iter().all(|a| !self.has_budget(a))
    }

    fn has_budget(&self, agent: &Agent<S, D>) -> bool {
        self.config.max_episodes.map_or(true, |max| agent.episode < max)
    }

    /// Run up to `episodes` fast episodes per agent, without pacing
    ///
    /// **Returns** the number of episodes run across all agents
    pub fn train<E, X>(&mut self, env: &E, episodes: u32, sink: &mut X) -> u32
    where
        E: Environment<State = S>,
        X: Diagnostics + ?Sized,
    {
        if !self.running {
            return 0;
        }

        let mut total = 0;
        for ix in 0..self.agents.len() {
            for _ in 0..episodes {
                if !self.has_budget(&self.agents[ix]) {
                    break;
                }
                let report = self.agents[ix].run_episode(env, &self.params);
                sink.episode(&report);
                total += 1;
            }
            let agent = &self.agents[ix];
            sink.success_rate(agent.id, agent.history.rate(), agent.history.len());
        }
        total
    }

    /// Run one batch of `batch_size` fast episodes per agent
    pub fn train_batch<E, X>(&mut self, env: &E, sink: &mut X) -> u32
    where
        E: Environment<State = S>,
        X: Diagnostics + ?Sized,
    {
        let total = self.train(env, self.config.batch_size, sink);
        self.batch_due = false;
        self.showcased.fill(false);
        info!("batch done: {total} episodes");
        total
    }

    /// Handle one scheduler event
    pub fn tick<E, X>(&mut self, env: &E, sink: &mut X) -> Tick
    where
        E: Environment<State = S>,
        X: Diagnostics + ?Sized,
    {
        if !self.is_running() {
            return Tick::Idle;
        }

        if self.config.batch_size > 0 && (!self.config.paced || self.batch_due) {
            let episodes = self.train_batch(env, sink);
            return Tick::Batch { episodes };
        }

        if !self.config.paced {
            // No batches and no pacing leaves nothing to do
            return Tick::Idle;
        }

        let mut finished = Vec::new();
        for ix in 0..self.agents.len() {
            if !self.has_budget(&self.agents[ix]) {
                continue;
            }
            if let Step::Finished(report) = self.agents[ix].step(env, &self.params) {
                sink.episode(&report);
                let agent = &self.agents[ix];
                sink.success_rate(agent.id, agent.history.rate(), agent.history.len());
                self.showcased[ix] = true;
                finished.push(report);
            }
        }

        // Agents out of budget will never finish another showcase
        let showcased = self
            .showcased
            .iter()
            .zip(&self.agents)
            .all(|(&done, agent)| done || !self.has_budget(agent));
        if showcased {
            self.batch_due = true;
        }

        Tick::Stepped { finished }
    }
}

impl<D: Decay> Trainer<Pos, D> {
    /// Positions of every agent, for rendering
    pub fn views(&self) -> Vec<AgentView> {
        self.agents.iter().map(Agent::view).collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{decay::Constant, env::Action, grid::Grid};

    /// A 1x4 corridor whose last cell is the goal but whose state space omits the third cell
    struct GappedCorridor;

    impl Environment for GappedCorridor {
        type State = usize;

        fn start(&self) -> usize {
            0
        }

        fn states(&self) -> Vec<usize> {
            vec![0, 1, 3]
        }

        fn reward(&self, state: usize) -> f32 {
            if state == 3 {
                100.0
            } else {
                -1.0
            }
        }

        fn attempt_move(&self, state: usize, action: Action) -> usize {
            match action {
                Action::Right => (state + 1).min(3),
                Action::Left => state.saturating_sub(1),
                Action::Up | Action::Down => state,
            }
        }

        fn is_terminal(&self, state: usize) -> bool {
            state == 3
        }

        fn is_goal(&self, state: usize) -> bool {
            state == 3
        }
    }

    fn agent<E: Environment>(env: &E, epsilon: f32, seed: u64) -> Agent<E::State, Constant> {
        Agent::new(
            0,
            env,
            EpsilonGreedy::constant(epsilon),
            20,
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn episode_outcomes() {
        let params = LearningParams::default();

        let grid: Grid = ".C".parse().unwrap();
        let mut mouse = agent(&grid, 1.0, 0);
        let report = mouse.run_episode(&grid, &params);
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(mouse.position(), (0, 0), "back on start");
        assert_eq!(mouse.steps(), 0);
        assert_eq!(mouse.episode(), 1);

        let grid: Grid = ".X\nX.\n..\n.C".parse().unwrap();
        let mut mouse = agent(&grid, 1.0, 0);
        let report = mouse.run_episode(&grid, &params);
        assert_eq!(report.outcome, Outcome::Failure, "only cats are reachable");
        assert_eq!(mouse.history().rate(), 0.0);
    }

    #[test]
    fn episode_times_out_at_cap() {
        let grid: Grid = ".#\n#C".parse().unwrap();
        let params = LearningParams {
            max_steps: 25,
            ..Default::default()
        };
        let mut mouse = agent(&grid, 0.3, 9);
        let report = mouse.run_episode(&grid, &params);
        assert_eq!(report.outcome, Outcome::Timeout);
        assert_eq!(report.steps, 25);
        assert_eq!(report.reward, -25.0, "every bump costs one");
    }

    #[test]
    fn undefined_state_is_penalized() {
        let env = GappedCorridor;
        let params = LearningParams {
            alpha: 1.0,
            gamma: 0.0,
            max_steps: 1,
            undefined_state: UndefinedStatePolicy::Penalize { penalty: -10.0 },
        };
        let mut mouse = agent(&env, 0.0, 2);
        // Make Right the only greedy move from 0, then from 1
        mouse.q_table.update(0, Action::Right, 1.0, 0.0, 1.0, 0.0);
        mouse.q_table.update(1, Action::Right, 1.0, 0.0, 1.0, 0.0);

        mouse.run_episode(&env, &params);
        assert_eq!(mouse.q_table.value(&0, Action::Right), Some(-1.0));

        mouse.pos = 1;
        let report = mouse.run_episode(&env, &params);
        assert_eq!(report.steps, 1);
        assert_eq!(report.reward, -10.0);
        assert_eq!(mouse.q_table.value(&1, Action::Right), Some(-10.0));
    }

    #[test]
    fn undefined_state_stalls() {
        let env = GappedCorridor;
        let params = LearningParams {
            max_steps: 10,
            undefined_state: UndefinedStatePolicy::Stall,
            ..Default::default()
        };
        let mut mouse = agent(&env, 0.0, 4);
        mouse.q_table.update(1, Action::Right, 1.0, 0.0, 1.0, 0.0);
        mouse.pos = 1;

        let report = mouse.run_episode(&env, &params);
        assert_eq!(report.outcome, Outcome::Timeout, "stalling is still bounded");
        assert_eq!(report.steps, 10);
        assert_eq!(report.reward, 0.0, "nothing learned while stalled");
        assert_eq!(mouse.q_table.value(&1, Action::Right), Some(1.0));
    }

    #[test]
    fn tick_advances_every_agent_once() {
        let grid = Grid::empty(4, 4).unwrap();
        let agents = (0..3)
            .map(|id| {
                Agent::new(
                    id,
                    &grid,
                    EpsilonGreedy::new(Schedule::default()),
                    20,
                    StdRng::seed_from_u64(id as u64),
                )
            })
            .collect();
        let config = TrainerConfig {
            paced: true,
            batch_size: 0,
            max_episodes: None,
        };
        let mut trainer = Trainer::new(agents, LearningParams::default(), config);

        for t in 1..=5 {
            assert!(matches!(trainer.tick(&grid, &mut ()), Tick::Stepped { .. }));
            for agent in trainer.agents() {
                assert_eq!(agent.steps(), t, "agent {} out of step", agent.id());
            }
        }
        assert_eq!(trainer.views().len(), 3);
    }

    #[test]
    fn batches_alternate_with_showcase_episodes() {
        let grid: Grid = "..\n.C".parse().unwrap();
        let agents = vec![Agent::new(
            0,
            &grid,
            EpsilonGreedy::new(Schedule::default()),
            20,
            StdRng::seed_from_u64(0),
        )];
        let config = TrainerConfig {
            paced: true,
            batch_size: 10,
            max_episodes: None,
        };
        let mut trainer = Trainer::new(agents, LearningParams::default(), config);

        assert_eq!(trainer.tick(&grid, &mut ()), Tick::Batch { episodes: 10 });
        loop {
            match trainer.tick(&grid, &mut ()) {
                Tick::Stepped { finished } if !finished.is_empty() => break,
                Tick::Stepped { .. } => {}
                other => panic!("unexpected {other:?} during showcase"),
            }
        }
        assert_eq!(trainer.tick(&grid, &mut ()), Tick::Batch { episodes: 10 });
        assert_eq!(trainer.agents()[0].episode(), 21);
    }

    #[test]
    fn stops_cooperatively() {
        let grid = Grid::empty(3, 3).unwrap();
        let agents = vec![Agent::new(
            0,
            &grid,
            EpsilonGreedy::new(Schedule::default()),
            20,
            StdRng::seed_from_u64(0),
        )];
        let config = TrainerConfig {
            paced: false,
            batch_size: 7,
            max_episodes: Some(10),
        };
        let mut trainer = Trainer::new(agents, LearningParams::default(), config);

        assert_eq!(trainer.tick(&grid, &mut ()), Tick::Batch { episodes: 7 });
        assert_eq!(trainer.tick(&grid, &mut ()), Tick::Batch { episodes: 3 });
        assert!(trainer.is_exhausted());
        assert_eq!(trainer.tick(&grid, &mut ()), Tick::Idle);

        let mut trainer = Trainer::new(
            vec![Agent::new(
                0,
                &grid,
                EpsilonGreedy::new(Schedule::default()),
                20,
                StdRng::seed_from_u64(0),
            )],
            LearningParams::default(),
            TrainerConfig::default(),
        );
        trainer.stop();
        assert!(!trainer.is_running());
        assert_eq!(trainer.train(&grid, 100, &mut ()), 0);
        assert_eq!(trainer.tick(&grid, &mut ()), Tick::Idle);
    }
}
