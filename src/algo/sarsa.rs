use std::str::FromStr;

use log::{debug, info};

use crate::{
    algo::{EpisodeStats, LearnerCore, TabularLearner},
    exploration::{argmax_defined, greedy_tiebreak},
    grid::{Action, GridMap},
    reward::RewardConfig,
    table::{Normalize, StateActionTable},
    Error, Result,
};

/// How SARSA picks the action for the next state
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SelectPolicy {
    /// Greedy with random tie-breaking
    Random,
    /// Strict first-index argmax, no tie randomization
    #[default]
    NonRandom,
}

impl FromStr for SelectPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(SelectPolicy::Random),
            "non-random" => Ok(SelectPolicy::NonRandom),
            _ => Err(Error::UnknownPolicy(s.into())),
        }
    }
}

/// Configuration for the [`SarsaLearner`]
pub struct SarsaConfig {
    pub episodes: u32,
    pub alpha: f32,
    pub gamma: f32,
    /// Trace decay; each step the whole trace is scaled by `gamma * td_lambda`
    pub td_lambda: f32,
    pub select: SelectPolicy,
    pub norm: Normalize,
    pub rewards: RewardConfig,
}

impl Default for SarsaConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            alpha: 0.1,
            gamma: 0.9,
            td_lambda: 0.9,
            select: SelectPolicy::default(),
            norm: Normalize::Max,
            rewards: RewardConfig::default(),
        }
    }
}

/// Eligibility trace matrix, rebuilt at the start of every episode
pub(crate) struct EligibilityTrace {
    entries: Vec<f32>,
    num_actions: usize,
}

impl EligibilityTrace {
    pub fn zeros(num_states: usize, num_actions: usize) -> Self {
        Self {
            entries: vec![0.0; num_states * num_actions],
            num_actions,
        }
    }

    /// Scale every entry by `factor`
    pub fn decay(&mut self, factor: f32) {
        for entry in &mut self.entries {
            *entry *= factor;
        }
    }

    /// Stamp the visited (state, action) cell to 1
    pub fn mark(&mut self, state: usize, action: usize) {
        self.entries[state * self.num_actions + action] = 1.0;
    }

    pub fn get(&self, state: usize, action: usize) -> f32 {
        self.entries[state * self.num_actions + action]
    }
}

/// On-policy SARSA(lambda) learner with an eligibility trace
pub struct SarsaLearner {
    core: LearnerCore,
    td_lambda: f32,
    select: SelectPolicy,
    trace: EligibilityTrace,
    pending: Option<Action>,
}

impl SarsaLearner {
    /// **Panics** if `alpha`, `gamma`, or `td_lambda` is not in the interval
    /// `[0,1]`
    pub fn new(config: SarsaConfig) -> Self {
        crate::assert_interval!(config.td_lambda, 0.0, 1.0);
        Self {
            core: LearnerCore::new(
                config.episodes,
                config.alpha,
                config.gamma,
                config.norm,
                config.rewards,
            ),
            td_lambda: config.td_lambda,
            select: config.select,
            trace: EligibilityTrace::zeros(0, 0),
            pending: None,
        }
    }

    /// The learned Q table, once [`prepare`](TabularLearner::prepare) has run
    pub fn q_table(&self) -> Option<&StateActionTable> {
        self.core.values().ok()
    }

    fn select_action(&self, state: usize) -> Result<Action> {
        let values = self.core.values()?;
        Ok(match self.select {
            SelectPolicy::Random => greedy_tiebreak(values, state),
            SelectPolicy::NonRandom => argmax_defined(values, state),
        })
    }
}

impl TabularLearner for SarsaLearner {
    fn prepare(&mut self, grid: &GridMap) -> Result<()> {
        info!(
            "running SARSA: alpha={:.2}, gamma={:.2}, lambda={:.2}",
            self.core.alpha(),
            self.core.gamma(),
            self.td_lambda,
        );
        self.core.build_rewards(grid);
        debug!("reward table: {:?}", self.core.rewards()?);
        self.core.init_values()
    }

    fn begin_episode(&mut self, _state: usize) -> Result<()> {
        let values = self.core.values()?;
        self.trace = EligibilityTrace::zeros(values.num_states(), values.num_actions());
        self.pending = None;
        Ok(())
    }

    fn next_action(&mut self, state: usize) -> Result<Action> {
        match self.pending.take() {
            Some(action) => Ok(action),
            // the first action of an episode is always greedy with tie-break
            None => Ok(greedy_tiebreak(self.core.values()?, state)),
        }
    }

    fn observe(&mut self, state: usize, action: Action, next_state: usize) -> Result<f32> {
        let a = action.index();
        let next_action = self.select_action(next_state)?;
        let a2 = next_action.index();
        debug!("next action for state {next_state}: {next_action:?}");

        self.trace.decay(self.core.gamma() * self.td_lambda);
        self.trace.mark(state, a);

        let reward = self.core.reward_at(state, a)?;
        let values = self.core.values()?;
        let q_current = values.get(state, a).expect("taken action is defined");
        let q_next = values
            .get(next_state, a2)
            .expect("selected action is defined");
        let delta = reward + self.core.gamma() * (q_next - q_current);
        debug!("learned value: {delta:.2}");

        let alpha = self.core.alpha();
        let trace = &self.trace;
        for ((s, act), q) in self.core.values_mut()?.iter_defined_mut() {
            *q += alpha * delta * trace.get(s, act);
        }
        self.core.normalize_values()?;

        self.pending = Some(next_action);
        Ok(self
            .core
            .values()?
            .get(state, a)
            .expect("taken action is defined"))
    }

    fn episodes(&self) -> u32 {
        self.core.episodes()
    }

    fn metric_headers(&self) -> &'static [&'static str] {
        &["Episode", "Steps", "Total_Reward", "Outcome"]
    }

    fn episode_summary(&self, stats: &EpisodeStats) -> Vec<String> {
        vec![
            stats.episode.to_string(),
            stats.steps.to_string(),
            format!("{:.2}", stats.total_reward),
            stats.outcome.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridMap;

    #[test]
    fn trace_marks_and_decays() {
        let mut trace = EligibilityTrace::zeros(4, 4);
        trace.mark(1, 2);
        assert_eq!(trace.get(1, 2), 1.0);
        assert_eq!(trace.get(0, 0), 0.0);

        let k = 0.9 * 0.5;
        trace.decay(k);
        trace.mark(2, 3);
        assert_eq!(trace.get(1, 2), k);
        assert_eq!(trace.get(2, 3), 1.0);
    }

    #[test]
    fn parse_select_policy_names() {
        assert_eq!("random".parse::<SelectPolicy>().unwrap(), SelectPolicy::Random);
        assert_eq!(
            "non-random".parse::<SelectPolicy>().unwrap(),
            SelectPolicy::NonRandom
        );
        assert!(matches!(
            "greedy".parse::<SelectPolicy>(),
            Err(Error::UnknownPolicy(_))
        ));
    }

    #[test]
    fn goal_transition_updates_through_the_trace() {
        let mut learner = SarsaLearner::new(SarsaConfig {
            alpha: 1.0,
            gamma: 0.9,
            td_lambda: 0.9,
            select: SelectPolicy::NonRandom,
            ..Default::default()
        });
        learner.prepare(&GridMap::frozen_lake_4x4()).unwrap();
        learner.begin_episode(0).unwrap();

        // (3,2) -Right-> goal: delta = 100, the freshly marked cell carries
        // trace 1, and max-normalization rescales the table to 1
        let metric = learner.observe(14, Action::Right, 15).unwrap();
        assert_eq!(metric, 1.0);
        let q = learner.q_table().unwrap();
        assert_eq!(q.get(14, Action::Right.index()), Some(1.0));
        assert_eq!(q.get(13, Action::Right.index()), Some(0.0));
        assert_eq!(q.get(15, Action::Down.index()), None);
    }

    #[test]
    fn trace_credits_earlier_steps_of_the_episode() {
        let mut learner = SarsaLearner::new(SarsaConfig {
            alpha: 1.0,
            gamma: 0.9,
            td_lambda: 0.5,
            select: SelectPolicy::NonRandom,
            norm: Normalize::Max,
            ..Default::default()
        });
        learner.prepare(&GridMap::frozen_lake_4x4()).unwrap();
        learner.begin_episode(13).unwrap();

        // first transition earns nothing, but leaves trace on (13, Right)
        let metric = learner.observe(13, Action::Right, 14).unwrap();
        assert_eq!(metric, 0.0);

        // the goal transition's delta flows back through the decayed trace
        learner.observe(14, Action::Right, 15).unwrap();
        let q = learner.q_table().unwrap();
        assert_eq!(q.get(14, Action::Right.index()), Some(1.0));
        // trace on the earlier step was gamma * lambda = 0.45
        assert_eq!(q.get(13, Action::Right.index()), Some(0.45));
    }

    #[test]
    fn first_action_of_episode_is_greedy() {
        let mut learner = SarsaLearner::new(SarsaConfig::default());
        learner.prepare(&GridMap::frozen_lake_4x4()).unwrap();
        learner.begin_episode(0).unwrap();
        // from the start square only Down and Right are feasible
        let action = learner.next_action(0).unwrap();
        assert!(matches!(action, Action::Down | Action::Right));
    }
}
