use log::{debug, info};
use rand::{thread_rng, Rng};

use crate::{
    algo::{EpisodeStats, LearnerCore, TabularLearner},
    exploration::EpsilonGreedy,
    grid::{Action, GridMap},
    reward::RewardConfig,
    table::{Normalize, StateActionTable},
    Result,
};

/// Configuration for the [`QLearner`]
pub struct QLearnerConfig {
    pub episodes: u32,
    pub alpha: f32,
    pub gamma: f32,
    pub epsilon_start: f32,
    /// Epsilon multiplier for steps whose draw falls in the exploit branch
    pub decay_exploit: f32,
    /// Epsilon multiplier for the remaining steps
    pub decay_explore: f32,
    pub norm: Normalize,
    pub rewards: RewardConfig,
}

impl Default for QLearnerConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            alpha: 0.1,
            gamma: 0.9,
            epsilon_start: 0.9,
            decay_exploit: 0.999,
            decay_explore: 1.0,
            norm: Normalize::Max,
            rewards: RewardConfig::default(),
        }
    }
}

/// Off-policy TD(0) learner over a masked Q table
pub struct QLearner {
    core: LearnerCore,
    exploration: EpsilonGreedy,
    last_draw: f32,
    ep_steps_random: u32,
    ep_epsilon_start: f32,
}

impl QLearner {
    /// **Panics** if `alpha`, `gamma`, or `epsilon_start` is not in the
    /// interval `[0,1]`
    pub fn new(config: QLearnerConfig) -> Self {
        let epsilon_start = config.epsilon_start;
        Self {
            core: LearnerCore::new(
                config.episodes,
                config.alpha,
                config.gamma,
                config.norm,
                config.rewards,
            ),
            exploration: EpsilonGreedy::new(
                config.epsilon_start,
                config.decay_exploit,
                config.decay_explore,
            ),
            last_draw: 0.0,
            ep_steps_random: 0,
            ep_epsilon_start: epsilon_start,
        }
    }

    /// The learned Q table, once [`prepare`](TabularLearner::prepare) has run
    pub fn q_table(&self) -> Option<&StateActionTable> {
        self.core.values().ok()
    }
}

impl TabularLearner for QLearner {
    fn prepare(&mut self, grid: &GridMap) -> Result<()> {
        info!(
            "running Q-learning: alpha={:.2}, gamma={:.2}, epsilon_start={:.2}, decay_exploit={:.3}, decay_explore={:.3}",
            self.core.alpha(),
            self.core.gamma(),
            self.exploration.epsilon(),
            self.exploration.decay_exploit(),
            self.exploration.decay_explore(),
        );
        self.core.build_rewards(grid);
        debug!("reward table: {:?}", self.core.rewards()?);
        self.core.init_values()
    }

    fn begin_episode(&mut self, _state: usize) -> Result<()> {
        self.ep_steps_random = 0;
        self.ep_epsilon_start = self.exploration.epsilon();
        Ok(())
    }

    fn next_action(&mut self, state: usize) -> Result<Action> {
        let draw = thread_rng().gen::<f32>();
        self.last_draw = draw;
        let (action, explored) = self.exploration.select(self.core.values()?, state, draw);
        if explored {
            self.ep_steps_random += 1;
            debug!("explored at state {state}");
        }
        Ok(action)
    }

    fn observe(&mut self, state: usize, action: Action, next_state: usize) -> Result<f32> {
        let a = action.index();
        let reward = self.core.reward_at(state, a)?;
        let values = self.core.values()?;
        let max_next = values
            .row_max(next_state)
            .expect("at least one action is defined per state");
        let target = reward + self.core.gamma() * max_next;
        let q = values.get(state, a).expect("taken action is defined");
        let updated = (1.0 - self.core.alpha()) * q + self.core.alpha() * target;
        self.core.values_mut()?.set(state, a, updated);
        self.core.normalize_values()?;
        // one draw per step drives both the selection and the decay branch
        self.exploration.decay(self.last_draw);
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
        &[
            "Episode",
            "Steps",
            "Total_Reward",
            "Outcome",
            "Steps_random",
            "Epsilon_start",
        ]
    }

    fn episode_summary(&self, stats: &EpisodeStats) -> Vec<String> {
        vec![
            stats.episode.to_string(),
            stats.steps.to_string(),
            format!("{:.2}", stats.total_reward),
            stats.outcome.to_string(),
            self.ep_steps_random.to_string(),
            format!("{:.2}", self.ep_epsilon_start),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridMap;

    fn learner(alpha: f32) -> QLearner {
        let mut learner = QLearner::new(QLearnerConfig {
            alpha,
            gamma: 0.9,
            ..Default::default()
        });
        learner.prepare(&GridMap::frozen_lake_4x4()).unwrap();
        learner
    }

    #[test]
    fn full_alpha_update_collapses_to_target() {
        let mut learner = learner(1.0);
        // (3,2) -Right-> goal: R = 100, next row all zero, so Q becomes 100
        // and max-normalization rescales the table to 1
        let metric = learner.observe(14, Action::Right, 15).unwrap();
        assert_eq!(metric, 1.0);
        assert_eq!(learner.q_table().unwrap().get(14, Action::Right.index()), Some(1.0));

        // (3,1) -Right-> (3,2): R = 0, bootstraps from max Q[14,:] = 1
        let metric = learner.observe(13, Action::Right, 14).unwrap();
        assert_eq!(metric, 0.9);
    }

    #[test]
    fn update_preserves_the_mask() {
        let mut learner = learner(0.5);
        learner.observe(14, Action::Right, 15).unwrap();
        let q = learner.q_table().unwrap();
        assert_eq!(q.get(0, Action::Left.index()), None);
        assert_eq!(q.get(15, Action::Down.index()), None);
    }

    #[test]
    fn summary_row_matches_headers() {
        let mut learner = learner(0.1);
        learner.begin_episode(0).unwrap();
        let stats = EpisodeStats {
            episode: 3,
            steps: 6,
            total_reward: 1.25,
            outcome: 'G',
        };
        let row = learner.episode_summary(&stats);
        assert_eq!(row.len(), learner.metric_headers().len());
        assert_eq!(row[0], "3");
        assert_eq!(row[2], "1.25");
        assert_eq!(row[3], "G");
        assert_eq!(row[5], "0.90");
    }
}
