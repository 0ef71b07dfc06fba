pub mod q_learning;
pub mod sarsa;

pub use q_learning::{QLearner, QLearnerConfig};
pub use sarsa::{SarsaConfig, SarsaLearner, SelectPolicy};

use crate::{
    assert_interval,
    grid::{Action, GridMap},
    reward::{build_rewards, RewardConfig},
    table::{Normalize, StateActionTable},
    Error, Result,
};

/// Per-episode aggregates handed to [`TabularLearner::episode_summary`]
pub struct EpisodeStats {
    pub episode: u32,
    pub steps: u32,
    /// Sum of the post-update value at each taken (state, action) pair
    pub total_reward: f32,
    /// Symbol of the terminal square
    pub outcome: char,
}

/// An episodic tabular learner driven by a [`Trainer`](crate::run::Trainer)
pub trait TabularLearner {
    /// Build the reward and value tables for `grid`; called once per run
    fn prepare(&mut self, grid: &GridMap) -> Result<()>;

    /// Start a new episode at `state`
    fn begin_episode(&mut self, state: usize) -> Result<()>;

    /// The action to take from `state`
    fn next_action(&mut self, state: usize) -> Result<Action>;

    /// Incorporate an observed transition
    ///
    /// **Returns** the post-update value at `(state, action)`, which the
    /// runner accumulates as the episode reward metric
    fn observe(&mut self, state: usize, action: Action, next_state: usize) -> Result<f32>;

    /// Number of episodes this learner is configured to run
    fn episodes(&self) -> u32;

    /// Column headers for the metrics sink
    fn metric_headers(&self) -> &'static [&'static str];

    /// Format one metrics row
    fn episode_summary(&self, stats: &EpisodeStats) -> Vec<String>;
}

/// State shared by both learners: the reward and value tables plus the
/// hyperparameters every update rule uses
pub(crate) struct LearnerCore {
    episodes: u32,
    alpha: f32,
    gamma: f32,
    norm: Normalize,
    reward_config: RewardConfig,
    rewards: Option<StateActionTable>,
    values: Option<StateActionTable>,
}

impl LearnerCore {
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    fn new(
        episodes: u32,
        alpha: f32,
        gamma: f32,
        norm: Normalize,
        reward_config: RewardConfig,
    ) -> Self {
        assert_interval!(alpha, 0.0, 1.0);
        assert_interval!(gamma, 0.0, 1.0);
        Self {
            episodes,
            alpha,
            gamma,
            norm,
            reward_config,
            rewards: None,
            values: None,
        }
    }

    fn episodes(&self) -> u32 {
        self.episodes
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    fn gamma(&self) -> f32 {
        self.gamma
    }

    fn build_rewards(&mut self, grid: &GridMap) {
        self.rewards = Some(build_rewards(grid, &self.reward_config));
    }

    /// Derive the value table from the reward table's mask, defined cells
    /// starting at zero
    fn init_values(&mut self) -> Result<()> {
        let rewards = self.rewards.as_ref().ok_or(Error::RewardsNotBuilt)?;
        self.values = Some(rewards.zeros_like_mask());
        Ok(())
    }

    fn rewards(&self) -> Result<&StateActionTable> {
        self.rewards.as_ref().ok_or(Error::RewardsNotBuilt)
    }

    fn values(&self) -> Result<&StateActionTable> {
        self.values.as_ref().ok_or(Error::ValuesNotInitialized)
    }

    fn values_mut(&mut self) -> Result<&mut StateActionTable> {
        self.values.as_mut().ok_or(Error::ValuesNotInitialized)
    }

    fn normalize_values(&mut self) -> Result<()> {
        let norm = self.norm;
        self.values_mut()?.normalize(norm);
        Ok(())
    }

    /// Reward for a taken action, always read from the reward table rather
    /// than the environment's step return
    fn reward_at(&self, state: usize, action: usize) -> Result<f32> {
        Ok(self
            .rewards()?
            .get(state, action)
            .expect("taken action has a defined reward"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_values_requires_rewards() {
        let mut core = LearnerCore::new(1, 0.5, 0.9, Normalize::Max, RewardConfig::default());
        assert!(matches!(core.init_values(), Err(Error::RewardsNotBuilt)));
        assert!(matches!(core.values(), Err(Error::ValuesNotInitialized)));
    }

    #[test]
    fn value_mask_mirrors_reward_mask() {
        let mut core = LearnerCore::new(1, 0.5, 0.9, Normalize::Max, RewardConfig::default());
        core.build_rewards(&GridMap::frozen_lake_4x4());
        core.init_values().unwrap();
        assert!(core.values().unwrap().mask_eq(core.rewards().unwrap()));
    }

    #[test]
    #[should_panic]
    fn alpha_outside_unit_interval_panics() {
        LearnerCore::new(1, 1.5, 0.9, Normalize::Max, RewardConfig::default());
    }
}
