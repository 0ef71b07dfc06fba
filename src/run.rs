use log::{debug, info, log_enabled, Level};

use crate::{
    algo::{EpisodeStats, TabularLearner},
    env::Environment,
    metrics::{MetricsSink, MetricsTarget},
    Result,
};

/// Per-invocation options for [`Trainer::execute`]
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Label for this run; the file sink derives its filename from it
    pub label: String,
    pub metrics: MetricsTarget,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            label: "run".to_string(),
            metrics: MetricsTarget::Disabled,
        }
    }
}

/// Drives repeated episodes of a learner against an environment, aggregating
/// per-episode metrics
pub struct Trainer<E, L> {
    env: E,
    learner: L,
}

impl<E, L> Trainer<E, L>
where
    E: Environment,
    L: TabularLearner,
{
    pub fn new(env: E, learner: L) -> Self {
        Self { env, learner }
    }

    pub fn learner(&self) -> &L {
        &self.learner
    }

    /// Run every configured episode
    ///
    /// **Returns** the buffered metrics text when the memory target was
    /// selected, `None` otherwise
    pub fn execute(&mut self, opts: &RunOptions) -> Result<Option<String>> {
        self.learner.prepare(self.env.grid())?;
        let mut sink =
            MetricsSink::open(opts.metrics, &opts.label, self.learner.metric_headers())?;

        for episode in 0..self.learner.episodes() {
            let mut state = self.env.reset();
            self.learner.begin_episode(state)?;
            let mut steps = 0u32;
            let mut total_reward = 0.0f32;

            loop {
                if log_enabled!(Level::Debug) {
                    self.env.render();
                }
                let action = self.learner.next_action(state)?;
                let (next_state, raw_reward, done) = self.env.step(action);
                debug!(
                    "episode {episode} step {steps}: {action:?} -> state {next_state} (raw reward {raw_reward})"
                );
                total_reward += self.learner.observe(state, action, next_state)?;
                state = next_state;
                steps += 1;
                if done {
                    break;
                }
            }

            let outcome = self.env.grid().square_at(state).symbol();
            let stats = EpisodeStats {
                episode,
                steps,
                total_reward,
                outcome,
            };
            info!("episode {episode} complete: {steps} steps, outcome {outcome}");
            sink.record(&self.learner.episode_summary(&stats))?;
        }

        sink.finish()
    }
}
