use rand::{seq::SliceRandom, thread_rng, Rng};

use crate::{assert_interval, grid::Action, table::StateActionTable};

/// Exploration policy result
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Among the defined actions at `state`, pick the one with the maximum value,
/// breaking ties uniformly at random
pub fn greedy_tiebreak(table: &StateActionTable, state: usize) -> Action {
    let row = table.row(state);
    let best = row
        .iter()
        .flatten()
        .copied()
        .reduce(f32::max)
        .expect("at least one action is defined per state");
    let tied = row
        .iter()
        .enumerate()
        .filter(|(_, value)| **value == Some(best))
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    let index = if tied.len() > 1 {
        *tied.choose(&mut thread_rng()).expect("tied is not empty")
    } else {
        tied[0]
    };
    Action::from_index(index).expect("index comes from the action dimension")
}

/// Strict first-index argmax over the defined actions at `state`, with no
/// tie randomization
pub fn argmax_defined(table: &StateActionTable, state: usize) -> Action {
    let mut best: Option<(usize, f32)> = None;
    for (i, value) in table.row(state).iter().enumerate() {
        if let Some(v) = value {
            if best.map_or(true, |(_, bv)| *v > bv) {
                best = Some((i, *v));
            }
        }
    }
    let (index, _) = best.expect("at least one action is defined per state");
    Action::from_index(index).expect("index comes from the action dimension")
}

/// Sample actions uniformly until one defined at `state` is drawn.
///
/// Terminates because every state keeps at least one feasible action under
/// this grid topology.
pub fn uniform_feasible(table: &StateActionTable, state: usize) -> Action {
    let mut rng = thread_rng();
    loop {
        let index = rng.gen_range(0..table.num_actions());
        if table.is_defined(state, index) {
            return Action::from_index(index).expect("index comes from the action dimension");
        }
    }
}

/// Epsilon greedy exploration policy with two-factor multiplicative decay
pub struct EpsilonGreedy {
    epsilon: f32,
    decay_exploit: f32,
    decay_explore: f32,
}

impl EpsilonGreedy {
    /// Initialize the policy with a starting threshold and the decay factor
    /// for each branch
    ///
    /// **Panics** if `epsilon_start` is not in the interval `[0,1]`
    pub fn new(epsilon_start: f32, decay_exploit: f32, decay_explore: f32) -> Self {
        assert_interval!(epsilon_start, 0.0, 1.0);
        Self {
            epsilon: epsilon_start,
            decay_exploit,
            decay_explore,
        }
    }

    /// The current epsilon threshold
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn decay_exploit(&self) -> f32 {
        self.decay_exploit
    }

    pub fn decay_explore(&self) -> f32 {
        self.decay_explore
    }

    /// Invoke the policy for a uniform `draw` in `[0,1)`
    pub fn choose(&self, draw: f32) -> Choice {
        if draw < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Select an action for `state`, returning it along with whether the
    /// exploratory branch was taken
    pub fn select(&self, table: &StateActionTable, state: usize, draw: f32) -> (Action, bool) {
        match self.choose(draw) {
            Choice::Explore => (uniform_feasible(table, state), true),
            Choice::Exploit => (greedy_tiebreak(table, state), false),
        }
    }

    /// Decay epsilon once for this step's draw.
    ///
    /// Branches on the draw itself, not on the realized [`Choice`]; the two
    /// disagree when `draw == epsilon` exactly.
    pub fn decay(&mut self, draw: f32) {
        if draw > self.epsilon {
            self.epsilon *= self.decay_exploit;
        } else {
            self.epsilon *= self.decay_explore;
        }
    }
}
