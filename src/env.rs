use crate::grid::{Action, GridMap};

/// A deterministic gridworld an agent can act in.
///
/// This is the seam between the learners and the simulator: the runner only
/// needs reset/step plus the grid layout the reward model reads the goal
/// classification from.
pub trait Environment {
    /// Reset to the initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> usize;

    /// Apply an action
    ///
    /// **Returns** `(next_state, raw_reward, done)`. The raw reward is the
    /// simulator's own signal; the learners ignore it and recompute reward
    /// from their reward table.
    fn step(&mut self, action: Action) -> (usize, f32, bool);

    /// Emit a diagnostic view of the current state
    fn render(&self) {}

    /// The grid layout
    fn grid(&self) -> &GridMap;
}
