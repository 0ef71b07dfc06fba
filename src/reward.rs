use strum::VariantArray;

use crate::grid::{Action, GridMap, Square};
use crate::table::StateActionTable;

/// Constants the reward table is built from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardConfig {
    /// Reward for a move that lands on the goal square
    pub goal: f32,
    /// Reward for every other defined move
    pub step: f32,
    /// When true, wall moves stay defined and the whole table is zero
    pub allow_wall_moves: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            goal: 100.0,
            step: 0.0,
            allow_wall_moves: false,
        }
    }
}

/// Build the masked state x action reward table for `grid`.
///
/// With wall moves disallowed, a wall move is masked out, a move onto the
/// goal square earns `goal`, and any other move earns `step`. With wall moves
/// allowed, reward shaping is disabled and every entry is zero.
pub fn build_rewards(grid: &GridMap, config: &RewardConfig) -> StateActionTable {
    let num_states = grid.num_states();
    let num_actions = Action::VARIANTS.len();

    if config.allow_wall_moves {
        return StateActionTable::filled(num_states, num_actions, 0.0);
    }

    let mut table = StateActionTable::masked(num_states, num_actions);
    for state in 0..num_states {
        let (row, col) = grid.from_state(state);
        for &action in Action::VARIANTS {
            if grid.is_wall_move(row, col, action) {
                continue;
            }
            let (dest_row, dest_col) = grid.apply_action(row, col, action);
            let value = if grid.get(dest_row, dest_col) == Square::Goal {
                config.goal
            } else {
                config.step
            };
            table.set(state, action.index(), value);
        }
    }
    table
}
