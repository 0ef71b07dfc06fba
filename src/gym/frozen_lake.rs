use log::debug;

use crate::env::Environment;
use crate::grid::{Action, GridMap, Square};

/// A deterministic, non-slippery frozen lake over a [`GridMap`]
///
/// The classic toy-text navigation task from Python
/// [gymnasium](https://gymnasium.farama.org/): walk from the start square to
/// the goal without falling into a hole. Moves that would leave the grid keep
/// the agent in place.
pub struct FrozenLake {
    grid: GridMap,
    pos: usize,
}

impl FrozenLake {
    /// The canonical 4x4 map
    pub fn new() -> Self {
        Self::with_grid(GridMap::frozen_lake_4x4())
    }

    pub fn with_grid(grid: GridMap) -> Self {
        let pos = grid.start_state();
        Self { grid, pos }
    }
}

impl Default for FrozenLake {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for FrozenLake {
    fn reset(&mut self) -> usize {
        self.pos = self.grid.start_state();
        self.pos
    }

    fn step(&mut self, action: Action) -> (usize, f32, bool) {
        let (row, col) = self.grid.from_state(self.pos);
        let (row, col) = self.grid.apply_action(row, col, action);
        self.pos = self.grid.to_state(row, col);

        let square = self.grid.get(row, col);
        let reward = match square {
            Square::Goal => 1.0,
            Square::Hole => -1.0,
            _ => -0.1,
        };
        (self.pos, reward, square.is_terminal())
    }

    fn render(&self) {
        for row in 0..self.grid.rows() {
            let line = (0..self.grid.cols())
                .map(|col| {
                    if self.grid.to_state(row, col) == self.pos {
                        '*'
                    } else {
                        self.grid.get(row, col).symbol()
                    }
                })
                .collect::<String>();
            debug!("{line}");
        }
    }

    fn grid(&self) -> &GridMap {
        &self.grid
    }
}
