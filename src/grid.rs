use strum::VariantArray;

use crate::{Error, Result};

/// Classification of a single grid cell
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Square {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl Square {
    /// The ASCII symbol used in map notation and episode outcome reporting
    pub fn symbol(self) -> char {
        match self {
            Square::Start => 'S',
            Square::Frozen => 'F',
            Square::Hole => 'H',
            Square::Goal => 'G',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'S' => Some(Square::Start),
            'F' => Some(Square::Frozen),
            'H' => Some(Square::Hole),
            'G' => Some(Square::Goal),
            _ => None,
        }
    }

    /// Whether entering this square ends the episode
    pub fn is_terminal(self) -> bool {
        matches!(self, Square::Hole | Square::Goal)
    }
}

/// An agent move on the grid
#[derive(VariantArray, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    Left = 0,
    Down = 1,
    Right = 2,
    Up = 3,
}

impl Action {
    /// Column index of this action in a state x action table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Action::VARIANTS.get(index).copied()
    }
}

/// A square map of [`Square`]s with flat state indexing.
///
/// State ids are `row * rows + col`. With the row count as the multiplier the
/// mapping is bijective only for square maps, so construction rejects
/// non-square maps outright rather than silently corrupting the indexing.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMap {
    cells: Vec<Square>,
    rows: usize,
    cols: usize,
}

impl GridMap {
    pub fn new(rows: Vec<Vec<Square>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if rows.iter().any(|row| row.len() != width) {
            return Err(Error::RaggedGrid);
        }
        if height == 0 || height != width {
            return Err(Error::NonSquareGrid {
                rows: height,
                cols: width,
            });
        }
        Ok(Self {
            cells: rows.into_iter().flatten().collect(),
            rows: height,
            cols: width,
        })
    }

    /// Parse the gymnasium `S`/`F`/`H`/`G` map notation, one `&str` per row
    pub fn from_ascii(rows: &[&str]) -> Result<Self> {
        rows.iter()
            .map(|line| {
                line.chars()
                    .map(|c| Square::from_symbol(c).ok_or(Error::UnknownSymbol(c)))
                    .collect()
            })
            .collect::<Result<Vec<_>>>()
            .and_then(Self::new)
    }

    /// The canonical 4x4 non-slippery map
    pub fn frozen_lake_4x4() -> Self {
        Self::from_ascii(&["SFFF", "FHFH", "FFFH", "HFFG"]).expect("canonical map is valid")
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn num_states(&self) -> usize {
        self.rows * self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Square {
        self.cells[row * self.cols + col]
    }

    /// Flat state id of a position
    pub fn to_state(&self, row: usize, col: usize) -> usize {
        row * self.rows + col
    }

    /// Position of a flat state id
    pub fn from_state(&self, state: usize) -> (usize, usize) {
        (state / self.rows, state % self.rows)
    }

    pub fn square_at(&self, state: usize) -> Square {
        let (row, col) = self.from_state(state);
        self.get(row, col)
    }

    /// State id of the start square, or 0 when the map has none
    pub fn start_state(&self) -> usize {
        self.cells
            .iter()
            .position(|&square| square == Square::Start)
            .map_or(0, |i| self.to_state(i / self.cols, i % self.cols))
    }

    /// The position reached by taking `action`; moves that would leave the
    /// grid are clamped in place
    pub fn apply_action(&self, row: usize, col: usize, action: Action) -> (usize, usize) {
        match action {
            Action::Left => (row, col.saturating_sub(1)),
            Action::Down => ((row + 1).min(self.rows - 1), col),
            Action::Right => (row, (col + 1).min(self.cols - 1)),
            Action::Up => (row.saturating_sub(1), col),
        }
    }

    /// True iff `action` maps the position back onto itself
    pub fn is_wall_move(&self, row: usize, col: usize, action: Action) -> bool {
        self.apply_action(row, col, action) == (row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_frozen(side: usize) -> GridMap {
        GridMap::new(vec![vec![Square::Frozen; side]; side]).unwrap()
    }

    #[test]
    fn state_round_trip() {
        for side in 1..=6 {
            let grid = all_frozen(side);
            for row in 0..side {
                for col in 0..side {
                    assert_eq!(grid.from_state(grid.to_state(row, col)), (row, col));
                }
            }
        }
    }

    #[test]
    fn ragged_rows_rejected() {
        let rows = vec![vec![Square::Frozen; 3], vec![Square::Frozen; 2]];
        assert!(matches!(GridMap::new(rows), Err(Error::RaggedGrid)));
    }

    #[test]
    fn non_square_rejected() {
        let rows = vec![vec![Square::Frozen; 3]; 2];
        assert!(matches!(
            GridMap::new(rows),
            Err(Error::NonSquareGrid { rows: 2, cols: 3 })
        ));
        assert!(matches!(
            GridMap::new(vec![]),
            Err(Error::NonSquareGrid { rows: 0, cols: 0 })
        ));
    }

    #[test]
    fn unknown_symbol_rejected() {
        assert!(matches!(
            GridMap::from_ascii(&["SF", "FX"]),
            Err(Error::UnknownSymbol('X'))
        ));
    }

    #[test]
    fn moves_clamp_at_edges() {
        let grid = all_frozen(4);
        assert_eq!(grid.apply_action(0, 0, Action::Left), (0, 0));
        assert_eq!(grid.apply_action(0, 0, Action::Up), (0, 0));
        assert_eq!(grid.apply_action(3, 3, Action::Right), (3, 3));
        assert_eq!(grid.apply_action(3, 3, Action::Down), (3, 3));
        assert_eq!(grid.apply_action(1, 2, Action::Left), (1, 1));
        assert_eq!(grid.apply_action(1, 2, Action::Down), (2, 2));
    }

    #[test]
    fn wall_move_detection() {
        let grid = all_frozen(4);
        assert!(grid.is_wall_move(0, 0, Action::Left));
        assert!(grid.is_wall_move(0, 0, Action::Up));
        assert!(!grid.is_wall_move(0, 0, Action::Right));
        assert!(!grid.is_wall_move(0, 0, Action::Down));
        assert!(grid.is_wall_move(3, 3, Action::Down));
        assert!(!grid.is_wall_move(2, 2, Action::Up));
    }

    #[test]
    fn canonical_map_layout() {
        let grid = GridMap::frozen_lake_4x4();
        assert_eq!(grid.num_states(), 16);
        assert_eq!(grid.start_state(), 0);
        assert_eq!(grid.square_at(0), Square::Start);
        assert_eq!(grid.square_at(5), Square::Hole);
        assert_eq!(grid.square_at(15), Square::Goal);
        assert_eq!(grid.square_at(15).symbol(), 'G');
    }

    #[test]
    fn action_index_round_trip() {
        for &action in Action::VARIANTS {
            assert_eq!(Action::from_index(action.index()), Some(action));
        }
        assert_eq!(Action::from_index(4), None);
    }
}
