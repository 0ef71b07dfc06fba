use std::str::FromStr;

use crate::{Error, Result};

/// Normalization applied to the value table after every update
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Normalize {
    /// Divide every defined entry by the sum of all defined entries
    Sum,
    /// Divide every defined entry by the maximum defined entry
    #[default]
    Max,
}

impl FromStr for Normalize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(Normalize::Sum),
            "max" => Ok(Normalize::Max),
            _ => Err(Error::UnknownNormalize(s.into())),
        }
    }
}

/// A state x action matrix where each entry is either a defined value or
/// masked out entirely.
///
/// Masked entries never participate in aggregates, normalization, or action
/// selection. The reward table masks out disallowed wall moves and the value
/// table mirrors that mask for the whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct StateActionTable {
    entries: Vec<Option<f32>>,
    num_states: usize,
    num_actions: usize,
}

impl StateActionTable {
    /// A table with every entry defined and set to `value`
    pub fn filled(num_states: usize, num_actions: usize, value: f32) -> Self {
        Self {
            entries: vec![Some(value); num_states * num_actions],
            num_states,
            num_actions,
        }
    }

    /// A table with every entry masked out
    pub fn masked(num_states: usize, num_actions: usize) -> Self {
        Self {
            entries: vec![None; num_states * num_actions],
            num_states,
            num_actions,
        }
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn idx(&self, state: usize, action: usize) -> usize {
        debug_assert!(state < self.num_states && action < self.num_actions);
        state * self.num_actions + action
    }

    pub fn get(&self, state: usize, action: usize) -> Option<f32> {
        self.entries[self.idx(state, action)]
    }

    pub fn is_defined(&self, state: usize, action: usize) -> bool {
        self.get(state, action).is_some()
    }

    /// Set an entry, defining it if it was masked
    pub fn set(&mut self, state: usize, action: usize, value: f32) {
        let i = self.idx(state, action);
        self.entries[i] = Some(value);
    }

    /// One state's row of entries, indexed by action
    pub fn row(&self, state: usize) -> &[Option<f32>] {
        let start = state * self.num_actions;
        &self.entries[start..start + self.num_actions]
    }

    /// Whether both tables mask out exactly the same cells
    pub fn mask_eq(&self, other: &Self) -> bool {
        self.num_states == other.num_states
            && self.num_actions == other.num_actions
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.is_some() == b.is_some())
    }

    /// A table with this table's mask and every defined entry set to zero
    pub fn zeros_like_mask(&self) -> Self {
        Self {
            entries: self.entries.iter().map(|e| e.map(|_| 0.0)).collect(),
            num_states: self.num_states,
            num_actions: self.num_actions,
        }
    }

    /// Sum over defined entries
    pub fn defined_sum(&self) -> f32 {
        self.entries.iter().flatten().sum()
    }

    /// Maximum over defined entries, `None` when every entry is masked
    pub fn defined_max(&self) -> Option<f32> {
        self.entries.iter().flatten().copied().reduce(f32::max)
    }

    /// Maximum over the defined entries of one state's row
    pub fn row_max(&self, state: usize) -> Option<f32> {
        self.row(state).iter().flatten().copied().reduce(f32::max)
    }

    /// Mutable visit of every defined entry with its (state, action) index
    pub fn iter_defined_mut(&mut self) -> impl Iterator<Item = ((usize, usize), &mut f32)> {
        let num_actions = self.num_actions;
        self.entries.iter_mut().enumerate().filter_map(move |(i, entry)| {
            entry
                .as_mut()
                .map(|value| ((i / num_actions, i % num_actions), value))
        })
    }

    /// Divide defined entries by the method's aggregate, skipped entirely when
    /// the aggregate is not positive
    pub fn normalize(&mut self, method: Normalize) {
        let divisor = match method {
            Normalize::Sum => self.defined_sum(),
            Normalize::Max => self.defined_max().unwrap_or(0.0),
        };
        if divisor > 0.0 {
            for entry in self.entries.iter_mut().flatten() {
                *entry /= divisor;
            }
        }
    }
}
