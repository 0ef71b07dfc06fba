use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building grids and tables or running a learner
#[derive(Debug, Error)]
pub enum Error {
    #[error("grid rows have inconsistent lengths")]
    RaggedGrid,
    #[error("grid must be square, got {rows} rows of {cols} columns")]
    NonSquareGrid { rows: usize, cols: usize },
    #[error("unknown map symbol `{0}`")]
    UnknownSymbol(char),
    #[error("reward table has not been built")]
    RewardsNotBuilt,
    #[error("value table has not been initialized")]
    ValuesNotInitialized,
    #[error("unknown action-selection policy `{0}`")]
    UnknownPolicy(String),
    #[error("unknown normalization method `{0}`")]
    UnknownNormalize(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
