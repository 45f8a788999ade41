use thiserror::Error;

use crate::{CellCount, CellPos};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board needs at least one row and one column")]
    InvalidDimensions,
    #[error("Invalid mine count {mines} for a board of {cells} cells")]
    InvalidMineCount { mines: CellCount, cells: CellCount },
    #[error("Invalid coordinates {0}")]
    InvalidCoords(CellPos),
    #[error("No round in progress, pick a difficulty first")]
    NoActiveRound,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure to persist the record table. Reading never fails, see [`crate::RecordStore::load`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access record storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not encode records: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Record storage rejected the write: {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDurationError {
    #[error("Expected 3 or 4 colon separated fields, found {0}")]
    FieldCount(usize),
    #[error("Field {0:?} is not a two digit number")]
    InvalidField(String),
    #[error("Field {field:?} is out of range, must be below {limit}")]
    OutOfRange { field: String, limit: u64 },
}
