//! Typed errors for the converter.
//!
//! Everything else is reported through `anyhow` with context attached at
//! the call site; these variants cover the preconditions and format
//! problems callers may want to match on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input directory does not exist
    #[error("Input path {} does not exist", .0.display())]
    InputNotFound(PathBuf),

    /// shard_size was zero or negative
    #[error("shard_size must be a positive integer, got {0}")]
    InvalidShardSize(i64),

    /// Neither the command line nor the config file supplied a value
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// Directory has no state.json (and no dataset_dict.json)
    #[error("{} is not a saved dataset directory (no state.json found)", .0.display())]
    NotASavedDataset(PathBuf),

    /// Dataset dict without the split we convert
    #[error(
        "dataset dict at {} has no '{split}' split (available: {available:?})",
        .path.display()
    )]
    MissingSplit {
        path: PathBuf,
        split: String,
        available: Vec<String>,
    },

    #[error("{} lists no data files", .0.display())]
    NoDataFiles(PathBuf),

    /// Data files of one split disagree on their fields
    #[error("arrow file {} does not match the schema of {}", .path.display(), .expected.display())]
    SchemaMismatch { path: PathBuf, expected: PathBuf },

    #[error("row range {start}..{end} is out of bounds for a dataset of {len} rows")]
    RowRangeOutOfBounds { start: usize, end: usize, len: usize },
}
