//! Error types for the rate-table updater.

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Any failure that aborts an update run.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The maintainer rate file does not exist.
    #[error("rate file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The rate file is not valid JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The rate file parsed but has the wrong shape.
    #[error("invalid rate table: {0}")]
    Schema(#[from] SchemaError),

    /// The host document has no `STATE_TAX_RATES` declaration to replace.
    #[error("marker `{marker}` not found in {}", path.display())]
    MarkerNotFound { marker: &'static str, path: PathBuf },

    /// A scalar marker is declared in a form that cannot be replaced in place.
    #[error("marker `{marker}` in {} is not a single `{marker} = value;` statement", path.display())]
    UnreadableMarker { marker: &'static str, path: PathBuf },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpdateError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Shape or field violation in a rate table.
#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("rate table must be a JSON object")]
    NotAnObject,

    #[error("`year` is missing or empty")]
    MissingYear,

    #[error("`year` must be a positive integer, got {0}")]
    InvalidYear(Value),

    #[error("`updated` is missing or empty")]
    MissingUpdated,

    #[error("`updated` must be a string, got {0}")]
    InvalidUpdated(Value),

    #[error("`states` must be an array")]
    StatesNotArray,

    #[error("`states` has {found} entries, expected at least {min}")]
    TooFewStates { found: usize, min: usize },

    /// First entry that failed validation, with the offending record.
    #[error("invalid entry at index {index} ({reason}): {entry}")]
    InvalidEntry {
        index: usize,
        reason: String,
        entry: Value,
    },
}
