use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading, converting,
/// or reloading the generation tables.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {0}")]
    MissingFile(PathBuf),

    #[error("source must be 'solar' or 'wind', got '{0}'")]
    InvalidSource(String),

    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path} line {line}: could not parse '{value}' for plant {plant}")]
    BadValue {
        path: PathBuf,
        line: usize,
        plant: String,
        value: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
