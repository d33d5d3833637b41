use std::path::PathBuf;

use thiserror::Error;

use crate::data::schema::Column;

/// Errors raised while loading a transaction dataset.
///
/// Every variant is fatal for the dashboard: the UI shows the message and
/// renders nothing else. Non-fatal conditions (empty filter result, optional
/// column absent) never become a `DataError`; see [`crate::dashboard::Section`].
#[derive(Debug, Error)]
pub enum DataError {
    #[error("The data file {} does not exist. Please check the file path.", path.display())]
    DataUnavailable { path: PathBuf },

    #[error("required column '{0}' is missing")]
    MissingColumn(Column),

    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: Column,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, DataError>;
