use std::path::PathBuf;

use thiserror::Error;

/// Anything that prevents the dataset from being loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow conversion failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("expected a top-level JSON array of records")]
    NotARecordArray,

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// `row` is the 1-based data row (header excluded).
    #[error("data row {row}, column '{column}': '{value}' is not a valid value")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("data row {row}, column '{column}': {value} is outside {expected}")]
    OutOfRange {
        row: usize,
        column: String,
        value: f64,
        expected: &'static str,
    },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnexpectedType { column: String, data_type: String },
}

/// Raised (not thrown) when the current filters match no records.
///
/// Downstream KPIs report "no data" and charts render empty; nothing aborts.
/// Serialises as its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no skills match the current filters")]
pub struct EmptyResultWarning;

impl serde::Serialize for EmptyResultWarning {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
