//! Error taxonomy for the feature pipeline.

use thiserror::Error;

/// Errors raised by the pipeline stages.
///
/// Structural errors (`Schema`) abort a run; `Type` failures are collected
/// per row and the offending rows excluded, see [`crate::report::RunReport`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required column is absent from the input dataset.
    #[error("missing required column `{column}`")]
    Schema { column: String },

    /// A value could not be coerced to the column's declared type.
    #[error("row {row}: cannot coerce `{value}` in column `{column}` to {expected}")]
    Type {
        row: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A transform was requested on a column the feature record does not expose.
    #[error("column `{column}` not found")]
    ColumnNotFound { column: String },

    /// Label encoding was applied to a category absent from the fitted vocabulary.
    #[error("unknown category `{value}` in column `{column}`")]
    UnknownCategory { column: String, value: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
