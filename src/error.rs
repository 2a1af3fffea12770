//! Error types for cohort-chart.
//!
//! Two failure domains exist: dataset loading (fail-closed validation
//! before anything renders) and reconciliation (key-space consistency).
//! Everything else in the chart is defined as a no-op, not an error.

use thiserror::Error;

use crate::types::Key;

/// Errors produced by the chart engine.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Two rows in one incoming set resolved to the same join key.
    ///
    /// Fatal internal-consistency error: the reconciler refuses to
    /// silently merge or drop either row, and the pass that produced
    /// it is aborted before any partition is applied.
    #[error("key collision in incoming rows: key {key} produced twice")]
    KeyCollision { key: Key },

    /// A record carried a negative population count.
    #[error("record {index}: negative population count {people}")]
    NegativePopulation { index: usize, people: i64 },

    /// A record's year is outside the census range.
    #[error("record {index}: year {year} outside {min}..={max}", min = crate::types::YEAR_MIN, max = crate::types::YEAR_MAX)]
    YearOutOfRange { index: usize, year: i32 },

    /// The dataset could not be parsed (missing or non-numeric field,
    /// invalid sex code, malformed JSON).
    #[error("malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// The dataset could not be read.
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChartError>;
