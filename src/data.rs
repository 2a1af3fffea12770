//! DataStore - Immutable census dataset with an ordered filtered view.
//!
//! Rows are validated once at load time (fail-closed: a single bad
//! record rejects the whole dataset, nothing partially renders) and
//! frozen. Every query after that is infallible.
//!
//! # Example
//!
//! ```ignore
//! use cohort_chart::data::DataStore;
//!
//! let store = DataStore::from_json(include_str!("census.json"))?;
//! let rows = store.filter(1900, Sex::Female);
//! ```

use std::fs;
use std::path::Path;

use crate::error::{ChartError, Result};
use crate::types::{Row, Sex, YEAR_MAX, YEAR_MIN};

// =============================================================================
// DataStore
// =============================================================================

/// Owns the immutable dataset of record.
#[derive(Debug, Clone)]
pub struct DataStore {
    rows: Vec<Row>,
}

impl DataStore {
    /// Build a store from pre-parsed rows, validating each one.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure: negative population or a
    /// year outside the census range. The store is not constructed on
    /// failure.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        for (index, row) in rows.iter().enumerate() {
            if row.people < 0 {
                return Err(ChartError::NegativePopulation {
                    index,
                    people: row.people,
                });
            }
            if row.year < YEAR_MIN || row.year > YEAR_MAX {
                return Err(ChartError::YearOutOfRange {
                    index,
                    year: row.year,
                });
            }
        }

        tracing::debug!(rows = rows.len(), "dataset loaded");
        Ok(Self { rows })
    }

    /// Parse and validate the census JSON shape:
    /// `[{"year":1900,"age_group":0,"sex":2,"people":10596}, ...]`.
    ///
    /// # Errors
    ///
    /// Malformed JSON, a missing or non-numeric field, or an invalid
    /// sex code fail the parse; validation failures fail as in
    /// [`DataStore::from_rows`].
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<Row> = serde_json::from_str(json)?;
        Self::from_rows(rows)
    }

    /// Read, parse, and validate a dataset file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in load order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The filtered, ordered view: every row matching both predicates,
    /// in ascending `age_group` order.
    ///
    /// The sort is stable, so repeated calls with the same arguments
    /// return an identical sequence.
    pub fn filter(&self, year: i32, sex: Sex) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| row.year == year && row.sex == sex)
            .copied()
            .collect();
        rows.sort_by_key(|row| row.age_group);
        rows
    }

    /// Distinct age groups across the whole dataset, ascending.
    ///
    /// This is the band scale's domain.
    pub fn age_domain(&self) -> Vec<i32> {
        let mut domain: Vec<i32> = self.rows.iter().map(|row| row.age_group).collect();
        domain.sort_unstable();
        domain.dedup();
        domain
    }

    /// Largest population count in the dataset.
    ///
    /// Upper bound of the linear scale's domain; computed over the full
    /// dataset so bar heights stay comparable across years and sexes.
    pub fn max_people(&self) -> i64 {
        self.rows.iter().map(|row| row.people).max().unwrap_or(0)
    }
}

// =============================================================================
// Tests
// =============================================================================
