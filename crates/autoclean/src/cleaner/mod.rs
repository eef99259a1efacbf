//! Row-level cleaning operations.
//!
//! This module provides functionality for:
//! - Removing duplicate rows
//! - Measuring per-row missingness
//! - Removing rows with excessive missing values
//! - Value sanitization (trimming, title-casing)

mod sanitizers;

pub(crate) use sanitizers::{trim_and_title_case, trim_values};

use crate::table::Table;
use tracing::debug;

/// Row-level cleaning operations on a [`Table`].
pub struct DataCleaner;

impl DataCleaner {
    /// Indices of the first occurrence of every distinct row, in row order.
    pub fn distinct_rows(table: &Table) -> Vec<usize> {
        let duplicates = table.duplicate_rows();
        let mut dup = duplicates.iter().peekable();
        (0..table.row_count())
            .filter(|row| {
                if dup.peek() == Some(&row) {
                    dup.next();
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    /// Drop rows equal to an earlier row, keeping first occurrences in order.
    ///
    /// Returns the new table and the number of rows removed.
    pub fn deduplicate(table: &Table) -> (Table, usize) {
        let keep = Self::distinct_rows(table);
        let removed = table.row_count() - keep.len();
        if removed == 0 {
            return (table.clone(), 0);
        }

        debug!("Removed {} duplicate rows", removed);
        (table.select_rows(&keep), removed)
    }

    /// Fraction of absent cells in each row. A table without columns has
    /// zero missingness.
    pub fn row_missing_fractions(table: &Table) -> Vec<f64> {
        let cols = table.column_count();
        (0..table.row_count())
            .map(|row| {
                if cols == 0 {
                    0.0
                } else {
                    table.row(row).filter(|v| v.is_absent()).count() as f64 / cols as f64
                }
            })
            .collect()
    }

    /// Drop rows whose recorded missing fraction strictly exceeds `threshold`.
    ///
    /// `fractions` is indexed by row and must come from a table with the same
    /// rows as `table`.
    pub fn prune_sparse_rows(table: &Table, fractions: &[f64], threshold: f64) -> (Table, usize) {
        let keep: Vec<usize> = (0..table.row_count())
            .filter(|&row| fractions.get(row).is_none_or(|f| *f <= threshold))
            .collect();
        let removed = table.row_count() - keep.len();

        if removed == 0 {
            return (table.clone(), 0);
        }
        debug!("Removed {} rows above {:.0}% missing", removed, threshold * 100.0);
        (table.select_rows(&keep), removed)
    }
}
