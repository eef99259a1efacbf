//! Column classification and exploratory profiling.
//!
//! - [`ColumnProfiler`] classifies a single column.
//! - [`TypeInferenceEngine`] classifies every column of a table, optionally
//!   keeping the parsed values in a [`TableProfile`].
//! - [`DatasetProfiler`] adds per-column statistics for a quick look at a
//!   dataset before cleaning it.

mod column;
mod inference;
mod statistics;

pub use column::{ColumnProfile, ColumnProfiler, ParsedValues};
pub use inference::{TableProfile, TypeInferenceEngine};
pub use statistics::{NumericSummary, ValueCount};

use crate::config::CleaningPolicy;
use crate::quality::QualityScorer;
use crate::table::Table;
use crate::types::{ClassificationMap, ColumnKind};
use serde::{Deserialize, Serialize};
use statistics::{TOP_VALUES_MAX_DISTINCT, numeric_summary, value_counts};
use tracing::info;

/// Statistics of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub name: String,
    pub kind: ColumnKind,
    pub absent_count: usize,
    pub absent_percentage: f64,
    pub distinct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    /// Value counts, only for low-cardinality non-numeric columns.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_values: Vec<ValueCount>,
}

/// Exploratory profile of a whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnStatistics>,
    pub classification: ClassificationMap,
    pub duplicate_rows: usize,
    pub duplicate_percentage: f64,
    pub quality_score: f64,
}

/// Profiles a dataset: classification plus descriptive statistics.
#[derive(Debug, Clone, Default)]
pub struct DatasetProfiler {
    engine: TypeInferenceEngine,
}

impl DatasetProfiler {
    pub fn new(policy: CleaningPolicy) -> Self {
        Self {
            engine: TypeInferenceEngine::new(policy),
        }
    }

    pub fn profile(&self, table: &Table) -> DatasetProfile {
        let table_profile = self.engine.profile(table);
        let quality = QualityScorer::score(table);
        let rows = table.row_count();

        let columns = table
            .columns()
            .iter()
            .map(|column| {
                let kind = table_profile
                    .classification
                    .get(column.name())
                    .unwrap_or(ColumnKind::Text);
                let values = column.values();
                let counts = value_counts(values);
                let absent_count = column.absent_count();

                let numeric = match table_profile.parsed(column.name()) {
                    Some(ParsedValues::Numbers(numbers)) => numeric_summary(numbers),
                    _ => None,
                };
                let top_values = if kind != ColumnKind::Numeric
                    && counts.len() <= TOP_VALUES_MAX_DISTINCT
                {
                    counts.clone()
                } else {
                    Vec::new()
                };

                ColumnStatistics {
                    name: column.name().to_string(),
                    kind,
                    absent_count,
                    absent_percentage: percentage(absent_count, rows),
                    distinct_count: counts.len(),
                    numeric,
                    top_values,
                }
            })
            .collect();

        info!(
            "Profiled {} rows x {} columns, quality score {:.2}",
            rows,
            table.column_count(),
            quality.quality_score
        );

        DatasetProfile {
            row_count: rows,
            column_count: table.column_count(),
            columns,
            classification: table_profile.into_classification(),
            duplicate_rows: quality.duplicate_rows,
            duplicate_percentage: percentage(quality.duplicate_rows, rows),
            quality_score: quality.quality_score,
        }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
