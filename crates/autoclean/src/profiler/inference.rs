//! Table-wide type inference.

use super::column::{ColumnProfile, ColumnProfiler, ParsedValues};
use crate::config::CleaningPolicy;
use crate::table::Table;
use crate::types::ClassificationMap;
use std::collections::HashMap;
use tracing::debug;

/// Classification of every column, plus the numbers and dates parsed while
/// classifying them.
///
/// Pass it to [`CleaningPipeline::clean_profiled`](crate::CleaningPipeline::clean_profiled)
/// so the repair stages do not parse the same cells again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableProfile {
    pub classification: ClassificationMap,
    parsed: HashMap<String, ParsedValues>,
}

impl TableProfile {
    /// Parsed values of a numeric or datetime column, one per input row.
    pub fn parsed(&self, column: &str) -> Option<&ParsedValues> {
        self.parsed.get(column)
    }

    pub fn into_classification(self) -> ClassificationMap {
        self.classification
    }
}

/// Classifies every column of a table.
///
/// Columns are classified independently, so the result depends only on the
/// table and the policy.
#[derive(Debug, Clone, Default)]
pub struct TypeInferenceEngine {
    profiler: ColumnProfiler,
}

static_assertions::assert_impl_all!(TypeInferenceEngine: Send, Sync);

impl TypeInferenceEngine {
    pub fn new(policy: CleaningPolicy) -> Self {
        Self {
            profiler: ColumnProfiler::new(policy),
        }
    }

    pub fn policy(&self) -> &CleaningPolicy {
        self.profiler.policy()
    }

    /// Classify every column and keep what was parsed on the way.
    pub fn profile(&self, table: &Table) -> TableProfile {
        let mut profile = TableProfile::default();
        for column in table.columns() {
            let ColumnProfile { kind, parsed } = self.profiler.profile(column.values());
            debug!("Column '{}' classified as {}", column.name(), kind);
            profile.classification.insert(column.name(), kind);
            if parsed != ParsedValues::Raw {
                profile.parsed.insert(column.name().to_string(), parsed);
            }
        }
        profile
    }

    /// Build the classification map, one entry per column in table order.
    pub fn infer(&self, table: &Table) -> ClassificationMap {
        self.profile(table).into_classification()
    }
}
