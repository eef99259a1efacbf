//! The deterministic cleaning pipeline.
//!
//! Stages run in a fixed order:
//!
//! 1. Deduplicate rows
//! 2. Numeric repair (median fill)
//! 3. Categorical repair (mode fill, title case)
//! 4. DateTime repair (median date fill, `YYYY-MM-DD`)
//! 5. Text repair (`"Unknown"` fill, trim)
//! 6. Row pruning, using missingness measured right after step 1
//!
//! Stage 6 deliberately looks at the table as it was before any filling, so a
//! row that was mostly empty in the input is removed even though the repair
//! stages have since filled it.

mod stages;

use crate::cleaner::DataCleaner;
use crate::config::CleaningPolicy;
use crate::profiler::{ParsedValues, TableProfile};
use crate::table::{Column, Table};
use crate::types::{ActionLog, ActionLogEntry, ActionType, ClassificationMap, CleaningStage, ColumnKind};
use crate::utils::{cell_as_date, cell_as_number, plural};
use stages::record;
use std::collections::HashSet;
use tracing::{debug, info};

const REPAIR_ORDER: [ColumnKind; 4] = [
    ColumnKind::Numeric,
    ColumnKind::Categorical,
    ColumnKind::DateTime,
    ColumnKind::Text,
];

/// Applies the repair stages to a table according to its classification.
///
/// # Example
///
/// ```rust,ignore
/// use autoclean::{CleaningPipeline, TypeInferenceEngine};
///
/// let map = TypeInferenceEngine::default().infer(&table);
/// let (cleaned, log) = CleaningPipeline::default().clean(&table, &map);
/// for entry in &log {
///     println!("{}", entry.description);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CleaningPipeline {
    policy: CleaningPolicy,
}

static_assertions::assert_impl_all!(CleaningPipeline: Send, Sync);

impl CleaningPipeline {
    pub fn new(policy: CleaningPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CleaningPolicy {
        &self.policy
    }

    /// Clean a table. The input is left untouched.
    ///
    /// Columns without a classification are copied as-is and reported as
    /// warnings; classifications naming unknown columns are ignored.
    pub fn clean(&self, table: &Table, classification: &ClassificationMap) -> (Table, ActionLog) {
        self.run(table, classification, None)
    }

    /// Clean a table against a [`TableProfile`] built from it, reusing the
    /// numbers and dates parsed during classification.
    pub fn clean_profiled(&self, table: &Table, profile: &TableProfile) -> (Table, ActionLog) {
        self.run(table, &profile.classification, Some(profile))
    }

    fn run(
        &self,
        table: &Table,
        classification: &ClassificationMap,
        profile: Option<&TableProfile>,
    ) -> (Table, ActionLog) {
        info!(
            "Cleaning {} rows x {} columns",
            table.row_count(),
            table.column_count()
        );
        let mut log = ActionLog::new();

        let kinds: Vec<Option<ColumnKind>> = table
            .columns()
            .iter()
            .map(|column| classification.get(column.name()))
            .collect();
        self.report_unclassified(table, &kinds, classification, &mut log);

        // 1. Deduplicate
        let kept = DataCleaner::distinct_rows(table);
        let duplicates = table.row_count() - kept.len();
        let mut cleaned = if duplicates == 0 {
            table.clone()
        } else {
            table.select_rows(&kept)
        };
        record(
            &mut log,
            ActionLogEntry::new(
                CleaningStage::Deduplicate,
                ActionType::DuplicatesRemoved,
                format!("removed {}", plural(duplicates, "duplicate row", "duplicate rows")),
            )
            .with_affected(duplicates),
        );

        let snapshot = DataCleaner::row_missing_fractions(&cleaned);

        // 2-5. Per-kind repairs
        let rows = table.row_count();
        for stage_kind in REPAIR_ORDER {
            for (column, kind) in cleaned.columns_mut().iter_mut().zip(&kinds) {
                if *kind != Some(stage_kind) {
                    continue;
                }
                debug!("Repairing {} column '{}'", stage_kind, column.name());
                let parsed = profile.and_then(|p| p.parsed(column.name()));
                match stage_kind {
                    ColumnKind::Numeric => {
                        let numbers = match parsed {
                            Some(ParsedValues::Numbers(numbers)) if numbers.len() == rows => select(numbers, &kept),
                            _ => column.values().iter().map(cell_as_number).collect(),
                        };
                        stages::repair_numeric(column, &numbers, &mut log);
                    }
                    ColumnKind::DateTime => {
                        let dates = match parsed {
                            Some(ParsedValues::Dates(dates)) if dates.len() == rows => select(dates, &kept),
                            _ => column.values().iter().map(cell_as_date).collect(),
                        };
                        stages::repair_datetime(column, &dates, &mut log);
                    }
                    ColumnKind::Categorical => stages::repair_categorical(column, &mut log),
                    ColumnKind::Text => stages::repair_text(column, &mut log),
                }
            }
        }

        // 6. Prune rows that were sparse before filling
        let threshold = self.policy.row_missing_threshold;
        let (cleaned, pruned) = DataCleaner::prune_sparse_rows(&cleaned, &snapshot, threshold);
        record(
            &mut log,
            ActionLogEntry::new(
                CleaningStage::RowPruning,
                ActionType::RowsRemoved,
                format!(
                    "removed {} with more than {}% missing values",
                    plural(pruned, "row", "rows"),
                    threshold * 100.0
                ),
            )
            .with_affected(pruned),
        );

        info!(
            "Cleaning finished: {} rows x {} columns, {} actions",
            cleaned.row_count(),
            cleaned.column_count(),
            log.len()
        );
        (cleaned, log)
    }

    fn report_unclassified(
        &self,
        table: &Table,
        kinds: &[Option<ColumnKind>],
        classification: &ClassificationMap,
        log: &mut ActionLog,
    ) {
        for (column, kind) in table.columns().iter().zip(kinds) {
            if kind.is_none() {
                record(
                    log,
                    ActionLogEntry::new(
                        CleaningStage::Classification,
                        ActionType::ColumnUnclassified,
                        format!("{} has no classification; left untouched", column.name()),
                    )
                    .for_column(column.name()),
                );
            }
        }

        let known: HashSet<&str> = table.columns().iter().map(Column::name).collect();
        for (name, _) in classification.iter() {
            if !known.contains(name) {
                debug!("Ignoring classification for unknown column '{}'", name);
            }
        }
    }
}

/// Parsed values of the rows that survived deduplication.
fn select<T: Copy>(parsed: &[Option<T>], rows: &[usize]) -> Vec<Option<T>> {
    rows.iter().map(|&row| parsed[row]).collect()
}
