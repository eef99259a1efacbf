use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Column classification
// ============================================================================

/// Semantic kind assigned to a column by type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    #[serde(rename = "datetime")]
    DateTime,
    Categorical,
    Text,
}

impl ColumnKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::DateTime => "datetime",
            Self::Categorical => "categorical",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One entry of a [`ClassificationMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedColumn {
    pub column: String,
    pub kind: ColumnKind,
}

/// Column name to [`ColumnKind`], in table column order.
///
/// Lookups go through a name index, so classifying or cleaning a wide table
/// stays linear in the number of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ClassifiedColumn>", into = "Vec<ClassifiedColumn>")]
pub struct ClassificationMap {
    entries: Vec<ClassifiedColumn>,
    index: HashMap<String, usize>,
}

impl ClassificationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kind of a column, replacing an earlier entry with the same name.
    pub fn insert(&mut self, column: impl Into<String>, kind: ColumnKind) {
        let column = column.into();
        if let Some(&position) = self.index.get(&column) {
            self.entries[position].kind = kind;
            return;
        }
        self.index.insert(column.clone(), self.entries.len());
        self.entries.push(ClassifiedColumn { column, kind });
    }

    pub fn get(&self, column: &str) -> Option<ColumnKind> {
        self.index.get(column).map(|&position| self.entries[position].kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.entries.iter().map(|e| (e.column.as_str(), e.kind))
    }

    /// Names of the columns classified as `kind`.
    pub fn columns_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name)
            .collect()
    }
}

impl From<Vec<ClassifiedColumn>> for ClassificationMap {
    fn from(entries: Vec<ClassifiedColumn>) -> Self {
        entries.into_iter().map(|e| (e.column, e.kind)).collect()
    }
}

impl From<ClassificationMap> for Vec<ClassifiedColumn> {
    fn from(map: ClassificationMap) -> Self {
        map.entries
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnKind)> for ClassificationMap {
    fn from_iter<I: IntoIterator<Item = (S, ColumnKind)>>(iter: I) -> Self {
        let mut map = ClassificationMap::new();
        for (column, kind) in iter {
            map.insert(column, kind);
        }
        map
    }
}

// ============================================================================
// Action log
// ============================================================================

/// Pipeline stage that produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Checks made before any stage runs.
    Classification,
    Deduplicate,
    NumericRepair,
    CategoricalRepair,
    #[serde(rename = "datetime_repair")]
    DateTimeRepair,
    TextRepair,
    RowPruning,
    /// Work done outside the pipeline by an external cleaner.
    ExternalDelegate,
}

impl CleaningStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Classification => "Classification",
            Self::Deduplicate => "Deduplicate",
            Self::NumericRepair => "Numeric Repair",
            Self::CategoricalRepair => "Categorical Repair",
            Self::DateTimeRepair => "DateTime Repair",
            Self::TextRepair => "Text Repair",
            Self::RowPruning => "Row Pruning",
            Self::ExternalDelegate => "External Delegate",
        }
    }
}

/// Types of actions recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Duplicate rows were removed.
    DuplicatesRemoved,
    /// Missing values were filled.
    ValueImputed,
    /// Values were converted to the column's kind.
    ValueConverted,
    /// Values were trimmed or re-cased.
    ValueCleaned,
    /// Dates were rewritten in the canonical format.
    DatesStandardized,
    /// Sparse rows were removed.
    RowsRemoved,
    /// A column was left as-is because it had nothing to repair from.
    ColumnSkipped,
    /// Some or all values of a column could not be parsed.
    ParseFailed,
    /// A column had no entry in the classification map.
    ColumnUnclassified,
    /// An external cleaner produced the table.
    DelegateApplied,
}

impl ActionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::ValueImputed => "Value Imputed",
            Self::ValueConverted => "Value Converted",
            Self::ValueCleaned => "Value Cleaned",
            Self::DatesStandardized => "Dates Standardized",
            Self::RowsRemoved => "Rows Removed",
            Self::ColumnSkipped => "Column Skipped",
            Self::ParseFailed => "Parse Failed",
            Self::ColumnUnclassified => "Column Unclassified",
            Self::DelegateApplied => "Delegate Applied",
        }
    }

    /// Column-local problems the run worked around.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::ColumnSkipped | Self::ParseFailed | Self::ColumnUnclassified
        )
    }
}

/// A single entry of the action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub stage: CleaningStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub action_type: ActionType,
    pub description: String,
    /// Number of cells or rows affected.
    pub affected: usize,
}

impl ActionLogEntry {
    pub fn new(stage: CleaningStage, action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            stage,
            column: None,
            action_type,
            description: description.into(),
            affected: 0,
        }
    }

    pub fn for_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_affected(mut self, affected: usize) -> Self {
        self.affected = affected;
        self
    }

    pub fn is_warning(&self) -> bool {
        self.action_type.is_warning()
    }
}

/// Ordered record of what a cleaning run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ActionLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionLogEntry> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().filter(|e| e.is_warning())
    }

    /// Entries produced by one stage.
    pub fn for_stage(&self, stage: CleaningStage) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().filter(move |e| e.stage == stage)
    }

    /// Entries that mention a column.
    pub fn for_column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a ActionLogEntry> {
        self.entries
            .iter()
            .filter(move |e| e.column.as_deref() == Some(column))
    }
}

impl<'a> IntoIterator for &'a ActionLog {
    type Item = &'a ActionLogEntry;
    type IntoIter = std::slice::Iter<'a, ActionLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// Quality reports
// ============================================================================

/// Absent-cell count of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

/// Missingness and duplication statistics of a table, with a 0-100 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub row_count: usize,
    pub column_count: usize,
    pub missing_per_column: Vec<ColumnMissing>,
    pub total_missing: usize,
    pub duplicate_rows: usize,
    pub missing_ratio: f64,
    pub duplicate_ratio: f64,
    pub quality_score: f64,
}

impl QualityReport {
    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.missing_per_column
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.missing)
    }
}

/// Per-column missing counts before and after cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChange {
    pub column: String,
    pub missing_before: usize,
    /// `None` when the column is absent from the cleaned table.
    pub missing_after: Option<usize>,
}

/// Which cleaner produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Deterministic,
    ExternalDelegate,
}

impl StrategyKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Deterministic => "deterministic",
            Self::ExternalDelegate => "external delegate",
        }
    }
}

/// Everything a cleaning run produced, apart from the table itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Strategy that produced the cleaned table.
    pub strategy: StrategyKind,
    /// Strategy that was asked for, when it differs from `strategy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_strategy: Option<StrategyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub classification: ClassificationMap,
    pub before: QualityReport,
    pub after: QualityReport,
    pub column_changes: Vec<ColumnChange>,
    pub rows_removed: usize,
    pub actions: ActionLog,
    pub duration_ms: u64,
}

impl CleaningReport {
    pub fn used_fallback(&self) -> bool {
        self.requested_strategy.is_some()
    }

    pub fn score_delta(&self) -> f64 {
        self.after.quality_score - self.before.quality_score
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_map_keeps_order_and_replaces() {
        let mut map = ClassificationMap::new();
        map.insert("b", ColumnKind::Text);
        map.insert("a", ColumnKind::Numeric);
        map.insert("b", ColumnKind::Categorical);

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(
            entries,
            vec![("b", ColumnKind::Categorical), ("a", ColumnKind::Numeric)]
        );
        assert_eq!(map.get("a"), Some(ColumnKind::Numeric));
        assert_eq!(map.get("z"), None);
    }

    #[test]
    fn test_classification_map_columns_of() {
        let map: ClassificationMap = [
            ("Age", ColumnKind::Numeric),
            ("City", ColumnKind::Categorical),
            ("Score", ColumnKind::Numeric),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.columns_of(ColumnKind::Numeric), vec!["Age", "Score"]);
    }

    #[test]
    fn test_classification_map_serialization() {
        let map: ClassificationMap = [("Joined", ColumnKind::DateTime)].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"[{"column":"Joined","kind":"datetime"}]"#);
    }

    #[test]
    fn test_classification_map_deserialization_rebuilds_lookup() {
        let json = r#"[{"column":"a","kind":"numeric"},{"column":"b","kind":"text"},{"column":"a","kind":"categorical"}]"#;
        let map: ClassificationMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(ColumnKind::Categorical));
        assert_eq!(map.get("b"), Some(ColumnKind::Text));
    }

    #[test]
    fn test_classification_map_handles_many_columns() {
        let map: ClassificationMap = (0..50_000)
            .map(|i| (format!("c{}", i), ColumnKind::Numeric))
            .collect();
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.get("c49999"), Some(ColumnKind::Numeric));
        assert_eq!(map.iter().last(), Some(("c49999", ColumnKind::Numeric)));
    }

    #[test]
    fn test_action_type_warnings() {
        assert!(ActionType::ParseFailed.is_warning());
        assert!(ActionType::ColumnSkipped.is_warning());
        assert!(!ActionType::ValueImputed.is_warning());
        assert_eq!(ActionType::RowsRemoved.display_name(), "Rows Removed");
    }

    #[test]
    fn test_action_log_filters() {
        let mut log = ActionLog::new();
        log.push(
            ActionLogEntry::new(CleaningStage::NumericRepair, ActionType::ValueImputed, "filled")
                .for_column("Age")
                .with_affected(1),
        );
        log.push(
            ActionLogEntry::new(CleaningStage::DateTimeRepair, ActionType::ParseFailed, "could not parse")
                .for_column("Joined"),
        );

        assert_eq!(log.len(), 2);
        assert_eq!(log.warnings().count(), 1);
        assert_eq!(log.for_column("Age").count(), 1);
        assert_eq!(log.for_stage(CleaningStage::NumericRepair).next().unwrap().affected, 1);
    }

    #[test]
    fn test_action_log_entry_serialization() {
        let entry = ActionLogEntry::new(
            CleaningStage::Deduplicate,
            ActionType::DuplicatesRemoved,
            "removed 2 duplicate rows",
        )
        .with_affected(2);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("duplicates_removed"));
        assert!(!json.contains("column"));
    }

    #[test]
    fn test_quality_report_missing_in() {
        let report = QualityReport {
            row_count: 3,
            column_count: 1,
            missing_per_column: vec![ColumnMissing {
                column: "Age".to_string(),
                missing: 1,
            }],
            total_missing: 1,
            duplicate_rows: 0,
            missing_ratio: 1.0 / 3.0,
            duplicate_ratio: 0.0,
            quality_score: 66.67,
        };
        assert_eq!(report.missing_in("Age"), Some(1));
        assert_eq!(report.missing_in("City"), None);
    }
}
