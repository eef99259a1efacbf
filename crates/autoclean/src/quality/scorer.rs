use crate::table::Table;
use crate::types::{ColumnChange, ColumnMissing, QualityReport};
use serde::{Deserialize, Serialize};

/// Weight of the duplicate ratio in the score.
const DUPLICATE_PENALTY: f64 = 10.0;

pub struct QualityScorer;

impl QualityScorer {
    /// Score a table.
    ///
    /// ```text
    /// missing_ratio   = absent cells / (rows * columns)
    /// duplicate_ratio = duplicate rows / rows
    /// quality_score   = clamp((1 - missing_ratio) * 100 - duplicate_ratio * 10, 0, 100)
    /// ```
    ///
    /// A table with no rows or no columns scores 100 with both ratios at 0.
    pub fn score(table: &Table) -> QualityReport {
        let rows = table.row_count();
        let cols = table.column_count();

        let missing_per_column: Vec<ColumnMissing> = table
            .columns()
            .iter()
            .map(|c| ColumnMissing {
                column: c.name().to_string(),
                missing: c.absent_count(),
            })
            .collect();
        let total_missing: usize = missing_per_column.iter().map(|c| c.missing).sum();
        let duplicate_rows = table.duplicate_rows().len();

        let (missing_ratio, duplicate_ratio) = if rows == 0 || cols == 0 {
            (0.0, 0.0)
        } else {
            (
                total_missing as f64 / (rows * cols) as f64,
                duplicate_rows as f64 / rows as f64,
            )
        };

        let quality_score = ((1.0 - missing_ratio) * 100.0 - duplicate_ratio * DUPLICATE_PENALTY)
            .clamp(0.0, 100.0);

        QualityReport {
            row_count: rows,
            column_count: cols,
            missing_per_column,
            total_missing,
            duplicate_rows,
            missing_ratio,
            duplicate_ratio,
            quality_score,
        }
    }
}

/// Before/after view of two quality reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityComparison {
    pub before: QualityReport,
    pub after: QualityReport,
}

impl QualityComparison {
    pub fn new(before: QualityReport, after: QualityReport) -> Self {
        Self { before, after }
    }

    pub fn score_delta(&self) -> f64 {
        self.after.quality_score - self.before.quality_score
    }

    pub fn rows_removed(&self) -> usize {
        self.before.row_count.saturating_sub(self.after.row_count)
    }

    pub fn duplicates_removed(&self) -> usize {
        self.before.duplicate_rows.saturating_sub(self.after.duplicate_rows)
    }

    /// Missing counts per original column, in the original column order.
    pub fn column_changes(&self) -> Vec<ColumnChange> {
        self.before
            .missing_per_column
            .iter()
            .map(|c| ColumnChange {
                column: c.column.clone(),
                missing_before: c.missing,
                missing_after: self.after.missing_in(&c.column),
            })
            .collect()
    }

    pub fn into_reports(self) -> (QualityReport, QualityReport) {
        (self.before, self.after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_table_scores_100() {
        let table = Table::new(vec![Column::new("a", vec![1.0, 2.0, 3.0])]).unwrap();
        let report = QualityScorer::score(&table);
        assert_eq!(report.quality_score, 100.0);
        assert_eq!(report.total_missing, 0);
        assert_eq!(report.duplicate_rows, 0);
    }

    #[test]
    fn test_missing_and_duplicates() {
        // 4 rows x 2 cols, 2 absent, 1 duplicate row
        let table = Table::new(vec![
            Column::new("a", vec![Some(1.0), Some(1.0), None, Some(4.0)]),
            Column::new("b", vec![Some("x"), Some("x"), Some("y"), None]),
        ])
        .unwrap();
        let report = QualityScorer::score(&table);

        assert_eq!(report.total_missing, 2);
        assert_eq!(report.duplicate_rows, 1);
        assert_eq!(report.missing_ratio, 0.25);
        assert_eq!(report.duplicate_ratio, 0.25);
        assert_eq!(report.quality_score, 72.5);
        assert_eq!(report.missing_in("b"), Some(1));
    }

    #[test]
    fn test_empty_tables_score_100() {
        let no_columns = QualityScorer::score(&Table::empty());
        assert_eq!(no_columns.quality_score, 100.0);
        assert_eq!(no_columns.missing_ratio, 0.0);

        let no_rows = Table::new(vec![Column::new("a", Vec::<f64>::new())]).unwrap();
        let report = QualityScorer::score(&no_rows);
        assert_eq!(report.quality_score, 100.0);
        assert_eq!(report.duplicate_ratio, 0.0);
    }

    #[test]
    fn test_all_absent_table_scores_near_zero() {
        // 2 rows, all absent: missing_ratio 1, second row duplicates the first
        let table = Table::new(vec![Column::new("a", vec![None::<f64>, None])]).unwrap();
        let report = QualityScorer::score(&table);
        assert_eq!(report.quality_score, 0.0);
    }

    #[test]
    fn test_comparison() {
        let before = Table::new(vec![Column::new("a", vec![Some(1.0), None, Some(1.0)])]).unwrap();
        let after = Table::new(vec![Column::new("a", vec![1.0, 2.0])]).unwrap();

        let comparison =
            QualityComparison::new(QualityScorer::score(&before), QualityScorer::score(&after));
        assert_eq!(comparison.rows_removed(), 1);
        assert_eq!(comparison.duplicates_removed(), 1);
        assert!(comparison.score_delta() > 0.0);
        assert_eq!(
            comparison.column_changes(),
            vec![ColumnChange {
                column: "a".to_string(),
                missing_before: 1,
                missing_after: Some(0),
            }]
        );
    }
}
