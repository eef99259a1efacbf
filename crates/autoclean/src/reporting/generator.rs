use crate::error::{Result, ResultExt};
use crate::table::Table;
use crate::types::CleaningReport;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// A cleaning report plus where it came from and where it went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_file: String,
    /// Path of the cleaned CSV, when one was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(flatten)]
    pub cleaning: CleaningReport,
}

impl RunReport {
    pub fn new(input_file: impl AsRef<Path>, output_file: Option<&Path>, cleaning: CleaningReport) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.as_ref().display().to_string(),
            output_file: output_file.map(|p| p.display().to_string()),
            cleaning,
        }
    }
}

/// Writes cleaned tables and reports under one output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: String,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf, output_name: impl Into<String>) -> Self {
        Self {
            output_dir,
            output_name: output_name.into(),
        }
    }

    /// Write `<output_dir>/<name>.csv`.
    pub fn write_cleaned_data(&self, table: &Table) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}.csv", self.output_name));
        table
            .write_csv(&path)
            .context(format!("Writing {}", path.display()))?;

        info!("Cleaned data saved: {}", path.display());
        Ok(path)
    }

    /// Write `<output_dir>/<name>_report.json`.
    pub fn write_report(&self, report: &RunReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(format!("{}_report.json", self.output_name));
        let mut file = File::create(&path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(path)
    }
}

/// Human-readable before/after summary of a cleaning run.
pub fn render_summary(report: &CleaningReport) -> String {
    let mut out = String::new();
    let before = &report.before;
    let after = &report.after;

    let _ = writeln!(out, "Strategy: {}", report.strategy.display_name());
    if let Some(reason) = &report.fallback_reason {
        let _ = writeln!(out, "  (fell back: {})", reason);
    }
    let _ = writeln!(
        out,
        "Shape: {} x {} -> {} x {}",
        before.row_count, before.column_count, after.row_count, after.column_count
    );
    let _ = writeln!(
        out,
        "Quality score: {:.2} -> {:.2} ({:+.2})",
        before.quality_score,
        after.quality_score,
        report.score_delta()
    );
    let _ = writeln!(
        out,
        "Duplicates removed: {}",
        before.duplicate_rows.saturating_sub(after.duplicate_rows)
    );
    let _ = writeln!(out, "Rows removed: {}", report.rows_removed);

    let _ = writeln!(out, "\nMissing values (before -> after):");
    for change in &report.column_changes {
        let after = change
            .missing_after
            .map_or_else(|| "dropped".to_string(), |n| n.to_string());
        let kind = report
            .classification
            .get(&change.column)
            .map_or("?", |k| k.display_name());
        let _ = writeln!(
            out,
            "  {:<24} {:<12} {:>6} -> {}",
            change.column, kind, change.missing_before, after
        );
    }

    let _ = writeln!(out, "\nActions:");
    for entry in &report.actions {
        let marker = if entry.is_warning() { "!" } else { "-" };
        let _ = writeln!(out, "  {} [{}] {}", marker, entry.stage.display_name(), entry.description);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::Orchestrator;
    use crate::table::Column;

    fn outcome() -> crate::orchestrator::CleaningOutcome {
        let table = Table::new(vec![
            Column::new("Age", vec![Some(25.0), None, Some(35.0)]),
            Column::new("Notes", vec![Some("a"), Some("b"), None]),
        ])
        .unwrap();
        Orchestrator::default().run(&table).unwrap()
    }

    #[test]
    fn test_summary_mentions_columns_and_actions() {
        let summary = render_summary(&outcome().report);
        assert!(summary.contains("Quality score"));
        assert!(summary.contains("Age"));
        assert!(summary.contains("filled 1 missing value in Age with median 30"));
    }

    #[test]
    fn test_run_report_flattens_cleaning_report() {
        let report = RunReport::new("in.csv", None, outcome().report);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["input_file"], "in.csv");
        assert!(json.get("output_file").is_none());
        assert!(json["before"]["quality_score"].is_number());
    }

    #[test]
    fn test_write_files() {
        let dir = std::env::temp_dir().join(format!("autoclean-report-{}", std::process::id()));
        let generator = ReportGenerator::new(dir.clone(), "sample");
        let outcome = outcome();

        let csv_path = generator.write_cleaned_data(&outcome.table).unwrap();
        assert!(csv_path.ends_with("sample.csv"));
        let reloaded = Table::read_csv(&csv_path).unwrap();
        assert_eq!(reloaded.row_count(), 3);

        let report = RunReport::new("in.csv", Some(&csv_path), outcome.report);
        let report_path = generator.write_report(&report).unwrap();
        let text = fs::read_to_string(&report_path).unwrap();
        assert!(text.contains("\"generated_at\""));

        let _ = fs::remove_dir_all(&dir);
    }
}
