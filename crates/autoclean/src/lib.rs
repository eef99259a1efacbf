//! Schema-free data profiling and adaptive cleaning.
//!
//! Works on any table of named columns: it classifies each column as
//! numeric, datetime, categorical or free text from the values alone, then
//! repairs missing values, duplicate rows and inconsistent formatting with
//! rules chosen per column kind. A 0-100 quality score measures the result.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use autoclean::{Table, clean, infer, score};
//!
//! let table = Table::read_csv("data.csv")?;
//!
//! let classification = infer(&table);
//! let (cleaned, log) = clean(&table, &classification);
//!
//! println!("quality {:.1} -> {:.1}", score(&table).quality_score, score(&cleaned).quality_score);
//! for entry in &log {
//!     println!("[{}] {}", entry.stage.display_name(), entry.description);
//! }
//! ```
//!
//! # Strategies
//!
//! The [`Orchestrator`] runs any [`CleaningStrategy`] and falls back to the
//! deterministic pipeline when the strategy reports
//! [`CleaningError::StrategyUnavailable`]:
//!
//! ```rust,ignore
//! use autoclean::{DelegatedStrategy, Orchestrator};
//! use autoclean::ai::OpenRouterProvider;
//!
//! let outcome = Orchestrator::builder()
//!     .strategy(DelegatedStrategy::new(OpenRouterProvider::from_env()?))
//!     .build()
//!     .run(&table)?;
//! ```
//!
//! # Configuration
//!
//! Thresholds live in [`CleaningPolicy`]:
//!
//! ```rust,ignore
//! let policy = CleaningPolicy::builder()
//!     .categorical_cardinality_ratio(0.3)
//!     .datetime_max_text_len(40)
//!     .row_missing_threshold(0.6)
//!     .build()?;
//! let engine = TypeInferenceEngine::new(policy.clone());
//! let pipeline = CleaningPipeline::new(policy);
//! ```

pub mod ai;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod orchestrator;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod strategy;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{CleaningPolicy, CleaningPolicyBuilder, ConfigValidationError};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use orchestrator::{CleaningOutcome, Orchestrator, OrchestratorBuilder};
pub use pipeline::CleaningPipeline;
pub use profiler::{
    ColumnProfile, ColumnProfiler, ColumnStatistics, DatasetProfile, DatasetProfiler,
    NumericSummary, ParsedValues, TableProfile, TypeInferenceEngine, ValueCount,
};
pub use quality::{QualityComparison, QualityScorer};
pub use reporting::{ReportGenerator, RunReport, render_summary};
pub use strategy::{
    CleaningStrategy, DelegatedStrategy, DeterministicStrategy, StrategyKind, StrategyOutput,
};
pub use table::{CellValue, Column, Table};
pub use types::{
    ActionLog, ActionLogEntry, ActionType, ClassificationMap, CleaningReport, CleaningStage,
    ColumnChange, ColumnKind, ColumnMissing, QualityReport,
};

/// Classify every column with the default policy.
pub fn infer(table: &Table) -> ClassificationMap {
    TypeInferenceEngine::default().infer(table)
}

/// Run the cleaning pipeline with the default policy.
pub fn clean(table: &Table, classification: &ClassificationMap) -> (Table, ActionLog) {
    CleaningPipeline::default().clean(table, classification)
}

/// Score a table's data quality.
pub fn score(table: &Table) -> QualityReport {
    QualityScorer::score(table)
}
