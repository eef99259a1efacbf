//! End-to-end cleaning run: classify, score, clean, score again.

use crate::config::CleaningPolicy;
use crate::error::Result;
use crate::profiler::TypeInferenceEngine;
use crate::quality::{QualityComparison, QualityScorer};
use crate::strategy::{CleaningStrategy, DeterministicStrategy, StrategyOutput};
use crate::table::Table;
use crate::types::CleaningReport;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Cleaned table plus the report describing how it was produced.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub table: Table,
    pub report: CleaningReport,
}

/// Runs a cleaning strategy and falls back to the deterministic pipeline
/// when the strategy reports itself unavailable.
///
/// # Example
///
/// ```rust,ignore
/// use autoclean::{Orchestrator, DelegatedStrategy};
///
/// let outcome = Orchestrator::builder()
///     .strategy(DelegatedStrategy::new(provider))
///     .build()
///     .run(&table)?;
/// if outcome.report.used_fallback() {
///     println!("fell back: {:?}", outcome.report.fallback_reason);
/// }
/// ```
pub struct Orchestrator {
    engine: TypeInferenceEngine,
    strategy: Arc<dyn CleaningStrategy>,
    fallback: DeterministicStrategy,
}

static_assertions::assert_impl_all!(Orchestrator: Send, Sync);

impl Default for Orchestrator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Clean a table and describe the run.
    ///
    /// # Errors
    ///
    /// Only errors other than `StrategyUnavailable` are returned; the
    /// deterministic fallback itself cannot fail.
    pub fn run(&self, table: &Table) -> Result<CleaningOutcome> {
        let start = Instant::now();
        info!(
            "Starting {} cleaning of {} rows x {} columns",
            self.strategy.name(),
            table.row_count(),
            table.column_count()
        );

        let before = QualityScorer::score(table);

        let (output, requested_strategy, fallback_reason) = match self.strategy.apply(table) {
            Ok(output) => (output, None, None),
            Err(e) if e.is_strategy_unavailable() => {
                warn!(
                    "{} unavailable, falling back to the deterministic pipeline: {}",
                    self.strategy.name(),
                    e
                );
                let output = self.fallback.apply(table)?;
                (output, Some(self.strategy.kind()), Some(e.to_string()))
            }
            Err(e) => return Err(e),
        };
        let strategy = if requested_strategy.is_some() {
            self.fallback.kind()
        } else {
            self.strategy.kind()
        };

        let StrategyOutput {
            table: cleaned,
            actions,
            classification,
        } = output;
        let classification = classification.unwrap_or_else(|| self.engine.infer(table));

        let comparison = QualityComparison::new(before, QualityScorer::score(&cleaned));
        let column_changes = comparison.column_changes();
        let rows_removed = comparison.rows_removed();
        let (before, after) = comparison.into_reports();

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Cleaning complete in {}ms: quality {:.2} -> {:.2}",
            duration_ms, before.quality_score, after.quality_score
        );

        Ok(CleaningOutcome {
            table: cleaned,
            report: CleaningReport {
                strategy,
                requested_strategy,
                fallback_reason,
                classification,
                before,
                after,
                column_changes,
                rows_removed,
                actions,
                duration_ms,
            },
        })
    }
}

/// Builder for [`Orchestrator`].
#[derive(Default)]
pub struct OrchestratorBuilder {
    policy: Option<CleaningPolicy>,
    strategy: Option<Arc<dyn CleaningStrategy>>,
}

impl OrchestratorBuilder {
    /// Policy for classification and the deterministic pipeline.
    pub fn policy(mut self, policy: CleaningPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Strategy to try first. Defaults to the deterministic pipeline.
    pub fn strategy(mut self, strategy: impl CleaningStrategy + 'static) -> Self {
        self.strategy = Some(Arc::new(strategy));
        self
    }

    pub fn shared_strategy(mut self, strategy: Arc<dyn CleaningStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn build(self) -> Orchestrator {
        let policy = self.policy.unwrap_or_default();
        let fallback = DeterministicStrategy::new(policy.clone());
        let strategy = self
            .strategy
            .unwrap_or_else(|| Arc::new(fallback.clone()) as Arc<dyn CleaningStrategy>);

        Orchestrator {
            engine: TypeInferenceEngine::new(policy),
            strategy,
            fallback,
        }
    }
}
