//! Interchangeable ways of cleaning a table.
//!
//! - [`DeterministicStrategy`] runs type inference and the
//!   [`CleaningPipeline`]; it never fails.
//! - [`DelegatedStrategy`] hands the table to a text-generation backend and
//!   reports [`CleaningError::StrategyUnavailable`] whenever it cannot
//!   produce a usable table, so callers can fall back.

mod delegate;

pub use delegate::{DEFAULT_MAX_ROWS, DelegatedStrategy};
pub use crate::types::StrategyKind;

use crate::config::CleaningPolicy;
use crate::error::Result;
use crate::pipeline::CleaningPipeline;
use crate::profiler::TypeInferenceEngine;
use crate::table::Table;
use crate::types::{ActionLog, ClassificationMap};

/// What a strategy produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub table: Table,
    pub actions: ActionLog,
    /// Classification the strategy cleaned against, when it used one.
    pub classification: Option<ClassificationMap>,
}

/// A way of turning a raw table into a cleaned one.
pub trait CleaningStrategy: Send + Sync {
    /// Clean the table. The input is never modified.
    fn apply(&self, table: &Table) -> Result<StrategyOutput>;

    fn kind(&self) -> StrategyKind;

    /// Name for logs and reports.
    fn name(&self) -> String {
        self.kind().display_name().to_string()
    }
}

/// Type inference followed by the cleaning pipeline.
#[derive(Debug, Clone, Default)]
pub struct DeterministicStrategy {
    engine: TypeInferenceEngine,
    pipeline: CleaningPipeline,
}

static_assertions::assert_impl_all!(DeterministicStrategy: Send, Sync);

impl DeterministicStrategy {
    pub fn new(policy: CleaningPolicy) -> Self {
        Self {
            engine: TypeInferenceEngine::new(policy.clone()),
            pipeline: CleaningPipeline::new(policy),
        }
    }
}

impl CleaningStrategy for DeterministicStrategy {
    fn apply(&self, table: &Table) -> Result<StrategyOutput> {
        let profile = self.engine.profile(table);
        let (cleaned, actions) = self.pipeline.clean_profiled(table, &profile);
        Ok(StrategyOutput {
            table: cleaned,
            actions,
            classification: Some(profile.into_classification()),
        })
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Deterministic
    }
}
