//! Cleaning delegated to a text-generation backend.

use super::{CleaningStrategy, StrategyKind, StrategyOutput};
use crate::ai::TextGenerationProvider;
use crate::error::{CleaningError, Result};
use crate::table::Table;
use crate::types::{ActionLog, ActionLogEntry, ActionType, CleaningStage};
use tracing::{info, warn};

/// Tables larger than this are not sent to the backend.
pub const DEFAULT_MAX_ROWS: usize = 500;

const CLEANING_INSTRUCTIONS: &str = "\
Clean the CSV dataset below. Apply these rules to every column, whatever its name:
1. Remove rows that exactly duplicate an earlier row.
2. In numeric columns, fill missing values with the column median.
3. In columns with few distinct labels, fill missing values with the most frequent label and fix inconsistent capitalization to Title Case (for example 'new york' becomes 'New York').
4. In date columns, fill missing values with the median date and write every date as YYYY-MM-DD.
5. In free-text columns, fill missing values with 'Unknown' and trim surrounding whitespace.
Answer with the cleaned dataset as CSV only: keep the header row and the exact same columns in the same order, and add no commentary.";

/// Sends the table to a [`TextGenerationProvider`] and parses the CSV answer.
///
/// Every failure mode (oversized table, provider error, non-CSV answer,
/// changed columns) is reported as [`CleaningError::StrategyUnavailable`].
pub struct DelegatedStrategy<P: TextGenerationProvider> {
    provider: P,
    max_rows: usize,
}

impl<P: TextGenerationProvider> DelegatedStrategy<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    /// Set the largest table (in rows) that will be sent.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn provider_label(&self) -> String {
        match self.provider.model() {
            Some(model) => format!("{} ({})", self.provider.name(), model),
            None => self.provider.name().to_string(),
        }
    }

    fn unavailable(&self, reason: impl Into<String>) -> CleaningError {
        let reason = reason.into();
        warn!("{} unavailable: {}", self.provider_label(), reason);
        CleaningError::StrategyUnavailable(reason)
    }
}

fn build_prompt(csv: &str) -> String {
    format!("{}\n\nDATASET:\n{}", CLEANING_INSTRUCTIONS, csv)
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fences(answer: &str) -> &str {
    let trimmed = answer.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("csv") on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

impl<P: TextGenerationProvider> CleaningStrategy for DelegatedStrategy<P> {
    fn apply(&self, table: &Table) -> Result<StrategyOutput> {
        if table.column_count() == 0 {
            return Ok(StrategyOutput {
                table: table.clone(),
                actions: ActionLog::new(),
                classification: None,
            });
        }

        if table.row_count() > self.max_rows {
            return Err(self.unavailable(format!(
                "table has {} rows, limit is {}",
                table.row_count(),
                self.max_rows
            )));
        }

        let csv = table
            .to_csv_string()
            .map_err(|e| self.unavailable(format!("could not render table: {}", e)))?;

        info!("Delegating cleaning to {}", self.provider_label());
        let answer = self
            .provider
            .generate(&build_prompt(&csv))
            .map_err(|e| self.unavailable(format!("request failed: {}", e)))?;

        let cleaned = Table::from_csv_str(strip_code_fences(&answer))
            .map_err(|e| self.unavailable(format!("answer is not a table: {}", e)))?;

        if cleaned.column_names() != table.column_names() {
            return Err(self.unavailable(format!(
                "answer has columns {:?}, expected {:?}",
                cleaned.column_names(),
                table.column_names()
            )));
        }

        let mut actions = ActionLog::new();
        actions.push(
            ActionLogEntry::new(
                CleaningStage::ExternalDelegate,
                ActionType::DelegateApplied,
                format!(
                    "cleaned by {}: {} rows in, {} rows out",
                    self.provider_label(),
                    table.row_count(),
                    cleaned.row_count()
                ),
            )
            .with_affected(cleaned.row_count()),
        );

        Ok(StrategyOutput {
            table: cleaned,
            actions,
            classification: None,
        })
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::ExternalDelegate
    }

    fn name(&self) -> String {
        self.provider_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CellValue, Column};
    use anyhow::anyhow;
    use std::sync::Mutex;

    /// Returns a fixed answer and remembers the last prompt.
    struct CannedProvider {
        answer: Option<String>,
        last_prompt: Mutex<Option<String>>,
    }

    impl CannedProvider {
        fn answering(answer: &str) -> Self {
            Self {
                answer: Some(answer.to_string()),
                last_prompt: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                answer: None,
                last_prompt: Mutex::new(None),
            }
        }
    }

    impl TextGenerationProvider for CannedProvider {
        fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.answer.clone().ok_or_else(|| anyhow!("connection refused"))
        }

        fn name(&self) -> &str {
            "Canned"
        }
    }

    fn messy() -> Table {
        Table::new(vec![
            Column::new("Age", vec![Some(25.0), None, Some(35.0)]),
            Column::new("City", vec![Some("new york"), Some("PARIS"), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```csv\na,b\n1,2\n```"), "a,b\n1,2");
        assert_eq!(strip_code_fences("```\na\n1\n```\n"), "a\n1");
        assert_eq!(strip_code_fences("  a,b\n1,2  "), "a,b\n1,2");
    }

    #[test]
    fn test_delegate_parses_answer() {
        let provider = CannedProvider::answering("```csv\nAge,City\n25,New York\n30,Paris\n35,New York\n```");
        let strategy = DelegatedStrategy::new(provider);
        let output = strategy.apply(&messy()).unwrap();

        assert_eq!(output.table.row_count(), 3);
        assert_eq!(output.table.column("Age").unwrap().values()[1], CellValue::Number(30.0));
        assert_eq!(output.actions.len(), 1);
        assert_eq!(output.actions.entries()[0].stage, CleaningStage::ExternalDelegate);
    }

    #[test]
    fn test_delegate_sends_instructions_and_data() {
        let strategy = DelegatedStrategy::new(CannedProvider::answering("Age,City\n1,A"));
        let _ = strategy.apply(&messy());

        let prompt = strategy.provider().last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("YYYY-MM-DD"));
        assert!(prompt.contains("Age,City"));
        assert!(prompt.contains("new york"));
    }

    #[test]
    fn test_provider_failure_is_unavailable() {
        let strategy = DelegatedStrategy::new(CannedProvider::failing());
        let error = strategy.apply(&messy()).unwrap_err();
        assert!(error.is_strategy_unavailable());
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_column_mismatch_is_unavailable() {
        let strategy = DelegatedStrategy::new(CannedProvider::answering("Age\n25\n30"));
        let error = strategy.apply(&messy()).unwrap_err();
        assert!(error.is_strategy_unavailable());
    }

    #[test]
    fn test_too_many_rows_is_unavailable() {
        let provider = CannedProvider::answering("Age,City\n1,A");
        let strategy = DelegatedStrategy::new(provider).with_max_rows(2);
        let error = strategy.apply(&messy()).unwrap_err();

        assert!(error.is_strategy_unavailable());
        assert!(strategy.provider().last_prompt.lock().unwrap().is_none());
    }

    #[test]
    fn test_kind_and_name() {
        let strategy = DelegatedStrategy::new(CannedProvider::failing());
        assert_eq!(strategy.kind(), StrategyKind::ExternalDelegate);
        assert_eq!(strategy.name(), "Canned");
    }
}
