//! Single-column classification.

use crate::config::CleaningPolicy;
use crate::table::CellValue;
use crate::types::ColumnKind;
use crate::utils::{cell_as_date, cell_as_number};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Values recovered while classifying, aligned with the column's rows.
///
/// `None` marks an absent cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValues {
    Numbers(Vec<Option<f64>>),
    Dates(Vec<Option<NaiveDate>>),
    /// Categorical and text columns carry no parsed form.
    Raw,
}

/// Result of classifying one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub kind: ColumnKind,
    pub parsed: ParsedValues,
}

/// Classifies a column into a [`ColumnKind`].
///
/// Rules are tried in order, the first match wins:
///
/// 1. **Numeric**: at least one present value and every present value is a
///    number or a numeric literal.
/// 2. **DateTime**: at least one present value and every present value is a
///    date or parses as one, with a text form shorter than
///    `datetime_max_text_len`.
/// 3. **Categorical**: fewer distinct present values than
///    `categorical_cardinality_ratio * row_count`.
/// 4. **Text**: everything else.
#[derive(Debug, Clone, Default)]
pub struct ColumnProfiler {
    policy: CleaningPolicy,
}

impl ColumnProfiler {
    pub fn new(policy: CleaningPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CleaningPolicy {
        &self.policy
    }

    /// Classify a column and keep the parsed numbers or dates.
    pub fn profile(&self, values: &[CellValue]) -> ColumnProfile {
        let has_present = values.iter().any(|v| !v.is_absent());

        if has_present {
            if let Some(numbers) = parse_all(values, cell_as_number) {
                return ColumnProfile {
                    kind: ColumnKind::Numeric,
                    parsed: ParsedValues::Numbers(numbers),
                };
            }

            if let Some(dates) = self.parse_dates(values) {
                return ColumnProfile {
                    kind: ColumnKind::DateTime,
                    parsed: ParsedValues::Dates(dates),
                };
            }
        }

        let kind = if self.is_low_cardinality(values) {
            ColumnKind::Categorical
        } else {
            ColumnKind::Text
        };

        ColumnProfile {
            kind,
            parsed: ParsedValues::Raw,
        }
    }

    /// Classify a column.
    pub fn classify(&self, values: &[CellValue]) -> ColumnKind {
        self.profile(values).kind
    }

    fn parse_dates(&self, values: &[CellValue]) -> Option<Vec<Option<NaiveDate>>> {
        let max_len = self.policy.datetime_max_text_len;
        parse_all(values, |cell| {
            let short_enough = cell
                .to_text()
                .is_some_and(|text| text.chars().count() < max_len);
            if short_enough { cell_as_date(cell) } else { None }
        })
    }

    fn is_low_cardinality(&self, values: &[CellValue]) -> bool {
        let distinct: HashSet<String> = values.iter().filter_map(CellValue::to_text).collect();
        (distinct.len() as f64) < self.policy.categorical_cardinality_ratio * values.len() as f64
    }
}

/// Parse every present cell, or give up at the first one that fails.
fn parse_all<T>(values: &[CellValue], parse: impl Fn(&CellValue) -> Option<T>) -> Option<Vec<Option<T>>> {
    values
        .iter()
        .map(|cell| {
            if cell.is_absent() {
                Some(None)
            } else {
                parse(cell).map(Some)
            }
        })
        .collect()
}
