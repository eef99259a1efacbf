//! Descriptive statistics for exploratory profiling.

use crate::table::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Columns with at most this many distinct values get a value-count table.
pub(crate) const TOP_VALUES_MAX_DISTINCT: usize = 10;

/// Describe-style summary of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 for fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// How often a value occurs in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Summarize the parsed numbers of a column. Returns `None` when there are none.
pub(crate) fn numeric_summary(parsed: &[Option<f64>]) -> Option<NumericSummary> {
    let mut numbers: Vec<f64> = parsed.iter().flatten().copied().collect();
    if numbers.is_empty() {
        return None;
    }
    numbers.sort_by(f64::total_cmp);

    let n = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / n;
    let std = if numbers.len() > 1 {
        let variance = numbers.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    Some(NumericSummary {
        count: numbers.len(),
        mean,
        std,
        min: numbers[0],
        q25: quantile(&numbers, 0.25),
        median: quantile(&numbers, 0.5),
        q75: quantile(&numbers, 0.75),
        max: numbers[numbers.len() - 1],
    })
}

/// Linearly interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Value counts by text form, most frequent first; ties keep first-seen order.
pub(crate) fn value_counts(values: &[CellValue]) -> Vec<ValueCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for text in values.iter().filter_map(CellValue::to_text) {
        let count = counts.entry(text.clone()).or_insert(0);
        if *count == 0 {
            order.push(text);
        }
        *count += 1;
    }

    let mut result: Vec<ValueCount> = order
        .into_iter()
        .map(|value| {
            let count = counts.get(&value).copied().unwrap_or(0);
            ValueCount { value, count }
        })
        .collect();
    // Stable sort keeps first occurrence ahead on ties
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    // ==================== numeric_summary tests ====================

    #[test]
    fn test_numeric_summary_basic() {
        let summary =
            numeric_summary(&[Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), Some(5.0)]).unwrap();

        assert_eq!(summary.count, 5);
        assert_eq!(summary.mean, 3.0);
        assert!((summary.std - 1.58).abs() < 0.01);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q25, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q75, 4.0);
        assert_eq!(summary.max, 5.0);
    }

    #[test]
    fn test_numeric_summary_interpolates() {
        let summary = numeric_summary(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]).unwrap();
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q25, 1.75);
    }

    #[test]
    fn test_numeric_summary_single_value() {
        let summary = numeric_summary(&[Some(5.0)]).unwrap();
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.median, 5.0);
    }

    #[test]
    fn test_numeric_summary_none_when_empty() {
        assert!(numeric_summary(&[None, None]).is_none());
    }

    // ==================== value_counts tests ====================

    #[test]
    fn test_value_counts_order() {
        let column = Column::new("v", vec![Some("a"), Some("b"), Some("b"), None, Some("c"), Some("a")]);
        let counts = value_counts(column.values());
        let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.value.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("a", 2), ("b", 2), ("c", 1)]);
    }
}
