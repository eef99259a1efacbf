//! Statistical imputation methods.

use crate::table::CellValue;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Statistics for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Median of the finite values; the mean of the two central values for an
    /// even count. `None` when there are none.
    pub fn median(values: &[f64]) -> Option<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Most frequent value. Ties go to the value that appears first.
    pub fn mode<'a, I>(values: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        // value -> (count, first position)
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (pos, value) in values.into_iter().enumerate() {
            counts.entry(value).or_insert((0, pos)).0 += 1;
        }

        counts
            .into_iter()
            .max_by(|(_, (count_a, pos_a)), (_, (count_b, pos_b))| {
                count_a.cmp(count_b).then(pos_b.cmp(pos_a))
            })
            .map(|(value, _)| value.to_string())
    }

    /// Lower median of the dates: element `(n - 1) / 2` in sorted order.
    pub fn median_date(dates: &[NaiveDate]) -> Option<NaiveDate> {
        if dates.is_empty() {
            return None;
        }
        let mut sorted = dates.to_vec();
        sorted.sort();
        Some(sorted[(sorted.len() - 1) / 2])
    }

    /// Replace every absent cell with `fill`. Returns how many were filled.
    pub fn fill_absent(values: &mut [CellValue], fill: &CellValue) -> usize {
        let mut filled = 0;
        for value in values.iter_mut().filter(|v| v.is_absent()) {
            *value = fill.clone();
            filled += 1;
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd() {
        assert_eq!(StatisticalImputer::median(&[35.0, 25.0, 30.0]), Some(30.0));
    }

    #[test]
    fn test_median_even_averages_middle_pair() {
        assert_eq!(StatisticalImputer::median(&[25.0, 35.0]), Some(30.0));
        assert_eq!(StatisticalImputer::median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(StatisticalImputer::median(&[]), None);
    }

    #[test]
    fn test_median_ignores_non_finite_values() {
        assert_eq!(StatisticalImputer::median(&[f64::NAN, 3.0, 1.0]), Some(2.0));
        assert_eq!(StatisticalImputer::median(&[f64::INFINITY, 5.0]), Some(5.0));
        assert_eq!(StatisticalImputer::median(&[f64::NAN]), None);
    }

    #[test]
    fn test_mode_tie_breaks_on_first_occurrence() {
        assert_eq!(
            StatisticalImputer::mode(["B", "A", "B", "A"]),
            Some("B".to_string())
        );
        assert_eq!(
            StatisticalImputer::mode(["x", "y", "z"]),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_mode_picks_most_frequent() {
        assert_eq!(
            StatisticalImputer::mode(["a", "b", "b", "c"]),
            Some("b".to_string())
        );
        assert_eq!(StatisticalImputer::mode(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_median_date_is_lower_median() {
        let d = |day| NaiveDate::from_ymd_opt(2023, 1, day).unwrap();
        assert_eq!(StatisticalImputer::median_date(&[d(20), d(5), d(10)]), Some(d(10)));
        assert_eq!(StatisticalImputer::median_date(&[d(10), d(5)]), Some(d(5)));
        assert_eq!(StatisticalImputer::median_date(&[]), None);
    }

    #[test]
    fn test_fill_absent() {
        let mut values = vec![CellValue::Number(1.0), CellValue::Absent, CellValue::Absent];
        let filled = StatisticalImputer::fill_absent(&mut values, &CellValue::Number(9.0));
        assert_eq!(filled, 2);
        assert_eq!(values[2], CellValue::Number(9.0));
    }
}
