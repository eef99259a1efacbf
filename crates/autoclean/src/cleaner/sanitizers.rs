//! Value sanitization for text-like columns.

use crate::table::CellValue;
use crate::utils::title_case;

/// Rewrite every present value as trimmed, title-cased text.
/// Returns how many cells changed.
pub(crate) fn trim_and_title_case(values: &mut [CellValue]) -> usize {
    rewrite_present(values, |text| title_case(text.trim()))
}

/// Rewrite every present value as trimmed text, keeping its casing.
/// Returns how many cells changed.
pub(crate) fn trim_values(values: &mut [CellValue]) -> usize {
    rewrite_present(values, |text| text.trim().to_string())
}

fn rewrite_present(values: &mut [CellValue], rewrite: impl Fn(&str) -> String) -> usize {
    let mut changed = 0;
    for value in values.iter_mut() {
        let Some(text) = value.to_text() else {
            continue;
        };
        let cleaned = CellValue::Text(rewrite(&text));
        if *value != cleaned {
            *value = cleaned;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_title_case() {
        let mut values = vec![
            CellValue::from("  new york "),
            CellValue::from("PARIS"),
            CellValue::from("Rome"),
            CellValue::Absent,
        ];
        let changed = trim_and_title_case(&mut values);

        assert_eq!(changed, 2);
        assert_eq!(values[0], CellValue::from("New York"));
        assert_eq!(values[1], CellValue::from("Paris"));
        assert!(values[3].is_absent());
    }

    #[test]
    fn test_trim_values_keeps_case() {
        let mut values = vec![CellValue::from("  Hello WORLD  "), CellValue::from("ok")];
        assert_eq!(trim_values(&mut values), 1);
        assert_eq!(values[0], CellValue::from("Hello WORLD"));
    }

    #[test]
    fn test_numbers_become_text() {
        let mut values = vec![CellValue::Number(3.0)];
        assert_eq!(trim_values(&mut values), 1);
        assert_eq!(values[0], CellValue::from("3"));
    }
}
