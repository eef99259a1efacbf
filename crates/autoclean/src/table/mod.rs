//! In-memory tabular data model.
//!
//! A [`Table`] is an ordered list of named [`Column`]s of [`CellValue`]s.
//! Construction validates the shape (equal column lengths, unique names),
//! so every function that accepts a `&Table` can rely on it.

mod polars_io;

use crate::error::{CleaningError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell.
///
/// `Absent` is a first-class missing marker and is distinct from
/// `Text(String::new())`.
#[derive(Debug, Clone, Default)]
pub enum CellValue {
    #[default]
    Absent,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl CellValue {
    /// Check if the cell holds no data.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Text representation of a present value, `None` for `Absent`.
    ///
    /// Dates render as `YYYY-MM-DD`; numbers use their shortest form
    /// (`30` rather than `30.0`).
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Absent => None,
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Numeric value, if the cell is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrowed text, if the cell is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Bit pattern used for number equality: `-0.0` folds onto `0.0` and every
/// NaN onto one canonical NaN.
fn number_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

// Row equality for duplicate detection must be an equivalence relation,
// so numbers compare by bit pattern instead of IEEE semantics.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Absent, CellValue::Absent) => true,
            (CellValue::Number(a), CellValue::Number(b)) => number_key(*a) == number_key(*b),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Absent => {}
            CellValue::Number(n) => number_key(*n).hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Absent, Into::into)
    }
}

fn finite_or_absent(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Number(n) if !n.is_finite() => CellValue::Absent,
        other => other,
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<CellValue>,
}

impl Column {
    /// Create a column from anything convertible into cells.
    ///
    /// NaN and infinite numbers are stored as `Absent`.
    ///
    /// ```rust,ignore
    /// let age = Column::new("Age", vec![Some(25.0), None, Some(35.0)]);
    /// let city = Column::new("City", vec![Some("Paris"), None]);
    /// ```
    pub fn new<V>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<CellValue>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(|v| finite_or_absent(v.into())).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of absent cells.
    pub fn absent_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_absent()).count()
    }

    /// Iterator over the present cells, in row order.
    pub fn present(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_absent())
    }

    pub(crate) fn values_mut(&mut self) -> &mut [CellValue] {
        &mut self.values
    }
}

/// A shape-validated table.
///
/// Tables are values: the cleaning pipeline never mutates its input and
/// always returns a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, rejecting mismatched column lengths and repeated names.
    ///
    /// # Errors
    ///
    /// - [`CleaningError::InvalidTableShape`] when a column's length differs
    ///   from the first column's.
    /// - [`CleaningError::DuplicateColumn`] when two columns share a name.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(CleaningError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != row_count {
                return Err(CleaningError::InvalidTableShape {
                    column: column.name.clone(),
                    expected: row_count,
                    found: column.len(),
                });
            }
        }

        Ok(Self { columns, row_count })
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            row_count: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cells of one row, left to right.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.row_count()`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &CellValue> {
        self.columns.iter().map(move |c| &c.values[row])
    }

    /// Total number of absent cells.
    pub fn absent_count(&self) -> usize {
        self.columns.iter().map(Column::absent_count).sum()
    }

    /// Indices of rows that repeat an earlier row across all columns.
    pub fn duplicate_rows(&self) -> Vec<usize> {
        let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(self.row_count);
        (0..self.row_count)
            .filter(|&row| !seen.insert(self.row(row).collect()))
            .collect()
    }

    /// New table keeping only the given rows, in the given order.
    pub(crate) fn select_rows(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: rows.iter().map(|&r| c.values[r].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            row_count: rows.len(),
        }
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new("id", vec![Some(1.0), Some(2.0), Some(1.0)]),
            Column::new("name", vec![Some("a"), None, Some("a")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let result = Table::new(vec![
            Column::new("a", vec![Some(1.0), Some(2.0)]),
            Column::new("b", vec![Some(1.0)]),
        ]);
        match result {
            Err(CleaningError::InvalidTableShape {
                column,
                expected,
                found,
            }) => {
                assert_eq!(column, "b");
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected InvalidTableShape, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = Table::new(vec![
            Column::new("a", vec![Some(1.0)]),
            Column::new("a", vec![Some(2.0)]),
        ]);
        assert!(matches!(result, Err(CleaningError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(Vec::new()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_absent_is_not_empty_string() {
        assert_ne!(CellValue::Absent, CellValue::Text(String::new()));
        assert!(!CellValue::Text(String::new()).is_absent());
    }

    #[test]
    fn test_number_equality_is_total() {
        assert_eq!(CellValue::Number(f64::NAN), CellValue::Number(f64::NAN));
        assert_eq!(CellValue::Number(-0.0), CellValue::Number(0.0));
        assert_ne!(CellValue::Number(1.0), CellValue::Text("1".to_string()));
    }

    #[test]
    fn test_non_finite_numbers_become_absent() {
        let column = Column::new(
            "n",
            vec![CellValue::Number(1.0), CellValue::Number(f64::NAN), f64::INFINITY.into()],
        );
        assert_eq!(
            column.values(),
            &[CellValue::Number(1.0), CellValue::Absent, CellValue::Absent]
        );
        assert_eq!(column.absent_count(), 2);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Number(30.0).to_text().as_deref(), Some("30"));
        assert_eq!(CellValue::Number(2.5).to_text().as_deref(), Some("2.5"));
        let date = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(CellValue::Date(date).to_text().as_deref(), Some("2023-01-05"));
        assert_eq!(CellValue::Absent.to_text(), None);
    }

    #[test]
    fn test_duplicate_rows() {
        assert_eq!(sample().duplicate_rows(), vec![2]);
    }

    #[test]
    fn test_duplicate_rows_treats_absent_as_equal() {
        let table = Table::new(vec![Column::new("x", vec![None::<f64>, None, Some(1.0)])]).unwrap();
        assert_eq!(table.duplicate_rows(), vec![1]);
    }

    #[test]
    fn test_select_rows_preserves_order() {
        let table = sample().select_rows(&[2, 0]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns()[0].values()[0], CellValue::Number(1.0));
        assert_eq!(table.columns()[1].values()[1], CellValue::Text("a".to_string()));
    }

    #[test]
    fn test_absent_counts() {
        let table = sample();
        assert_eq!(table.absent_count(), 1);
        assert_eq!(table.column("name").unwrap().absent_count(), 1);
        assert!(table.column("missing").is_none());
    }
}
