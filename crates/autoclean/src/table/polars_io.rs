//! Conversion between [`Table`] and polars `DataFrame`, plus CSV helpers.
//!
//! Polars handles the file formats; the cleaning core only ever sees
//! [`CellValue`]s.
//!
//! # Type Mapping
//!
//! | Polars type       | Cell            |
//! |-------------------|-----------------|
//! | Null / NaN        | `Absent`        |
//! | Int*, UInt*, Float* | `Number`      |
//! | Date              | `Date`          |
//! | String            | `Text`          |
//! | Other             | `Text` (display)|
//!
//! On the way back, a column whose present cells are all numbers becomes
//! `Int64` (when every value is integral) or `Float64`; everything else
//! becomes `String`.

use super::{CellValue, Column, Table};
use crate::error::{Result, ResultExt};
use chrono::NaiveDate;
use polars::prelude::{
    AnyValue, CsvParseOptions, CsvReadOptions, CsvWriter, DataFrame, NamedFrom, SerReader,
    SerWriter, Series,
};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

fn epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
}

fn any_value_to_cell(value: AnyValue) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Absent,

        AnyValue::Int8(i) => CellValue::Number(i as f64),
        AnyValue::Int16(i) => CellValue::Number(i as f64),
        AnyValue::Int32(i) => CellValue::Number(i as f64),
        AnyValue::Int64(i) => CellValue::Number(i as f64),

        AnyValue::UInt8(u) => CellValue::Number(u as f64),
        AnyValue::UInt16(u) => CellValue::Number(u as f64),
        AnyValue::UInt32(u) => CellValue::Number(u as f64),
        AnyValue::UInt64(u) => CellValue::Number(u as f64),

        AnyValue::Float32(f) if f.is_nan() => CellValue::Absent,
        AnyValue::Float32(f) => CellValue::Number(f as f64),
        AnyValue::Float64(f) if f.is_nan() => CellValue::Absent,
        AnyValue::Float64(f) => CellValue::Number(f),

        AnyValue::String(s) => CellValue::Text(s.to_string()),
        AnyValue::StringOwned(s) => CellValue::Text(s.to_string()),

        // Days since the Unix epoch
        AnyValue::Date(days) => epoch()
            .and_then(|e| e.checked_add_signed(chrono::Duration::days(days as i64)))
            .map_or(CellValue::Absent, CellValue::Date),

        other => CellValue::Text(format!("{}", other)),
    }
}

fn column_to_series(column: &Column) -> Series {
    let name = column.name();
    let all_numeric = column
        .present()
        .all(|v| matches!(v, CellValue::Number(_)));

    if all_numeric && column.present().next().is_some() {
        // i64::MAX as f64 rounds up to 2^63, which does not fit
        let integral = column.present().filter_map(CellValue::as_number).all(|n| {
            n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64
        });
        if integral {
            let values: Vec<Option<i64>> = column
                .values()
                .iter()
                .map(|v| v.as_number().map(|n| n as i64))
                .collect();
            return Series::new(name.into(), values);
        }
        let values: Vec<Option<f64>> = column.values().iter().map(CellValue::as_number).collect();
        return Series::new(name.into(), values);
    }

    let values: Vec<Option<String>> = column.values().iter().map(CellValue::to_text).collect();
    Series::new(name.into(), values)
}

impl Table {
    /// Build a table from a polars `DataFrame`.
    pub fn from_dataframe(df: &DataFrame) -> Result<Table> {
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let mut values = Vec::with_capacity(series.len());
            for idx in 0..series.len() {
                let value = series
                    .get(idx)
                    .context(format!("Reading column '{}'", series.name()))?;
                values.push(any_value_to_cell(value));
            }
            columns.push(Column::new(series.name().to_string(), values));
        }

        Table::new(columns)
    }

    /// Convert the table into a polars `DataFrame`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<polars::prelude::Column> = self
            .columns()
            .iter()
            .map(|c| polars::prelude::Column::from(column_to_series(c)))
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Read a CSV file with a header row.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();
        debug!("Reading CSV from {}", path.display());

        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(100))
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
            .context(format!("Reading {}", path.display()))?;

        Table::from_dataframe(&df)
    }

    /// Parse CSV text with a header row.
    pub fn from_csv_str(content: &str) -> Result<Table> {
        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(100))
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(content.to_string()))
            .finish()?;

        Table::from_dataframe(&df)
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path.as_ref())?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)?;
        Ok(())
    }

    /// Render the table as CSV text with a header row.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut df = self.to_dataframe()?;
        let mut buffer: Vec<u8> = Vec::new();
        CsvWriter::new(&mut buffer)
            .include_header(true)
            .finish(&mut df)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
