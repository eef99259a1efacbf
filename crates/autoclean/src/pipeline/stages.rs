//! Per-kind repair stages.
//!
//! Each stage repairs one column in place and records what it did. Problems
//! local to a column become warning entries; a stage never fails.

use crate::cleaner::{trim_and_title_case, trim_values};
use crate::config::FALLBACK_LABEL;
use crate::imputers::StatisticalImputer;
use crate::table::{CellValue, Column};
use crate::types::{ActionLog, ActionLogEntry, ActionType, CleaningStage};
use crate::utils::plural;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Append an entry to the log and mirror it as a tracing event.
pub(crate) fn record(log: &mut ActionLog, entry: ActionLogEntry) {
    if entry.is_warning() {
        warn!("[{}] {}", entry.stage.display_name(), entry.description);
    } else {
        info!("[{}] {}", entry.stage.display_name(), entry.description);
    }
    log.push(entry);
}

fn entry(stage: CleaningStage, action: ActionType, column: &str, description: String) -> ActionLogEntry {
    ActionLogEntry::new(stage, action, description).for_column(column)
}

/// Fill absent cells with the median and turn numeric text into numbers.
///
/// `numbers` holds the parsed value of each row, `None` where the cell is
/// absent or not a number.
pub(crate) fn repair_numeric(column: &mut Column, numbers: &[Option<f64>], log: &mut ActionLog) {
    const STAGE: CleaningStage = CleaningStage::NumericRepair;
    let name = column.name().to_string();

    let present: Vec<f64> = numbers.iter().flatten().copied().collect();
    let unparseable = column
        .values()
        .iter()
        .zip(numbers)
        .filter(|(value, number)| !value.is_absent() && number.is_none())
        .count();

    let Some(median) = StatisticalImputer::median(&present) else {
        record(
            log,
            entry(
                STAGE,
                ActionType::ColumnSkipped,
                &name,
                format!("no numeric values in {}; skipped", name),
            )
            .with_affected(column.absent_count()),
        );
        return;
    };

    let mut converted = 0;
    for (value, number) in column.values_mut().iter_mut().zip(numbers) {
        if let CellValue::Text(_) = value
            && let Some(n) = number
        {
            *value = CellValue::Number(*n);
            converted += 1;
        }
    }
    if converted > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ValueConverted,
                &name,
                format!("converted {} in {} to numbers", plural(converted, "value", "values"), name),
            )
            .with_affected(converted),
        );
    }

    let filled = StatisticalImputer::fill_absent(column.values_mut(), &CellValue::Number(median));
    if filled > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ValueImputed,
                &name,
                format!(
                    "filled {} in {} with median {}",
                    plural(filled, "missing value", "missing values"),
                    name,
                    median
                ),
            )
            .with_affected(filled),
        );
    }

    if unparseable > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ParseFailed,
                &name,
                format!(
                    "left {} in {} untouched",
                    plural(unparseable, "non-numeric value", "non-numeric values"),
                    name
                ),
            )
            .with_affected(unparseable),
        );
    }
}

/// Fill absent cells with the mode, then trim and title-case every value.
pub(crate) fn repair_categorical(column: &mut Column, log: &mut ActionLog) {
    const STAGE: CleaningStage = CleaningStage::CategoricalRepair;
    let name = column.name().to_string();

    let texts: Vec<String> = column.values().iter().filter_map(CellValue::to_text).collect();
    let mode = StatisticalImputer::mode(texts.iter().map(String::as_str));

    let (fill, how) = match mode {
        Some(mode) => {
            let how = format!("mode '{}'", mode);
            (mode, how)
        }
        None => (FALLBACK_LABEL.to_string(), format!("'{}'", FALLBACK_LABEL)),
    };

    let filled = StatisticalImputer::fill_absent(column.values_mut(), &CellValue::Text(fill));
    if filled > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ValueImputed,
                &name,
                format!(
                    "filled {} in {} with {}",
                    plural(filled, "missing value", "missing values"),
                    name,
                    how
                ),
            )
            .with_affected(filled),
        );
    }

    let cleaned = trim_and_title_case(column.values_mut());
    if cleaned > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ValueCleaned,
                &name,
                format!(
                    "trimmed and title-cased {} in {}",
                    plural(cleaned, "value", "values"),
                    name
                ),
            )
            .with_affected(cleaned),
        );
    }
}

/// Fill gaps with the median date and render every date as `YYYY-MM-DD`.
///
/// `parsed` holds the date of each row, `None` where the cell is absent or
/// not a date.
pub(crate) fn repair_datetime(column: &mut Column, parsed: &[Option<NaiveDate>], log: &mut ActionLog) {
    const STAGE: CleaningStage = CleaningStage::DateTimeRepair;
    let name = column.name().to_string();

    let dates: Vec<_> = parsed.iter().flatten().copied().collect();

    let Some(median) = StatisticalImputer::median_date(&dates) else {
        record(
            log,
            entry(
                STAGE,
                ActionType::ParseFailed,
                &name,
                format!("could not parse dates in {}; left unchanged", name),
            )
            .with_affected(column.len()),
        );
        return;
    };

    let unparseable = column
        .values()
        .iter()
        .zip(parsed)
        .filter(|(value, date)| !value.is_absent() && date.is_none())
        .count();
    let filled = parsed.iter().filter(|d| d.is_none()).count();

    let mut rewritten = 0;
    for (value, date) in column.values_mut().iter_mut().zip(parsed) {
        let rendered = CellValue::Text(date.unwrap_or(median).format("%Y-%m-%d").to_string());
        if date.is_some() && *value != rendered {
            rewritten += 1;
        }
        *value = rendered;
    }

    if unparseable > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ParseFailed,
                &name,
                format!(
                    "treated {} in {} as missing",
                    plural(unparseable, "unparseable date", "unparseable dates"),
                    name
                ),
            )
            .with_affected(unparseable),
        );
    }

    if filled > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ValueImputed,
                &name,
                format!(
                    "filled {} in {} with median date {}",
                    plural(filled, "missing value", "missing values"),
                    name,
                    median.format("%Y-%m-%d")
                ),
            )
            .with_affected(filled),
        );
    }

    if rewritten > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::DatesStandardized,
                &name,
                format!(
                    "standardized {} in {} to YYYY-MM-DD",
                    plural(rewritten, "date", "dates"),
                    name
                ),
            )
            .with_affected(rewritten),
        );
    }
}

/// Fill absent cells with the fallback label and trim every value.
pub(crate) fn repair_text(column: &mut Column, log: &mut ActionLog) {
    const STAGE: CleaningStage = CleaningStage::TextRepair;
    let name = column.name().to_string();

    let filled = StatisticalImputer::fill_absent(
        column.values_mut(),
        &CellValue::Text(FALLBACK_LABEL.to_string()),
    );
    if filled > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ValueImputed,
                &name,
                format!(
                    "filled {} in {} with '{}'",
                    plural(filled, "missing value", "missing values"),
                    name,
                    FALLBACK_LABEL
                ),
            )
            .with_affected(filled),
        );
    }

    let trimmed = trim_values(column.values_mut());
    if trimmed > 0 {
        record(
            log,
            entry(
                STAGE,
                ActionType::ValueCleaned,
                &name,
                format!("trimmed {} in {}", plural(trimmed, "value", "values"), name),
            )
            .with_affected(trimmed),
        );
    }
}
