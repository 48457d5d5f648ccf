use chrono::{NaiveDate, NaiveTime, Timelike};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::columns::{Column, ColumnMap};
use super::RawTable;
use crate::error::{LedgerError, Result};
use crate::models::StatementRow;

/// Descriptions containing this phrase are statement artifacts, not spending.
pub(crate) const OVERDRAFT_MARKER: &str = "OverDraft of Credit Party";

/// Numeric dates: day, month and year in some order, separated by `/`, `-` or `.`.
static NUMERIC_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,4})[/.-]([0-9]{1,2})[/.-]([0-9]{1,4})$").ok());

const NAMED_MONTH_FORMATS: &[&str] = &["%d %b %Y", "%d-%b-%Y", "%d %B %Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// A value that could not be read. The row is kept with the field left empty
/// (or zero, for amounts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseWarning {
    /// Zero-based row in the raw table.
    pub(crate) row: usize,
    pub(crate) column: Column,
    pub(crate) value: String,
    pub(crate) reason: &'static str,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {}: {} '{}': {}",
            self.row + 1,
            self.column,
            self.value,
            self.reason
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct Normalized {
    pub(crate) rows: Vec<StatementRow>,
    pub(crate) warnings: Vec<ParseWarning>,
    /// Rows removed because they carried [`OVERDRAFT_MARKER`].
    pub(crate) overdraft_dropped: usize,
    pub(crate) blank_skipped: usize,
}

/// One optional step of the normalization pipeline.
///
/// A step runs only when the statement has at least one of the columns it
/// requires and no step that supersedes it is already planned. A missing
/// column skips the step; it never fails the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transform {
    /// Split a combined "date time" column into date and time.
    SplitCompletionTime,
    /// Read date and, if present, time from their own columns.
    SeparateDateTime,
    /// Merge paid-in and withdrawn columns into one signed amount.
    MergePaidInWithdrawn,
    /// Read an already-signed amount column.
    SignedAmount,
    /// Use the statement's own receipt or transaction ID.
    ExplicitReceipt,
}

impl Transform {
    const PIPELINE: [Transform; 5] = [
        Transform::SplitCompletionTime,
        Transform::SeparateDateTime,
        Transform::MergePaidInWithdrawn,
        Transform::SignedAmount,
        Transform::ExplicitReceipt,
    ];

    /// Any one of these columns enables the step.
    pub(crate) fn requires(self) -> &'static [Column] {
        match self {
            Self::SplitCompletionTime => &[Column::CompletionTime],
            Self::SeparateDateTime => &[Column::Date],
            Self::MergePaidInWithdrawn => &[Column::PaidIn, Column::Withdrawn],
            Self::SignedAmount => &[Column::Amount],
            Self::ExplicitReceipt => &[Column::ReceiptId],
        }
    }

    fn superseded_by(self) -> Option<Transform> {
        match self {
            Self::SeparateDateTime => Some(Self::SplitCompletionTime),
            Self::SignedAmount => Some(Self::MergePaidInWithdrawn),
            _ => None,
        }
    }

    /// The steps that apply to a statement with these columns, in order.
    pub(crate) fn plan(columns: &ColumnMap) -> Vec<Transform> {
        let mut planned = Vec::new();
        for step in Self::PIPELINE {
            let available = step.requires().iter().any(|c| columns.has(*c));
            let superseded = step.superseded_by().is_some_and(|s| planned.contains(&s));
            if available && !superseded {
                planned.push(step);
            }
        }
        planned
    }

    fn apply(self, row: &RowContext<'_>, draft: &mut Draft, warnings: &mut Vec<ParseWarning>) {
        match self {
            Self::SplitCompletionTime => {
                let raw = row.cell(Column::CompletionTime).unwrap_or("");
                let (date_part, time_part) = split_timestamp(raw);
                draft.date = row.date(Column::CompletionTime, date_part, warnings);
                draft.time = row.time(Column::CompletionTime, time_part, warnings);
            }
            Self::SeparateDateTime => {
                let raw = row.cell(Column::Date).unwrap_or("");
                let (date_part, time_part) = split_timestamp(raw);
                draft.date = row.date(Column::Date, date_part, warnings);
                draft.time = match row.cell(Column::Time) {
                    Some(t) => row.time(Column::Time, t, warnings),
                    None => row.time(Column::Date, time_part, warnings),
                };
            }
            Self::MergePaidInWithdrawn => {
                let paid_in = row.amount(Column::PaidIn, warnings);
                let withdrawn = row.amount(Column::Withdrawn, warnings);
                if paid_in > Decimal::ZERO && withdrawn > Decimal::ZERO {
                    warnings.push(row.warning(
                        Column::Withdrawn,
                        withdrawn.to_string(),
                        "both paid in and withdrawn are set; using withdrawn",
                    ));
                }
                draft.amount = merge_amounts(paid_in, withdrawn);
            }
            Self::SignedAmount => {
                draft.amount = row.amount(Column::Amount, warnings);
            }
            Self::ExplicitReceipt => {
                draft.receipt_id = row
                    .cell(Column::ReceiptId)
                    .filter(|s| !s.is_empty())
                    .map(String::from);
            }
        }
    }
}

/// Turns raw statement tables into canonical rows.
pub(crate) struct Normalizer;

impl Normalizer {
    /// Fails only when the table has no description column. Bad values in
    /// individual rows become [`ParseWarning`]s.
    pub(crate) fn normalize(table: &RawTable) -> Result<Normalized> {
        let columns = ColumnMap::detect(&table.headers);
        let Some(description_col) = columns.get(Column::Description) else {
            return Err(LedgerError::Format(format!(
                "no description column among headers [{}]",
                table.headers.join(", ")
            )));
        };
        let plan = Transform::plan(&columns);
        debug!("Normalizing {} rows with {:?}", table.rows.len(), plan);

        let mut out = Normalized::default();
        for (i, cells) in table.rows.iter().enumerate() {
            if cells.iter().all(|c| c.trim().is_empty()) {
                out.blank_skipped += 1;
                continue;
            }

            let description = cells
                .get(description_col)
                .map(|s| s.trim())
                .unwrap_or_default();
            if description.contains(OVERDRAFT_MARKER) {
                out.overdraft_dropped += 1;
                continue;
            }

            let row = RowContext {
                index: i,
                cells,
                columns: &columns,
            };
            let mut draft = Draft::default();
            for step in &plan {
                step.apply(&row, &mut draft, &mut out.warnings);
            }

            out.rows.push(StatementRow {
                source_row: i,
                receipt_id: draft.receipt_id,
                date: draft.date,
                time: draft.time,
                description: description.to_string(),
                amount: draft.amount,
                category: None,
            });
        }

        for w in &out.warnings {
            warn!("{w}");
        }
        info!(
            "Normalized {} rows ({} overdraft entries dropped, {} warnings)",
            out.rows.len(),
            out.overdraft_dropped,
            out.warnings.len()
        );
        Ok(out)
    }
}

#[derive(Debug, Default)]
struct Draft {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    amount: Decimal,
    receipt_id: Option<String>,
}

struct RowContext<'a> {
    index: usize,
    cells: &'a [String],
    columns: &'a ColumnMap,
}

impl RowContext<'_> {
    fn cell(&self, column: Column) -> Option<&str> {
        self.columns
            .get(column)
            .map(|i| self.cells.get(i).map(|s| s.trim()).unwrap_or(""))
    }

    fn warning(&self, column: Column, value: String, reason: &'static str) -> ParseWarning {
        ParseWarning {
            row: self.index,
            column,
            value,
            reason,
        }
    }

    fn date(
        &self,
        column: Column,
        raw: &str,
        warnings: &mut Vec<ParseWarning>,
    ) -> Option<NaiveDate> {
        if raw.is_empty() {
            return None;
        }
        let parsed = parse_date_day_first(raw);
        if parsed.is_none() {
            warnings.push(self.warning(column, raw.to_string(), "unrecognized date"));
        }
        parsed
    }

    fn time(
        &self,
        column: Column,
        raw: &str,
        warnings: &mut Vec<ParseWarning>,
    ) -> Option<NaiveTime> {
        if raw.is_empty() {
            return None;
        }
        let parsed = parse_time(raw);
        if parsed.is_none() {
            warnings.push(self.warning(column, raw.to_string(), "unrecognized time"));
        }
        parsed
    }

    /// Absent column and empty cell both read as zero.
    fn amount(&self, column: Column, warnings: &mut Vec<ParseWarning>) -> Decimal {
        let raw = self.cell(column).unwrap_or("");
        match parse_amount(raw) {
            Some(v) => v,
            None => {
                warnings.push(self.warning(column, raw.to_string(), "not a number"));
                Decimal::ZERO
            }
        }
    }
}

/// A positive `paid_in` is the inflow unless a positive `withdrawn` sits on
/// the same row, in which case the withdrawal wins. Without a positive
/// `paid_in`, any non-zero withdrawal is an outflow of its magnitude, so
/// statements that print withdrawals as negative numbers read the same.
pub(crate) fn merge_amounts(paid_in: Decimal, withdrawn: Decimal) -> Decimal {
    if paid_in > Decimal::ZERO {
        if withdrawn > Decimal::ZERO {
            -withdrawn
        } else {
            paid_in
        }
    } else if !withdrawn.is_zero() {
        -withdrawn.abs()
    } else {
        Decimal::ZERO
    }
}

fn split_timestamp(raw: &str) -> (&str, &str) {
    match raw.trim().split_once(' ') {
        Some((date, time)) => (date.trim(), time.trim()),
        None => (raw.trim(), ""),
    }
}

/// Parse a date, reading day before month whenever both readings are
/// possible. Four-digit leading fields are read as year-month-day.
pub(crate) fn parse_date_day_first(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(caps) = NUMERIC_DATE.as_ref().and_then(|re| re.captures(raw)) {
        let first = &caps[1];
        let second: u32 = caps[2].parse().ok()?;
        let third = &caps[3];
        if first.len() == 4 {
            let year: i32 = first.parse().ok()?;
            return NaiveDate::from_ymd_opt(year, second, third.parse().ok()?);
        }
        let first: u32 = first.parse().ok()?;
        let year = expand_year(third)?;
        return NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second));
    }
    NAMED_MONTH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    match raw.len() {
        4 => Some(year),
        1 | 2 if year < 70 => Some(2000 + year),
        1 | 2 => Some(1900 + year),
        _ => None,
    }
}

/// Parse a time of day, truncated to the minute.
pub(crate) fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .and_then(|t| NaiveTime::from_hms_opt(t.hour(), t.minute(), 0))
}

/// Parse a statement amount. Thousands separators are ignored and an empty
/// cell is zero; anything else unparseable is `None`.
pub(crate) fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(cleaned).ok()
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
