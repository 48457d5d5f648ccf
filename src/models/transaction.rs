use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

/// Display format for statement dates.
pub const DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y";
/// Display format for statement times.
pub const TIME_DISPLAY_FORMAT: &str = "%H:%M";

/// A transaction as persisted in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub receipt_no: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn display_date(&self) -> String {
        display_date(self.date)
    }

    pub fn display_time(&self) -> String {
        self.time
            .map(|t| t.format(TIME_DISPLAY_FORMAT).to_string())
            .unwrap_or_default()
    }
}

/// A normalized statement row that has not been ingested yet.
///
/// `category` is `None` until the categorizer runs; that placeholder is
/// distinct from [`super::UNCATEGORIZED`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    /// Zero-based position in the raw table, counted before any rows were dropped.
    pub source_row: usize,
    /// Receipt or transaction ID taken from the statement, if it had one.
    pub receipt_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub amount: Decimal,
    pub category: Option<String>,
}

impl StatementRow {
    /// The deduplication key for this row.
    ///
    /// Falls back to `TXN_{source_row}_{date}` when the statement carries no
    /// ID column. That fallback only identifies a row reliably when the same
    /// file is re-uploaded unchanged.
    pub fn receipt_no(&self) -> String {
        match &self.receipt_id {
            Some(id) => id.clone(),
            None => self.synthesized_receipt_no(),
        }
    }

    pub fn has_explicit_receipt(&self) -> bool {
        self.receipt_id.is_some()
    }

    fn synthesized_receipt_no(&self) -> String {
        format!("TXN_{}_{}", self.source_row, display_date(self.date))
    }

    pub fn into_transaction(self, category: String) -> Transaction {
        Transaction {
            receipt_no: self.receipt_no(),
            date: self.date,
            time: self.time,
            description: self.description,
            amount: self.amount,
            category,
        }
    }
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}
