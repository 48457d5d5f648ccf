mod transaction;

pub use transaction::{StatementRow, Transaction, DATE_DISPLAY_FORMAT, TIME_DISPLAY_FORMAT};

/// Reserved category every transaction falls back to. Never matched against.
pub const UNCATEGORIZED: &str = "Uncategorized";
