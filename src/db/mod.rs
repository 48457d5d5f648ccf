mod schema;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::ledger::TransactionStore;
use crate::models::*;

const DATE_STORAGE_FORMAT: &str = "%Y-%m-%d";

const SELECT_TRANSACTION: &str =
    "SELECT receipt_no, date, time, description, amount, category FROM transactions";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| LedgerError::store(format!("open {}", path.display()), e))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        debug!("Opened transaction database at {}", path.display());
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Create the schema on first open. Only one schema version exists, so an
    /// existing database is used as is.
    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);
        debug!("Existing database at schema version {current}");
        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    /// Stored transactions in insertion order, optionally filtered to those
    /// whose description or receipt number contains `search`.
    pub(crate) fn get_transactions(&self, search: Option<&str>) -> Result<Vec<Transaction>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let mut sql = String::from(SELECT_TRANSACTION);
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(s) = search {
            sql.push_str(" WHERE description LIKE ?1 OR receipt_no LIKE ?1");
            param_values.push(Box::new(format!("%{s}%")));
        }
        sql.push_str(" ORDER BY id");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    // ── Analytics ─────────────────────────────────────────────

    /// Total outflow per category as positive amounts, largest first.
    ///
    /// Summed in decimal rather than SQL so stored text amounts keep their
    /// precision.
    pub(crate) fn get_spending_by_category(&self) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, amount FROM transactions ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let category: String = row.get(0)?;
            let amt_str: String = row.get(1)?;
            Ok((category, Decimal::from_str(&amt_str).unwrap_or_default()))
        })?;

        let mut totals: Vec<(String, Decimal)> = Vec::new();
        for row in rows {
            let (category, amount) = row?;
            if amount >= Decimal::ZERO {
                continue;
            }
            match totals.iter_mut().find(|(name, _)| *name == category) {
                Some((_, total)) => *total += amount.abs(),
                None => totals.push((category, amount.abs())),
            }
        }
        totals.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(totals)
    }
}

impl TransactionStore for Database {
    fn exists(&self, receipt_no: &str, date: Option<NaiveDate>, amount: Decimal) -> Result<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM transactions
             WHERE receipt_no = ?1 AND date IS ?2 AND amount = ?3)",
            params![receipt_no, date_to_sql(date), amount_to_sql(amount)],
            |row| row.get(0),
        )?)
    }

    fn insert(&mut self, txn: &Transaction) -> Result<()> {
        self.conn.execute(
            "INSERT INTO transactions (receipt_no, date, time, description, amount, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                txn.receipt_no,
                date_to_sql(txn.date),
                txn.time.map(|t| t.format(TIME_DISPLAY_FORMAT).to_string()),
                txn.description,
                amount_to_sql(txn.amount),
                txn.category,
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    fn all(&self) -> Result<Vec<Transaction>> {
        self.get_transactions(None)
    }

    fn update_category(&mut self, receipt_no: &str, category: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE transactions SET category = ?1 WHERE receipt_no = ?2",
            params![category, receipt_no],
        )?)
    }

    fn find(&self, receipt_no: &str) -> Result<Option<Transaction>> {
        let sql = format!("{SELECT_TRANSACTION} WHERE receipt_no = ?1 ORDER BY id LIMIT 1");
        let result = self
            .conn
            .query_row(&sql, params![receipt_no], transaction_from_row);
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date: Option<String> = row.get(1)?;
    let time: Option<String> = row.get(2)?;
    let amount_str: String = row.get(4)?;
    Ok(Transaction {
        receipt_no: row.get(0)?,
        date: date.and_then(|d| NaiveDate::parse_from_str(&d, DATE_STORAGE_FORMAT).ok()),
        time: time.and_then(|t| NaiveTime::parse_from_str(&t, TIME_DISPLAY_FORMAT).ok()),
        description: row.get(3)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        category: row.get(5)?,
    })
}

fn date_to_sql(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_STORAGE_FORMAT).to_string())
}

/// Canonical text for an amount, so `250`, `250.0` and `250.00` compare equal.
fn amount_to_sql(amount: Decimal) -> String {
    amount.normalize().to_string()
}
