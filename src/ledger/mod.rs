//! The stored ledger: deduplicating ingest and the category feedback loop.

mod feedback;
mod ingest;
mod review;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::Transaction;

pub(crate) use feedback::{recategorize_stored, FeedbackOutcome};
pub(crate) use ingest::{ingest, IngestReport};
pub(crate) use review::ReviewBatch;

/// Durable set of ingested transactions.
///
/// Records are only ever inserted or recategorized. `all` returns them in
/// insertion order.
pub(crate) trait TransactionStore {
    /// Whether a record with this deduplication triple is already stored.
    fn exists(&self, receipt_no: &str, date: Option<NaiveDate>, amount: Decimal) -> Result<bool>;

    fn insert(&mut self, txn: &Transaction) -> Result<()>;

    fn all(&self) -> Result<Vec<Transaction>>;

    /// Set the category of every record carrying `receipt_no`. Returns the
    /// number of records touched.
    fn update_category(&mut self, receipt_no: &str, category: &str) -> Result<usize>;

    fn find(&self, receipt_no: &str) -> Result<Option<Transaction>> {
        Ok(self.all()?.into_iter().find(|t| t.receipt_no == receipt_no))
    }
}
