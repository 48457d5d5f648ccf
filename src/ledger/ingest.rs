use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::TransactionStore;
use crate::error::Result;
use crate::models::{StatementRow, UNCATEGORIZED};
use crate::rules::CategoryRules;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct IngestReport {
    pub(crate) inserted: usize,
    pub(crate) duplicates: usize,
}

/// Insert every row not already stored under the same
/// `(receipt_no, date, amount)` triple.
///
/// Rows are checked one at a time against the growing store, so a repeat
/// inside the batch is skipped too. A row whose category the rules no longer
/// know is stored as `Uncategorized`.
pub(crate) fn ingest<S: TransactionStore>(
    store: &mut S,
    rows: Vec<StatementRow>,
    rules: &CategoryRules,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for row in rows {
        let receipt_no = row.receipt_no();
        if store.exists(&receipt_no, row.date, row.amount)? {
            report.duplicates += 1;
            if !row.has_explicit_receipt() && row.amount == Decimal::ZERO {
                warn!(
                    "Skipped zero-amount row {} as a duplicate of {receipt_no}; \
                     its synthesized ID may collide with an unrelated row",
                    row.source_row + 1
                );
            } else {
                debug!("Skipping duplicate {receipt_no}");
            }
            continue;
        }

        let category = match row.category.as_deref() {
            Some(c) if rules.contains(c) => c.to_string(),
            _ => UNCATEGORIZED.to_string(),
        };
        store.insert(&row.into_transaction(category))?;
        report.inserted += 1;
    }

    info!(
        "Ingested {} new transactions, skipped {} duplicates",
        report.inserted, report.duplicates
    );
    Ok(report)
}
