use tracing::debug;

use super::feedback::{learn, propagate};
use super::{ingest, FeedbackOutcome, IngestReport, TransactionStore};
use crate::error::{LedgerError, Result};
use crate::models::{StatementRow, UNCATEGORIZED};
use crate::rules::RuleStore;

/// A normalized, categorized upload waiting to be saved.
///
/// Category edits made here teach the rules and reach stored transactions
/// right away, even though the batch itself is only written by `commit`.
#[derive(Debug, Default)]
pub(crate) struct ReviewBatch {
    rows: Vec<StatementRow>,
}

impl ReviewBatch {
    pub(crate) fn new(rows: Vec<StatementRow>) -> Self {
        Self { rows }
    }

    pub(crate) fn rows(&self) -> &[StatementRow] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Set row `index` to `category`.
    ///
    /// Other rows in the batch with the same description follow along, as do
    /// stored transactions; `propagated` counts both.
    pub(crate) fn assign<S: TransactionStore>(
        &mut self,
        index: usize,
        category: &str,
        rules: &mut RuleStore,
        store: &mut S,
    ) -> Result<FeedbackOutcome> {
        let category = category.trim();
        let row = self.rows.get(index).ok_or(LedgerError::NoSuchRow(index))?;
        let current = row.category.as_deref().unwrap_or(UNCATEGORIZED);
        if category.is_empty() || current == category {
            return Ok(FeedbackOutcome::default());
        }
        let description = row.description.clone();

        let keyword_added = learn(rules, category, &description)?;

        let mut siblings = 0;
        for (i, r) in self.rows.iter_mut().enumerate() {
            if r.description != description || r.category.as_deref() == Some(category) {
                continue;
            }
            r.category = Some(category.to_string());
            if i != index {
                siblings += 1;
            }
        }
        debug!("Assigned {category} to review row {index} and {siblings} others");

        let (stored, failed) = propagate(store, &description, category, None)?;

        Ok(FeedbackOutcome {
            changed: true,
            keyword_added,
            propagated: siblings + stored,
            failed,
        })
    }

    /// Save the batch, skipping rows already stored.
    pub(crate) fn commit<S: TransactionStore>(
        self,
        store: &mut S,
        rules: &RuleStore,
    ) -> Result<IngestReport> {
        ingest(store, self.rows, rules.rules())
    }
}
