use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::TransactionStore;
use crate::error::{LedgerError, Result};
use crate::rules::RuleStore;

/// What a category edit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FeedbackOutcome {
    /// False when the new category matched the old one and nothing happened.
    pub(crate) changed: bool,
    /// Whether the description was new under the chosen category.
    pub(crate) keyword_added: bool,
    /// Other transactions moved to the chosen category.
    pub(crate) propagated: usize,
    /// Other transactions whose update failed.
    pub(crate) failed: usize,
}

/// Move the stored transaction `receipt_no` to `category` and teach the rules
/// its description.
///
/// The rule file is written before any transaction changes; if that write
/// fails nothing else happens. Other stored transactions with exactly the
/// same description follow, one at a time, and a failure on one of them is
/// logged and counted without stopping the rest.
pub(crate) fn recategorize_stored<S: TransactionStore>(
    rules: &mut RuleStore,
    store: &mut S,
    receipt_no: &str,
    category: &str,
) -> Result<FeedbackOutcome> {
    let category = category.trim();
    let txn = store
        .find(receipt_no)?
        .ok_or_else(|| LedgerError::NotFound(receipt_no.to_string()))?;

    if category.is_empty() || txn.category == category {
        debug!("{receipt_no} already in {:?}, nothing to do", txn.category);
        return Ok(FeedbackOutcome::default());
    }

    let keyword_added = learn(rules, category, &txn.description)?;
    store.update_category(receipt_no, category)?;

    let (propagated, failed) = propagate(store, &txn.description, category, Some(receipt_no))?;
    info!(
        "Moved {receipt_no} from {} to {category}, {propagated} similar updated",
        txn.category
    );

    Ok(FeedbackOutcome {
        changed: true,
        keyword_added,
        propagated,
        failed,
    })
}

/// Make sure `category` exists and is the only category holding
/// `description` as a keyword. Returns whether the keyword is new there.
pub(super) fn learn(rules: &mut RuleStore, category: &str, description: &str) -> Result<bool> {
    let added = !description.trim().is_empty() && !rules.rules().has_keyword(category, description);
    rules.move_keyword(category, description)?;
    Ok(added)
}

/// Recategorize every stored transaction described exactly as `description`
/// that is not already in `category`, skipping `edited`. Returns
/// `(propagated, failed)`.
pub(super) fn propagate<S: TransactionStore>(
    store: &mut S,
    description: &str,
    category: &str,
    edited: Option<&str>,
) -> Result<(usize, usize)> {
    let mut targets: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for t in store.all()? {
        if t.description == description
            && t.category != category
            && edited != Some(t.receipt_no.as_str())
            && seen.insert(t.receipt_no.clone())
        {
            targets.push(t.receipt_no);
        }
    }

    let mut propagated = 0;
    let mut failed = 0;
    for receipt_no in &targets {
        match store.update_category(receipt_no, category) {
            Ok(n) => propagated += n,
            Err(e) => {
                warn!("Could not recategorize {receipt_no}: {e}");
                failed += 1;
            }
        }
    }
    Ok((propagated, failed))
}
