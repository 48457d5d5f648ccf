use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::CategoryRules;
use crate::error::{LedgerError, Result};

/// Category rules bound to the JSON file they persist to.
///
/// Every successful mutation is written through before returning. If the
/// write fails the in-memory rules are rolled back, so memory and disk never
/// disagree.
#[derive(Debug)]
pub(crate) struct RuleStore {
    path: PathBuf,
    rules: CategoryRules,
}

impl RuleStore {
    /// Load rules from `path`. Never fails: a missing or unreadable file
    /// yields the default `{"Uncategorized": []}` mapping.
    pub(crate) fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let rules = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<CategoryRules>(&content) {
                Ok(rules) => rules,
                Err(e) => {
                    warn!("Ignoring corrupt category file {}: {e}", path.display());
                    CategoryRules::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No category file at {}, starting fresh", path.display());
                CategoryRules::default()
            }
            Err(e) => {
                warn!("Could not read category file {}: {e}", path.display());
                CategoryRules::default()
            }
        };
        Self { path, rules }
    }

    pub(crate) fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file with the full current mapping.
    pub(crate) fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| LedgerError::store(format!("create {}", dir.display()), e))?;
        }
        let json = serde_json::to_string_pretty(&self.rules)
            .map_err(|e| LedgerError::store("serialize category rules", e))?;
        std::fs::write(&self.path, format!("{json}\n"))
            .map_err(|e| LedgerError::store(format!("write {}", self.path.display()), e))?;
        debug!(
            "Saved {} categories to {}",
            self.rules.len(),
            self.path.display()
        );
        Ok(())
    }

    pub(crate) fn create_category(&mut self, name: &str) -> Result<bool> {
        self.mutate(|rules| rules.create_category(name))
    }

    pub(crate) fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool> {
        self.mutate(|rules| rules.add_keyword(category, keyword))
    }

    pub(crate) fn move_keyword(&mut self, category: &str, keyword: &str) -> Result<bool> {
        self.mutate(|rules| rules.move_keyword(category, keyword))
    }

    fn mutate(&mut self, change: impl FnOnce(&mut CategoryRules) -> bool) -> Result<bool> {
        let previous = self.rules.clone();
        if !change(&mut self.rules) {
            return Ok(false);
        }
        if let Err(e) = self.save() {
            self.rules = previous;
            return Err(e);
        }
        Ok(true)
    }
}
