mod cli;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::db::Database;
use crate::rules::RuleStore;

pub(crate) use cli::{as_cli, print_usage};

/// The stores a command works against, opened once per process.
pub(crate) struct Session {
    pub(crate) config: Config,
    pub(crate) db: Database,
    pub(crate) rules: RuleStore,
}

impl Session {
    pub(crate) fn open(config: Config) -> Result<Self> {
        debug!(
            "Data directory {} (match policy {:?})",
            config.data_dir.display(),
            config.match_policy
        );
        let db = Database::open(&config.database_path).with_context(|| {
            format!("Failed to open database: {}", config.database_path.display())
        })?;
        let rules = RuleStore::load(&config.rules_path);
        Ok(Self { config, db, rules })
    }
}
