use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::categorize::MatchPolicy;

const DATA_DIR_ENV: &str = "PESATRACK_DATA_DIR";
const MATCH_POLICY_ENV: &str = "PESATRACK_MATCH_POLICY";
const CONFIG_FILE: &str = "config.json";

/// Where PesaTrack keeps its files and how it matches keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) database_path: PathBuf,
    pub(crate) rules_path: PathBuf,
    pub(crate) match_policy: MatchPolicy,
}

/// Optional `config.json` in the data directory. Every field may be omitted.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    match_policy: MatchPolicy,
    database_file: String,
    rules_file: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::default(),
            database_file: "transactions.db".into(),
            rules_file: "categories.json".into(),
        }
    }
}

impl Config {
    /// Resolve from the environment and the platform data directory, creating
    /// the directory if needed.
    pub(crate) fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        let policy = std::env::var(MATCH_POLICY_ENV).ok();
        Ok(Self::resolve(data_dir, policy.as_deref()))
    }

    /// Build a config rooted at `data_dir`. `policy_override` wins over the
    /// config file when it names a known policy.
    pub(crate) fn resolve(data_dir: PathBuf, policy_override: Option<&str>) -> Self {
        let file = read_config_file(&data_dir.join(CONFIG_FILE));

        let mut match_policy = file.match_policy;
        if let Some(raw) = policy_override {
            match MatchPolicy::parse(raw) {
                Some(p) => match_policy = p,
                None => warn!("Ignoring unknown {MATCH_POLICY_ENV} value {raw:?}"),
            }
        }

        Self {
            database_path: data_dir.join(&file.database_file),
            rules_path: data_dir.join(&file.rules_file),
            data_dir,
            match_policy,
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "pesatrack", "PesaTrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

fn read_config_file(path: &Path) -> ConfigFile {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            debug!("No config file at {}, using defaults", path.display());
            return ConfigFile::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(file) => file,
        Err(e) => {
            warn!("Ignoring unreadable config {}: {e}", path.display());
            ConfigFile::default()
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
