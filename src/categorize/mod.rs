use serde::{Deserialize, Serialize};

use crate::models::{StatementRow, UNCATEGORIZED};
use crate::rules::CategoryRules;

/// How a category keyword is compared with a transaction description.
/// Both sides are trimmed and lowercased first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MatchPolicy {
    /// The keyword appears anywhere in the description.
    #[default]
    Substring,
    /// The keyword is the whole description.
    Exact,
}

impl MatchPolicy {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "substring" | "contains" => Some(Self::Substring),
            "exact" => Some(Self::Exact),
            _ => None,
        }
    }

    fn matches(self, description: &str, keyword: &str) -> bool {
        match self {
            Self::Substring => description.contains(keyword),
            Self::Exact => description == keyword,
        }
    }
}

/// Keyword rules compiled for matching. Categories are tried in rule-store
/// order and the first one with a matching keyword wins.
pub(crate) struct Categorizer {
    rules: Vec<CompiledCategory>,
    policy: MatchPolicy,
}

struct CompiledCategory {
    name: String,
    keywords: Vec<String>,
}

impl Categorizer {
    pub(crate) fn new(rules: &CategoryRules, policy: MatchPolicy) -> Self {
        let compiled = rules
            .iter()
            .filter(|entry| entry.name != UNCATEGORIZED)
            .map(|entry| CompiledCategory {
                name: entry.name.clone(),
                keywords: entry
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .filter(|c| !c.keywords.is_empty())
            .collect();

        Self {
            rules: compiled,
            policy,
        }
    }

    pub(crate) fn categorize(&self, description: &str) -> &str {
        let desc_lower = description.trim().to_lowercase();

        for rule in &self.rules {
            if rule
                .keywords
                .iter()
                .any(|k| self.policy.matches(&desc_lower, k))
            {
                return &rule.name;
            }
        }

        UNCATEGORIZED
    }

    /// Assign a category to every row, replacing whatever it held.
    pub(crate) fn categorize_batch(&self, rows: &mut [StatementRow]) {
        for row in rows.iter_mut() {
            row.category = Some(self.categorize(&row.description).to_string());
        }
    }
}
