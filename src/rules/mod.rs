//! Category rules: an insertion-ordered mapping from category name to the
//! description keywords that select it.
//!
//! Order is part of the contract. The categorizer walks categories in the
//! order they were created and the first match wins, so the persisted JSON
//! keeps that order too.

mod store;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::models::UNCATEGORIZED;

pub(crate) use store::RuleStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryEntry {
    pub(crate) name: String,
    pub(crate) keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryRules {
    entries: Vec<CategoryEntry>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            entries: vec![CategoryEntry {
                name: UNCATEGORIZED.into(),
                keywords: Vec::new(),
            }],
        }
    }
}

impl CategoryRules {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Category names in iteration order, `Uncategorized` included.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub(crate) fn keywords(&self, name: &str) -> Option<&[String]> {
        self.entry(name).map(|e| e.keywords.as_slice())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append `name` with no keywords. Returns false if it already exists or
    /// is blank.
    pub(crate) fn create_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.entries.push(CategoryEntry {
            name: name.to_string(),
            keywords: Vec::new(),
        });
        true
    }

    /// Add `keyword` under `category`, creating the category if needed.
    ///
    /// Keywords are trimmed and compared case-insensitively; the first casing
    /// seen is the one kept. Returns false when nothing changed.
    pub(crate) fn add_keyword(&mut self, category: &str, keyword: &str) -> bool {
        let keyword = keyword.trim();
        let category = category.trim();
        if keyword.is_empty() || category.is_empty() {
            return false;
        }
        self.create_category(category);
        let Some(entry) = self.entries.iter_mut().find(|e| e.name == category) else {
            return false;
        };
        let lower = keyword.to_lowercase();
        if entry.keywords.iter().any(|k| k.to_lowercase() == lower) {
            return false;
        }
        entry.keywords.push(keyword.to_string());
        true
    }

    /// Whether `category` lists `keyword`, ignoring case.
    pub(crate) fn has_keyword(&self, category: &str, keyword: &str) -> bool {
        let lower = keyword.trim().to_lowercase();
        self.keywords(category.trim())
            .is_some_and(|ks| ks.iter().any(|k| k.to_lowercase() == lower))
    }

    /// File `keyword` under `category` and nowhere else.
    ///
    /// The category is created if needed and the keyword is removed from
    /// every other category, compared case-insensitively. A blank keyword
    /// only creates the category. Returns false when nothing changed.
    pub(crate) fn move_keyword(&mut self, category: &str, keyword: &str) -> bool {
        let category = category.trim();
        let keyword = keyword.trim();
        if category.is_empty() {
            return false;
        }
        let mut changed = self.create_category(category);
        if keyword.is_empty() {
            return changed;
        }
        let lower = keyword.to_lowercase();
        for entry in self.entries.iter_mut().filter(|e| e.name != category) {
            let before = entry.keywords.len();
            entry.keywords.retain(|k| k.to_lowercase() != lower);
            changed |= entry.keywords.len() != before;
        }
        self.add_keyword(category, keyword) || changed
    }

    fn entry(&self, name: &str) -> Option<&CategoryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn ensure_uncategorized(&mut self) {
        if !self.contains(UNCATEGORIZED) {
            self.entries.insert(
                0,
                CategoryEntry {
                    name: UNCATEGORIZED.into(),
                    keywords: Vec::new(),
                },
            );
        }
    }
}

impl Serialize for CategoryRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|e| (&e.name, &e.keywords)))
    }
}

impl<'de> Deserialize<'de> for CategoryRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = CategoryRules;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to keyword lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut rules = CategoryRules {
                    entries: Vec::new(),
                };
                while let Some((name, keywords)) = map.next_entry::<String, Vec<String>>()? {
                    rules.create_category(&name);
                    for keyword in &keywords {
                        rules.add_keyword(&name, keyword);
                    }
                }
                rules.ensure_uncategorized();
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}
