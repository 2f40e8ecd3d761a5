//! Bounded, case-insensitively deduplicated list of recent searches.

use serde::Serialize;

use crate::{
    error::{PersistenceError, StoreError},
    store::KeyValueStore,
};

/// Store key the history is saved under.
pub const HISTORY_KEY: &str = "weatherSearchHistory";
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Recently searched place names, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryList {
    entries: Vec<String>,
    #[serde(skip)]
    limit: usize,
}

impl Default for HistoryList {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryList {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Build a list from stored entries, dropping later case-insensitive
    /// duplicates and anything past `limit`.
    pub fn from_entries<I, S>(entries: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::with_limit(limit);
        for entry in entries {
            let entry = entry.into();
            if list.entries.len() == limit {
                break;
            }
            if !list.contains(&entry) {
                list.entries.push(entry);
            }
        }
        list
    }

    /// The list after searching for `term`: the trimmed term moves to the
    /// front with its literal casing, replacing any case-insensitive match.
    /// A blank term leaves the list unchanged.
    pub fn record_search(&self, term: &str) -> HistoryList {
        let term = term.trim();
        if term.is_empty() {
            return self.clone();
        }

        let entries = std::iter::once(term.to_string())
            .chain(self.entries.iter().filter(|e| !same_place(e, term)).cloned())
            .take(self.limit)
            .collect();

        HistoryList {
            entries,
            limit: self.limit,
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.entries.iter().any(|e| same_place(e, term))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

fn same_place(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Loads and saves the [`HistoryList`] through a [`KeyValueStore`].
#[derive(Debug)]
pub struct HistoryManager<S> {
    store: S,
    key: String,
    limit: usize,
}

impl<S: KeyValueStore> HistoryManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: HISTORY_KEY.to_string(),
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the saved history. Missing or unreadable data yields an empty list.
    pub fn load(&self) -> HistoryList {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HistoryList::with_limit(self.limit),
            Err(e) => {
                tracing::debug!("Could not read search history: {}", e);
                return HistoryList::with_limit(self.limit);
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(entries) => HistoryList::from_entries(entries, self.limit),
            Err(e) => {
                tracing::debug!("Ignoring malformed search history: {}", e);
                HistoryList::with_limit(self.limit)
            }
        }
    }

    pub fn persist(&self, list: &HistoryList) -> Result<(), PersistenceError> {
        let fail = |source: StoreError| PersistenceError {
            key: self.key.clone(),
            source,
        };

        let json = serde_json::to_string(list).map_err(|e| fail(e.into()))?;
        self.store.set(&self.key, &json).map_err(fail)
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.store
            .remove(&self.key)
            .map_err(|source| PersistenceError {
                key: self.key.clone(),
                source,
            })
    }
}
