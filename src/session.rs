//! Presentation-layer search state: current query, page and recent searches.

use crate::engine::{Query, DEFAULT_RECENT_CAPACITY};
use crate::storage::KeyValueStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Storage key the recent-search list lives under
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Suggested topics shown before the user types anything
pub const TRENDING_TOPICS: [&str; 5] = ["DeFi", "NFTs", "Layer 2", "Ethereum", "Smart Contracts"];

/// Bounded, most-recent-first, exact-deduplicated search history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearches {
    entries: Vec<String>,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_RECENT_CAPACITY
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECENT_CAPACITY)
    }
}

impl RecentSearches {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Load from `store`; a missing or unreadable value gives an empty history
    pub fn load(store: &dyn KeyValueStore, capacity: usize) -> Result<Self> {
        let mut recent = Self::with_capacity(capacity);

        if let Some(raw) = store.get(RECENT_SEARCHES_KEY)? {
            match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(entries) => {
                    recent.entries = entries;
                    recent.entries.truncate(capacity);
                }
                Err(err) => {
                    tracing::warn!("Ignoring malformed recent searches: {}", err);
                }
            }
        }

        Ok(recent)
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(RECENT_SEARCHES_KEY, &serde_json::to_string(&self.entries)?)
    }

    /// Put `term` at the front. Blank terms are ignored; an identical earlier
    /// entry is moved rather than duplicated. Returns whether anything changed.
    pub fn record(&mut self, term: &str) -> bool {
        if term.trim().is_empty() || self.capacity == 0 {
            return false;
        }

        self.entries.retain(|existing| existing != term);
        self.entries.insert(0, term.to_string());
        self.entries.truncate(self.capacity);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Caller-owned search session, persisted through a [`KeyValueStore`]
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    pub query: Query,
    pub page: usize,
    pub recent: RecentSearches,
}

impl SearchSession {
    /// Start a session, restoring history from `store`
    pub fn restore(store: &dyn KeyValueStore, capacity: usize) -> Result<Self> {
        Ok(Self {
            query: Query::default(),
            page: 1,
            recent: RecentSearches::load(store, capacity)?,
        })
    }

    /// Replace the query text and reset to the first page
    pub fn set_text(&mut self, text: &str) {
        self.query.text = text.to_string();
        self.page = 1;
    }

    /// Record the current query after a search completed; blank text is skipped
    pub fn commit(&mut self, store: &dyn KeyValueStore) -> Result<()> {
        let text = self.query.text.clone();
        if self.recent.record(&text) {
            self.recent.save(store)?;
        }
        Ok(())
    }

    /// Forget the history, in memory and in `store`
    pub fn clear_history(&mut self, store: &dyn KeyValueStore) -> Result<()> {
        self.recent.clear();
        store.remove(RECENT_SEARCHES_KEY)
    }
}
