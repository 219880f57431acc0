use anyhow::{Context, Result};
use sled::Db;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// Default scope for presentation-layer preferences
pub const PREFERENCES_SCOPE: &str = "preferences";

/// Scoped string key-value storage owned by the caller.
///
/// Stands in for the browser's local storage: the search engine never sees
/// it, only the layer that renders results and remembers user state.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// sled-backed store; each scope is its own tree
pub struct SledStore {
    db: Db,
    scope: String,
}

impl SledStore {
    /// Open or create a store database
    pub fn open<P: AsRef<Path>>(path: P, scope: &str) -> Result<Self> {
        let db = sled::open(path).context("Failed to open preference store")?;
        Ok(Self {
            db,
            scope: scope.to_string(),
        })
    }

    /// Create a temporary database (for testing)
    pub fn in_memory(scope: &str) -> Result<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open().context("Failed to create temporary preference store")?;
        Ok(Self {
            db,
            scope: scope.to_string(),
        })
    }

    /// Another scope over the same database
    pub fn scoped(&self, scope: &str) -> Self {
        Self {
            db: self.db.clone(),
            scope: scope.to_string(),
        }
    }

    fn tree(&self) -> Result<sled::Tree> {
        self.db
            .open_tree(&self.scope)
            .with_context(|| format!("Failed to open scope '{}'", self.scope))
    }

    /// Flush all changes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Drop every key in this scope
    pub fn clear(&self) -> Result<()> {
        self.db.drop_tree(&self.scope)?;
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.tree()?.get(key.as_bytes())? {
            Some(data) => {
                let value = String::from_utf8(data.to_vec())
                    .with_context(|| format!("Value for '{key}' is not UTF-8"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let tree = self.tree()?;
        tree.insert(key.as_bytes(), value.as_bytes())?;
        tree.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.tree()?.remove(key.as_bytes())?;
        Ok(())
    }
}
