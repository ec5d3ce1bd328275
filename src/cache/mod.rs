//! Raw response cache.
//!
//! Every upstream call is persisted verbatim as a JSON array under
//! `<root>/<domain>/<lang>/<key>.json`, so later stages can be replayed
//! without touching the network.

use log::debug;
use std::fs;
use std::path::PathBuf;

use crate::api::types::RawItem;
use crate::error::{Result, TourError};

pub mod key;

pub use key::RawKey;

#[derive(Debug, Clone)]
pub struct RawCache {
    root: PathBuf,
}

impl RawCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, key: &RawKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    /// Persist items for a key, overwriting any earlier copy
    pub fn save(&self, key: &RawKey, items: &[RawItem]) -> Result<PathBuf> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(items)?)?;
        debug!("Saved {} raw items to {}", items.len(), path.display());
        Ok(path)
    }

    /// Load items for a key; `None` when nothing was persisted
    pub fn load(&self, key: &RawKey) -> Result<Option<Vec<RawItem>>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let items = serde_json::from_str(&contents).map_err(|e| {
            TourError::Parse(format!("Corrupt raw cache file {}: {}", path.display(), e))
        })?;
        Ok(Some(items))
    }

    /// Load items that an earlier stage must have produced
    pub fn require(&self, key: &RawKey) -> Result<Vec<RawItem>> {
        self.load(key)?
            .ok_or_else(|| TourError::MissingOutput(self.path(key)))
    }
}
