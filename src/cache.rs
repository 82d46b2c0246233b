//! TTL-stamped JSON cache of the remote listing.

use crate::error::GistError;
use crate::remote::ListKind;
use crate::types::RawItem;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    /// Unix seconds.
    fetched_at: u64,
    items: Vec<RawItem>,
}

#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Cache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn path(&self, kind: ListKind) -> PathBuf {
        match kind {
            ListKind::Own => self.dir.join("cache.json"),
            ListKind::Starred => self.dir.join("cache-starred.json"),
        }
    }

    /// Returns the cached listing if it exists, parses, and is younger than
    /// the TTL.
    pub fn load(&self, kind: ListKind) -> Option<Vec<RawItem>> {
        let path = self.path(kind);
        let content = fs::read_to_string(&path).ok()?;
        let file: CacheFile = match serde_json::from_str(&content) {
            Ok(f) => f,
            Err(_e) => {
                #[cfg(feature = "logging")]
                tracing::debug!("Ignoring unreadable cache {}: {}", path.display(), _e);
                return None;
            }
        };
        let age = now_secs().saturating_sub(file.fetched_at);
        if age >= self.ttl.as_secs() {
            #[cfg(feature = "logging")]
            tracing::debug!("Cache {} is stale ({}s old)", path.display(), age);
            return None;
        }
        #[cfg(feature = "logging")]
        tracing::debug!("Using cache {} ({} items)", path.display(), file.items.len());
        Some(file.items)
    }

    pub fn store(&self, kind: ListKind, items: &[RawItem]) -> Result<(), GistError> {
        fs::create_dir_all(&self.dir).map_err(|e| GistError::io(&self.dir, e))?;
        let file = CacheFile {
            fetched_at: now_secs(),
            items: items.to_vec(),
        };
        let path = self.path(kind);
        write_json(&path, &file)
    }

    /// Stores the listing, logging instead of failing. Returns whether the
    /// cache was written.
    pub fn store_or_warn(&self, kind: ListKind, items: &[RawItem]) -> bool {
        match self.store(kind, items) {
            Ok(()) => true,
            Err(_e) => {
                #[cfg(feature = "logging")]
                tracing::warn!("Could not write cache {}: {}", self.path(kind).display(), _e);
                false
            }
        }
    }

    pub fn clear(&self, kind: ListKind) -> Result<(), GistError> {
        let path = self.path(kind);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(GistError::io(&path, e)),
            _ => Ok(()),
        }
    }
}

fn write_json(path: &Path, file: &CacheFile) -> Result<(), GistError> {
    let content = serde_json::to_string(file)?;
    fs::write(path, content).map_err(|e| GistError::io(path, e))
}
