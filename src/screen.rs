//! Loads the listing, renders it and lets the user pick rows.

use crate::cache::Cache;
use crate::convert::convert_items;
use crate::error::GistError;
use crate::options::Config;
use crate::remote::{ListKind, RemoteClient};
use crate::selector::Selector;
use crate::types::{Items, RawItem, Row};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Screen {
    items: Items,
    lines: Vec<String>,
    rows: Vec<Row>,
    selector: Selector,
}

/// Raw listing from the cache when allowed and fresh, otherwise from the
/// remote (refreshing the cache).
pub fn load_raw(config: &Config) -> Result<Vec<RawItem>, GistError> {
    let kind = if config.flag.starred {
        ListKind::Starred
    } else {
        ListKind::Own
    };
    let cache_dir = config
        .core
        .tomlfile
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(crate::options::default_dir);
    let cache = Cache::new(cache_dir, Duration::from_secs(config.gist.cache_ttl));
    if config.gist.use_cache && !config.flag.refresh {
        if let Some(items) = cache.load(kind) {
            return Ok(items);
        }
    }
    let client = RemoteClient::from_config(&config.gist, &config.core.user)?;
    let items = client.list_items(kind)?;
    if config.gist.use_cache {
        cache.store_or_warn(kind, &items);
    }
    Ok(items)
}

impl Screen {
    pub fn open(config: &Config) -> Result<Self, GistError> {
        let settings = config.settings()?;
        let items = convert_items(load_raw(config)?, &settings)?.unique();
        Ok(Self::from_items(
            items,
            &config.screen.columns,
            Selector::parse(&config.core.selectcmd),
        ))
    }

    pub fn from_items(items: Items, columns: &[String], selector: Selector) -> Self {
        let lines = items.render(columns);
        let rows = items.rows();
        if has_duplicates(&lines) {
            #[cfg(feature = "logging")]
            tracing::warn!("Some listing lines are identical; picking one selects its first row");
        }
        Self {
            items,
            lines,
            rows,
            selector,
        }
    }

    pub fn items(&self) -> &Items {
        &self.items
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Runs the selector. Fails with [`GistError::NoSelection`] when nothing
    /// was picked or there was nothing to show.
    pub fn select(&self) -> Result<Vec<Row>, GistError> {
        let picked = self.selector.select(&self.lines)?;
        Ok(picked
            .into_iter()
            .filter_map(|i| self.rows.get(i).cloned())
            .collect())
    }
}

fn has_duplicates(lines: &[String]) -> bool {
    let mut seen = HashSet::with_capacity(lines.len());
    !lines.iter().all(|line| seen.insert(line.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_repeated_lines() {
        let lines = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(!has_duplicates(&lines(&["a", "b"])));
        assert!(has_duplicates(&lines(&["a", "b", "a"])));
        assert!(!has_duplicates(&[]));
    }
}
