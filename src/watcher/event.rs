//! Watch event types, options, and per-category debounce state

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::paths::AssetCategory;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Quiet period before a burst of events triggers a rebuild
    pub debounce: Duration,
    /// Run `build:all` once before entering the event loop
    pub initial_build: bool,
}

impl WatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: Duration::from_millis(config.server.debounce_ms),
            initial_build: true,
        }
    }
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    WatchStarted {
        source: String,
    },
    ServerStarted {
        proxy: String,
    },
    FileChanged {
        category: String,
        path: String,
    },
    BuildStarted {
        task: String,
    },
    BuildComplete {
        task: String,
        written: usize,
        removed: usize,
    },
    BuildFailed {
        task: String,
        message: String,
    },
    Reload {
        category: String,
        full: bool,
    },
    Error {
        message: String,
    },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Pending changes for one category.
struct CategoryChanges {
    paths: HashSet<PathBuf>,
    last_change: Instant,
}

/// Per-category debounce state.
///
/// Rapid successive events for a category coalesce into one pending set;
/// the category becomes ready once its quiet period elapses. Categories
/// debounce independently of each other.
#[derive(Default)]
pub struct DebounceState {
    pending: HashMap<AssetCategory, CategoryChanges>,
}

impl DebounceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_change(&mut self, category: AssetCategory, path: PathBuf) {
        let entry = self
            .pending
            .entry(category)
            .or_insert_with(|| CategoryChanges {
                paths: HashSet::new(),
                last_change: Instant::now(),
            });
        entry.paths.insert(path);
        entry.last_change = Instant::now();
    }

    /// Categories whose quiet period has elapsed, in a stable order.
    pub fn ready(&self, debounce: Duration) -> Vec<AssetCategory> {
        AssetCategory::ALL
            .into_iter()
            .filter(|c| {
                self.pending
                    .get(c)
                    .map(|changes| {
                        !changes.paths.is_empty() && changes.last_change.elapsed() >= debounce
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Drain the pending set for a category, sorted for determinism.
    pub fn take(&mut self, category: AssetCategory) -> Vec<PathBuf> {
        match self.pending.remove(&category) {
            Some(changes) => {
                let mut paths: Vec<_> = changes.paths.into_iter().collect();
                paths.sort();
                paths
            }
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
