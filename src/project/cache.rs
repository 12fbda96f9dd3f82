//! Project Root Cache
//!
//! Maps document URIs to their resolved project root. Entries are write-once
//! and live for the whole session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct RootCache {
    roots: RwLock<HashMap<String, PathBuf>>,
}

impl RootCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uri: &str) -> Option<PathBuf> {
        match self.roots.read() {
            Ok(roots) => roots.get(uri).cloned(),
            Err(e) => {
                log::error!("Root cache lock poisoned: {}", e);
                None
            }
        }
    }

    /// Insert a root unless one is already cached, returning the cached value
    pub fn get_or_insert(&self, uri: &str, root: &Path) -> PathBuf {
        match self.roots.write() {
            Ok(mut roots) => roots
                .entry(uri.to_string())
                .or_insert_with(|| root.to_path_buf())
                .clone(),
            Err(e) => {
                log::error!("Root cache lock poisoned: {}", e);
                root.to_path_buf()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.roots.read().map(|roots| roots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
