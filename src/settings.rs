//! Settings Resolution
//!
//! Turns a document URI into the lint configuration of its project: the
//! project root is resolved once per document, the config file is re-read
//! on every call so edits apply on the next pass.

use std::path::PathBuf;

use tower_lsp::lsp_types::Url;

use crate::config::Config;
use crate::lsp::host::Host;
use crate::project::root::normalize_path_case;
use crate::project::{file_path_from_uri, find_root, RootCache, RootMarker};
use crate::rules::{load_project_config, BaseRules, ProjectConfig};

#[derive(Debug)]
pub struct SettingsResolver {
    cache: RootCache,
    markers: Vec<RootMarker>,
    base: BaseRules,
}

impl SettingsResolver {
    pub fn new(markers: Vec<RootMarker>, base: BaseRules) -> Self {
        Self {
            cache: RootCache::new(),
            markers,
            base,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.root_markers.clone(),
            BaseRules::load(&config.base_rule_files),
        )
    }

    pub fn cache(&self) -> &RootCache {
        &self.cache
    }

    pub fn base_rules(&self) -> &BaseRules {
        &self.base
    }

    /// Project root of a document, resolved on first use and cached.
    ///
    /// `None` when the host knows no workspace folder; that outcome is not
    /// cached so a later folder can still be picked up.
    pub async fn project_root<H: Host + ?Sized>(&self, host: &H, uri: &Url) -> Option<PathBuf> {
        if let Some(root) = self.cache.get(uri.as_str()) {
            return Some(root);
        }

        let workspace_folder = normalize_path_case(host.workspace_folder().await?);
        let file_path = file_path_from_uri(uri);
        let root = find_root(&workspace_folder, file_path.as_deref(), &self.markers);
        log::debug!(
            "Resolved project root {} for {} (workspace {})",
            root.display(),
            uri,
            workspace_folder.display()
        );

        Some(self.cache.get_or_insert(uri.as_str(), &root))
    }

    /// Effective lint configuration for a document
    pub async fn resolve<H: Host + ?Sized>(&self, host: &H, uri: &Url) -> ProjectConfig {
        let root = self.project_root(host, uri).await;
        load_project_config(root.as_deref(), &self.base).await
    }
}
