//! Host Connection
//!
//! The narrow view of the editor the linting pipeline depends on.

use std::path::PathBuf;

use serde_json::Value;
use tower_lsp::lsp_types::{ConfigurationItem, Diagnostic, Url};
use tower_lsp::Client;

/// Configuration section the client answers with its first workspace folder
pub const WORKSPACE_FOLDER_SECTION: &str = "workspaceFolder";

/// Editor-side collaborator used by settings resolution and publishing
#[tower_lsp::async_trait]
pub trait Host: Send + Sync {
    /// Filesystem path of the first workspace folder, if any
    async fn workspace_folder(&self) -> Option<PathBuf>;

    /// Replace every diagnostic previously sent for `uri`
    async fn send_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>);
}

/// `Host` backed by the tower-lsp client
#[derive(Clone)]
pub struct ClientHost {
    client: Client,
    use_configuration: bool,
    fallback_folder: Option<PathBuf>,
}

impl ClientHost {
    /// `use_configuration` asks the client for the `workspaceFolder` section;
    /// `fallback_folder` comes from the initialize handshake.
    pub fn new(client: Client, use_configuration: bool, fallback_folder: Option<PathBuf>) -> Self {
        Self {
            client,
            use_configuration,
            fallback_folder,
        }
    }
}

#[tower_lsp::async_trait]
impl Host for ClientHost {
    async fn workspace_folder(&self) -> Option<PathBuf> {
        if self.use_configuration {
            let item = ConfigurationItem {
                scope_uri: None,
                section: Some(WORKSPACE_FOLDER_SECTION.to_string()),
            };
            match self.client.configuration(vec![item]).await {
                Ok(values) => {
                    if let Some(path) = values
                        .first()
                        .and_then(Value::as_str)
                        .filter(|path| !path.is_empty())
                    {
                        return Some(PathBuf::from(path));
                    }
                }
                Err(e) => log::warn!("workspace/configuration request failed: {}", e),
            }
        }

        self.fallback_folder.clone()
    }

    async fn send_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}
