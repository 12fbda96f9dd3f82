use std::path::PathBuf;

use tower_lsp::lsp_types::*;

use crate::lsp::backend::Backend;
use crate::lsp::diagnostics::{lint_document, LintOptions};
use crate::lsp::host::ClientHost;
use crate::rules::CONFIG_FILE_NAME;
use crate::watcher::{ConfigWatcher, WatcherEvent};

const CONFIG_FILES_REGISTRATION_ID: &str = "code-check/config-files";
const CONFIGURATION_REGISTRATION_ID: &str = "code-check/configuration";

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    fn host(&self) -> ClientHost;
    fn lint_options(&self) -> LintOptions;
    async fn publish_diagnostics(&self, uri: Url);
    async fn revalidate_open_documents(&self);
    async fn clear_diagnostics(&self, uri: Url);
}

/// Trait for handling workspace-level notifications and registrations
#[tower_lsp::async_trait]
pub trait HandleWorkspace {
    async fn register_capabilities(&self);
    async fn watch_config_files(&self);
    async fn handle_watched_files(&self, params: DidChangeWatchedFilesParams);
    async fn handle_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams);
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    fn host(&self) -> ClientHost {
        ClientHost::new(
            self.client.clone(),
            self.flags().configuration,
            self.fallback_workspace_folder(),
        )
    }

    fn lint_options(&self) -> LintOptions {
        LintOptions {
            max_problems: self.config.max_problems,
            related_information: self.flags().related_information,
        }
    }

    /// Publish diagnostics for a document
    async fn publish_diagnostics(&self, uri: Url) {
        let content = {
            let docs = self.documents.lock().await;
            match docs.get(&uri) {
                Some(content) => content.clone(),
                None => return,
            }
        };

        lint_document(
            &self.host(),
            &self.resolver,
            &uri,
            &content,
            self.lint_options(),
        )
        .await;
    }

    /// Re-run validation for every open document, e.g. after a config edit
    async fn revalidate_open_documents(&self) {
        let uris: Vec<Url> = self.documents.lock().await.keys().cloned().collect();
        log::debug!("Revalidating {} open document(s)", uris.len());

        for uri in uris {
            self.publish_diagnostics(uri).await;
        }
    }

    async fn clear_diagnostics(&self, uri: Url) {
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}

#[tower_lsp::async_trait]
impl HandleWorkspace for Backend {
    /// Dynamic registrations for configuration pushes and config file events
    async fn register_capabilities(&self) {
        let flags = self.flags();
        let mut registrations = Vec::new();

        if flags.configuration {
            registrations.push(Registration {
                id: CONFIGURATION_REGISTRATION_ID.to_string(),
                method: "workspace/didChangeConfiguration".to_string(),
                register_options: None,
            });
        }

        if flags.watched_files_registration {
            let options = DidChangeWatchedFilesRegistrationOptions {
                watchers: vec![FileSystemWatcher {
                    glob_pattern: GlobPattern::String(format!("**/{}", CONFIG_FILE_NAME)),
                    kind: None,
                }],
            };
            registrations.push(Registration {
                id: CONFIG_FILES_REGISTRATION_ID.to_string(),
                method: "workspace/didChangeWatchedFiles".to_string(),
                register_options: serde_json::to_value(options).ok(),
            });
        }

        if registrations.is_empty() {
            return;
        }

        if let Err(e) = self.client.register_capability(registrations).await {
            log::warn!("Capability registration failed: {}", e);
        }
    }

    /// Watch config files ourselves when the client cannot do it for us
    async fn watch_config_files(&self) {
        if self.flags().watched_files_registration {
            return;
        }

        let Some(folder) = self.fallback_workspace_folder() else {
            log::debug!("No workspace folder to watch for config changes");
            return;
        };

        let (watcher, mut rx) = match ConfigWatcher::start(&folder) {
            Ok(started) => started,
            Err(e) => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Config file watching disabled: {:#}", e),
                    )
                    .await;
                return;
            }
        };
        *self.watcher.lock().await = Some(watcher);

        let backend = self.clone();
        tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                // Coalesce the burst of events a single save produces
                let mut events = vec![first];
                while let Ok(next) = rx.try_recv() {
                    events.push(next);
                }

                let mut config_changed = false;
                for event in events {
                    match event {
                        WatcherEvent::ConfigFileChanged(path) => {
                            log::info!("Config file changed: {}", path.display());
                            config_changed = true;
                        }
                        WatcherEvent::DirectoryCreated(dir) => {
                            if let Some(watcher) = backend.watcher.lock().await.as_mut() {
                                if let Err(e) = watcher.watch_tree(&dir) {
                                    log::debug!("Not watching {}: {:#}", dir.display(), e);
                                }
                            }
                            config_changed |= dir.join(CONFIG_FILE_NAME).is_file();
                        }
                        WatcherEvent::WatcherError(e) => {
                            backend
                                .client
                                .log_message(
                                    MessageType::ERROR,
                                    format!("Config file watcher error: {}", e),
                                )
                                .await;
                        }
                    }
                }

                if config_changed {
                    backend.revalidate_open_documents().await;
                }
            }
        });
    }

    async fn handle_watched_files(&self, params: DidChangeWatchedFilesParams) {
        if touches_config_file(&params.changes) {
            self.revalidate_open_documents().await;
        }
    }

    async fn handle_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        self.client
            .log_message(MessageType::LOG, "Workspace folder change event received.")
            .await;

        let current = self.fallback_workspace_folder();
        let next = next_workspace_folder(current.clone(), &params.event);
        if next != current {
            log::info!("Fallback workspace folder is now {:?}", next);
            self.set_fallback_workspace_folder(next);
        }
    }
}

/// Whether any watched-file event concerns a project config file
pub fn touches_config_file(changes: &[FileEvent]) -> bool {
    changes.iter().any(|change| {
        change
            .uri
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .is_some_and(|name| name == CONFIG_FILE_NAME)
    })
}

/// The fallback folder after a workspace folder change: kept unless it was
/// removed or unset, in which case the first added folder takes over
pub fn next_workspace_folder(
    current: Option<PathBuf>,
    event: &WorkspaceFoldersChangeEvent,
) -> Option<PathBuf> {
    let removed = current.as_ref().is_some_and(|folder| {
        event
            .removed
            .iter()
            .any(|f| f.uri.to_file_path().ok().as_ref() == Some(folder))
    });

    if current.is_some() && !removed {
        return current;
    }

    event
        .added
        .first()
        .and_then(|f| f.uri.to_file_path().ok())
}
