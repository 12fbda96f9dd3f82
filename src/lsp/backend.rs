use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::lsp::handlers::{HandleDiagnostics, HandleWorkspace};
use crate::settings::SettingsResolver;
use crate::watcher::ConfigWatcher;
use crate::Config;

/// Client capabilities that change server behavior, captured at initialize
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientFlags {
    /// Client answers `workspace/configuration`
    pub configuration: bool,
    pub workspace_folders: bool,
    /// Client accepts `relatedInformation` on diagnostics
    pub related_information: bool,
    /// Client accepts dynamic `workspace/didChangeWatchedFiles` registration
    pub watched_files_registration: bool,
}

impl ClientFlags {
    pub fn from_capabilities(capabilities: &ClientCapabilities) -> Self {
        let workspace = capabilities.workspace.as_ref();

        Self {
            configuration: workspace.and_then(|w| w.configuration).unwrap_or(false),
            workspace_folders: workspace.and_then(|w| w.workspace_folders).unwrap_or(false),
            related_information: capabilities
                .text_document
                .as_ref()
                .and_then(|t| t.publish_diagnostics.as_ref())
                .and_then(|p| p.related_information)
                .unwrap_or(false),
            watched_files_registration: workspace
                .and_then(|w| w.did_change_watched_files.as_ref())
                .and_then(|d| d.dynamic_registration)
                .unwrap_or(false),
        }
    }
}

/// The main LSP backend that holds state and implements the Language Server Protocol
#[derive(Clone)]
pub struct Backend {
    pub client: Client,
    pub config: Config,
    /// Full text of each open document
    pub documents: Arc<Mutex<HashMap<Url, String>>>,
    pub resolver: Arc<SettingsResolver>,
    pub flags: Arc<RwLock<ClientFlags>>,
    /// First workspace folder reported by the client, used when it cannot
    /// answer `workspace/configuration`
    pub workspace_folder: Arc<RwLock<Option<PathBuf>>>,
    pub watcher: Arc<Mutex<Option<ConfigWatcher>>>,
}

impl Backend {
    pub fn new(client: Client, config: Config, resolver: SettingsResolver) -> Self {
        Self {
            client,
            config,
            documents: Arc::new(Mutex::new(HashMap::new())),
            resolver: Arc::new(resolver),
            flags: Arc::new(RwLock::new(ClientFlags::default())),
            workspace_folder: Arc::new(RwLock::new(None)),
            watcher: Arc::new(Mutex::new(None)),
        }
    }

    pub fn flags(&self) -> ClientFlags {
        self.flags.read().map(|flags| *flags).unwrap_or_default()
    }

    pub fn fallback_workspace_folder(&self) -> Option<PathBuf> {
        self.workspace_folder
            .read()
            .ok()
            .and_then(|folder| folder.clone())
    }

    pub(crate) fn set_fallback_workspace_folder(&self, folder: Option<PathBuf>) {
        match self.workspace_folder.write() {
            Ok(mut current) => *current = folder,
            Err(e) => log::error!("Workspace folder lock poisoned: {}", e),
        }
    }
}

/// First workspace folder from the initialize params, else the root URI
fn initial_workspace_folder(params: &InitializeParams) -> Option<PathBuf> {
    if let Some(folder) = params.workspace_folders.as_ref().and_then(|f| f.first()) {
        return folder.uri.to_file_path().ok();
    }

    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();
    root_uri.and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        let flags = ClientFlags::from_capabilities(&params.capabilities);
        match self.flags.write() {
            Ok(mut current) => *current = flags,
            Err(e) => log::error!("Client flags lock poisoned: {}", e),
        }
        self.set_fallback_workspace_folder(initial_workspace_folder(&params));
        log::info!("Client capabilities: {:?}", flags);

        let workspace = flags
            .workspace_folders
            .then(|| WorkspaceServerCapabilities {
                workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                    supported: Some(true),
                    change_notifications: Some(OneOf::Left(true)),
                }),
                file_operations: None,
            });

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        ..Default::default()
                    },
                )),
                workspace,
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "code-check-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "code-check-ls initialized")
            .await;

        self.register_capabilities().await;
        self.watch_config_files().await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        // Stop the filesystem watcher, if any
        self.watcher.lock().await.take();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;

        let mut docs = self.documents.lock().await;
        docs.insert(uri.clone(), params.text_document.text);
        drop(docs); // Release the lock before calling publish_diagnostics

        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        // Full sync: the last change carries the whole text
        if let Some(change) = params.content_changes.into_iter().last() {
            let mut docs = self.documents.lock().await;
            docs.insert(uri.clone(), change.text);
            drop(docs); // Release the lock before calling publish_diagnostics

            self.publish_diagnostics(uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.lock().await.remove(&uri);
        self.clear_diagnostics(uri).await;
    }

    async fn did_change_configuration(&self, _: DidChangeConfigurationParams) {
        self.revalidate_open_documents().await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        self.handle_watched_files(params).await;
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        self.handle_workspace_folders(params).await;
    }
}
