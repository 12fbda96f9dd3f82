//! Stdio client that drives the `code-check-ls` binary in integration tests
#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tower_lsp::lsp_types::Url;

pub const SERVER_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LspClient {
    child: Child,
    stdin: ChildStdin,
    incoming: Receiver<Value>,
    next_id: i64,
}

impl LspClient {
    pub fn spawn() -> Self {
        let bin_path = std::env::var("CARGO_BIN_EXE_code-check-ls")
            .unwrap_or_else(|_| "target/debug/code-check-ls".to_string());

        let mut child = Command::new(bin_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn language server");

        let stdin = child.stdin.take().expect("Child stdin should be available");
        let stdout = child
            .stdout
            .take()
            .expect("Child stdout should be available");

        let (tx, incoming) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            while let Some(message) = read_message(&mut reader) {
                if tx.send(message).is_err() {
                    break;
                }
            }
        });

        Self {
            child,
            stdin,
            incoming,
            next_id: 1,
        }
    }

    /// Initialize with `root` as the only workspace folder. The client
    /// advertises watched-file registration, so the server does not start
    /// its own filesystem watcher.
    pub fn initialize(&mut self, root: &Path) -> Value {
        let root_uri = Url::from_file_path(root).expect("directory uri");
        let response = self.request(
            "initialize",
            json!({
                "processId": null,
                "rootUri": root_uri,
                "workspaceFolders": [{ "uri": root_uri, "name": "ws" }],
                "capabilities": {
                    "workspace": {
                        "workspaceFolders": true,
                        "didChangeWatchedFiles": { "dynamicRegistration": true }
                    }
                }
            }),
        );

        self.notify("initialized", json!({}));
        self.wait_for(|m| m["method"] == "client/registerCapability");
        response
    }

    pub fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;

        self.send(&rpc_message(Some(id), method, params));
        self.wait_for(|m| m["id"] == id && m.get("method").is_none())
    }

    pub fn notify(&mut self, method: &str, params: Value) {
        self.send(&rpc_message(None, method, params));
    }

    pub fn open(&mut self, uri: &str, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": { "uri": uri, "languageId": "plaintext", "version": 1, "text": text }
            }),
        );
    }

    pub fn close(&mut self, uri: &str) {
        self.notify(
            "textDocument/didClose",
            json!({ "textDocument": { "uri": uri } }),
        );
    }

    /// Wait for the next `publishDiagnostics` for `uri`
    pub fn next_diagnostics(&mut self, uri: &str) -> Vec<Value> {
        let published = self.wait_for(|m| {
            m["method"] == "textDocument/publishDiagnostics" && m["params"]["uri"] == uri
        });
        published["params"]["diagnostics"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    /// Fail if any diagnostics are published within `quiet`
    pub fn expect_no_diagnostics(&mut self, quiet: Duration) {
        let deadline = Instant::now() + quiet;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.incoming.recv_timeout(remaining) {
                Ok(message) => {
                    self.reply_if_request(&message);
                    assert_ne!(
                        message["method"], "textDocument/publishDiagnostics",
                        "Unexpected diagnostics: {}",
                        message
                    );
                }
                Err(RecvTimeoutError::Timeout) => return,
                Err(RecvTimeoutError::Disconnected) => panic!("Server closed stdout"),
            }
        }
    }

    /// Next server message matching `matches`; server requests seen on the
    /// way are answered with a null result
    pub fn wait_for(&mut self, mut matches: impl FnMut(&Value) -> bool) -> Value {
        let deadline = Instant::now() + SERVER_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let message = match self.incoming.recv_timeout(remaining) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => panic!("Timeout waiting for server message"),
                Err(RecvTimeoutError::Disconnected) => panic!("Server closed stdout"),
            };

            self.reply_if_request(&message);
            if matches(&message) {
                return message;
            }
        }
    }

    pub fn shutdown(mut self) {
        let response = self.request("shutdown", Value::Null);
        assert!(response.get("error").is_none(), "shutdown failed: {}", response);
        self.notify("exit", Value::Null);
    }

    fn reply_if_request(&mut self, message: &Value) {
        if let (Some(id), Some(_)) = (message.get("id"), message.get("method")) {
            let reply = json!({ "jsonrpc": "2.0", "id": id, "result": null });
            self.send(&reply);
        }
    }

    fn send(&mut self, message: &Value) {
        let body = message.to_string();
        let framed = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        self.stdin
            .write_all(framed.as_bytes())
            .expect("Failed to write message");
        self.stdin.flush().expect("Failed to flush stdin");
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// JSON-RPC message; null params are left out for methods that take none
fn rpc_message(id: Option<i64>, method: &str, params: Value) -> Value {
    let mut message = json!({ "jsonrpc": "2.0", "method": method });
    if let Some(id) = id {
        message["id"] = json!(id);
    }
    if !params.is_null() {
        message["params"] = params;
    }
    message
}

fn read_message(reader: &mut impl BufRead) -> Option<Value> {
    let mut content_length = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }

        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some(length) = line.strip_prefix("Content-Length:") {
            content_length = length.trim().parse::<usize>().ok();
        }
    }

    let mut body = vec![0u8; content_length?];
    reader.read_exact(&mut body).ok()?;
    serde_json::from_slice(&body).ok()
}

pub fn file_uri(path: &Path) -> String {
    Url::from_file_path(path).expect("file uri").to_string()
}
