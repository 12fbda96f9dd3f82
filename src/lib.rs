//! code-check Language Server
//!
//! Lints open documents with per-project regular-expression rules.
//!
//! This library provides:
//! - Project root discovery from marker files
//! - Per-project rule loading from `.code-check.toml`
//! - Regex validation with a capped, deduplicated diagnostic set
//! - LSP protocol implementation

pub mod config;
pub mod lsp;
pub mod project;
pub mod rules;
pub mod settings;
pub mod validation;
pub mod watcher;

// Re-exports for clean public API
pub use config::Config;
pub use rules::{BaseRules, ProjectConfig, Rule, Severity};
pub use settings::SettingsResolver;
pub use validation::{validate_document, Diagnostic};
