//! LSP Protocol Implementation
//!
//! tower-lsp backend, the host abstraction and type conversions.

pub mod backend;
pub mod conversion;
pub mod diagnostics;
pub mod handlers;
pub mod host;
pub mod server;

pub use backend::Backend;
pub use diagnostics::{lint_document, LintOptions};
pub use host::{ClientHost, Host};
