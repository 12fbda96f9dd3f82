//! Lint Rules
//!
//! Rule schema, the built-in base set and per-project config loading.

pub mod base;
pub mod loader;
pub mod schema;

pub use base::BaseRules;
pub use loader::{load_project_config, CONFIG_FILE_NAME};
pub use schema::{Predicate, ProjectConfig, Rule, Severity};
