//! Validation Engine
//!
//! Regex rule matching, separated from settings resolution and LSP concerns.

pub mod engine;

pub use engine::{
    compile_rules, validate_document, CompiledRule, Diagnostic, ValidationResult,
    MAX_NUMBER_OF_PROBLEMS,
};
