//! Rule Schema Types
//!
//! Data-only types for `.code-check.toml` project files and the base rule set.

use serde::Deserialize;

/// Message used when a rule does not provide one
pub const DEFAULT_MESSAGE: &str = "Unexpected Item";

/// Severity of a rule and of the diagnostics it produces
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Information,
    Hint,
}

/// Secondary check applied to the text of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Accepts every match
    Always,
    /// Accepts a match when this regex finds it in the match text
    Matches(String),
}

/// A single lint rule (matches TOML `[[lints]]` entries)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Regex searched for in the document text
    pub test: String,
    /// Optional secondary regex tested against the full match text
    #[serde(default)]
    pub rule: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub severity: Option<Severity>,
}

impl Rule {
    pub fn new(test: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            rule: None,
            message: None,
            severity: None,
        }
    }

    pub fn with_predicate(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn predicate(&self) -> Predicate {
        match &self.rule {
            Some(pattern) => Predicate::Matches(pattern.clone()),
            None => Predicate::Always,
        }
    }

    /// Message with the default applied
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_MESSAGE)
    }

    /// Severity with the default applied
    pub fn severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }
}

/// Per-project lint configuration (root of `.code-check.toml`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Append the base rule set on load. Cleared once the merge happened.
    #[serde(default = "default_extends_base", alias = "extendsBase")]
    pub extends_base: bool,
    #[serde(default)]
    pub lints: Vec<Rule>,
}

fn default_extends_base() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            extends_base: true,
            lints: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Merge the base rules after the project's own rules, at most once
    pub fn apply_defaults(&mut self, base: &[Rule]) {
        if self.extends_base {
            self.lints.extend_from_slice(base);
            self.extends_base = false;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lints.is_empty()
    }
}
