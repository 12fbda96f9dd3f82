//! Base Rule Set
//!
//! Rules shared by every project that does not opt out with
//! `extends_base = false`. Loading priority: explicit/user file < embedded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::schema::{ProjectConfig, Rule, Severity};

const EMBEDDED_BASE_RULES: &str = include_str!("../../resources/base-rules.toml");

/// The built-in rules appended to project configs
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRules {
    rules: Vec<Rule>,
    source_path: Option<PathBuf>,
}

impl Default for BaseRules {
    fn default() -> Self {
        Self::embedded()
    }
}

impl BaseRules {
    /// Base rules compiled into the binary
    pub fn embedded() -> Self {
        match parse_rule_file(EMBEDDED_BASE_RULES) {
            Ok(rules) => Self {
                rules,
                source_path: None,
            },
            Err(e) => {
                log::warn!(
                    "Failed to parse embedded base rules: {}. Using minimal fallback.",
                    e
                );
                Self::minimal()
            }
        }
    }

    /// An empty base set, for projects and tests that want none
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            source_path: None,
        }
    }

    /// Use the first candidate file that exists and parses, else the embedded set
    pub fn load(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::from_file(path) {
                Ok(base) => {
                    log::info!("Loaded base rules from {}", path.display());
                    return base;
                }
                Err(e) => log::warn!("{:#}", e),
            }
        }
        Self::embedded()
    }

    /// Read a base rule file (same `[[lints]]` layout as project files)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read base rules: {}", path.display()))?;
        let rules = parse_rule_file(&content)
            .with_context(|| format!("Failed to parse base rules: {}", path.display()))?;

        Ok(Self {
            rules,
            source_path: Some(path.to_path_buf()),
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// File the rules came from, `None` for built-in rules
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    fn minimal() -> Self {
        let rules = vec![
            Rule::new(r"(?mR)[ \t]+$")
                .with_predicate(r"^[ \t]+$")
                .with_message("Trailing whitespace")
                .with_severity(Severity::Warning),
        ];

        Self {
            rules,
            source_path: None,
        }
    }
}

fn parse_rule_file(content: &str) -> Result<Vec<Rule>> {
    let file: ProjectConfig = toml::from_str(content)?;
    Ok(file.lints)
}
