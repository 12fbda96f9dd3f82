//! Validation Engine
//!
//! Applies project rules to raw document text. Knows nothing about LSP;
//! positions are byte spans into the validated text.

use std::collections::HashSet;
use std::ops::Range;

use regex::Regex;

use crate::rules::{Predicate, ProjectConfig, Rule, Severity};

/// Default cap on diagnostics per document, across all rules
pub const MAX_NUMBER_OF_PROBLEMS: usize = 100;

/// A diagnostic produced by a rule match
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Byte range of the match in the document text
    pub span: Range<usize>,
    pub message: String,
    pub severity: Severity,
}

/// Result of validating a document
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }
}

/// A rule whose regexes compiled successfully
#[derive(Debug)]
pub struct CompiledRule<'a> {
    pub rule: &'a Rule,
    test: Regex,
    predicate: Option<Regex>,
}

impl<'a> CompiledRule<'a> {
    pub fn compile(rule: &'a Rule) -> Result<Self, regex::Error> {
        let test = Regex::new(&rule.test)?;
        let predicate = match rule.predicate() {
            Predicate::Always => None,
            Predicate::Matches(pattern) => Some(Regex::new(&pattern)?),
        };

        Ok(Self {
            rule,
            test,
            predicate,
        })
    }

    /// Whether this rule's predicate accepts the text of a match
    pub fn accepts(&self, matched: &str) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| predicate.is_match(matched))
    }
}

/// Compile every rule, skipping (and logging) the ones with invalid regexes
pub fn compile_rules(rules: &[Rule]) -> Vec<CompiledRule<'_>> {
    rules
        .iter()
        .filter_map(|rule| match CompiledRule::compile(rule) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                log::warn!("Skipping rule with invalid pattern '{}': {}", rule.test, e);
                None
            }
        })
        .collect()
}

/// Validate an entire document against a project config.
///
/// Matches of every rule are reported through the first rule in the whole
/// list whose predicate accepts the match text. Collection stops silently
/// once `max_problems` diagnostics exist.
pub fn validate_document(
    content: &str,
    config: &ProjectConfig,
    max_problems: usize,
) -> ValidationResult {
    let rules = compile_rules(&config.lints);
    let mut result = ValidationResult::new();
    let mut seen = HashSet::new();

    'rules: for rule in &rules {
        for found in rule.test.find_iter(content) {
            if result.diagnostics.len() >= max_problems {
                break 'rules;
            }
            // Zero-width matches have nothing to underline
            if found.is_empty() {
                continue;
            }

            let Some(accepting) = rules.iter().find(|r| r.accepts(found.as_str())) else {
                continue;
            };

            let diagnostic = Diagnostic {
                span: found.range(),
                message: accepting.rule.message().to_string(),
                severity: accepting.rule.severity(),
            };
            if seen.insert(diagnostic.clone()) {
                result.diagnostics.push(diagnostic);
            }
        }
    }

    result
}
