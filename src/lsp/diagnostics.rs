//! Diagnostic Publishing
//!
//! One validation pass: resolve settings, run the rules, convert and send.

use tower_lsp::lsp_types::Url;

use crate::lsp::conversion::to_lsp_diagnostic;
use crate::lsp::host::Host;
use crate::settings::SettingsResolver;
use crate::validation::{validate_document, MAX_NUMBER_OF_PROBLEMS};

/// Per-pass options derived from CLI config and client capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintOptions {
    pub max_problems: usize,
    pub related_information: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            max_problems: MAX_NUMBER_OF_PROBLEMS,
            related_information: false,
        }
    }
}

/// Validate a document and publish its complete diagnostic set
pub async fn lint_document<H: Host + ?Sized>(
    host: &H,
    resolver: &SettingsResolver,
    uri: &Url,
    text: &str,
    options: LintOptions,
) {
    let config = resolver.resolve(host, uri).await;
    let result = validate_document(text, &config, options.max_problems);

    let diagnostics: Vec<_> = result
        .diagnostics
        .iter()
        .filter_map(|d| to_lsp_diagnostic(d, text, uri, options.related_information))
        .collect();

    log::debug!(
        "{} diagnostic(s) from {} rule(s) for {}",
        diagnostics.len(),
        config.lints.len(),
        uri
    );

    host.send_diagnostics(uri.clone(), diagnostics).await;
}
