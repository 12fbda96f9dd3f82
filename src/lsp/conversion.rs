//! LSP type conversion utilities.

use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, Location, Position, Range, Url,
};

use crate::rules::Severity;
use crate::validation::Diagnostic as RuleDiagnostic;

/// Source tag attached to every published diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "code-check";

pub fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

/// Converts a rule diagnostic to an LSP diagnostic.
///
/// With `related_information`, the diagnostic also carries one related entry
/// pointing at its own location with its own message.
pub fn to_lsp_diagnostic(
    diag: &RuleDiagnostic,
    text: &str,
    uri: &Url,
    related_information: bool,
) -> Option<Diagnostic> {
    let range = offset_to_range(diag.span.start, diag.span.end, text)?;

    let related = related_information.then(|| {
        vec![DiagnosticRelatedInformation {
            location: Location {
                uri: uri.clone(),
                range,
            },
            message: diag.message.clone(),
        }]
    });

    Some(Diagnostic {
        range,
        severity: Some(to_lsp_severity(diag.severity)),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: diag.message.clone(),
        related_information: related,
        ..Default::default()
    })
}

/// Converts byte offsets to an LSP range.
pub fn offset_to_range(start: usize, end: usize, text: &str) -> Option<Range> {
    let start_pos = offset_to_position(start, text)?;
    let end_pos = offset_to_position(end, text)?;
    Some(Range::new(start_pos, end_pos))
}

/// Converts a byte offset to an LSP position (UTF-16 columns).
///
/// `\n`, `\r` and `\r\n` each end a line. An offset between the two halves
/// of a `\r\n` maps to the end of that line.
pub fn offset_to_position(offset: usize, text: &str) -> Option<Position> {
    let prefix = text.get(..offset)?;
    let splits_crlf = prefix.ends_with('\r') && text[offset..].starts_with('\n');

    let mut line = 0u32;
    let mut col = 0u32;
    let mut chars = prefix.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            // A `\r\n` pair is counted once, at its `\n`
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' if splits_crlf && chars.peek().is_none() => {}
            '\r' | '\n' => {
                line += 1;
                col = 0;
            }
            _ => col += ch.len_utf16() as u32,
        }
    }

    Some(Position::new(line, col))
}
