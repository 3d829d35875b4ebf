//! Canonical formatting: parse, then serialize.

use crate::diagnostics::Severity;
use crate::parser::{ParserConfig, parse_truck};
use crate::serializer::{SerializerConfig, serialize_document};

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for [`format_truck`].
#[derive(Debug, Clone, Default)]
pub struct FormatConfig {
    pub parser: ParserConfig,
    pub serializer: SerializerConfig,
    /// Refuse to format when the parser reported an error. Default: **false**.
    pub strict: bool,
}

// ─── Pipeline ─────────────────────────────────────────────────────────────

/// Parse a truck file and re-emit it in canonical form.
///
/// Formatting canonical output again yields the same text.
///
/// # Errors
///
/// Returns the rendered diagnostics in strict mode when the parse reported
/// errors, and the serializer's message when the document cannot be written.
pub fn format_truck(text: &str, config: &FormatConfig) -> Result<String, String> {
    let out = parse_truck(text, &config.parser);
    if config.strict && out.diagnostics.at_least(Severity::Error).next().is_some() {
        return Err(out.diagnostics.render());
    }
    log::debug!(
        "formatting '{}' with {} diagnostics",
        config.parser.filename,
        out.diagnostics.len()
    );
    serialize_document(&out.document, &config.serializer).map_err(|e| e.to_string())
}

// ─── Tests ────────────────────────────────────────────────────────────────
