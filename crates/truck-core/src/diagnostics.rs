//! Parser diagnostics.
//!
//! Every recoverable problem becomes a [`Diagnostic`] handed to an injected
//! [`DiagnosticSink`]. Nothing in the parser aborts on bad input; the sink
//! decides what to do with the messages.

use crate::keyword::Keyword;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a parser message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    /// Internal failure (I/O from the caller's stream, broken invariant).
    SystemError,
}

impl Severity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::SystemError => "SYSTEM ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single message produced while parsing one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub filename: String,
    pub resource_group: String,
    /// 1-based line number, 0 for messages not tied to a line.
    pub line_number: u32,
    /// Current block, or the directive being processed.
    pub keyword: Keyword,
    pub module: String,
    /// Source line as read (after comment trimming), empty when not applicable.
    pub line: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{}, {}, module '{}'): {}",
            self.severity, self.filename, self.line_number, self.keyword, self.module, self.message
        )
    }
}

// ─── Sinks ───────────────────────────────────────────────────────────────

/// Receiver for parser messages.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collecting sink with per-severity counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Messages at `severity` or worse.
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter().filter(move |d| d.severity >= severity)
    }

    /// True when any message text contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|d| d.message.contains(needle))
    }

    /// Human-readable listing, one message per line, then a summary.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for d in &self.messages {
            let _ = writeln!(
                out,
                "{} (line {}, {}): {}",
                d.severity, d.line_number, d.keyword, d.message
            );
            if !d.line.is_empty() {
                let _ = writeln!(out, "\t{}", d.line);
            }
        }
        let _ = write!(
            out,
            "{} info, {} warnings, {} errors, {} system errors",
            self.count(Severity::Info),
            self.count(Severity::Warning),
            self.count(Severity::Error),
            self.count(Severity::SystemError),
        );
        out
    }

    /// JSON dump of every message.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.messages).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.messages.push(diagnostic);
    }
}

/// Sink that forwards every message to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, d: Diagnostic) {
        let level = match d.severity {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::SystemError => log::Level::Error,
        };
        log::log!(target: "truck_core", level, "{d}");
    }
}

/// Collects into an inner [`Diagnostics`] and also forwards to `log`.
#[derive(Debug, Clone, Default)]
pub struct TeeSink {
    pub collected: Diagnostics,
}

impl DiagnosticSink for TeeSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        LogSink.report(diagnostic.clone());
        self.collected.report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(severity: Severity, message: &str) -> Diagnostic {
        Diagnostic {
            severity,
            filename: "test.truck".into(),
            resource_group: String::new(),
            line_number: 3,
            keyword: Keyword::Beams,
            module: "_Root_".into(),
            line: "1 2 x".into(),
            message: message.into(),
        }
    }

    #[test]
    fn counts_by_severity() {
        let mut d = Diagnostics::new();
        d.report(diag(Severity::Warning, "a"));
        d.report(diag(Severity::Error, "b"));
        d.report(diag(Severity::Warning, "c"));
        assert_eq!(d.count(Severity::Warning), 2);
        assert_eq!(d.count(Severity::Error), 1);
        assert_eq!(d.at_least(Severity::Error).count(), 1);
        assert!(d.contains("b"));
    }

    #[test]
    fn report_lists_messages_and_summary() {
        let mut d = Diagnostics::new();
        d.report(diag(Severity::Error, "Invalid flag: x"));
        let text = d.render();
        assert!(text.contains("ERROR (line 3, beams): Invalid flag: x"));
        assert!(text.contains("\t1 2 x"));
        assert!(text.ends_with("0 info, 0 warnings, 1 errors, 0 system errors"));
    }

    #[test]
    fn json_dump_contains_fields() {
        let mut d = Diagnostics::new();
        d.report(diag(Severity::Info, "hello"));
        let json = d.to_json();
        assert!(json.contains("\"message\": \"hello\""));
        assert!(json.contains("\"keyword\": \"Beams\""));
    }
}
