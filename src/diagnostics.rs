//! User-facing diagnostics and the sentinel that routes them.
//!
//! Every problem the front end reports to a user is a [`Diagnostic`]: a kind,
//! a message, an optional location inside a [`SourceTable`], and a stack of
//! context notes added as it travels outward ("while tokenizing ...").
//! Diagnostics implement `miette::Diagnostic` so the CLI can hand them to the
//! graphical report handler, and they also render themselves in the plain
//! caret format used by tests and `--format plain`.
//!
//! A [`Sentinel`] decides what happens when a diagnostic is raised: collect
//! it, throw it back to the caller, or drop it.

use std::fmt;
use std::sync::Arc;

use miette::{LabeledSpan, SourceCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::{Coords, SourceSegment, SourceTable};

// ============================================================================
// DIAGNOSTIC
// ============================================================================

/// Which phase or subsystem produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Malformed literals, comments and characters found by the tokenizer
    Lexical,
    /// Grammar mismatches reported by the parser
    Syntax,
    Io,
    Config,
    Internal,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "lexical",
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::Io => "io",
            DiagnosticKind::Config => "config",
            DiagnosticKind::Internal => "internal",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in which source a diagnostic points.
#[derive(Debug, Clone)]
pub struct Location {
    pub table: Arc<SourceTable>,
    pub segment: SourceSegment,
}

impl Location {
    pub fn coords(&self) -> Coords {
        self.table.coords_of(self.segment.position)
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    location: Option<Location>,
    help: Option<String>,
    /// Context notes, innermost first.
    context: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            help: None,
            context: Vec::new(),
        }
    }

    pub fn lexical(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Lexical, message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Syntax, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Io, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Config, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Internal, message)
    }

    /// Attaches a source location. A diagnostic that already points somewhere
    /// keeps its original location.
    pub fn at(mut self, table: &Arc<SourceTable>, segment: SourceSegment) -> Self {
        if self.location.is_none() {
            self.location = Some(Location {
                table: Arc::clone(table),
                segment,
            });
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Wraps the diagnostic in one more layer of context.
    pub fn within(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn segment(&self) -> Option<SourceSegment> {
        self.location.as_ref().map(|l| l.segment)
    }

    pub fn coords(&self) -> Option<Coords> {
        self.location.as_ref().map(Location::coords)
    }

    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Renders the diagnostic in the plain caret format:
    ///
    /// ```text
    /// ["unit.wckt":1:25] error in source: expected type-expression instead of ';'
    ///  1 | namespace A { type X as ; }
    ///    |                         ^
    /// note: while parsing type-declaration
    /// ```
    pub fn render(&self, tab_width: usize) -> String {
        let mut out = match &self.location {
            Some(location) => {
                let coords = location.coords();
                format!(
                    "[\"{}\":{}:{}] error in source: {}\n{}",
                    location.table.name(),
                    coords.row,
                    coords.col,
                    self.message,
                    location.table.render_excerpt(location.segment, tab_width)
                )
            }
            None => format!("error: {}", self.message),
        };
        for note in &self.context {
            out.push_str("\nnote: ");
            out.push_str(note);
        }
        if let Some(help) = &self.help {
            out.push_str("\nhelp: ");
            out.push_str(help);
        }
        out
    }
}

impl miette::Diagnostic for Diagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("wickit::{}", self.kind)))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let mut lines: Vec<&str> = self.context.iter().map(String::as_str).collect();
        if let Some(help) = &self.help {
            lines.push(help);
        }
        if lines.is_empty() {
            None
        } else {
            Some(Box::new(lines.join("\n")))
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.location
            .as_ref()
            .map(|l| l.table.source_code() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let location = self.location.as_ref()?;
        let label = LabeledSpan::new_with_span(Some(self.message.clone()), location.segment);
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// SENTINEL
// ============================================================================

/// What a [`Sentinel`] does with a raised diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelMode {
    /// Keep it for later inspection.
    #[default]
    Collect,
    /// Hand it straight back to the raiser as an `Err`.
    Throw,
    /// Drop it.
    Ignore,
}

pub type ContextFn = Box<dyn Fn(Diagnostic) -> Diagnostic + Send + Sync>;

/// Receives diagnostics and applies the configured [`SentinelMode`].
///
/// A sentinel may carry a context function that every raised diagnostic is
/// passed through first, which is how phases label their output before
/// forwarding it to an outer sentinel.
pub struct Sentinel {
    mode: SentinelMode,
    context: Option<ContextFn>,
    collected: Vec<Diagnostic>,
    limit: Option<usize>,
    suppressed: usize,
}

impl Sentinel {
    pub fn new(mode: SentinelMode) -> Self {
        Self {
            mode,
            context: None,
            collected: Vec::new(),
            limit: None,
            suppressed: 0,
        }
    }

    pub fn collecting() -> Self {
        Self::new(SentinelMode::Collect)
    }

    pub fn with_context<F>(mode: SentinelMode, context: F) -> Self
    where
        F: Fn(Diagnostic) -> Diagnostic + Send + Sync + 'static,
    {
        Self {
            context: Some(Box::new(context)),
            ..Self::new(mode)
        }
    }

    /// Caps how many diagnostics a collecting sentinel keeps. Anything past
    /// the cap is counted in [`Sentinel::suppressed`] and dropped.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn mode(&self) -> SentinelMode {
        self.mode
    }

    pub fn raise(&mut self, diagnostic: Diagnostic) -> Result<(), Diagnostic> {
        let diagnostic = match &self.context {
            Some(context) => context(diagnostic),
            None => diagnostic,
        };
        match self.mode {
            SentinelMode::Collect => {
                if self.limit.is_some_and(|limit| self.collected.len() >= limit) {
                    self.suppressed += 1;
                } else {
                    self.collected.push(diagnostic);
                }
                Ok(())
            }
            SentinelMode::Throw => Err(diagnostic),
            SentinelMode::Ignore => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.collected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collected.is_empty()
    }

    /// Number of diagnostics dropped because the limit was reached.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.collected
    }

    /// Forgets every diagnostic collected after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.collected.truncate(len);
    }

    /// Re-raises everything this sentinel collected into `parent`.
    pub fn forward(self, parent: &mut Sentinel) -> Result<(), Diagnostic> {
        parent.suppressed += self.suppressed;
        for diagnostic in self.collected {
            parent.raise(diagnostic)?;
        }
        Ok(())
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.collected
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::collecting()
    }
}

impl fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sentinel")
            .field("mode", &self.mode)
            .field("has_context", &self.context.is_some())
            .field("collected", &self.collected.len())
            .field("limit", &self.limit)
            .field("suppressed", &self.suppressed)
            .finish()
    }
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    fn table(text: &str) -> Arc<SourceTable> {
        Arc::new(SourceTable::from_text("unit.wckt", text))
    }

    #[test]
    fn render_includes_header_excerpt_and_notes() {
        let table = table("type X as ;");
        let diagnostic = Diagnostic::syntax("expected type-expression after 'as'")
            .at(&table, SourceSegment::empty_at(9))
            .within("while parsing type-declaration");
        let rendered = diagnostic.render(4);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines[0],
            "[\"unit.wckt\":1:10] error in source: expected type-expression after 'as'"
        );
        assert_eq!(lines[1], " 1 | type X as ;");
        assert_eq!(lines[2], "   |          ^");
        assert_eq!(lines[3], "note: while parsing type-declaration");
    }

    #[test]
    fn first_location_wins() {
        let table = table("abc def");
        let diagnostic = Diagnostic::lexical("bad")
            .at(&table, SourceSegment::new(4, 3))
            .at(&table, SourceSegment::new(0, 1));
        assert_eq!(diagnostic.segment(), Some(SourceSegment::new(4, 3)));
    }

    #[test]
    fn unlocated_diagnostic_renders_plainly() {
        let diagnostic = Diagnostic::io("could not read 'x'");
        assert_eq!(diagnostic.render(4), "error: could not read 'x'");
    }

    #[test]
    fn miette_report_carries_code_label_and_notes() {
        let table = table("abc def");
        let diagnostic = Diagnostic::lexical("'def' is not a token")
            .at(&table, SourceSegment::new(4, 3))
            .within("while tokenizing unit.wckt");
        let output = format!("{:?}", Report::new(diagnostic));
        assert!(output.contains("wickit::lexical"));
        assert!(output.contains("'def' is not a token"));
        assert!(output.contains("while tokenizing unit.wckt"));
    }

    #[test]
    fn sentinel_modes() {
        let mut collect = Sentinel::collecting();
        assert!(collect.raise(Diagnostic::syntax("a")).is_ok());
        assert_eq!(collect.len(), 1);

        let mut throw = Sentinel::new(SentinelMode::Throw);
        let err = throw.raise(Diagnostic::syntax("b")).unwrap_err();
        assert_eq!(err.message(), "b");
        assert!(throw.is_empty());

        let mut ignore = Sentinel::new(SentinelMode::Ignore);
        assert!(ignore.raise(Diagnostic::syntax("c")).is_ok());
        assert!(ignore.is_empty());
    }

    #[test]
    fn context_is_applied_before_forwarding() {
        let mut child = Sentinel::with_context(SentinelMode::Collect, |d| d.within("inner"));
        child.raise(Diagnostic::syntax("x")).unwrap();
        let mut parent = Sentinel::with_context(SentinelMode::Collect, |d| d.within("outer"));
        child.forward(&mut parent).unwrap();
        assert_eq!(parent.diagnostics()[0].context(), ["inner", "outer"]);
    }

    #[test]
    fn limit_counts_suppressed() {
        let mut sentinel = Sentinel::collecting().with_limit(Some(1));
        sentinel.raise(Diagnostic::syntax("one")).unwrap();
        sentinel.raise(Diagnostic::syntax("two")).unwrap();
        assert_eq!(sentinel.len(), 1);
        assert_eq!(sentinel.suppressed(), 1);
    }

    #[test]
    fn truncate_drops_later_diagnostics() {
        let mut sentinel = Sentinel::collecting();
        sentinel.raise(Diagnostic::syntax("keep")).unwrap();
        sentinel.raise(Diagnostic::syntax("drop")).unwrap();
        sentinel.truncate(1);
        assert_eq!(sentinel.diagnostics()[0].message(), "keep");
        assert_eq!(sentinel.len(), 1);
    }
}
