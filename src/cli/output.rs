//! Handles all user-facing output for the CLI.
//!
//! Diagnostics and logs go to stderr, requested artefacts (token dumps, tree
//! dumps) go to stdout so they can be piped.

use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::args::Format;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::source::SourceTable;
use crate::token::Token;

// ============================================================================
// LOGGING
// ============================================================================

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = StandardStream::stderr(ColorChoice::Auto);
        let color = match record.level() {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Green,
            Level::Debug => Color::Cyan,
            Level::Trace => Color::Magenta,
        };
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(stderr, "[{:<5}]", record.level());
        let _ = stderr.reset();
        let _ = writeln!(stderr, " {}: {}", record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Installs the stderr logger. `-v` enables debug output, `-vv` trace.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

pub fn print_diagnostic(diagnostic: &Diagnostic, format: Format, tab_width: usize) {
    match format {
        Format::Fancy => {
            let report = miette::Report::new(diagnostic.clone());
            eprintln!("{report:?}");
        }
        Format::Plain => {
            let mut stderr = StandardStream::stderr(ColorChoice::Auto);
            let rendered = diagnostic.render(tab_width);
            let (headline, rest) = rendered.split_once('\n').unwrap_or((rendered.as_str(), ""));
            let color = match diagnostic.kind() {
                DiagnosticKind::Internal => Color::Magenta,
                DiagnosticKind::Io | DiagnosticKind::Config => Color::Yellow,
                DiagnosticKind::Lexical | DiagnosticKind::Syntax => Color::Red,
            };
            let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
            let _ = writeln!(stderr, "{headline}");
            let _ = stderr.reset();
            if !rest.is_empty() {
                let _ = writeln!(stderr, "{rest}");
            }
        }
    }
}

pub fn print_diagnostics(diagnostics: &[Diagnostic], format: Format, tab_width: usize) {
    for diagnostic in diagnostics {
        print_diagnostic(diagnostic, format, tab_width);
    }
}

/// One line per run of `check`.
pub fn print_summary(files: usize, diagnostics: usize, suppressed: usize) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let color = if diagnostics + suppressed == 0 {
        Color::Green
    } else {
        Color::Red
    };
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let noun = if files == 1 { "file" } else { "files" };
    let _ = write!(stderr, "checked {files} {noun}: {diagnostics} diagnostic(s)");
    let _ = stderr.reset();
    if suppressed > 0 {
        let _ = write!(stderr, " ({suppressed} more suppressed)");
    }
    let _ = writeln!(stderr);
}

// ============================================================================
// ARTEFACTS
// ============================================================================

/// Token dump, one `row:col [CLASS "text"]` line per token, or JSON.
pub fn print_tokens(table: &SourceTable, tokens: &[Token], json: bool) -> Result<(), Diagnostic> {
    let mut stdout = std::io::stdout().lock();
    let written = if json {
        let text = serde_json::to_string_pretty(tokens)
            .map_err(|e| Diagnostic::internal(format!("cannot serialize tokens: {e}")))?;
        writeln!(stdout, "{text}")
    } else {
        tokens.iter().try_for_each(|token| {
            writeln!(stdout, "{} {token}", table.coords_of(token.segment.position))
        })
    };
    written.map_err(|e| Diagnostic::io(format!("cannot write to stdout: {e}")))
}

pub fn print_text(text: &str) -> Result<(), Diagnostic> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{text}").map_err(|e| Diagnostic::io(format!("cannot write to stdout: {e}")))
}
