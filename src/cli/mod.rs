//! The Wickit command-line interface.
//!
//! Every subcommand returns the number of diagnostics it reported; any
//! non-zero count makes the process exit with status 1.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use crate::cli::args::{Command, Format, WickitArgs};
use crate::config::FrontendConfig;
use crate::diagnostics::{Diagnostic, Sentinel};
use crate::pipeline::{compile_unit, discover_sources};
use crate::source::SourceTable;
use crate::tokenizer::tokenize;

pub mod args;
pub mod output;

pub fn run() -> ExitCode {
    let args = WickitArgs::parse();
    output::init_logging(args.verbose);

    let result = match args.command {
        Command::Tokens { file, json } => handle_tokens(&file, json),
        Command::Ast { file } => handle_ast(&file),
        Command::Check {
            paths,
            config,
            format,
        } => handle_check(&paths, config.as_deref(), format),
    };

    match result {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(diagnostic) => {
            output::print_diagnostic(&diagnostic, Format::Plain, FrontendConfig::default().tab_width);
            ExitCode::FAILURE
        }
    }
}

fn load(path: &Path) -> Result<Arc<SourceTable>, Diagnostic> {
    SourceTable::load(path).map(Arc::new)
}

fn handle_tokens(path: &Path, json: bool) -> Result<usize, Diagnostic> {
    let config = FrontendConfig::default();
    let table = load(path)?;
    let (tokens, diagnostics) = tokenize(&table);
    output::print_tokens(&table, &tokens, json)?;
    output::print_diagnostics(&diagnostics, Format::Plain, config.tab_width);
    Ok(diagnostics.len())
}

fn handle_ast(path: &Path) -> Result<usize, Diagnostic> {
    let config = FrontendConfig::default();
    let table = load(path)?;
    let mut sentinel = Sentinel::collecting();
    if let Some(ast) = compile_unit(&table, &config, &mut sentinel)? {
        output::print_text(&ast.dump(&table))?;
    }
    output::print_diagnostics(sentinel.diagnostics(), Format::Plain, config.tab_width);
    Ok(sentinel.len())
}

fn handle_check(paths: &[std::path::PathBuf], config: Option<&Path>, format: Format) -> Result<usize, Diagnostic> {
    let config = match config {
        Some(path) => FrontendConfig::load(path)?,
        None => FrontendConfig::default(),
    };
    let mut sentinel = Sentinel::new(config.sentinel).with_limit(config.max_diagnostics);
    let mut files = 0;
    let mut failures = 0;

    for root in paths {
        for file in discover_sources(root, &config)? {
            files += 1;
            let before = sentinel.len();
            let outcome = load(&file).and_then(|table| compile_unit(&table, &config, &mut sentinel));
            output::print_diagnostics(&sentinel.diagnostics()[before..], format, config.tab_width);
            if let Err(thrown) = outcome {
                output::print_diagnostic(&thrown, format, config.tab_width);
                failures += 1;
            }
        }
    }

    let reported = sentinel.len() + failures;
    output::print_summary(files, reported, sentinel.suppressed());
    Ok(reported + sentinel.suppressed())
}
