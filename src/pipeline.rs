//! Tokenize-then-parse driver and source discovery.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::ast::Ast;
use crate::config::FrontendConfig;
use crate::diagnostics::{Diagnostic, Sentinel};
use crate::grammar::Construct;
use crate::parser::Parser;
use crate::source::SourceTable;
use crate::tokenizer::tokenize_into;

/// Parses one compilation unit.
///
/// Tokenizer diagnostics are labelled with the unit name. Everything is
/// forwarded to `sentinel`; `Err` means the sentinel threw.
pub fn compile_unit(
    table: &Arc<SourceTable>,
    config: &FrontendConfig,
    sentinel: &mut Sentinel,
) -> Result<Option<Ast<Construct>>, Diagnostic> {
    parse_as(table, Construct::CompilationUnit, config, sentinel)
}

/// Parses the whole of `table` as `root`.
pub fn parse_as(
    table: &Arc<SourceTable>,
    root: Construct,
    config: &FrontendConfig,
    sentinel: &mut Sentinel,
) -> Result<Option<Ast<Construct>>, Diagnostic> {
    log::debug!("compiling {} as {root:?} (tab width {})", table.name(), config.tab_width);

    let unit = table.name().to_string();
    let mut lexing = Sentinel::with_context(sentinel.mode(), move |d| {
        d.within(format!("while tokenizing {unit}"))
    });
    let tokens = tokenize_into(table, &mut lexing)?;
    lexing.forward(sentinel)?;

    let mut parsing = Sentinel::new(sentinel.mode());
    let ast = Parser::new(Arc::clone(table), tokens).parse(root, &mut parsing)?;
    parsing.forward(sentinel)?;
    Ok(ast)
}

/// Files under `root` whose extension the config accepts, sorted. A file
/// path is returned as is when it exists.
pub fn discover_sources(root: &Path, config: &FrontendConfig) -> Result<Vec<PathBuf>, Diagnostic> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            Diagnostic::io(format!("cannot walk '{}': {e}", root.display()))
        })?;
        if entry.file_type().is_file() && config.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    log::debug!("discovered {} sources under {}", files.len(), root.display());
    Ok(files)
}
