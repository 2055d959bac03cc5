//! Command-line arguments and subcommands of the `wickit` binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "wickit",
    version,
    about = "Tokenizes and parses Wickit sources, reporting every problem it finds."
)]
pub struct WickitArgs {
    /// Log engine activity to stderr. Repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the token stream of a source file.
    Tokens {
        /// Source file to tokenize.
        #[arg(required = true)]
        file: PathBuf,
        /// Emit JSON instead of one token per line.
        #[arg(long)]
        json: bool,
    },
    /// Print the syntax tree of a source file.
    Ast {
        /// Source file to parse.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Parse files and directories and report diagnostics.
    Check {
        /// Files, or directories searched for sources.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// YAML or JSON front-end settings.
        #[arg(long)]
        config: Option<PathBuf>,
        /// How diagnostics are printed.
        #[arg(long, value_enum, default_value_t = Format::Plain)]
        format: Format,
    },
}

/// How diagnostics are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Caret excerpts.
    Plain,
    /// miette's graphical report.
    Fancy,
}
