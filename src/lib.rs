//! Wickit front end: a longest-match tokenizer and a backtracking
//! recursive-descent parsing engine with scope-aware panic-mode recovery,
//! plus the reference grammar that drives it.
//!
//! ```
//! use std::sync::Arc;
//! use wickit::{compile_unit, FrontendConfig, Sentinel, SourceTable};
//!
//! let table = Arc::new(SourceTable::from_text("demo.wckt", "namespace A { type X as int; }"));
//! let mut sentinel = Sentinel::collecting();
//! let ast = compile_unit(&table, &FrontendConfig::default(), &mut sentinel)
//!     .unwrap()
//!     .unwrap();
//! assert!(sentinel.is_empty());
//! assert!(ast.find("type-declaration").is_some());
//! ```

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod grammar;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod token;
pub mod tokenizer;

pub use crate::ast::{Ast, Node, NodeId, Syntax};
pub use crate::config::FrontendConfig;
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Sentinel, SentinelMode};
pub use crate::grammar::Construct;
pub use crate::parser::{ParseError, ParseResult, ParseSignal, Parser};
pub use crate::pipeline::{compile_unit, discover_sources, parse_as};
pub use crate::source::{Coords, SourceSegment, SourceTable};
pub use crate::token::{Token, TokenClass};
pub use crate::tokenizer::{tokenize, tokenize_into};
