//! Control signals raised while parsing.
//!
//! Grammar rules return [`ParseResult`]. Its error side is a [`ParseSignal`],
//! which keeps the three reasons a rule can stop apart: the grammar did not
//! match, a panic scan found an outer recovery point, or a speculative
//! attempt was abandoned.

use std::fmt;

use crate::source::SourceSegment;
use crate::token::Token;

/// How an "expected ..." message relates the expectation to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectationMode {
    /// The offending token is where the expected one should have been.
    InsteadOf,
    /// The expected token belongs right after the previous one, usually
    /// because the offending token starts a new line.
    After,
    /// Nothing precedes the offending token.
    Before,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub expected: String,
    pub found: Token,
    /// The token consumed just before `found`, if any.
    pub anchor: Option<Token>,
    pub mode: ExpectationMode,
}

impl ParseError {
    pub fn new(
        expected: impl Into<String>,
        found: Token,
        anchor: Option<Token>,
        mode: ExpectationMode,
    ) -> Self {
        Self {
            expected: expected.into(),
            found,
            anchor,
            mode,
        }
    }

    pub fn message(&self) -> String {
        match (self.mode, &self.anchor) {
            (ExpectationMode::After, Some(anchor)) => {
                format!("expected {} after {}", self.expected, anchor.describe())
            }
            (ExpectationMode::Before, _) => {
                format!("expected {} before {}", self.expected, self.found.describe())
            }
            _ => format!("expected {} instead of {}", self.expected, self.found.describe()),
        }
    }

    /// Where the diagnostic for this error should point.
    pub fn segment(&self) -> SourceSegment {
        match (self.mode, &self.anchor) {
            (ExpectationMode::After, Some(anchor)) => anchor.segment.after(),
            _ => self.found.segment,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ParseError {}

/// Raised by a panic scan that reached a recovery point registered by an
/// enclosing `match_node_within` call before reaching its own target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryInterrupt {
    /// Registration the scan matched.
    pub target: usize,
    /// Whether the scan skipped any tokens before stopping.
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseSignal {
    Error(ParseError),
    Recovery(RecoveryInterrupt),
    Backtrack,
}

impl fmt::Display for ParseSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseSignal::Error(error) => write!(f, "{error}"),
            ParseSignal::Recovery(interrupt) => {
                write!(f, "recovery interrupt for registration {}", interrupt.target)
            }
            ParseSignal::Backtrack => f.write_str("backtrack interrupt"),
        }
    }
}

impl From<ParseError> for ParseSignal {
    fn from(error: ParseError) -> Self {
        ParseSignal::Error(error)
    }
}

pub type ParseResult<T = ()> = Result<T, ParseSignal>;

/// Lets a grammar rule catch one kind of signal and pass the others on
/// with `?`.
pub trait SignalExt<T> {
    /// Turns a parse error into an `Ok(Err(error))` for the rule to handle.
    fn catch_error(self) -> ParseResult<Result<T, ParseError>>;

    /// Turns a backtrack interrupt into `Ok(None)`.
    fn catch_backtrack(self) -> ParseResult<Option<T>>;
}

impl<T> SignalExt<T> for ParseResult<T> {
    fn catch_error(self) -> ParseResult<Result<T, ParseError>> {
        match self {
            Ok(value) => Ok(Ok(value)),
            Err(ParseSignal::Error(error)) => Ok(Err(error)),
            Err(other) => Err(other),
        }
    }

    fn catch_backtrack(self) -> ParseResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(ParseSignal::Backtrack) => Ok(None),
            Err(other) => Err(other),
        }
    }
}
