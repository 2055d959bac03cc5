//! Longest-match tokenizer.
//!
//! The scanner walks the source once. At each step it picks a scan mode from
//! the current character, measures the raw run that mode allows, and then
//! asks every token class regex how much of that run it can claim. The
//! longest claim wins (lower class priority breaks ties) and only the claimed
//! prefix is consumed; the rest of the run is scanned again as new tokens.
//!
//! Malformed input never stops the scan. Each problem is raised as a
//! `Lexical` diagnostic and scanning continues, so one stray character does
//! not hide every token after it.

use std::sync::Arc;

use crate::diagnostics::{Diagnostic, Sentinel};
use crate::source::{SourceSegment, SourceTable};
use crate::token::{Token, TokenClass, CLASSIFIERS};

/// Tokenizes `table`, collecting every diagnostic.
pub fn tokenize(table: &Arc<SourceTable>) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut sentinel = Sentinel::collecting();
    let tokens = tokenize_into(table, &mut sentinel).unwrap_or_default();
    (tokens, sentinel.into_diagnostics())
}

/// Tokenizes `table`, raising diagnostics into `sentinel`.
///
/// Returns `Err` only when the sentinel throws.
pub fn tokenize_into(
    table: &Arc<SourceTable>,
    sentinel: &mut Sentinel,
) -> Result<Vec<Token>, Diagnostic> {
    let before = sentinel.len();
    let mut tokenizer = Tokenizer {
        table,
        bytes: table.text().as_bytes(),
        pos: 0,
        tokens: Vec::new(),
    };
    while tokenizer.pos < tokenizer.bytes.len() {
        tokenizer.step(sentinel)?;
    }
    log::debug!(
        "tokenized {}: {} tokens, {} diagnostics",
        table.name(),
        tokenizer.tokens.len(),
        sentinel.len().saturating_sub(before)
    );
    Ok(tokenizer.tokens)
}

// ============================================================================
// SCANNER
// ============================================================================

/// The maximal run one scan mode allows at the cursor.
struct Run {
    len: usize,
    /// Closing quote injected to repair an unterminated literal.
    repair: Option<char>,
}

struct Tokenizer<'a> {
    table: &'a Arc<SourceTable>,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn text(&self) -> &'a str {
        self.table.text()
    }

    fn raise(
        &self,
        sentinel: &mut Sentinel,
        message: String,
        segment: SourceSegment,
    ) -> Result<(), Diagnostic> {
        sentinel.raise(Diagnostic::lexical(message).at(self.table, segment))
    }

    /// Scans at most one token starting at the cursor.
    fn step(&mut self, sentinel: &mut Sentinel) -> Result<(), Diagnostic> {
        self.skip_whitespace();
        if self.pos >= self.bytes.len() {
            return Ok(());
        }

        let start = self.pos;
        let Some(run) = self.scan_run(sentinel)? else {
            return Ok(());
        };
        if run.len == 0 {
            return Ok(());
        }

        let raw = &self.text()[start..start + run.len];
        let candidate = match run.repair {
            Some(quote) => format!("{raw}{quote}"),
            None => raw.to_string(),
        };

        let Some((class, matched)) = longest_match(&candidate) else {
            self.raise(
                sentinel,
                format!("'{raw}' is not a token"),
                SourceSegment::new(start, run.len),
            )?;
            self.pos = start + run.len;
            return Ok(());
        };

        match class {
            TokenClass::LineComment => self.skip_line_comment(start + matched),
            TokenClass::BlockComment => self.skip_block_comment(sentinel, start, matched)?,
            _ => {
                let len = matched.min(run.len);
                let text = if matched > run.len {
                    candidate
                } else {
                    candidate[..matched].to_string()
                };
                self.tokens
                    .push(Token::new(class, text, SourceSegment::new(start, len)));
                self.pos = start + len;
            }
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && is_whitespace(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    /// Measures the raw run at the cursor without moving it. Returns `None`
    /// after skipping a disallowed character.
    fn scan_run(&mut self, sentinel: &mut Sentinel) -> Result<Option<Run>, Diagnostic> {
        let bytes = self.bytes;
        let start = self.pos;
        let first = bytes[start];
        let mut end = start + 1;
        let mut repair = None;

        if is_alphanumeric(first) {
            let mut numeric = first.is_ascii_digit();
            while end < bytes.len() && (is_alphanumeric(bytes[end]) || (numeric && bytes[end] == b'.')) {
                if !bytes[end].is_ascii_digit() {
                    numeric = false;
                }
                end += 1;
            }
        } else if is_symbolic(first) && first != b'.' {
            while end < bytes.len() && is_symbolic(bytes[end]) {
                end += 1;
            }
        } else if first == b'\'' || first == b'"' {
            let mut escape = false;
            loop {
                if end >= bytes.len() || bytes[end] == b'\n' || bytes[end] == b'\r' {
                    let what = if first == b'\'' { "character" } else { "string" };
                    self.raise(
                        sentinel,
                        format!("unterminated {what} literal"),
                        SourceSegment::new(start, end - start),
                    )?;
                    repair = Some(first as char);
                    break;
                }
                let c = bytes[end];
                end += 1;
                if c == b'\\' {
                    escape = !escape;
                } else if !escape && c == first {
                    break;
                } else {
                    escape = false;
                }
            }
        } else if first == b'.' {
            if end < bytes.len() && bytes[end].is_ascii_digit() {
                while end < bytes.len() && is_alphanumeric(bytes[end]) {
                    end += 1;
                }
            } else {
                while end < bytes.len() && is_symbolic(bytes[end]) {
                    end += 1;
                }
            }
        } else {
            let c = self.text()[start..].chars().next().unwrap_or('\u{fffd}');
            self.raise(
                sentinel,
                format!("disallowed character '{c}'"),
                SourceSegment::new(start, c.len_utf8()),
            )?;
            self.pos = start + c.len_utf8();
            return Ok(None);
        }

        Ok(Some(Run {
            len: end - start,
            repair,
        }))
    }

    fn skip_line_comment(&mut self, from: usize) {
        self.pos = from;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    fn skip_block_comment(
        &mut self,
        sentinel: &mut Sentinel,
        start: usize,
        marker: usize,
    ) -> Result<(), Diagnostic> {
        let mut pos = start + marker;
        let mut ready = false;
        while pos < self.bytes.len() {
            match self.bytes[pos] {
                b'*' => ready = true,
                b'/' if ready => {
                    self.pos = pos + 1;
                    return Ok(());
                }
                _ => ready = false,
            }
            pos += 1;
        }
        self.pos = self.bytes.len();
        self.raise(
            sentinel,
            "unterminated multiline comment".to_string(),
            SourceSegment::new(start, self.bytes.len() - start),
        )
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

/// Finds the class claiming the longest non-empty prefix of `run`. Classes
/// are visited in priority order and only a strictly longer match replaces
/// the current best, so ties go to the lower id.
fn longest_match(run: &str) -> Option<(TokenClass, usize)> {
    let mut best: Option<(TokenClass, usize)> = None;
    for (class, regex) in CLASSIFIERS.iter() {
        if let Some(found) = regex.find(run) {
            let len = found.end();
            if len > 0 && best.map_or(true, |(_, longest)| len > longest) {
                best = Some((*class, len));
            }
        }
    }
    best
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\n' | b'\r' | b'\t' | b' ')
}

fn is_alphanumeric(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_symbolic(b: u8) -> bool {
    b"~!@%^&*()-=+[]{}|;:,<.>/?#\\".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(src: &str) -> Vec<TokenClass> {
        let table = Arc::new(SourceTable::from_text("t", src));
        tokenize(&table).0.into_iter().map(|t| t.class).collect()
    }

    #[test]
    fn keywords_beat_identifiers_on_ties() {
        assert_eq!(
            classes("type types null"),
            [TokenClass::KwType, TokenClass::Identifier, TokenClass::NullLiteral]
        );
    }

    #[test]
    fn symbolic_runs_split_at_the_longest_claim() {
        assert_eq!(
            classes("a<<=b);"),
            [
                TokenClass::Identifier,
                TokenClass::OtherAssign,
                TokenClass::Identifier,
                TokenClass::CloseParen,
                TokenClass::Semicolon,
            ]
        );
        assert_eq!(classes("==="), [TokenClass::StrictEquals]);
        assert_eq!(classes("="), [TokenClass::Assign]);
    }

    #[test]
    fn numbers() {
        assert_eq!(classes("12us"), [TokenClass::IntLiteral]);
        assert_eq!(classes("0x1F"), [TokenClass::IntLiteral]);
        assert_eq!(classes("1.5f"), [TokenClass::FloatLiteral]);
        assert_eq!(classes(".25"), [TokenClass::FloatLiteral]);
        assert_eq!(
            classes("a.b"),
            [TokenClass::Identifier, TokenClass::Dot, TokenClass::Identifier]
        );
    }

    #[test]
    fn escaped_quotes_stay_inside_literals() {
        let table = Arc::new(SourceTable::from_text("t", r#""a\"b" 'c'"#));
        let (tokens, diagnostics) = tokenize(&table);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].text, r#""a\"b""#);
        assert_eq!(tokens[1].class, TokenClass::CharLiteral);
    }

    #[test]
    fn unterminated_literal_is_repaired() {
        let table = Arc::new(SourceTable::from_text("t", "x = \"abc\ny"));
        let (tokens, diagnostics) = tokenize(&table);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message(), "unterminated string literal");
        let literal = &tokens[2];
        assert_eq!(literal.class, TokenClass::StringLiteral);
        assert_eq!(literal.text, "\"abc\"");
        assert_eq!(literal.segment, SourceSegment::new(4, 4));
        assert_eq!(tokens[3].text, "y");
    }

    #[test]
    fn comments_produce_no_tokens() {
        assert_eq!(
            classes("a // b\n/* c */ d /**/"),
            [TokenClass::Identifier, TokenClass::Identifier]
        );
    }

    #[test]
    fn bad_input_is_reported_and_skipped() {
        let table = Arc::new(SourceTable::from_text("t", "a @ b ` c /* open"));
        let (tokens, diagnostics) = tokenize(&table);
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message()).collect();
        assert_eq!(
            messages,
            [
                "'@' is not a token",
                "disallowed character '`'",
                "unterminated multiline comment"
            ]
        );
        assert_eq!(tokens.len(), 3);
    }
}
