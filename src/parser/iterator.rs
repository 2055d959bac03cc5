//! Cursor over a token sequence.

use crate::source::SourceSegment;
use crate::token::{Token, TokenClass};

/// A change made to the token sequence while parsing.
#[derive(Debug, Clone)]
enum Edit {
    /// A synthetic token was inserted at this index.
    Inserted(usize),
    /// The token at this index was split; holds the original.
    Split(usize, Token),
}

/// A cursor over the tokens of one compilation unit.
///
/// `position` is the index of the look-ahead token. Reads past the end yield
/// an end-of-stream token anchored at the end of the source; reads before the
/// start yield the `NoToken` marker.
///
/// Insertions and splits are journaled so a rewind can take them back.
#[derive(Debug, Clone)]
pub struct TokenIterator {
    tokens: Vec<Token>,
    position: usize,
    edits: Vec<Edit>,
    end_of_stream: Token,
    none: Token,
}

impl TokenIterator {
    /// `source_len` anchors the end-of-stream token.
    pub fn new(tokens: Vec<Token>, source_len: usize) -> Self {
        Self {
            tokens,
            position: 0,
            edits: Vec::new(),
            end_of_stream: Token::end_of_stream(source_len),
            none: Token::none(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Moves the cursor to `position`, clamped to the end of the stream.
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.tokens.len());
    }

    /// Consumes and returns the look-ahead token. At the end of the stream
    /// the cursor stays put and end-of-stream is returned.
    pub fn next(&mut self) -> &Token {
        if self.position < self.tokens.len() {
            self.position += 1;
            &self.tokens[self.position - 1]
        } else {
            &self.end_of_stream
        }
    }

    pub fn look_ahead(&self) -> &Token {
        self.peek(0)
    }

    /// The most recently consumed token.
    pub fn latest(&self) -> &Token {
        self.peek(-1)
    }

    /// Token at `offset` from the look-ahead: `0` is the look-ahead itself,
    /// `-1` the latest consumed token.
    pub fn peek(&self, offset: isize) -> &Token {
        let index = self.position as isize + offset;
        if index < 0 {
            &self.none
        } else {
            self.tokens.get(index as usize).unwrap_or(&self.end_of_stream)
        }
    }

    /// Inserts a zero-length token at the cursor so the next read returns it.
    /// It is anchored just past the latest token.
    pub fn insert_synthetic(&mut self, class: TokenClass, text: impl Into<String>) {
        let at = if self.position > 0 {
            self.latest().segment.end()
        } else {
            self.look_ahead().segment.position
        };
        let token = Token::new(class, text, SourceSegment::empty_at(at));
        self.tokens.insert(self.position, token);
        self.edits.push(Edit::Inserted(self.position));
    }

    /// Splits the look-ahead token after `at` bytes into two tokens of the
    /// given classes, e.g. `>>` into `>` `>` when closing nested generics.
    /// Does nothing at the end of the stream or when `at` is not inside the
    /// token text.
    pub fn split_look_ahead(&mut self, at: usize, first: TokenClass, second: TokenClass) {
        let Some(token) = self.tokens.get(self.position) else {
            return;
        };
        if at == 0 || at >= token.text.len() || !token.text.is_char_boundary(at) {
            return;
        }
        let head = Token::new(
            first,
            &token.text[..at],
            SourceSegment::new(token.segment.position, at),
        );
        let tail = Token::new(
            second,
            &token.text[at..],
            SourceSegment::new(token.segment.position + at, token.segment.length.saturating_sub(at)),
        );
        let original = std::mem::replace(&mut self.tokens[self.position], head);
        self.tokens.insert(self.position + 1, tail);
        self.edits.push(Edit::Split(self.position, original));
    }

    /// Number of insertions and splits made so far.
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Undoes every edit past the first `count`, newest first, leaving the
    /// token sequence as it was when [`TokenIterator::edit_count`] returned
    /// `count`. The cursor is clamped but otherwise left alone.
    pub fn revert_edits(&mut self, count: usize) {
        while self.edits.len() > count {
            match self.edits.pop() {
                Some(Edit::Inserted(at)) => {
                    self.tokens.remove(at);
                }
                Some(Edit::Split(at, original)) => {
                    self.tokens.remove(at + 1);
                    self.tokens[at] = original;
                }
                None => break,
            }
        }
        self.position = self.position.min(self.tokens.len());
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> TokenIterator {
        let tokens = vec![
            Token::new(TokenClass::Identifier, "a", SourceSegment::new(0, 1)),
            Token::new(TokenClass::Add, "+", SourceSegment::new(2, 1)),
            Token::new(TokenClass::Identifier, "b", SourceSegment::new(4, 1)),
        ];
        TokenIterator::new(tokens, 5)
    }

    #[test]
    fn bounded_look_around() {
        let mut tokens = stream();
        assert!(tokens.latest().is(TokenClass::NoToken));
        assert_eq!(tokens.peek(2).text, "b");
        assert!(tokens.peek(3).is_end());
        assert_eq!(tokens.peek(3).segment, SourceSegment::empty_at(5));

        tokens.next();
        assert_eq!(tokens.latest().text, "a");
        assert_eq!(tokens.look_ahead().text, "+");
        assert_eq!(tokens.peek(-1).text, "a");
        assert!(tokens.peek(-2).is(TokenClass::NoToken));
    }

    #[test]
    fn next_stops_at_end() {
        let mut tokens = stream();
        tokens.seek(10);
        assert_eq!(tokens.position(), 3);
        assert!(tokens.next().is_end());
        assert_eq!(tokens.position(), 3);
    }

    #[test]
    fn synthetic_tokens_are_read_next() {
        let mut tokens = stream();
        tokens.next();
        tokens.insert_synthetic(TokenClass::Semicolon, ";");
        let synthetic = tokens.next().clone();
        assert_eq!(synthetic.class, TokenClass::Semicolon);
        assert_eq!(synthetic.segment, SourceSegment::empty_at(1));
        assert_eq!(tokens.look_ahead().text, "+");
    }

    #[test]
    fn split_breaks_a_token_in_two() {
        let mut tokens = TokenIterator::new(
            vec![Token::new(TokenClass::Shr, ">>", SourceSegment::new(3, 2))],
            5,
        );
        tokens.split_look_ahead(1, TokenClass::Greater, TokenClass::Greater);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.peek(0).segment, SourceSegment::new(3, 1));
        assert_eq!(tokens.peek(1).segment, SourceSegment::new(4, 1));
        assert!(tokens.peek(1).is(TokenClass::Greater));
    }

    #[test]
    fn reverting_restores_the_original_sequence() {
        let mut tokens = TokenIterator::new(
            vec![
                Token::new(TokenClass::Identifier, "a", SourceSegment::new(0, 1)),
                Token::new(TokenClass::Shr, ">>", SourceSegment::new(2, 2)),
                Token::new(TokenClass::Identifier, "b", SourceSegment::new(5, 1)),
            ],
            6,
        );
        let before: Vec<String> = tokens.tokens().iter().map(|t| t.text.clone()).collect();
        let count = tokens.edit_count();

        tokens.next();
        tokens.insert_synthetic(TokenClass::Semicolon, ";");
        tokens.next();
        tokens.split_look_ahead(1, TokenClass::Greater, TokenClass::Greater);
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens.edit_count(), count + 2);

        tokens.revert_edits(count);
        tokens.seek(1);
        let after: Vec<String> = tokens.tokens().iter().map(|t| t.text.clone()).collect();
        assert_eq!(after, before);
        assert_eq!(tokens.look_ahead().segment, SourceSegment::new(2, 2));
        assert_eq!(tokens.edit_count(), count);
    }
}
