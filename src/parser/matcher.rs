//! Token-window predicates and nesting trackers.

use crate::parser::iterator::TokenIterator;
use crate::token::TokenClass;

/// A positional pattern over the tokens starting at the look-ahead: one
/// `(class, literal)` pair per offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pattern: Vec<(TokenClass, Option<String>)>,
}

impl Matcher {
    pub fn sequence(classes: impl IntoIterator<Item = TokenClass>) -> Self {
        Self {
            pattern: classes.into_iter().map(|class| (class, None)).collect(),
        }
    }

    /// A single token of `class` whose text is exactly `text`.
    pub fn literal(class: TokenClass, text: impl Into<String>) -> Self {
        Self {
            pattern: vec![(class, Some(text.into()))],
        }
    }

    pub fn then(mut self, class: TokenClass) -> Self {
        self.pattern.push((class, None));
        self
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Offset of the first token that does not fit, or `None` when the whole
    /// window matches.
    pub fn mismatch(&self, tokens: &TokenIterator) -> Option<usize> {
        self.pattern.iter().enumerate().position(|(offset, (class, literal))| {
            let token = tokens.peek(offset as isize);
            token.class != *class || literal.as_ref().is_some_and(|text| token.text != *text)
        })
    }

    pub fn matches(&self, tokens: &TokenIterator) -> bool {
        self.mismatch(tokens).is_none()
    }

    /// What the matcher expects at `offset`, for error messages.
    pub fn describe_at(&self, offset: usize) -> String {
        match self.pattern.get(offset) {
            Some((_, Some(text))) => format!("'{text}'"),
            Some((class, None)) => class.nickname().to_string(),
            None => String::from("nothing"),
        }
    }

    pub fn describe(&self) -> String {
        (0..self.pattern.len())
            .map(|offset| self.describe_at(offset))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<TokenClass> for Matcher {
    fn from(class: TokenClass) -> Self {
        Self::sequence([class])
    }
}

/// Tracks nesting depth of paired delimiters during a panic scan.
///
/// Depth never goes negative: a closer with no matching opener is ignored,
/// which keeps unbalanced input from wedging the scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeDetector {
    pairs: Vec<(TokenClass, TokenClass)>,
    depths: Vec<usize>,
}

impl ScopeDetector {
    pub fn none() -> Self {
        Self::default()
    }

    /// `()`, `[]` and `{}`.
    pub fn standard() -> Self {
        Self::none()
            .with(TokenClass::OpenParen, TokenClass::CloseParen)
            .with(TokenClass::OpenBracket, TokenClass::CloseBracket)
            .with(TokenClass::OpenBrace, TokenClass::CloseBrace)
    }

    pub fn braces() -> Self {
        Self::none().with(TokenClass::OpenBrace, TokenClass::CloseBrace)
    }

    /// Standard pairs plus `<>`.
    pub fn with_diamonds() -> Self {
        Self::standard().with(TokenClass::Less, TokenClass::Greater)
    }

    pub fn with(mut self, open: TokenClass, close: TokenClass) -> Self {
        self.pairs.push((open, close));
        self.depths.push(0);
        self
    }

    pub fn feed(&mut self, class: TokenClass) {
        for (index, (open, close)) in self.pairs.iter().enumerate() {
            if class == *open {
                self.depths[index] += 1;
            } else if class == *close {
                self.depths[index] = self.depths[index].saturating_sub(1);
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.depths.iter().sum()
    }

    pub fn is_outside(&self) -> bool {
        self.depth() == 0
    }

    /// Whether `class` closes a pair this detector has seen opened.
    pub fn closes_open_scope(&self, class: TokenClass) -> bool {
        self.pairs
            .iter()
            .zip(&self.depths)
            .any(|((_, close), depth)| *close == class && *depth > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceSegment;
    use crate::token::Token;

    fn tokens(classes: &[(TokenClass, &str)]) -> TokenIterator {
        let tokens = classes
            .iter()
            .enumerate()
            .map(|(i, (class, text))| Token::new(*class, *text, SourceSegment::new(i * 2, text.len())))
            .collect();
        TokenIterator::new(tokens, classes.len() * 2)
    }

    #[test]
    fn sequence_reports_first_mismatch() {
        let stream = tokens(&[(TokenClass::Dot, "."), (TokenClass::Identifier, "x")]);
        let wildcard = Matcher::from(TokenClass::Dot).then(TokenClass::Mul);
        assert_eq!(wildcard.mismatch(&stream), Some(1));
        assert_eq!(wildcard.describe(), "'.' '*'");
        assert!(Matcher::sequence([TokenClass::Dot, TokenClass::Identifier]).matches(&stream));
    }

    #[test]
    fn literal_compares_text() {
        let stream = tokens(&[(TokenClass::Identifier, "get")]);
        assert!(Matcher::literal(TokenClass::Identifier, "get").matches(&stream));
        assert!(!Matcher::literal(TokenClass::Identifier, "set").matches(&stream));
        assert_eq!(Matcher::literal(TokenClass::Identifier, "set").describe(), "'set'");
    }

    #[test]
    fn scope_depth_never_negative() {
        let mut detector = ScopeDetector::standard();
        detector.feed(TokenClass::CloseParen);
        assert!(detector.is_outside());
        detector.feed(TokenClass::OpenBrace);
        detector.feed(TokenClass::OpenParen);
        assert_eq!(detector.depth(), 2);
        detector.feed(TokenClass::CloseParen);
        detector.feed(TokenClass::CloseBrace);
        assert!(detector.is_outside());
    }

    #[test]
    fn only_open_scopes_are_closed() {
        let mut detector = ScopeDetector::standard();
        assert!(!detector.closes_open_scope(TokenClass::CloseBrace));
        detector.feed(TokenClass::OpenBrace);
        assert!(detector.closes_open_scope(TokenClass::CloseBrace));
        assert!(!detector.closes_open_scope(TokenClass::CloseParen));
        assert!(!detector.closes_open_scope(TokenClass::OpenBrace));
    }

    #[test]
    fn diamonds_only_when_requested() {
        let mut plain = ScopeDetector::standard();
        plain.feed(TokenClass::Less);
        assert!(plain.is_outside());

        let mut diamonds = ScopeDetector::with_diamonds();
        diamonds.feed(TokenClass::Less);
        assert_eq!(diamonds.depth(), 1);
    }
}
