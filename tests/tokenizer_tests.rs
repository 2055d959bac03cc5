use std::sync::Arc;

use wickit::{tokenize, tokenize_into, DiagnosticKind, Sentinel, SentinelMode, SourceTable, TokenClass};

fn lex(src: &str) -> Vec<(TokenClass, String)> {
    let table = Arc::new(SourceTable::from_text("lex.wckt", src));
    let (tokens, diagnostics) = tokenize(&table);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    tokens.into_iter().map(|t| (t.class, t.text)).collect()
}

fn classes(src: &str) -> Vec<TokenClass> {
    lex(src).into_iter().map(|(class, _)| class).collect()
}

#[test]
fn declaration_line() {
    assert_eq!(
        lex("type Pair<T> as (T, T) -> void;"),
        [
            (TokenClass::KwType, "type".to_string()),
            (TokenClass::Identifier, "Pair".to_string()),
            (TokenClass::Less, "<".to_string()),
            (TokenClass::Identifier, "T".to_string()),
            (TokenClass::Greater, ">".to_string()),
            (TokenClass::KwAs, "as".to_string()),
            (TokenClass::OpenParen, "(".to_string()),
            (TokenClass::Identifier, "T".to_string()),
            (TokenClass::Comma, ",".to_string()),
            (TokenClass::Identifier, "T".to_string()),
            (TokenClass::CloseParen, ")".to_string()),
            (TokenClass::Arrow, "->".to_string()),
            (TokenClass::KwVoid, "void".to_string()),
            (TokenClass::Semicolon, ";".to_string()),
        ]
    );
}

#[test]
fn longest_operator_wins() {
    assert_eq!(classes("a+++b"), [TokenClass::Identifier, TokenClass::Inc, TokenClass::Add, TokenClass::Identifier]);
    assert_eq!(classes("x !== y"), [TokenClass::Identifier, TokenClass::StrictNotEquals, TokenClass::Identifier]);
    assert_eq!(classes("x :+= y"), [TokenClass::Identifier, TokenClass::OtherAssign, TokenClass::Identifier]);
    assert_eq!(classes("---"), [TokenClass::NoName]);
    assert_eq!(classes("a&&b||c"), [
        TokenClass::Identifier,
        TokenClass::LazyAnd,
        TokenClass::Identifier,
        TokenClass::LazyOr,
        TokenClass::Identifier,
    ]);
}

#[test]
fn literals() {
    assert_eq!(
        classes("null true 0b101 0o17 42L 3. 'c' \"s\""),
        [
            TokenClass::NullLiteral,
            TokenClass::BoolLiteral,
            TokenClass::IntLiteral,
            TokenClass::IntLiteral,
            TokenClass::IntLiteral,
            TokenClass::FloatLiteral,
            TokenClass::CharLiteral,
            TokenClass::StringLiteral,
        ]
    );
}

#[test]
fn identifiers_may_use_dollar_and_underscore() {
    assert_eq!(lex("$tmp _x1"), [
        (TokenClass::Identifier, "$tmp".to_string()),
        (TokenClass::Identifier, "_x1".to_string()),
    ]);
}

#[test]
fn throwing_sentinel_stops_at_the_first_problem() {
    let table = Arc::new(SourceTable::from_text("lex.wckt", "a @ b ` c"));
    let mut sentinel = Sentinel::new(SentinelMode::Throw);
    let thrown = tokenize_into(&table, &mut sentinel).unwrap_err();
    assert_eq!(thrown.kind(), DiagnosticKind::Lexical);
    assert_eq!(thrown.message(), "'@' is not a token");
    assert!(sentinel.is_empty());
}

#[test]
fn ignoring_sentinel_drops_problems_but_keeps_scanning() {
    let table = Arc::new(SourceTable::from_text("lex.wckt", "a @ b ` c"));
    let mut sentinel = Sentinel::new(SentinelMode::Ignore);
    let tokens = tokenize_into(&table, &mut sentinel).unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(sentinel.is_empty());
}

#[test]
fn lexical_diagnostics_point_at_the_offending_text() {
    let table = Arc::new(SourceTable::from_text("lex.wckt", "x = 1;\ny = 'q;"));
    let (_, diagnostics) = tokenize(&table);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message(), "unterminated character literal");
    let coords = diagnostics[0].coords().unwrap();
    assert_eq!((coords.row, coords.col), (2, 5));
}
