//! Compilation units, imports, declaration lists and names.

use crate::parser::{Matcher, ParseResult, Parser, ScopeDetector, SignalExt};
use crate::token::TokenClass;

use super::{at_identifier, resync_on, semicolon, Construct};

pub(super) fn compilation_unit(parser: &mut Parser<Construct>) -> ParseResult {
    parser.now_is_sufficient();
    let import_recovery = [Matcher::from(TokenClass::KwImport), Matcher::from(TokenClass::EndOfStream)];
    while parser.lookahead_is(TokenClass::KwImport) {
        parser.match_node_within(Construct::ImportDeclaration { wildcard: false }, &import_recovery)?;
    }

    parser.match_node_within(
        Construct::DeclarationSet { inside: false },
        &[Matcher::from(TokenClass::EndOfStream)],
    )?;
    parser.match_or_report(TokenClass::EndOfStream);
    Ok(())
}

pub(super) fn import_declaration(parser: &mut Parser<Construct>, wildcard: &mut bool) -> ParseResult {
    let attempt = (|| -> ParseResult {
        parser.match_token(TokenClass::KwImport)?;
        parser.next_is_sufficient();
        parser.match_node(Construct::StaticSymbol)?;
        if parser.matches(TokenClass::Dot) {
            parser.match_token(TokenClass::Mul)?;
            *wildcard = true;
        }
        semicolon(parser)
    })();

    if let Err(error) = attempt.catch_error()? {
        parser.report(&error);
        resync_on(parser, TokenClass::Semicolon, ScopeDetector::none())?;
    }
    Ok(())
}

fn declaration_starters() -> [Matcher; 2] {
    [
        Matcher::from(TokenClass::KwNamespace),
        Matcher::from(TokenClass::KwType),
    ]
}

pub(super) fn declaration_set(parser: &mut Parser<Construct>, inside: bool) -> ParseResult {
    parser.now_is_sufficient();
    let starters = declaration_starters();
    loop {
        if parser.lookahead_is(TokenClass::EndOfStream)
            || (inside && parser.lookahead_is(TokenClass::CloseBrace))
        {
            return Ok(());
        }

        let start = parser.position();
        let attempt = if parser.lookahead_is(TokenClass::KwNamespace) {
            parser.match_node_within(Construct::NamespaceDeclaration, &starters)
        } else if parser.lookahead_is(TokenClass::KwType) {
            parser.match_node_within(Construct::TypeDeclaration, &starters)
        } else if parser.lookahead_is(TokenClass::Semicolon) {
            parser.skip_node(Construct::EmptyDeclaration)
        } else if at_identifier(parser) {
            parser.match_node_within(Construct::PropertyDeclaration { initializer: true }, &starters)
        } else {
            Err(parser.unexpected("declaration"))
        };

        if let Err(error) = attempt.catch_error()? {
            parser.report(&error);
            parser.panic_until(&starters, ScopeDetector::braces())?;
        }

        if parser.position() == start && !parser.lookahead_is(TokenClass::EndOfStream) {
            log::trace!("no progress at {}, skipping it", parser.look_ahead());
            parser.skip_token();
        }
    }
}

/// Dotted name. Stops before a trailing `.*` so the import can see it.
pub(super) fn static_symbol(parser: &mut Parser<Construct>) -> ParseResult {
    parser.begin_segment();
    let wildcard = Matcher::sequence([TokenClass::Dot, TokenClass::Mul]);
    loop {
        parser.match_node(Construct::identifier())?;
        if parser.lookahead_is(wildcard.clone()) || !parser.matches(TokenClass::Dot) {
            break;
        }
    }
    parser.now_is_sufficient();
    parser.end_segment();
    Ok(())
}

pub(super) fn identifier(parser: &mut Parser<Construct>, name: &mut String) -> ParseResult {
    if parser.matches(TokenClass::Identifier) {
        parser.now_is_sufficient();
        *name = parser.latest().text.clone();
        Ok(())
    } else if parser.matches(TokenClass::NoName) {
        parser.now_is_sufficient();
        name.clear();
        Ok(())
    } else if parser.matches(TokenClass::KwOperator) {
        *name = format!("operator{}", operator_name(parser)?);
        parser.now_is_sufficient();
        Ok(())
    } else {
        Err(parser.unexpected("identifier"))
    }
}

/// The symbol after `operator`: an overloadable operator, `\+` / `\-` for
/// the unary forms, or `[]` / `()` with an optional `=` for the assigning
/// forms.
fn operator_name(parser: &mut Parser<Construct>) -> ParseResult<String> {
    let look_ahead = parser.look_ahead().clone();
    match look_ahead.class {
        TokenClass::Add
        | TokenClass::Sub
        | TokenClass::Mul
        | TokenClass::Div
        | TokenClass::Mod
        | TokenClass::And
        | TokenClass::Or
        | TokenClass::Xor
        | TokenClass::Shl
        | TokenClass::Shr
        | TokenClass::BitwiseNot
        | TokenClass::LogicalNot
        | TokenClass::Greater
        | TokenClass::Less
        | TokenClass::GreaterOrEqual
        | TokenClass::LessOrEqual
        | TokenClass::Inc
        | TokenClass::Dec => {
            parser.skip_token();
            Ok(look_ahead.text)
        }
        TokenClass::OtherAssign if !look_ahead.text.starts_with(':') => {
            parser.skip_token();
            Ok(look_ahead.text)
        }
        TokenClass::Backslash => {
            parser.skip_token();
            if parser.matches(TokenClass::Add) {
                Ok(String::from("\\+"))
            } else if parser.matches(TokenClass::Sub) {
                Ok(String::from("\\-"))
            } else {
                Err(parser.unexpected("'+' or '-'"))
            }
        }
        TokenClass::OpenBracket | TokenClass::OpenParen => {
            parser.skip_token();
            let close = if look_ahead.class == TokenClass::OpenBracket {
                TokenClass::CloseBracket
            } else {
                TokenClass::CloseParen
            };
            let closing = parser.match_token(close)?;
            let mut symbol = format!("{}{}", look_ahead.text, closing.text);
            if parser.matches(TokenClass::Assign) {
                symbol.push('=');
            }
            Ok(symbol)
        }
        _ => Err(parser.unexpected("operator")),
    }
}
