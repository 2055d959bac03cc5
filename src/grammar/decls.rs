//! Namespace, type and property declarations.

use crate::parser::{Matcher, ParseResult, Parser, ScopeDetector, SignalExt};
use crate::token::TokenClass;

use super::{resync_on, semicolon, Construct};

pub(super) fn namespace_declaration(parser: &mut Parser<Construct>) -> ParseResult {
    parser.begin_segment();
    let header = (|| -> ParseResult {
        parser.match_token(TokenClass::KwNamespace)?;
        parser.match_node(Construct::identifier())?;
        parser.end_segment();
        parser.match_token(TokenClass::OpenBrace).map(drop)
    })();

    if let Err(error) = header.catch_error()? {
        parser.end_segment();
        parser.report(&error);
        if !resync_on(parser, TokenClass::OpenBrace, ScopeDetector::none())? {
            return Ok(());
        }
    }

    parser.next_is_sufficient();
    parser.match_node_within(
        Construct::DeclarationSet { inside: true },
        &[Matcher::from(TokenClass::CloseBrace)],
    )?;
    parser.match_or_report(TokenClass::CloseBrace);
    Ok(())
}

pub(super) fn type_declaration(parser: &mut Parser<Construct>) -> ParseResult {
    parser.begin_segment();
    let header = (|| -> ParseResult {
        parser.match_token(TokenClass::KwType)?;
        parser.next_is_sufficient();
        parser.match_node(Construct::identifier())?;
        if parser.lookahead_is(TokenClass::Less) {
            parser.match_node(Construct::GenericTypeDeclarator)?;
        }
        parser.end_segment();
        parser.match_token(TokenClass::KwAs).map(drop)
    })();

    if let Err(error) = header.catch_error()? {
        parser.end_segment();
        parser.report(&error);
        if !resync_on(parser, TokenClass::KwAs, ScopeDetector::none())? {
            return Ok(());
        }
    }

    let body = (|| -> ParseResult {
        parser.match_node_within(Construct::Type, &[Matcher::from(TokenClass::Semicolon)])?;
        semicolon(parser)
    })();

    if let Err(error) = body.catch_error()? {
        parser.report(&error);
        resync_on(parser, TokenClass::Semicolon, ScopeDetector::with_diamonds())?;
    }
    Ok(())
}

/// `name: Type;`, or `name: Type = value;` where initializers are allowed.
pub(super) fn property_declaration(parser: &mut Parser<Construct>, initializer: bool) -> ParseResult {
    let attempt = (|| -> ParseResult {
        parser.next_is_sufficient();
        parser.match_node(Construct::identifier())?;
        parser.match_token(TokenClass::Colon)?;
        if initializer {
            let recovery = [Matcher::from(TokenClass::Semicolon), Matcher::from(TokenClass::Assign)];
            parser.match_node_within(Construct::Type, &recovery)?;
            if parser.matches(TokenClass::Assign) {
                parser.match_node_within(Construct::Expression, &[Matcher::from(TokenClass::Semicolon)])?;
            }
        } else {
            parser.match_node_within(Construct::Type, &[Matcher::from(TokenClass::Semicolon)])?;
        }
        semicolon(parser)
    })();

    if let Err(error) = attempt.catch_error()? {
        parser.report(&error);
        resync_on(parser, TokenClass::Semicolon, ScopeDetector::standard())?;
    }
    Ok(())
}

/// Optional `extends A, B` clause of a contract.
pub(super) fn extends(parser: &mut Parser<Construct>) -> ParseResult {
    parser.now_is_sufficient();
    if !parser.matches(TokenClass::KwExtends) {
        return Ok(());
    }
    loop {
        parser.match_node(Construct::Type)?;
        if !parser.matches(TokenClass::Comma) {
            return Ok(());
        }
    }
}
