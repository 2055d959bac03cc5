//! Type expressions.
//!
//! Precedence, loosest first: `|` unions, `&` intersections, function types,
//! `[]` and `?` postfixes, then unit types (parenthesised types, contracts,
//! switch functions and named references). Each level is a helper that parses
//! flat siblings and folds them with `reassociate_under`.

use crate::parser::{Matcher, ParseResult, ParseSignal, Parser, ScopeDetector, SignalExt};
use crate::token::TokenClass;

use super::{at_identifier, resync_on, Construct};

pub(super) fn type_expression(parser: &mut Parser<Construct>) -> ParseResult {
    parser.next_is_sufficient();
    parser.match_node(Construct::TypeDisjunction)
}

pub(super) fn disjunction(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_node(Construct::TypeConjunction)?;
    while parser.lookahead_is(TokenClass::Or) {
        parser.match_node(Construct::TypeUnion)?;
        parser.match_node(Construct::TypeConjunction)?;
        parser.reassociate_under(1);
    }
    parser.now_is_sufficient();
    Ok(())
}

pub(super) fn conjunction(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_node(Construct::PossibleFunctionType)?;
    while parser.lookahead_is(TokenClass::And) {
        parser.match_node(Construct::TypeIntersection)?;
        parser.match_node(Construct::PossibleFunctionType)?;
        parser.reassociate_under(1);
    }
    parser.now_is_sufficient();
    Ok(())
}

/// Either a function type `(A, B) -> R`, `A -> R`, `<T>(x: T) -> void`, or a
/// plain postfix type.
///
/// A parenthesised list is taken as parameters when a scan to its closing
/// `)` finds a top-level comma or a `->` right after it. Anything else is
/// parsed once as a postfix type, which becomes the sole parameter if `->`
/// follows.
pub(super) fn possible_function_type(parser: &mut Parser<Construct>) -> ParseResult {
    if parser.lookahead_is(TokenClass::Less) {
        parser.match_node(Construct::GenericTypeDeclarator)?;
        parser.match_node(Construct::FunctionTypeParameters { bare: false })?;
    } else if parser.lookahead_is(TokenClass::OpenParen) && parameter_list_ahead(parser) {
        parser.match_node(Construct::FunctionTypeParameters { bare: false })?;
    } else {
        parser.match_node(Construct::PostfixType)?;
        if !parser.lookahead_is(TokenClass::Arrow) {
            parser.now_is_sufficient();
            return Ok(());
        }
        parser.match_node(Construct::FunctionTypeParameters { bare: true })?;
        parser.reassociate_under(parser.degree() - 1);
    }

    parser.match_node(Construct::FunctionType)?;
    if parser.matches(TokenClass::KwVoid) {
        parser.reassociate_under(parser.degree() - 1);
    } else {
        parser.match_node(Construct::PostfixType)?;
        parser.reassociate_under(parser.degree() - 2);
    }
    parser.now_is_sufficient();
    Ok(())
}

pub(super) fn postfix_type(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_node(Construct::UnitType)?;
    loop {
        if parser.lookahead_is(TokenClass::OpenBracket) {
            parser.match_node(Construct::ArrayPostfix)?;
        } else if parser.lookahead_is(TokenClass::Optional) {
            parser.match_node(Construct::OptionalPostfix)?;
        } else {
            break;
        }
        parser.reassociate_under(1);
    }
    parser.now_is_sufficient();
    Ok(())
}

pub(super) fn unit_type(parser: &mut Parser<Construct>) -> ParseResult {
    if parser.matches(TokenClass::OpenParen) {
        let inner = (|| -> ParseResult {
            parser.next_is_sufficient();
            parser.match_node_within(Construct::TypeDisjunction, &[Matcher::from(TokenClass::CloseParen)])?;
            parser.match_token(TokenClass::CloseParen).map(drop)
        })();
        if let Err(error) = inner.catch_error()? {
            parser.report(&error);
            resync_on(parser, TokenClass::CloseParen, ScopeDetector::with_diamonds())?;
        }
        Ok(())
    } else if parser.lookahead_is(TokenClass::KwContract) {
        parser.next_is_sufficient();
        parser.match_node(Construct::ContractType)
    } else if parser.lookahead_is(TokenClass::KwSwitch) {
        parser.next_is_sufficient();
        parser.match_node(Construct::SwitchFunctionType)
    } else if at_identifier(parser) {
        parser.next_is_sufficient();
        parser.match_node(Construct::TypeReference)
    } else {
        Err(parser.unexpected("type-expression"))
    }
}

/// Scans from the look-ahead `(` to its partner without consuming anything.
/// The group is a parameter list when it holds a comma at its own level or
/// is followed by `->`.
fn parameter_list_ahead(parser: &Parser<Construct>) -> bool {
    let tokens = parser.tokens();
    let mut depth = 0usize;
    let mut offset = 0isize;
    loop {
        let token = tokens.peek(offset);
        match token.class {
            TokenClass::EndOfStream => return false,
            TokenClass::OpenParen | TokenClass::OpenBracket | TokenClass::OpenBrace | TokenClass::Less => {
                depth += 1;
            }
            TokenClass::CloseParen | TokenClass::CloseBracket | TokenClass::CloseBrace | TokenClass::Greater => {
                depth = depth.saturating_sub(1);
            }
            TokenClass::Shr => depth = depth.saturating_sub(2),
            TokenClass::Comma if depth == 1 => return true,
            _ => {}
        }
        offset += 1;
        if depth == 0 {
            return tokens.peek(offset).is(TokenClass::Arrow);
        }
    }
}

/// `()`, `(A, B)`, or a single unparenthesised parameter type. A `bare`
/// list adopts the type its caller already parsed.
pub(super) fn function_type_parameters(parser: &mut Parser<Construct>, bare: bool) -> ParseResult {
    if bare {
        parser.now_is_sufficient();
        let latest = parser.latest().segment;
        parser.override_segment(latest);
        return Ok(());
    }

    parser.next_is_sufficient();
    if !parser.matches(TokenClass::OpenParen) {
        return parser.match_node(Construct::PostfixType);
    }
    if parser.matches(TokenClass::CloseParen) {
        return Ok(());
    }

    let close = [Matcher::from(TokenClass::CloseParen)];
    let list = (|| -> ParseResult {
        parser.match_node_within(Construct::Type, &close)?;
        while parser.matches(TokenClass::Comma) {
            parser.match_node_within(Construct::Type, &close)?;
        }
        parser.match_token(TokenClass::CloseParen).map(drop)
    })();
    if let Err(error) = list.catch_error()? {
        parser.report(&error);
        resync_on(parser, TokenClass::CloseParen, ScopeDetector::with_diamonds())?;
    }
    Ok(())
}

pub(super) fn type_reference(parser: &mut Parser<Construct>) -> ParseResult {
    parser.next_is_sufficient();
    parser.match_node(Construct::StaticSymbol)?;
    if parser.lookahead_is(TokenClass::Less) {
        parser.match_node(Construct::GenericTypeSpecifier)?;
    }
    Ok(())
}

/// `contract extends A { name: Type; ... }`
pub(super) fn contract_type(parser: &mut Parser<Construct>) -> ParseResult {
    parser.next_is_sufficient();
    parser.match_token(TokenClass::KwContract)?;
    let open = [Matcher::from(TokenClass::OpenBrace)];
    let header = (|| -> ParseResult {
        parser.match_node_within(Construct::Extends, &open)?;
        parser.match_token(TokenClass::OpenBrace).map(drop)
    })();
    if let Err(error) = header.catch_error()? {
        parser.report(&error);
        if !resync_on(parser, TokenClass::OpenBrace, ScopeDetector::with_diamonds())? {
            return Ok(());
        }
    }

    let close = [Matcher::from(TokenClass::CloseBrace)];
    while !parser.lookahead_is(TokenClass::CloseBrace) && !parser.lookahead_is(TokenClass::EndOfStream) {
        parser.match_node_within(Construct::PropertyDeclaration { initializer: false }, &close)?;
    }
    parser.match_or_report(TokenClass::CloseBrace);
    Ok(())
}

/// `switch function { case(A): R; ... }`
pub(super) fn switch_function_type(parser: &mut Parser<Construct>) -> ParseResult {
    parser.next_is_sufficient();
    parser.match_token(TokenClass::KwSwitch)?;
    let header = parser
        .match_token(Matcher::sequence([TokenClass::KwFunction, TokenClass::OpenBrace]))
        .catch_error()?;
    if let Err(error) = header {
        parser.report(&error);
        if !resync_on(parser, TokenClass::OpenBrace, ScopeDetector::with_diamonds())? {
            return Ok(());
        }
    }

    let recovery = [Matcher::from(TokenClass::CloseBrace), Matcher::from(TokenClass::Semicolon)];
    while !parser.lookahead_is(TokenClass::CloseBrace) && !parser.lookahead_is(TokenClass::EndOfStream) {
        let start = parser.position();
        parser.match_node_within(Construct::AbstractSwitchFunctionCase, &recovery)?;
        if parser.lookahead_is(TokenClass::EndOfStream) {
            break;
        }
        if !parser.match_or_report(TokenClass::Semicolon) && parser.position() == start {
            parser.skip_token();
        }
    }
    parser.match_or_report(TokenClass::CloseBrace);
    Ok(())
}

pub(super) fn switch_function_case(parser: &mut Parser<Construct>) -> ParseResult {
    parser.next_is_sufficient();
    parser.match_node(Construct::identifier())?;
    if !parser.lookahead_is(TokenClass::OpenParen) {
        if let ParseSignal::Error(error) = parser.unexpected("'('") {
            parser.report(&error);
        }
        let diamonds = ScopeDetector::none()
            .with(TokenClass::Less, TokenClass::Greater)
            .with(TokenClass::OpenBrace, TokenClass::CloseBrace);
        parser.panic_until(&[Matcher::from(TokenClass::OpenParen)], diamonds)?;
        if parser.lookahead_is(TokenClass::EndOfStream) {
            return Ok(());
        }
    }

    let signature = (|| -> ParseResult {
        parser.match_node(Construct::FunctionTypeParameters { bare: false })?;
        parser.match_token(TokenClass::Colon)?;
        if !parser.matches(TokenClass::KwVoid) {
            parser.match_node(Construct::Type)?;
        }
        Ok(())
    })();
    if let Err(error) = signature.catch_error()? {
        parser.report(&error);
        parser.panic_until(&[Matcher::from(TokenClass::Semicolon)], ScopeDetector::with_diamonds())?;
    }
    Ok(())
}

/// `<A, B>` after a type name, or `<T satisfies C>` in a declaration. `item`
/// is the construct each entry parses as.
pub(super) fn generic_list(parser: &mut Parser<Construct>, item: Construct) -> ParseResult {
    parser.match_token(TokenClass::Less)?;
    let list = (|| -> ParseResult {
        parser.next_is_sufficient();
        parser.match_node(item.clone())?;
        while parser.matches(TokenClass::Comma) {
            parser.match_node(item.clone())?;
        }
        Ok(())
    })();
    if let Err(error) = list.catch_error()? {
        parser.report(&error);
        let closers = [Matcher::from(TokenClass::Greater), Matcher::from(TokenClass::Shr)];
        parser.panic_until(&closers, ScopeDetector::with_diamonds())?;
        if parser.lookahead_is(TokenClass::EndOfStream) {
            return Ok(());
        }
    }
    close_generic(parser)
}

/// Matches one `>`, splitting a `>>` that closes two lists at once.
fn close_generic(parser: &mut Parser<Construct>) -> ParseResult {
    if parser.lookahead_is(TokenClass::Shr) {
        parser.split_look_ahead(1, TokenClass::Greater, TokenClass::Greater);
    }
    parser.match_token(TokenClass::Greater).map(drop)
}

pub(super) fn generic_type(parser: &mut Parser<Construct>) -> ParseResult {
    parser.next_is_sufficient();
    parser.match_node(Construct::identifier())?;
    if parser.matches(TokenClass::KwSatisfies) {
        parser.match_node(Construct::Type)?;
    }
    Ok(())
}
