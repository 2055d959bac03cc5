//! Expressions.
//!
//! Seventeen helper layers, loosest first:
//!
//! | layer | operators |
//! |-------|-----------|
//! | 0 | `=` and compound assignment (right-associative) |
//! | 1 | `? :` |
//! | 2 | `\|\|` |
//! | 3 | `&&` |
//! | 4 | `\|` |
//! | 5 | `^` |
//! | 6 | `&` |
//! | 7 | `==` `!=` `===` `!==` |
//! | 8 | `<` `>` `<=` `>=` `satisfies (T)` |
//! | 9 | `<<` `>>` |
//! | 10 | `+` `-` |
//! | 11 | `*` `/` `%` |
//! | 12 | `<T>` casts |
//! | 13 | prefix `+ - ! ~ ++ --` |
//! | 14 | postfix `++ --` |
//! | 15 | `.name`, `[i]`, `(args)` |
//! | 16 | parenthesised expressions, literals, `this`, names |

use crate::parser::{Matcher, ParseResult, Parser, ScopeDetector, SignalExt};
use crate::token::TokenClass;

use super::{at_identifier, resync_on, Construct, EXPRESSION_LAYERS};

const OR_LAYER: &[TokenClass] = &[TokenClass::LazyOr];
const AND_LAYER: &[TokenClass] = &[TokenClass::LazyAnd];
const BIT_OR_LAYER: &[TokenClass] = &[TokenClass::Or];
const XOR_LAYER: &[TokenClass] = &[TokenClass::Xor];
const BIT_AND_LAYER: &[TokenClass] = &[TokenClass::And];
const EQUALITY_LAYER: &[TokenClass] = &[
    TokenClass::Equals,
    TokenClass::NotEquals,
    TokenClass::StrictEquals,
    TokenClass::StrictNotEquals,
];
const RELATIONAL_LAYER: &[TokenClass] = &[
    TokenClass::Greater,
    TokenClass::Less,
    TokenClass::GreaterOrEqual,
    TokenClass::LessOrEqual,
];
const SHIFT_LAYER: &[TokenClass] = &[TokenClass::Shl, TokenClass::Shr];
const ADDITIVE_LAYER: &[TokenClass] = &[TokenClass::Add, TokenClass::Sub];
const MULTIPLICATIVE_LAYER: &[TokenClass] = &[TokenClass::Mul, TokenClass::Div, TokenClass::Mod];
const PREFIX_OPERATORS: &[TokenClass] = &[
    TokenClass::Add,
    TokenClass::Sub,
    TokenClass::LogicalNot,
    TokenClass::BitwiseNot,
    TokenClass::Inc,
    TokenClass::Dec,
];

pub(super) fn layer(parser: &mut Parser<Construct>, level: u8) -> ParseResult {
    debug_assert!(level < EXPRESSION_LAYERS, "no expression layer {level}");
    match level {
        0 => assignment(parser)?,
        1 => ternary(parser)?,
        2 => binary(parser, level, OR_LAYER)?,
        3 => binary(parser, level, AND_LAYER)?,
        4 => binary(parser, level, BIT_OR_LAYER)?,
        5 => binary(parser, level, XOR_LAYER)?,
        6 => binary(parser, level, BIT_AND_LAYER)?,
        7 => binary(parser, level, EQUALITY_LAYER)?,
        8 => relational(parser)?,
        9 => binary(parser, level, SHIFT_LAYER)?,
        10 => binary(parser, level, ADDITIVE_LAYER)?,
        11 => binary(parser, level, MULTIPLICATIVE_LAYER)?,
        12 => cast_layer(parser)?,
        13 => prefix(parser)?,
        14 => postfix(parser)?,
        15 => access(parser)?,
        _ => primary(parser)?,
    }
    parser.now_is_sufficient();
    Ok(())
}

fn lookahead_in(parser: &Parser<Construct>, classes: &[TokenClass]) -> Option<TokenClass> {
    classes.iter().copied().find(|class| parser.lookahead_is(*class))
}

/// Left-associative `operand (op operand)*`.
fn binary(parser: &mut Parser<Construct>, level: u8, operators: &[TokenClass]) -> ParseResult {
    parser.match_node(Construct::layer(level + 1))?;
    while let Some(class) = lookahead_in(parser, operators) {
        parser.match_node(Construct::binary(class))?;
        parser.match_node(Construct::layer(level + 1))?;
        parser.reassociate_under(1);
    }
    Ok(())
}

fn assignment(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_node(Construct::layer(1))?;
    if parser.lookahead_is(TokenClass::Assign) || parser.lookahead_is(TokenClass::OtherAssign) {
        parser.match_node(Construct::Assignment { op: String::new() })?;
        parser.match_node(Construct::layer(0))?;
        parser.reassociate_under(1);
    }
    Ok(())
}

pub(super) fn assignment_operator(parser: &mut Parser<Construct>, op: &mut String) -> ParseResult {
    let token = if parser.lookahead_is(TokenClass::OtherAssign) {
        parser.match_token(TokenClass::OtherAssign)?
    } else {
        parser.match_token(TokenClass::Assign)?
    };
    *op = token.text;
    Ok(())
}

fn ternary(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_node(Construct::layer(2))?;
    if parser.lookahead_is(TokenClass::Optional) {
        parser.match_node(Construct::Ternary)?;
        parser.match_node(Construct::layer(0))?;
        parser.match_token(TokenClass::Colon)?;
        parser.match_node(Construct::layer(1))?;
        parser.reassociate_under(1);
    }
    Ok(())
}

fn relational(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_node(Construct::layer(9))?;
    loop {
        if let Some(class) = lookahead_in(parser, RELATIONAL_LAYER) {
            parser.match_node(Construct::binary(class))?;
            parser.match_node(Construct::layer(9))?;
        } else if parser.lookahead_is(TokenClass::KwSatisfies) {
            parser.match_node(Construct::Satisfies)?;
        } else {
            return Ok(());
        }
        parser.reassociate_under(1);
    }
}

/// `satisfies (Type)`
pub(super) fn satisfies(parser: &mut Parser<Construct>) -> ParseResult {
    parser.begin_segment();
    parser.match_token(TokenClass::KwSatisfies)?;
    parser.next_is_sufficient();
    parser.match_token(TokenClass::OpenParen)?;
    closed_type(parser, TokenClass::CloseParen)
}

fn cast_layer(parser: &mut Parser<Construct>) -> ParseResult {
    if parser.lookahead_is(TokenClass::Less) {
        parser.match_node(Construct::Cast)?;
        parser.match_node(Construct::layer(12))?;
        parser.reassociate_under(0);
        Ok(())
    } else {
        parser.match_node(Construct::layer(13))
    }
}

/// `<Type>` in front of an operand.
pub(super) fn cast(parser: &mut Parser<Construct>) -> ParseResult {
    parser.begin_segment();
    parser.next_is_sufficient();
    parser.match_token(TokenClass::Less)?;
    closed_type(parser, TokenClass::Greater)
}

/// A type followed by `close`, with the segment ending at `close`.
fn closed_type(parser: &mut Parser<Construct>, close: TokenClass) -> ParseResult {
    let body = (|| -> ParseResult {
        parser.match_node_within(Construct::Type, &[Matcher::from(close)])?;
        parser.match_token(close)?;
        parser.end_segment();
        Ok(())
    })();
    if let Err(error) = body.catch_error()? {
        parser.end_segment();
        parser.report(&error);
        resync_on(parser, close, ScopeDetector::with_diamonds())?;
    }
    Ok(())
}

fn prefix(parser: &mut Parser<Construct>) -> ParseResult {
    match lookahead_in(parser, PREFIX_OPERATORS) {
        Some(class) => {
            parser.match_node(Construct::prefix(class))?;
            parser.match_node(Construct::layer(13))?;
            parser.reassociate_pre_unary();
            Ok(())
        }
        None => parser.match_node(Construct::layer(14)),
    }
}

fn postfix(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_node(Construct::layer(15))?;
    while let Some(class) = lookahead_in(parser, &[TokenClass::Inc, TokenClass::Dec]) {
        parser.match_node(Construct::postfix(class))?;
        parser.reassociate_post_unary();
    }
    Ok(())
}

fn access(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_node(Construct::layer(16))?;
    loop {
        if parser.lookahead_is(TokenClass::Dot) {
            parser.match_node(Construct::MemberAccess)?;
        } else if parser.lookahead_is(TokenClass::OpenBracket) {
            parser.match_node(Construct::Subscript)?;
        } else if parser.lookahead_is(TokenClass::OpenParen) {
            parser.match_node(Construct::Invocation)?;
        } else {
            return Ok(());
        }
        parser.reassociate_under(1);
    }
}

pub(super) fn member_access(parser: &mut Parser<Construct>) -> ParseResult {
    parser.match_token(TokenClass::Dot)?;
    parser.match_node(Construct::identifier())
}

/// Comma-separated expressions between `open` and `close`, as used by
/// subscripts and invocations.
pub(super) fn argument_list(parser: &mut Parser<Construct>, open: TokenClass, close: TokenClass) -> ParseResult {
    parser.begin_segment();
    parser.next_is_sufficient();
    parser.match_token(open)?;
    let arguments = (|| -> ParseResult {
        while !parser.matches(close) {
            parser.match_node_within(Construct::layer(0), &[Matcher::from(close)])?;
            if !parser.lookahead_is(close) {
                parser.match_token(TokenClass::Comma)?;
            }
        }
        parser.end_segment();
        Ok(())
    })();
    if let Err(error) = arguments.catch_error()? {
        parser.end_segment();
        parser.report(&error);
        resync_on(parser, close, ScopeDetector::standard())?;
    }
    Ok(())
}

fn primary(parser: &mut Parser<Construct>) -> ParseResult {
    if parser.matches(TokenClass::OpenParen) {
        let inner = (|| -> ParseResult {
            parser.next_is_sufficient();
            parser.match_node_within(Construct::layer(0), &[Matcher::from(TokenClass::CloseParen)])
        })();
        if let Err(error) = inner.catch_error()? {
            parser.report(&error);
            return resync_on(parser, TokenClass::CloseParen, ScopeDetector::standard()).map(drop);
        }
        parser.match_token(TokenClass::CloseParen).map(drop)
    } else if parser.look_ahead().class.is_literal() && !parser.lookahead_is(TokenClass::NoName) {
        let class = parser.look_ahead().class;
        parser.match_node(Construct::Literal {
            class,
            text: String::new(),
        })
    } else if parser.lookahead_is(TokenClass::KwThis) {
        parser.match_node(Construct::This)
    } else if at_identifier(parser) {
        parser.match_node(Construct::identifier())
    } else {
        Err(parser.unexpected("expression"))
    }
}
