//! The Wickit reference grammar.
//!
//! One [`Construct`] variant per rule. Payloads a later phase needs (an
//! identifier's text, an operator's spelling, the wildcard flag of an import)
//! are typed fields filled in while the rule parses. The rule bodies live in
//! the submodules, grouped the way the language reference groups them.

mod decls;
mod exprs;
mod general;
mod types;

use crate::ast::Syntax;
use crate::parser::{ExpectationMode, Matcher, ParseResult, Parser, ScopeDetector, SignalExt};
use crate::token::TokenClass;

/// Number of expression precedence layers. Layer 0 binds loosest.
pub const EXPRESSION_LAYERS: u8 = 17;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    // general
    CompilationUnit,
    ImportDeclaration { wildcard: bool },
    /// Declarations up to end of input, or up to `}` when `inside` a namespace.
    DeclarationSet { inside: bool },
    /// A stray `;` between declarations.
    EmptyDeclaration,
    NamespaceDeclaration,
    TypeDeclaration,
    PropertyDeclaration { initializer: bool },
    Extends,
    StaticSymbol,
    Identifier { name: String },

    // types
    Type,
    TypeDisjunction,
    TypeConjunction,
    PossibleFunctionType,
    PostfixType,
    UnitType,
    TypeUnion,
    TypeIntersection,
    ArrayPostfix,
    OptionalPostfix,
    FunctionType,
    /// A `bare` list is the single unparenthesised type in front of `->`.
    /// It consumes nothing and adopts that type once it completes.
    FunctionTypeParameters { bare: bool },
    TypeReference,
    ContractType,
    SwitchFunctionType,
    AbstractSwitchFunctionCase,
    GenericTypeDeclarator,
    GenericType,
    GenericTypeSpecifier,

    // expressions
    Expression,
    ExpressionLayer(u8),
    Assignment { op: String },
    Ternary,
    BinaryOperator { class: TokenClass, op: String },
    PrefixOperator { class: TokenClass, op: String },
    PostfixOperator { class: TokenClass, op: String },
    Satisfies,
    Cast,
    MemberAccess,
    Subscript,
    Invocation,
    Literal { class: TokenClass, text: String },
    This,
}

impl Construct {
    pub fn identifier() -> Self {
        Construct::Identifier {
            name: String::new(),
        }
    }

    pub fn binary(class: TokenClass) -> Self {
        Construct::BinaryOperator {
            class,
            op: String::new(),
        }
    }

    pub fn prefix(class: TokenClass) -> Self {
        Construct::PrefixOperator {
            class,
            op: String::new(),
        }
    }

    pub fn postfix(class: TokenClass) -> Self {
        Construct::PostfixOperator {
            class,
            op: String::new(),
        }
    }

    pub fn layer(level: u8) -> Self {
        Construct::ExpressionLayer(level)
    }
}

impl Syntax for Construct {
    fn rule_name(&self) -> &'static str {
        match self {
            Construct::CompilationUnit => "compilation-unit",
            Construct::ImportDeclaration { .. } => "import-declaration",
            Construct::DeclarationSet { .. } => "declaration-set",
            Construct::EmptyDeclaration => "empty-declaration",
            Construct::NamespaceDeclaration => "namespace-declaration",
            Construct::TypeDeclaration => "type-declaration",
            Construct::PropertyDeclaration { .. } => "property-declaration",
            Construct::Extends => "extends",
            Construct::StaticSymbol => "static-symbol",
            Construct::Identifier { .. } => "identifier",

            Construct::Type => "type",
            Construct::TypeDisjunction => "type-disjunction",
            Construct::TypeConjunction => "type-conjunction",
            Construct::PossibleFunctionType => "possible-function-type",
            Construct::PostfixType => "postfix-type",
            Construct::UnitType => "unit-type",
            Construct::TypeUnion => "type-union",
            Construct::TypeIntersection => "type-intersection",
            Construct::ArrayPostfix => "array-postfix",
            Construct::OptionalPostfix => "optional-postfix",
            Construct::FunctionType => "function-type",
            Construct::FunctionTypeParameters { .. } => "function-type-parameters",
            Construct::TypeReference => "type-reference",
            Construct::ContractType => "contract-type",
            Construct::SwitchFunctionType => "switch-function-type",
            Construct::AbstractSwitchFunctionCase => "abstract-switch-function-case",
            Construct::GenericTypeDeclarator => "generic-type-declarator",
            Construct::GenericType => "generic-type",
            Construct::GenericTypeSpecifier => "generic-type-specifier",

            Construct::Expression | Construct::ExpressionLayer(_) => "expression",
            Construct::Assignment { .. } => "assignment",
            Construct::Ternary => "ternary",
            Construct::BinaryOperator { .. } => "binary-operator",
            Construct::PrefixOperator { .. } => "prefix-operator",
            Construct::PostfixOperator { .. } => "postfix-operator",
            Construct::Satisfies => "satisfies",
            Construct::Cast => "cast",
            Construct::MemberAccess => "member-access",
            Construct::Subscript => "subscript",
            Construct::Invocation => "function-invocation",
            Construct::Literal { .. } => "literal",
            Construct::This => "this",
        }
    }

    fn is_helper(&self) -> bool {
        matches!(
            self,
            Construct::DeclarationSet { .. }
                | Construct::TypeDisjunction
                | Construct::TypeConjunction
                | Construct::PossibleFunctionType
                | Construct::PostfixType
                | Construct::UnitType
                | Construct::ExpressionLayer(_)
        )
    }

    fn detail(&self) -> Option<String> {
        match self {
            Construct::Identifier { name } => Some(name.clone()),
            Construct::ImportDeclaration { wildcard: true } => Some(String::from("wildcard")),
            Construct::Assignment { op }
            | Construct::BinaryOperator { op, .. }
            | Construct::PrefixOperator { op, .. }
            | Construct::PostfixOperator { op, .. } => Some(op.clone()),
            Construct::Literal { text, .. } => Some(text.clone()),
            _ => None,
        }
    }

    fn parse(&mut self, parser: &mut Parser<Self>) -> ParseResult {
        match self {
            Construct::CompilationUnit => general::compilation_unit(parser),
            Construct::ImportDeclaration { wildcard } => general::import_declaration(parser, wildcard),
            Construct::DeclarationSet { inside } => general::declaration_set(parser, *inside),
            Construct::EmptyDeclaration => parser.match_token(TokenClass::Semicolon).map(drop),
            Construct::StaticSymbol => general::static_symbol(parser),
            Construct::Identifier { name } => general::identifier(parser, name),

            Construct::NamespaceDeclaration => decls::namespace_declaration(parser),
            Construct::TypeDeclaration => decls::type_declaration(parser),
            Construct::PropertyDeclaration { initializer } => {
                decls::property_declaration(parser, *initializer)
            }
            Construct::Extends => decls::extends(parser),

            Construct::Type => types::type_expression(parser),
            Construct::TypeDisjunction => types::disjunction(parser),
            Construct::TypeConjunction => types::conjunction(parser),
            Construct::PossibleFunctionType => types::possible_function_type(parser),
            Construct::PostfixType => types::postfix_type(parser),
            Construct::UnitType => types::unit_type(parser),
            Construct::TypeUnion => parser.match_token(TokenClass::Or).map(drop),
            Construct::TypeIntersection => parser.match_token(TokenClass::And).map(drop),
            Construct::ArrayPostfix => parser
                .match_token(Matcher::sequence([
                    TokenClass::OpenBracket,
                    TokenClass::CloseBracket,
                ]))
                .map(drop),
            Construct::OptionalPostfix => parser.match_token(TokenClass::Optional).map(drop),
            Construct::FunctionType => parser.match_token(TokenClass::Arrow).map(drop),
            Construct::FunctionTypeParameters { bare } => types::function_type_parameters(parser, *bare),
            Construct::TypeReference => types::type_reference(parser),
            Construct::ContractType => types::contract_type(parser),
            Construct::SwitchFunctionType => types::switch_function_type(parser),
            Construct::AbstractSwitchFunctionCase => types::switch_function_case(parser),
            Construct::GenericTypeDeclarator => types::generic_list(parser, Construct::GenericType),
            Construct::GenericType => types::generic_type(parser),
            Construct::GenericTypeSpecifier => types::generic_list(parser, Construct::Type),

            Construct::Expression => parser.match_node(Construct::layer(0)),
            Construct::ExpressionLayer(level) => exprs::layer(parser, *level),
            Construct::Assignment { op } => exprs::assignment_operator(parser, op),
            Construct::Ternary => parser.match_token(TokenClass::Optional).map(drop),
            Construct::BinaryOperator { class, op }
            | Construct::PrefixOperator { class, op }
            | Construct::PostfixOperator { class, op } => {
                *op = parser.match_token(*class)?.text;
                Ok(())
            }
            Construct::Satisfies => exprs::satisfies(parser),
            Construct::Cast => exprs::cast(parser),
            Construct::MemberAccess => exprs::member_access(parser),
            Construct::Subscript => {
                exprs::argument_list(parser, TokenClass::OpenBracket, TokenClass::CloseBracket)
            }
            Construct::Invocation => {
                exprs::argument_list(parser, TokenClass::OpenParen, TokenClass::CloseParen)
            }
            Construct::Literal { class, text } => {
                *text = parser.match_token(*class)?.text;
                Ok(())
            }
            Construct::This => parser.match_token(TokenClass::KwThis).map(drop),
        }
    }
}

/// Whether the look-ahead can start an identifier: a plain name, an
/// `operator` name, or the no-name placeholder `---`.
pub(crate) fn at_identifier(parser: &Parser<Construct>) -> bool {
    parser.lookahead_is(TokenClass::Identifier)
        || parser.lookahead_is(TokenClass::KwOperator)
        || parser.lookahead_is(TokenClass::NoName)
}

/// Panic-scans to `target` after an error has been reported and consumes it.
/// Returns `false` when the scan ran out of input instead, in which case
/// nothing more is reported.
pub(crate) fn resync_on(parser: &mut Parser<Construct>, target: TokenClass, detector: ScopeDetector) -> ParseResult<bool> {
    parser.panic_until(&[Matcher::from(target)], detector)?;
    Ok(parser.matches(target))
}

/// Matches a `;`. When it is missing at the end of a line, the error is
/// reported and a synthetic `;` is inserted so parsing carries on as if it
/// had been written.
pub(crate) fn semicolon(parser: &mut Parser<Construct>) -> ParseResult {
    match parser.match_token(TokenClass::Semicolon).catch_error()? {
        Ok(_) => Ok(()),
        Err(error) if error.mode == ExpectationMode::After => {
            parser.report(&error);
            parser.substitute(TokenClass::Semicolon, ";");
            parser.match_token(TokenClass::Semicolon).map(drop)
        }
        Err(error) => Err(error.into()),
    }
}
