//! Token classes and tokens.
//!
//! The class table below is the single source of truth for the lexical
//! grammar: every class has a fixed numeric id (which doubles as its
//! longest-match priority, lower wins on ties), the regular expression the
//! tokenizer classifies runs with, and the nickname parse errors use when they
//! say what was expected.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::source::SourceSegment;

/// One row of [`CLASS_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassEntry {
    pub class: TokenClass,
    pub pattern: &'static str,
    pub nickname: &'static str,
}

macro_rules! token_classes {
    ($( $variant:ident = $id:literal, $pattern:literal, $nickname:literal; )*) => {
        /// Lexical category of a token. The discriminant is the class priority.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum TokenClass {
            $( $variant = $id, )*
        }

        /// Every token class in priority order.
        pub const CLASS_TABLE: &[ClassEntry] = &[
            $( ClassEntry {
                class: TokenClass::$variant,
                pattern: $pattern,
                nickname: $nickname,
            }, )*
        ];

        impl TokenClass {
            /// The variant name, used by token dumps.
            pub const fn name(self) -> &'static str {
                match self {
                    $( TokenClass::$variant => stringify!($variant), )*
                }
            }
        }
    };
}

token_classes! {
    EndOfStream       = 0x00, "", "end-of-stream";
    NoToken           = 0x01, "", "<null>";

    KwContract        = 0x02, "contract", "'contract'";
    KwTemplate        = 0x03, "template", "'template'";
    KwNamespace       = 0x04, "namespace", "'namespace'";
    KwType            = 0x05, "type", "'type'";
    KwAs              = 0x06, "as", "'as'";
    KwExtends         = 0x07, "extends", "'extends'";
    KwFunction        = 0x08, "function", "'function'";
    KwSwitch          = 0x09, "switch", "'switch'";
    KwConstructor     = 0x0a, "constructor", "'constructor'";
    KwImport          = 0x0b, "import", "'import'";

    KwPublic          = 0x20, "public", "'public'";
    KwRestricted      = 0x21, "restricted", "'restricted'";
    KwPrivate         = 0x22, "private", "'private'";
    KwPartial         = 0x23, "partial", "'partial'";
    KwStatic          = 0x24, "static", "'static'";
    KwDefault         = 0x25, "default", "'default'";

    KwVoid            = 0x40, "void", "'void'";
    KwSatisfies       = 0x41, "satisfies", "'satisfies'";
    KwNew             = 0x42, "new", "'new'";
    KwThis            = 0x43, "this", "'this'";
    KwConflict        = 0x44, "conflict", "'conflict'";
    KwOperator        = 0x45, "operator", "'operator'";

    KwIf              = 0x60, "if", "'if'";
    KwWhile           = 0x61, "while", "'while'";
    KwFor             = 0x62, "for", "'for'";
    KwDo              = 0x63, "do", "'do'";
    KwCase            = 0x64, "case", "'case'";
    KwBreak           = 0x65, "break", "'break'";
    KwContinue        = 0x66, "continue", "'continue'";
    KwReturn          = 0x67, "return", "'return'";
    KwThrow           = 0x68, "throw", "'throw'";
    KwTry             = 0x69, "try", "'try'";
    KwCatch           = 0x6a, "catch", "'catch'";
    KwFinally         = 0x6b, "finally", "'finally'";
    KwVar             = 0x6c, "var", "'var'";
    KwDelegate        = 0x6d, "delegate", "'delegate'";

    OpenParen         = 0x80, r"\(", "'('";
    CloseParen        = 0x81, r"\)", "')'";
    OpenBracket       = 0x82, r"\[", "'['";
    CloseBracket      = 0x83, r"\]", "']'";
    OpenBrace         = 0x84, r"\{", "'{'";
    CloseBrace        = 0x85, r"\}", "'}'";
    Semicolon         = 0x86, ";", "';'";
    Colon             = 0x87, ":", "':'";
    Dot               = 0x88, r"\.", "'.'";
    Comma             = 0x89, ",", "','";
    Hash              = 0x8a, "#", "'#'";
    Backslash         = 0x8b, r"\\", r"'\'";

    Add               = 0xa0, r"\+", "'+'";
    Sub               = 0xa1, r"\-", "'-'";
    Mul               = 0xa2, r"\*", "'*'";
    Div               = 0xa3, "/", "'/'";
    Mod               = 0xa4, "%", "'%'";
    And               = 0xa5, "&", "'&'";
    Or                = 0xa6, r"\|", "'|'";
    Xor               = 0xa7, r"\^", "'^'";
    Shl               = 0xa8, "<<", "'<<'";
    Shr               = 0xa9, ">>", "'>>'";
    LazyAnd           = 0xaa, "&&", "'&&'";
    LazyOr            = 0xab, r"\|\|", "'||'";
    Inc               = 0xac, r"\+\+", "'++'";
    Dec               = 0xad, r"\-\-", "'--'";
    LogicalNot        = 0xae, "!", "'!'";
    BitwiseNot        = 0xaf, "~", "'~'";
    Equals            = 0xb0, "==", "'=='";
    NotEquals         = 0xb1, "!=", "'!='";
    StrictEquals      = 0xb2, "===", "'==='";
    StrictNotEquals   = 0xb3, "!==", "'!=='";
    Greater           = 0xb4, ">", "'>'";
    GreaterOrEqual    = 0xb5, ">=", "'>='";
    Less              = 0xb6, "<", "'<'";
    LessOrEqual       = 0xb7, "<=", "'<='";
    Optional          = 0xb8, r"\?", "'?'";
    Arrow             = 0xb9, r"\->", "'->'";
    Assign            = 0xba, "=", "'='";
    OtherAssign       = 0xbb, r":?(\+|\-|\*|/|%|&|\||\^|<<|>>)?=", "assignment-operator";

    NoName            = 0xd0, r"\-\-\-", "'---'";
    NullLiteral       = 0xd1, "null", "'null'";
    BoolLiteral       = 0xd2, "true|false", "bool-literal";
    IntLiteral        = 0xd3, "(0x[0-9A-Fa-f]+|0b[01]+|0o[0-7]+|[0-9]+)(us|ub|L|U|u|s|b)?", "int-literal";
    FloatLiteral      = 0xd4, r"([0-9]*\.[0-9]+|[0-9]+\.)[fd]?", "float-literal";
    CharLiteral       = 0xd5, "'.*'", "char-literal";
    StringLiteral     = 0xd6, "\".*\"", "string-literal";
    Identifier        = 0xd7, "[A-Za-z$_][A-Za-z0-9$_]*", "identifier";

    LineComment       = 0xf0, "//", "comment";
    BlockComment      = 0xf1, r"/\*", "comment";
}

/// Anchored classifiers for every class that can appear in source.
pub(crate) static CLASSIFIERS: Lazy<Vec<(TokenClass, Regex)>> = Lazy::new(|| {
    CLASS_TABLE
        .iter()
        .filter(|entry| !entry.pattern.is_empty())
        .map(|entry| {
            let regex = Regex::new(&format!("^(?:{})", entry.pattern))
                .expect("token class patterns are valid regular expressions");
            (entry.class, regex)
        })
        .collect()
});

impl TokenClass {
    pub const fn priority(self) -> u8 {
        self as u8
    }

    pub fn from_priority(id: u8) -> Option<TokenClass> {
        CLASS_TABLE
            .binary_search_by_key(&id, |entry| entry.class.priority())
            .ok()
            .map(|index| CLASS_TABLE[index].class)
    }

    fn entry(self) -> &'static ClassEntry {
        // every variant has exactly one row and the table is sorted by id
        let index = CLASS_TABLE
            .binary_search_by_key(&self.priority(), |entry| entry.class.priority())
            .unwrap_or(0);
        &CLASS_TABLE[index]
    }

    /// Human name used in "expected ..." messages.
    pub fn nickname(self) -> &'static str {
        self.entry().nickname
    }

    pub fn pattern(self) -> &'static str {
        self.entry().pattern
    }

    pub fn is_keyword(self) -> bool {
        (0x02..0x80).contains(&self.priority())
    }

    pub fn is_delimiter(self) -> bool {
        (0x80..0xa0).contains(&self.priority())
    }

    pub fn is_operator(self) -> bool {
        (0xa0..0xd0).contains(&self.priority())
    }

    pub fn is_literal(self) -> bool {
        (0xd0..0xd7).contains(&self.priority())
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenClass::LineComment | TokenClass::BlockComment)
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TokenClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ============================================================================
// TOKEN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub class: TokenClass,
    pub text: String,
    pub segment: SourceSegment,
}

impl Token {
    pub fn new(class: TokenClass, text: impl Into<String>, segment: SourceSegment) -> Self {
        Self {
            class,
            text: text.into(),
            segment,
        }
    }

    /// The zero-length end-of-stream marker at byte offset `at`.
    pub fn end_of_stream(at: usize) -> Self {
        Self::new(TokenClass::EndOfStream, "", SourceSegment::empty_at(at))
    }

    /// The null marker returned for look-behind past the first token.
    pub fn none() -> Self {
        Self::new(TokenClass::NoToken, "", SourceSegment::default())
    }

    pub fn is(&self, class: TokenClass) -> bool {
        self.class == class
    }

    pub fn is_end(&self) -> bool {
        self.class == TokenClass::EndOfStream
    }

    /// How the token is quoted in diagnostics: its text, or the class
    /// nickname for markers without text.
    pub fn describe(&self) -> String {
        if self.text.is_empty() {
            self.class.nickname().to_string()
        } else {
            format!("'{}'", self.text)
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} \"{}\"]", self.class, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_priority() {
        assert!(CLASS_TABLE
            .windows(2)
            .all(|pair| pair[0].class.priority() < pair[1].class.priority()));
    }

    #[test]
    fn every_pattern_compiles() {
        let with_patterns = CLASS_TABLE.iter().filter(|e| !e.pattern.is_empty()).count();
        assert_eq!(CLASSIFIERS.len(), with_patterns);
    }

    #[test]
    fn lookup_by_priority() {
        assert_eq!(TokenClass::from_priority(0x05), Some(TokenClass::KwType));
        assert_eq!(TokenClass::from_priority(0xd7), Some(TokenClass::Identifier));
        assert_eq!(TokenClass::from_priority(0x30), None);
    }

    #[test]
    fn categories() {
        assert!(TokenClass::KwDelegate.is_keyword());
        assert!(TokenClass::Backslash.is_delimiter());
        assert!(TokenClass::OtherAssign.is_operator());
        assert!(TokenClass::StringLiteral.is_literal());
        assert!(!TokenClass::Identifier.is_literal());
        assert!(TokenClass::BlockComment.is_comment());
    }

    #[test]
    fn nicknames_and_display() {
        assert_eq!(TokenClass::Semicolon.nickname(), "';'");
        assert_eq!(TokenClass::OtherAssign.nickname(), "assignment-operator");
        let token = Token::new(TokenClass::KwType, "type", SourceSegment::new(0, 4));
        assert_eq!(token.to_string(), "[KwType \"type\"]");
        assert_eq!(token.describe(), "'type'");
        assert_eq!(Token::end_of_stream(3).describe(), "end-of-stream");
    }
}
