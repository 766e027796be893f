//! Token types and representations for Cypher lexical analysis.

use crate::ast::Span;
use smol_str::SmolStr;
use std::fmt;

/// The kind of a lexical token in Cypher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Clause keywords
    Match,
    Optional,
    Where,
    With,
    Return,
    Unwind,
    Order,
    By,
    Asc,
    Ascending,
    Desc,
    Descending,
    Skip,
    Limit,
    Distinct,
    As,

    // Logical operators (also keywords)
    And,
    Or,
    Xor,
    Not,
    Is,
    In,

    // String predicate keywords
    Starts,
    Ends,
    Contains,

    // Literal keywords
    True,
    False,
    Null,

    // Literals and names
    Identifier(SmolStr),
    DelimitedIdentifier(SmolStr),
    StringLiteral(SmolStr),
    IntegerLiteral(SmolStr),
    FloatLiteral(SmolStr),
    Parameter(SmolStr),

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    DotDot,
    Pipe,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Eq,
    NotEq,
    NotEqBang,
    Lt,
    LtEq,
    Gt,
    GtEq,
    RegexMatch,
    Arrow,
    LeftArrow,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns true for tokens that carry a name usable as an identifier.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_) | TokenKind::DelimitedIdentifier(_)
        )
    }

    /// Returns true for keyword tokens.
    ///
    /// Cypher allows keywords as property keys, labels and aliases, so the
    /// parser uses this to accept them in name positions.
    pub fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    /// Returns the canonical upper-case text of a keyword token.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Match => "MATCH",
            TokenKind::Optional => "OPTIONAL",
            TokenKind::Where => "WHERE",
            TokenKind::With => "WITH",
            TokenKind::Return => "RETURN",
            TokenKind::Unwind => "UNWIND",
            TokenKind::Order => "ORDER",
            TokenKind::By => "BY",
            TokenKind::Asc => "ASC",
            TokenKind::Ascending => "ASCENDING",
            TokenKind::Desc => "DESC",
            TokenKind::Descending => "DESCENDING",
            TokenKind::Skip => "SKIP",
            TokenKind::Limit => "LIMIT",
            TokenKind::Distinct => "DISTINCT",
            TokenKind::As => "AS",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Xor => "XOR",
            TokenKind::Not => "NOT",
            TokenKind::Is => "IS",
            TokenKind::In => "IN",
            TokenKind::Starts => "STARTS",
            TokenKind::Ends => "ENDS",
            TokenKind::Contains => "CONTAINS",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Null => "NULL",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword_text() {
            return write!(f, "{keyword}");
        }

        match self {
            TokenKind::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenKind::DelimitedIdentifier(name) => write!(f, "identifier `{name}`"),
            TokenKind::StringLiteral(_) => write!(f, "string literal"),
            TokenKind::IntegerLiteral(text) => write!(f, "integer '{text}'"),
            TokenKind::FloatLiteral(text) => write!(f, "float '{text}'"),
            TokenKind::Parameter(name) => write!(f, "parameter '${name}'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::DotDot => write!(f, "'..'"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::NotEq => write!(f, "'<>'"),
            TokenKind::NotEqBang => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::LtEq => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::GtEq => write!(f, "'>='"),
            TokenKind::RegexMatch => write!(f, "'=~'"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::LeftArrow => write!(f, "'<-'"),
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// A token with its location in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the source slice covered by this token.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_creation() {
        let token = Token::new(TokenKind::Match, 0..5);
        assert_eq!(token.kind, TokenKind::Match);
        assert_eq!(token.span, 0..5);
    }

    #[test]
    fn token_slice() {
        let source = "MATCH (n)";
        let token = Token::new(TokenKind::Match, 0..5);
        assert_eq!(token.slice(source), "MATCH");
    }

    #[test]
    fn keyword_display_is_upper_case() {
        assert_eq!(TokenKind::Match.to_string(), "MATCH");
        assert_eq!(TokenKind::Contains.to_string(), "CONTAINS");
        assert_eq!(TokenKind::Arrow.to_string(), "'->'");
    }

    #[test]
    fn identifiers_are_not_keywords() {
        let ident = TokenKind::Identifier("person".into());
        assert!(ident.is_identifier());
        assert!(!ident.is_keyword());
        assert!(TokenKind::Return.is_keyword());
    }
}
