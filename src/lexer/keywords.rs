//! Keyword recognition for Cypher.
//!
//! Cypher keywords are case-insensitive.

use super::token::TokenKind;

/// Looks up a keyword by name (case-insensitive).
pub fn lookup_keyword(name: &str) -> Option<TokenKind> {
    match name.to_ascii_uppercase().as_str() {
        // Clauses
        "MATCH" => Some(TokenKind::Match),
        "OPTIONAL" => Some(TokenKind::Optional),
        "WHERE" => Some(TokenKind::Where),
        "WITH" => Some(TokenKind::With),
        "RETURN" => Some(TokenKind::Return),
        "UNWIND" => Some(TokenKind::Unwind),
        "ORDER" => Some(TokenKind::Order),
        "BY" => Some(TokenKind::By),
        "ASC" => Some(TokenKind::Asc),
        "ASCENDING" => Some(TokenKind::Ascending),
        "DESC" => Some(TokenKind::Desc),
        "DESCENDING" => Some(TokenKind::Descending),
        "SKIP" => Some(TokenKind::Skip),
        "LIMIT" => Some(TokenKind::Limit),
        "DISTINCT" => Some(TokenKind::Distinct),
        "AS" => Some(TokenKind::As),

        // Logical operators
        "AND" => Some(TokenKind::And),
        "OR" => Some(TokenKind::Or),
        "XOR" => Some(TokenKind::Xor),
        "NOT" => Some(TokenKind::Not),
        "IS" => Some(TokenKind::Is),
        "IN" => Some(TokenKind::In),

        // String predicates
        "STARTS" => Some(TokenKind::Starts),
        "ENDS" => Some(TokenKind::Ends),
        "CONTAINS" => Some(TokenKind::Contains),

        // Literals
        "TRUE" => Some(TokenKind::True),
        "FALSE" => Some(TokenKind::False),
        "NULL" => Some(TokenKind::Null),

        _ => None,
    }
}

/// Returns true if the given name is a reserved keyword.
pub fn is_keyword(name: &str) -> bool {
    lookup_keyword(name).is_some()
}
