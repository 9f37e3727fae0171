//! Operator precedence for the expression engine.

use crate::lexer::{Keyword, Token, TokenKind};

/// Binding power of an infix or postfix operator, lowest first.
///
/// [`Parser::parse_expr`](super::Parser) keeps applying operators while the
/// current token binds tighter than the minimum it was called with, so every
/// operator is left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    /// Not an operator.
    None,
    /// `FOR XML ...`, `OPTION (...)`.
    QueryOption,
    /// `ORDER BY`.
    OrderBy,
    /// `UNION`, `EXCEPT`, `INTERSECT`.
    SetOperator,
    Comma,
    Assignment,
    Or,
    And,
    /// Right binding power of prefix `NOT`.
    Not,
    /// Comparisons and `IS`.
    Comparison,
    /// `BETWEEN`, `LIKE`, `IN` and infix `NOT`.
    Pattern,
    /// `+ - & | ^`.
    Additive,
    /// `* / %`.
    Multiplicative,
    /// Right binding power of prefix `+ - ~`.
    Unary,
    /// Calls, `COLLATE`, `OVER`.
    Postfix,
}

impl Token {
    /// The binding power of this token as an infix or postfix operator.
    #[must_use]
    pub fn precedence(&self) -> Precedence {
        match self.kind() {
            TokenKind::Comma => Precedence::Comma,
            TokenKind::LeftParen => Precedence::Postfix,
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Amp
            | TokenKind::Pipe
            | TokenKind::Caret => Precedence::Additive,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Multiplicative,
            kind if kind.is_assignment() => Precedence::Assignment,
            kind if kind.is_comparison() => Precedence::Comparison,
            TokenKind::Identifier => self.keyword().map_or(Precedence::None, keyword_precedence),
            _ => Precedence::None,
        }
    }
}

const fn keyword_precedence(keyword: Keyword) -> Precedence {
    match keyword {
        Keyword::Or => Precedence::Or,
        Keyword::And => Precedence::And,
        Keyword::Is => Precedence::Comparison,
        Keyword::Not | Keyword::Between | Keyword::Like | Keyword::In => Precedence::Pattern,
        Keyword::Collate | Keyword::Over => Precedence::Postfix,
        Keyword::Union | Keyword::Except | Keyword::Intersect => Precedence::SetOperator,
        Keyword::Order => Precedence::OrderBy,
        Keyword::For | Keyword::Option => Precedence::QueryOption,
        _ => Precedence::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;

    fn prec(kind: TokenKind, text: &str) -> Precedence {
        Token::new(kind, text, Span::default()).precedence()
    }

    #[test]
    fn test_ordering() {
        assert!(Precedence::Multiplicative > Precedence::Additive);
        assert!(Precedence::Additive > Precedence::Comparison);
        assert!(Precedence::Comparison > Precedence::Not);
        assert!(Precedence::Not > Precedence::And);
        assert!(Precedence::And > Precedence::Or);
        assert!(Precedence::Or > Precedence::Assignment);
        assert!(Precedence::Assignment > Precedence::Comma);
        assert!(Precedence::Comma > Precedence::SetOperator);
        assert!(Precedence::SetOperator > Precedence::OrderBy);
        assert!(Precedence::OrderBy > Precedence::QueryOption);
    }

    #[test]
    fn test_token_precedence() {
        assert_eq!(prec(TokenKind::Star, "*"), Precedence::Multiplicative);
        assert_eq!(prec(TokenKind::Eq, "="), Precedence::Comparison);
        assert_eq!(prec(TokenKind::Assign, "="), Precedence::Assignment);
        assert_eq!(prec(TokenKind::PlusAssign, "+="), Precedence::Assignment);
        assert_eq!(prec(TokenKind::Identifier, "and"), Precedence::And);
        assert_eq!(prec(TokenKind::Identifier, "UNION"), Precedence::SetOperator);
        assert_eq!(prec(TokenKind::Identifier, "[and]"), Precedence::None);
        assert_eq!(prec(TokenKind::Identifier, "x"), Precedence::None);
        assert_eq!(prec(TokenKind::Semicolon, ";"), Precedence::None);
    }
}
