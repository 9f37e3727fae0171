//! Node construction errors and the shape checks that raise them.

use crate::lexer::{Keyword, Token, TokenKind};

/// A node constructor was given children that do not fit its slots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("{node}: expected {expected} in {slot}, found '{found}'")]
    UnexpectedToken {
        node: &'static str,
        slot: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("{node}: {list} must not be empty")]
    EmptyList {
        node: &'static str,
        list: &'static str,
    },
    #[error("{node}: {items} items need {expected} separators, found {found}")]
    Separators {
        node: &'static str,
        items: usize,
        expected: usize,
        found: usize,
    },
    #[error("{node}: {reason}")]
    Invalid {
        node: &'static str,
        reason: &'static str,
    },
}

/// Checks one token slot of node `node`.
pub(crate) fn check(
    node: &'static str,
    slot: &'static str,
    token: &Token,
    expected: &'static str,
    ok: bool,
) -> Result<(), ShapeError> {
    if ok {
        Ok(())
    } else {
        Err(ShapeError::UnexpectedToken {
            node,
            slot,
            expected,
            found: token.text().to_string(),
        })
    }
}

pub(crate) fn check_keyword(
    node: &'static str,
    slot: &'static str,
    token: &Token,
    keyword: Keyword,
) -> Result<(), ShapeError> {
    check(node, slot, token, keyword.as_str(), token.is_keyword(keyword))
}

pub(crate) fn check_kind(
    node: &'static str,
    slot: &'static str,
    token: &Token,
    kind: TokenKind,
    expected: &'static str,
) -> Result<(), ShapeError> {
    check(node, slot, token, expected, token.kind() == kind)
}

/// Like [`check_kind`], but a placeholder is accepted too.
pub(crate) fn check_optional_kind(
    node: &'static str,
    slot: &'static str,
    token: &Token,
    kind: TokenKind,
    expected: &'static str,
) -> Result<(), ShapeError> {
    check(
        node,
        slot,
        token,
        expected,
        token.is_placeholder() || token.kind() == kind,
    )
}

/// Optional parentheses come in pairs: both present or both placeholders.
pub(crate) fn check_paren_pair(
    node: &'static str,
    lparen: &Token,
    rparen: &Token,
) -> Result<(), ShapeError> {
    check_optional_kind(node, "open paren", lparen, TokenKind::LeftParen, "'('")?;
    check_optional_kind(node, "close paren", rparen, TokenKind::RightParen, "')'")?;
    if lparen.is_placeholder() == rparen.is_placeholder() {
        Ok(())
    } else {
        Err(ShapeError::Invalid {
            node,
            reason: "parentheses must be paired",
        })
    }
}

/// The optional statement terminator slot.
pub(crate) fn check_terminator(node: &'static str, token: &Token) -> Result<(), ShapeError> {
    check_optional_kind(node, "terminator", token, TokenKind::Semicolon, "';'")
}

/// An identifier or variable name slot.
pub(crate) fn check_identifier(
    node: &'static str,
    slot: &'static str,
    token: &Token,
) -> Result<(), ShapeError> {
    check(node, slot, token, "identifier", token.is_identifier())
}

pub(crate) fn check_variable(
    node: &'static str,
    slot: &'static str,
    token: &Token,
) -> Result<(), ShapeError> {
    check(node, slot, token, "variable", token.is_variable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;

    #[test]
    fn test_check_keyword_reports_slot() {
        let token = Token::new(TokenKind::Identifier, "FROM", Span::default());
        let err = check_keyword("BlockStmt", "begin", &token, Keyword::Begin).unwrap_err();
        assert_eq!(err.to_string(), "BlockStmt: expected BEGIN in begin, found 'FROM'");
    }

    #[test]
    fn test_paren_pair() {
        let lparen = Token::new(TokenKind::LeftParen, "(", Span::default());
        let rparen = Token::new(TokenKind::RightParen, ")", Span::default());
        assert!(check_paren_pair("X", &lparen, &rparen).is_ok());
        assert!(check_paren_pair("X", &Token::placeholder(), &Token::placeholder()).is_ok());
        assert!(check_paren_pair("X", &lparen, &Token::placeholder()).is_err());
    }
}
