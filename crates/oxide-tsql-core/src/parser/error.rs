//! Parser error types.

use crate::ast::ShapeError;
use crate::lexer::Span;

/// Number of characters of unconsumed input shown in [`ParseError::near`].
const NEAR_WIDTH: usize = 40;

/// A grammar error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message, possibly chained (`"outer: inner"`).
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// The input at the failure point, first line only.
    pub near: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            near: String::new(),
        }
    }

    /// Fills `near` from the source text the error was raised against.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.near = source
            .get(self.span.start..)
            .and_then(|rest| rest.lines().next())
            .unwrap_or_default()
            .chars()
            .take(NEAR_WIDTH)
            .collect();
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at position {}..{}",
            self.message, self.span.start, self.span.end
        )?;
        if !self.near.is_empty() {
            write!(f, " near '{}'", self.near)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Any failure of an entry point.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The input does not match the grammar.
    #[error(transparent)]
    Syntax(#[from] ParseError),
    /// A node was built with an invalid shape.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// The input parsed, but to another statement variant than requested.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The input uses a construct the parser deliberately rejects.
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

impl Error {
    /// Attaches the source text to a syntax error so it can show `near`.
    #[must_use]
    pub fn with_source(self, source: &str) -> Self {
        match self {
            Self::Syntax(err) => Self::Syntax(err.with_source(source)),
            other => other,
        }
    }

    /// The syntax error, if this is one.
    #[must_use]
    pub const fn as_syntax(&self) -> Option<&ParseError> {
        match self {
            Self::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

/// Result alias used throughout the parser.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_takes_first_line() {
        let err = ParseError::new("boom", Span::new(7, 8)).with_source("select oops\nfrom t");
        assert_eq!(err.near, "oops");
        assert_eq!(err.to_string(), "boom at position 7..8 near 'oops'");
    }

    #[test]
    fn test_near_is_truncated() {
        let source = "x".repeat(100);
        let err = ParseError::new("boom", Span::new(0, 1)).with_source(&source);
        assert_eq!(err.near.len(), NEAR_WIDTH);
    }

    #[test]
    fn test_error_display() {
        let err = Error::TypeMismatch {
            expected: "CreateProcedureStmt",
            found: "ExpressionStmt",
        };
        assert_eq!(err.to_string(), "expected CreateProcedureStmt, found ExpressionStmt");
        assert_eq!(
            Error::Unsupported("CLR routine").to_string(),
            "CLR routine is not supported"
        );
    }
}
