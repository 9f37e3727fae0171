//! T-SQL Parser
//!
//! A hand-written recursive descent parser for statements with Pratt
//! parsing for expressions. The free functions here are the entry points;
//! each requires the whole input to be consumed.

mod cursor;
mod decl;
mod error;
mod expr;
#[allow(clippy::module_inception)]
mod parser;
mod pratt;
mod routine;
mod scope;
mod select;
mod stmt;

use std::rc::Rc;

use tracing::trace_span;

pub use error::{Error, ParseError, Result};
pub use parser::{DEFAULT_MAX_DEPTH, Parser, ParserOptions};
pub use pratt::Precedence;

use crate::ast::{Expr, StatementList, Stmt, SyntaxNode, Variant};

/// Parses a single statement.
///
/// A statement starting with a `BEGIN ... END` block keeps the block even
/// when its body cannot be parsed, holding the body as one unmodeled
/// statement.
pub fn parse_statement(text: &str) -> Result<Stmt> {
    let _span = trace_span!("parse_statement", len = text.len()).entered();
    let mut parser = Parser::new(text);
    parser
        .parse_top_statement()
        .and_then(|stmt| parser.expect_end().map(|()| stmt))
        .map_err(|err| err.with_source(text))
}

/// Parses a single statement and requires it to be a `T`.
///
/// ```
/// use oxide_tsql_core::ast::CreateViewStmt;
/// use oxide_tsql_core::parser::parse_statement_as;
///
/// let view = parse_statement_as::<CreateViewStmt>("create view v as select 1 as one").unwrap();
/// assert_eq!(view.name().name(), "v");
/// assert!(parse_statement_as::<CreateViewStmt>("select 1").is_err());
/// ```
pub fn parse_statement_as<T: Variant<Stmt>>(text: &str) -> Result<Rc<T>> {
    parse_statement(text)?
        .downcast::<T>()
        .map_err(|other| Error::TypeMismatch {
            expected: T::KIND,
            found: other.kind_name(),
        })
}

/// Parses a single expression.
pub fn parse_expression(text: &str) -> Result<Expr> {
    let _span = trace_span!("parse_expression", len = text.len()).entered();
    let mut parser = Parser::new(text);
    let result = parser
        .assignment_scope(false)
        .parse_expr(Precedence::None);
    result
        .and_then(|expr| parser.expect_end().map(|()| expr))
        .map_err(|err| err.with_source(text))
}

/// Parses every statement of a batch.
pub fn parse_script(text: &str) -> Result<StatementList> {
    let _span = trace_span!("parse_script", len = text.len()).entered();
    let mut parser = Parser::new(text);
    parser
        .parse_statements()
        .and_then(|list| parser.expect_end().map(|()| list))
        .map_err(|err| err.with_source(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockStmt, CreateProcedureStmt};

    #[test]
    fn test_parse_statement_as() {
        let proc = parse_statement_as::<CreateProcedureStmt>("create proc p as select 1").unwrap();
        assert_eq!(proc.name().name(), "p");
        let err = parse_statement_as::<BlockStmt>("select 1").unwrap_err();
        assert_eq!(err.to_string(), "expected BlockStmt, found ExpressionStmt");
    }

    #[test]
    fn test_error_near_text() {
        let err = parse_statement("select 1 from").unwrap_err();
        let syntax = err.as_syntax().unwrap();
        assert!(syntax.message.contains("end of input"));
        assert!(syntax.near.is_empty());

        let err = parse_expression("1 + ) x").unwrap_err();
        assert_eq!(err.as_syntax().map(|e| e.near.as_str()), Some(") x"));
    }

    #[test]
    fn test_trailing_input_rejected() {
        assert!(parse_expression("1 + 2 )").is_err());
        assert!(parse_statement("set @a = 1 )").is_err());
    }

    #[test]
    fn test_script() {
        let list = parse_script("declare @a int; set @a = 1; select @a").unwrap();
        assert_eq!(list.len(), 3);
    }
}
