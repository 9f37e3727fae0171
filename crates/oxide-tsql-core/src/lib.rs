//! # oxide-tsql-core
//!
//! A format-preserving T-SQL parser with a rewriting syntax tree.
//!
//! This crate provides:
//! - A hand-written lexer that keeps whitespace and comments as token trivia
//! - A recursive descent statement parser with Pratt expression parsing
//! - Immutable, `Rc`-shared syntax tree nodes with fixed child slots
//! - A [`Visitor`](ast::Visitor) that rebuilds only the nodes it changes
//!
//! ## Parsing
//!
//! Every entry point requires the whole input to be consumed:
//!
//! ```rust
//! use oxide_tsql_core::ast::{Expr, Stmt, SyntaxNode};
//! use oxide_tsql_core::parse_statement;
//!
//! let stmt = parse_statement("set @total = @price * 2;").unwrap();
//! let Stmt::SetVariable(set) = &stmt else { panic!() };
//! assert!(matches!(set.value(), Expr::Binary(_)));
//!
//! // The tree reproduces its input byte for byte.
//! assert_eq!(stmt.to_source(), "set @total = @price * 2;");
//! ```
//!
//! Statements the grammar does not model in detail (`INSERT`, `UPDATE`,
//! `CREATE TABLE`, ...) are kept as raw tokens in an
//! [`UnmodeledStmt`](ast::UnmodeledStmt), so any script can round-trip.
//!
//! ## Rewriting
//!
//! A visitor returns the original `Rc` for every subtree it leaves alone:
//!
//! ```rust
//! use oxide_tsql_core::ast::Visitor;
//! use oxide_tsql_core::parse_statement;
//!
//! struct Identity;
//! impl Visitor for Identity {}
//!
//! let stmt = parse_statement("if @a = 1 print 'one' else print 'other'").unwrap();
//! assert!(stmt.accept(&mut Identity).ptr_eq(&stmt));
//! ```

pub mod ast;
pub mod batch;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, StatementList, Stmt, SyntaxNode};
pub use batch::{Batch, split_batches};
pub use lexer::{Lexer, Token, TokenKind, TokenSource};
pub use parser::{
    Error, ParseError, Parser, ParserOptions, parse_expression, parse_script, parse_statement,
    parse_statement_as,
};
