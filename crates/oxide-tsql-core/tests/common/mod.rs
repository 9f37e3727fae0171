#![allow(dead_code)]

use std::rc::Rc;

use oxide_tsql_core::ast::{SelectExpr, Stmt, SyntaxNode, Variant, Visitor};
use oxide_tsql_core::{Error, Expr, parse_expression, parse_statement, parse_statement_as};

pub fn parse(sql: &str) -> Stmt {
    parse_statement(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"))
}

pub fn parse_as<T: Variant<Stmt>>(sql: &str) -> Rc<T> {
    parse_statement_as::<T>(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"))
}

pub fn parse_expr(sql: &str) -> Expr {
    parse_expression(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"))
}

pub fn parse_err(sql: &str) -> Error {
    parse_statement(sql)
        .map(|stmt| stmt.to_source())
        .expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_expr_err(sql: &str) -> Error {
    parse_expression(sql)
        .map(|expr| expr.to_source())
        .expect_err(&format!("Expected parse error for: {sql}"))
}

/// Message of a syntax error, failing the test for any other error.
pub fn syntax_message(err: &Error) -> &str {
    err.as_syntax()
        .map(|e| e.message.as_str())
        .unwrap_or_else(|| panic!("Expected syntax error, got {err:?}"))
}

pub fn parse_select(sql: &str) -> Rc<SelectExpr> {
    match parse_expr(sql) {
        Expr::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

/// Verifies that the tree reproduces its input byte for byte.
pub fn round_trip(sql: &str) {
    let stmt = parse(sql);
    assert_eq!(
        stmt.to_source(),
        sql,
        "Round-trip failed.\n  Input:    {sql}\n  Rendered: {}",
        stmt.to_source()
    );
}

/// Visitor that changes nothing.
pub struct Identity;

impl Visitor for Identity {}
