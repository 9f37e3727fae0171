//! Tree rewriting tests.

mod common;
use common::*;

use std::rc::Rc;

use oxide_tsql_core::ast::visit::walk_binary;
use oxide_tsql_core::ast::{BinaryExpr, LiteralExpr, NameExpr, Stmt, SyntaxNode, Visitor};
use oxide_tsql_core::lexer::{Token, TokenKind};
use oxide_tsql_core::Expr;

/// Replaces integer literals with `to`, keeping their trivia.
struct ReplaceInteger {
    from: &'static str,
    to: &'static str,
}

impl Visitor for ReplaceInteger {
    fn visit_literal(&mut self, node: &Rc<LiteralExpr>) -> Expr {
        let token = node.token();
        if token.kind() != TokenKind::Integer || token.text() != self.from {
            return Expr::Literal(Rc::clone(node));
        }
        let replaced = Token::new(TokenKind::Integer, self.to, token.span())
            .with_trivia(token.leading().to_vec(), token.trailing().to_vec());
        LiteralExpr::new(replaced).unwrap().into()
    }
}

/// Counts name references and binary operators without changing anything.
#[derive(Default)]
struct Counter {
    names: Vec<String>,
    binaries: usize,
}

impl Visitor for Counter {
    fn visit_name(&mut self, node: &Rc<NameExpr>) -> Expr {
        self.names.push(node.name());
        Expr::Name(Rc::clone(node))
    }

    fn visit_binary(&mut self, node: &Rc<BinaryExpr>) -> Expr {
        self.binaries += 1;
        walk_binary(self, node)
    }
}

#[test]
fn identity_returns_same_tree() {
    let stmt = parse(
        "create proc p @a int as begin if @a > 0 select a, b from t where c = 1 else return end",
    );
    let visited = stmt.accept(&mut Identity);
    assert!(visited.ptr_eq(&stmt));
}

#[test]
fn identity_on_expression() {
    let expr = parse_expr("case when a between 1 and 2 then cast(b as int) else c end");
    assert!(expr.accept(&mut Identity).ptr_eq(&expr));
}

#[test]
fn rewrite_literal_keeps_trivia() {
    let stmt = parse("if @a = 1 /* one */ print 'one'\nelse set @b = 2");
    let rewritten = stmt.accept(&mut ReplaceInteger { from: "1", to: "10" });
    assert!(!rewritten.ptr_eq(&stmt));
    assert_eq!(
        rewritten.to_source(),
        "if @a = 10 /* one */ print 'one'\nelse set @b = 2"
    );
}

#[test]
fn rewrite_shares_untouched_siblings() {
    let stmt = parse("if @a = 1 print 'one' else set @b = 2");
    let rewritten = stmt.accept(&mut ReplaceInteger { from: "1", to: "10" });
    let (Stmt::If(before), Stmt::If(after)) = (&stmt, &rewritten) else {
        panic!("expected IF");
    };
    assert!(!before.condition().ptr_eq(after.condition()));
    assert!(before.then().ptr_eq(after.then()));
    let (Some(old_else), Some(new_else)) = (before.else_branch(), after.else_branch()) else {
        panic!("expected ELSE");
    };
    assert!(old_else.ptr_eq(new_else));
}

#[test]
fn rewrite_inside_select() {
    let select = parse_select("select a + 1, b from t where c = 2");
    let expr = Expr::Select(Rc::clone(&select));
    let Expr::Select(rewritten) = expr.accept(&mut ReplaceInteger { from: "2", to: "3" }) else {
        panic!("expected SELECT");
    };
    assert!(!Rc::ptr_eq(&select, &rewritten));
    assert!(select.columns()[0].ptr_eq(&rewritten.columns()[0]));
    assert_eq!(
        rewritten.where_clause().map(|w| w.to_source()).as_deref(),
        Some("c = 3")
    );
}

#[test]
fn unchanged_rewrite_is_identity() {
    let stmt = parse("set @x = 5 * 5");
    let rewritten = stmt.accept(&mut ReplaceInteger { from: "7", to: "8" });
    assert!(rewritten.ptr_eq(&stmt));
}

#[test]
fn counting_visitor_descends() {
    let mut counter = Counter::default();
    let stmt = parse("select a from t where b = 1 and c < 2");
    let visited = stmt.accept(&mut counter);
    assert!(visited.ptr_eq(&stmt));
    assert_eq!(counter.binaries, 3);
    assert!(counter.names.iter().any(|n| n == "b"));
    assert!(counter.names.iter().any(|n| n == "c"));
}

#[test]
fn rewrite_is_idempotent() {
    let stmt = parse("while @i < 1 set @i = @i + 1");
    let mut rewrite = ReplaceInteger { from: "1", to: "10" };
    let once = stmt.accept(&mut rewrite);
    let twice = once.accept(&mut rewrite);
    assert!(twice.ptr_eq(&once));
    assert_eq!(twice.to_source(), "while @i < 10 set @i = @i + 10");
}
