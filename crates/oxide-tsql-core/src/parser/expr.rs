//! Pratt expression engine.
//!
//! [`Parser::parse_expr`] reads a prefix form (the NUD), then keeps applying
//! infix and postfix operators (the LEDs) while they bind tighter than the
//! minimum precedence it was called with.

use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::debug;

use super::error::{Error, Result};
use super::pratt::Precedence;
use super::Parser;
use crate::ast::{
    AssignmentExpr, BetweenExpr, BinaryExpr, CallExpr, CaseExpr, CastExpr, Clause, CollateExpr,
    Expr, ExprList, InExpr, IsNullExpr, LikeExpr, LiteralExpr, NameExpr, OverClause, ParenExpr,
    QueryOptionExpr, RawTokens, SetOperationExpr, SortExpr, UnaryExpr, WhenClause, WindowExpr,
};
use crate::lexer::{Keyword, Token, TokenKind};

impl Parser<'_> {
    /// Parses an expression whose operators all bind tighter than `min`.
    pub fn parse_expr(&mut self, min: Precedence) -> Result<Expr> {
        self.nested(|p| {
            let mut left = p.parse_prefix()?;
            while p.current().precedence() > min {
                match p.parse_infix(left)? {
                    ControlFlow::Continue(next) => left = next,
                    ControlFlow::Break(done) => return Ok(done),
                }
            }
            Ok(left)
        })
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let token = self.current().clone();
        match token.kind() {
            TokenKind::Error => self.fail_at_error(),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde => {
                self.take();
                let operand = self.parse_expr(Precedence::Unary)?;
                Ok(UnaryExpr::new(token, operand)?.into())
            }
            TokenKind::LeftParen => self.parse_paren(),
            TokenKind::Star => {
                self.take();
                Ok(NameExpr::single(token)?.into())
            }
            kind if kind.is_literal() => {
                self.take();
                Ok(LiteralExpr::new(token)?.into())
            }
            TokenKind::Identifier => match token.keyword() {
                Some(Keyword::Null) => {
                    self.take();
                    Ok(LiteralExpr::new(token)?.into())
                }
                Some(Keyword::Not) => {
                    self.take();
                    let operand = self.parse_expr(Precedence::Not)?;
                    Ok(UnaryExpr::new(token, operand)?.into())
                }
                Some(Keyword::Case) => self.parse_case(),
                Some(Keyword::Select) => Ok(self.parse_select()?.into()),
                _ if token.starts_expression() => Ok(self.parse_name()?.into()),
                _ => self.fail(format!("expected expression, found {}", token.describe())),
            },
            _ => self.fail(format!("expected expression, found {}", token.describe())),
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<ControlFlow<Expr, Expr>> {
        let token = self.current().clone();
        let next = match token.kind() {
            TokenKind::LeftParen if is_callable(&left) => self.parse_call(left)?,
            TokenKind::Comma => self.parse_list(left)?,
            kind if kind.is_assignment() => self.parse_assignment(left)?,
            kind if kind.is_arithmetic() || kind.is_comparison() => self.parse_binary(left)?,
            TokenKind::Identifier => match token.keyword() {
                Some(Keyword::And | Keyword::Or) => self.parse_binary(left)?,
                Some(Keyword::Is) => self.parse_is_null(left)?,
                Some(Keyword::Not)
                    if self.peek_is_any(&[Keyword::Between, Keyword::Like, Keyword::In]) =>
                {
                    let not = self.take();
                    self.parse_pattern(left, Some(not))?
                }
                Some(Keyword::Between | Keyword::Like | Keyword::In) => {
                    self.parse_pattern(left, None)?
                }
                Some(Keyword::Collate) => {
                    let collate = self.take();
                    let collation = self.kind(TokenKind::Identifier, "collation name")?;
                    CollateExpr::new(left, collate, collation)?.into()
                }
                Some(Keyword::Over) if matches!(left, Expr::Call(_)) => {
                    let over = self.parse_over()?;
                    WindowExpr::new(left, Rc::new(over))?.into()
                }
                Some(Keyword::Union | Keyword::Except | Keyword::Intersect) if left.is_query() => {
                    self.parse_set_operation(left)?
                }
                Some(Keyword::Order) if left.is_query() && self.peek_is(Keyword::By) => {
                    self.parse_order_by(left)?
                }
                Some(Keyword::For)
                    if left.is_query()
                        && self.peek_is_any(&[Keyword::Xml, Keyword::Json, Keyword::Browse]) =>
                {
                    self.parse_for_clause(left)?
                }
                Some(Keyword::Option)
                    if left.is_query() && self.cursor.raw_lookahead().kind() == TokenKind::LeftParen =>
                {
                    self.parse_option_clause(left)?
                }
                _ => return Ok(ControlFlow::Break(left)),
            },
            _ => return Ok(ControlFlow::Break(left)),
        };
        Ok(ControlFlow::Continue(next))
    }

    /// A possibly qualified name: `a`, `a.b`, `db..t`, `t.*`.
    pub(crate) fn parse_name(&mut self) -> Result<NameExpr> {
        let mut parts = vec![self.kind(TokenKind::Identifier, "name")?];
        while self.at_kind(TokenKind::Dot) {
            parts.push(self.take());
            while self.at_kind(TokenKind::Dot) {
                parts.push(self.take());
            }
            if self.at_kind(TokenKind::Star) {
                parts.push(self.take());
                break;
            }
            parts.push(self.kind(TokenKind::Identifier, "name")?);
        }
        Ok(NameExpr::new(parts)?)
    }

    fn parse_binary(&mut self, left: Expr) -> Result<Expr> {
        let operator = self.take();
        let right = self.parse_expr(operator.precedence())?;
        Ok(BinaryExpr::new(left, operator, right)?.into())
    }

    fn parse_assignment(&mut self, target: Expr) -> Result<Expr> {
        if !matches!(&target, Expr::Name(name) if !name.is_wildcard()) {
            return self.fail("assignment target must be a name");
        }
        let operator = self.take();
        let value = self.parse_expr(Precedence::Assignment)?;
        Ok(AssignmentExpr::new(target, operator, value)?.into())
    }

    /// Collects `first, b, c` into one flat list.
    fn parse_list(&mut self, first: Expr) -> Result<Expr> {
        let mut items = vec![first];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat_kind(TokenKind::Comma) {
            separators.push(comma);
            items.push(self.parse_expr(Precedence::Comma)?);
        }
        Ok(ExprList::new(items, separators)?.into())
    }

    fn parse_is_null(&mut self, operand: Expr) -> Result<Expr> {
        let is = self.take();
        let not = self.eat(Keyword::Not);
        let null = self.keyword(Keyword::Null)?;
        Ok(IsNullExpr::new(operand, is, not, null)?.into())
    }

    /// `[NOT] BETWEEN`, `[NOT] LIKE` and `[NOT] IN`, with any `NOT` already
    /// consumed.
    fn parse_pattern(&mut self, operand: Expr, not: Option<Token>) -> Result<Expr> {
        let operator = self.current().clone();
        match operator.keyword() {
            Some(Keyword::Between) => {
                self.take();
                let low = self.parse_expr(Precedence::Pattern)?;
                let and = self.keyword(Keyword::And)?;
                let high = self.parse_expr(Precedence::Pattern)?;
                Ok(BetweenExpr::new(operand, not, operator, low, and, high)?.into())
            }
            Some(Keyword::Like) => {
                self.take();
                let pattern = self.parse_expr(Precedence::Pattern)?;
                let escape = match self.eat(Keyword::Escape) {
                    Some(keyword) => Some((keyword, self.parse_expr(Precedence::Pattern)?)),
                    None => None,
                };
                Ok(LikeExpr::new(operand, not, operator, pattern, escape)?.into())
            }
            _ => {
                let in_token = self.keyword(Keyword::In)?;
                let lparen = self.kind(TokenKind::LeftParen, "'('")?;
                let (values, rparen) = self.parse_paren_body()?;
                let Some(values) = values else {
                    return self.fail("expected values in IN list");
                };
                Ok(InExpr::new(operand, not, in_token, lparen, values, rparen)?.into())
            }
        }
    }

    fn parse_paren(&mut self) -> Result<Expr> {
        let lparen = self.take();
        match self.parse_paren_body()? {
            (Some(inner), rparen) => Ok(ParenExpr::new(lparen, inner, rparen)?.into()),
            (None, _) => self.fail("expected expression inside parentheses"),
        }
    }

    /// Parses what follows an already consumed `(` up to and including the
    /// matching `)`. The body is read in comparison context. When it is not
    /// a well-formed expression its tokens are kept raw, unless the
    /// expression was merely cut short by `)`, `,` or the end of input.
    pub(crate) fn parse_paren_body(&mut self) -> Result<(Option<Expr>, Token)> {
        if let Some(rparen) = self.eat_kind(TokenKind::RightParen) {
            return Ok((None, rparen));
        }
        let mut scope = self.assignment_scope(false);
        let mut collector = scope.collect();
        match collector.parse_expr(Precedence::None) {
            Ok(inner) if collector.at_kind(TokenKind::RightParen) => {
                collector.finish();
                let rparen = scope.take();
                Ok((Some(inner), rparen))
            }
            Err(err @ Error::Syntax(_)) if is_cut_short(collector.cursor.raw_current()) => Err(err),
            Ok(_) | Err(Error::Syntax(_)) => {
                if let Some(err) = collector.cursor.error() {
                    debug!(error = %err, "keeping parenthesized tokens raw");
                }
                let (tokens, rparen) = collector.read_to_close_paren()?;
                Ok((Some(RawTokens::new(tokens)?.into()), rparen))
            }
            Err(err) => Err(err),
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr> {
        let cast = callee
            .as_name()
            .filter(|name| name.is_single())
            .map(|name| name.last_part().clone())
            .filter(|token| token.is_any_keyword(&[Keyword::Cast, Keyword::TryCast]));
        if let Some(cast) = cast {
            return self.parse_cast(cast);
        }
        let lparen = self.take();
        let (args, rparen) = self.parse_paren_body()?;
        Ok(CallExpr::new(callee, lparen, args, rparen)?.into())
    }

    /// `CAST(operand AS type)` and `TRY_CAST(...)`.
    fn parse_cast(&mut self, cast: Token) -> Result<Expr> {
        let lparen = self.take();
        let mut scope = self.assignment_scope(false);
        let operand = scope.parse_expr(Precedence::Comma)?;
        let as_token = scope.keyword(Keyword::As)?;
        let data_type = scope.parse_data_type()?;
        let rparen = scope.kind(TokenKind::RightParen, "')'")?;
        Ok(CastExpr::new(cast, lparen, operand, as_token, data_type, rparen)?.into())
    }

    fn parse_case(&mut self) -> Result<Expr> {
        let case = self.take();
        let mut scope = self.assignment_scope(false);
        let operand = if scope.at(Keyword::When) {
            None
        } else {
            Some(scope.parse_expr(Precedence::Comma)?)
        };
        let mut whens = Vec::new();
        loop {
            let when = scope.keyword(Keyword::When)?;
            let condition = scope.parse_expr(Precedence::Comma)?;
            let then = scope.keyword(Keyword::Then)?;
            let result = scope.parse_expr(Precedence::Comma)?;
            whens.push(Rc::new(WhenClause::new(when, condition, then, result)?));
            if !scope.at(Keyword::When) {
                break;
            }
        }
        let else_clause = match scope.eat(Keyword::Else) {
            Some(keyword) => Some((keyword, scope.parse_expr(Precedence::Comma)?)),
            None => None,
        };
        let end = scope.keyword(Keyword::End)?;
        Ok(CaseExpr::new(case, operand, whens, else_clause, end)?.into())
    }

    fn parse_set_operation(&mut self, left: Expr) -> Result<Expr> {
        let operator = self.take();
        let all = if operator.is_keyword(Keyword::Union) {
            self.eat(Keyword::All)
        } else {
            None
        };
        let right = self.parse_expr(Precedence::SetOperator)?;
        if !right.is_query() {
            let message = format!("expected query after {}", operator.text().to_ascii_uppercase());
            return self.fail(message);
        }
        Ok(SetOperationExpr::new(left, operator, all, right)?.into())
    }

    /// Sort items: `a, b DESC`.
    pub(crate) fn parse_sort_items(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_sort_item()?];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat_kind(TokenKind::Comma) {
            separators.push(comma);
            items.push(self.parse_sort_item()?);
        }
        if items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(ExprList::new(items, separators)?.into())
    }

    fn parse_sort_item(&mut self) -> Result<Expr> {
        let expr = self.parse_expr(Precedence::Comma)?;
        match self.eat_any(&[Keyword::Asc, Keyword::Desc]) {
            Some(direction) => Ok(SortExpr::new(expr, direction)?.into()),
            None => Ok(expr),
        }
    }

    /// `OVER ([PARTITION BY ...] [ORDER BY ...] [frame])`.
    fn parse_over(&mut self) -> Result<OverClause> {
        let over = self.take();
        let lparen = self.kind(TokenKind::LeftParen, "'('")?;
        let mut scope = self.assignment_scope(false);
        let partition = if scope.at(Keyword::Partition) {
            let keywords = vec![scope.take(), scope.keyword(Keyword::By)?];
            let body = scope.parse_expr(Precedence::SetOperator)?;
            Some(Rc::new(Clause::new(
                keywords,
                &[Keyword::Partition, Keyword::By],
                body,
            )?))
        } else {
            None
        };
        let order = if scope.at(Keyword::Order) {
            let keywords = vec![scope.take(), scope.keyword(Keyword::By)?];
            let body = scope.parse_sort_items()?;
            Some(Rc::new(Clause::new(keywords, &[Keyword::Order, Keyword::By], body)?))
        } else {
            None
        };
        let (frame, rparen) = match scope.eat_kind(TokenKind::RightParen) {
            Some(rparen) => (None, rparen),
            None => {
                let (tokens, rparen) = scope.collect().read_to_close_paren()?;
                (Some(Rc::new(RawTokens::new(tokens)?)), rparen)
            }
        };
        Ok(OverClause::new(over, lparen, partition, order, frame, rparen)?)
    }

    /// `FOR XML|JSON|BROWSE ...` after a query. The options run to the end
    /// of the statement.
    fn parse_for_clause(&mut self, query: Expr) -> Result<Expr> {
        let keyword = self.take();
        let options = self.parse_statement_tail();
        Ok(QueryOptionExpr::new(query, keyword, Rc::new(RawTokens::new(options)?))?.into())
    }

    /// `OPTION (hints)` after a query.
    fn parse_option_clause(&mut self, query: Expr) -> Result<Expr> {
        let keyword = self.take();
        let lparen = self.take();
        let (tokens, rparen) = self.collect().read_to_close_paren()?;
        let mut options = Vec::with_capacity(tokens.len() + 2);
        options.push(lparen);
        options.extend(tokens);
        options.push(rparen);
        Ok(QueryOptionExpr::new(query, keyword, Rc::new(RawTokens::new(options)?))?.into())
    }
}

/// Only plain names can be called; `(` after anything else ends the
/// expression.
fn is_callable(expr: &Expr) -> bool {
    expr.as_name()
        .is_some_and(|name| !name.is_variable() && !name.is_wildcard())
}

/// An operand that runs into one of these is missing, not written in a
/// dialect the grammar does not model.
fn is_cut_short(token: &Token) -> bool {
    token.is_eof() || matches!(token.kind(), TokenKind::RightParen | TokenKind::Comma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode;

    fn parse(input: &str) -> Expr {
        let mut parser = Parser::new(input);
        let expr = parser.parse_expr(Precedence::None).unwrap();
        parser.expect_end().unwrap();
        expr
    }

    fn parse_err(input: &str) -> String {
        let mut parser = Parser::new(input);
        parser
            .parse_expr(Precedence::None)
            .and_then(|_| parser.expect_end())
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let Expr::Binary(sum) = parse("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(sum.operator().text(), "+");
        assert!(matches!(sum.right(), Expr::Binary(_)));
    }

    #[test]
    fn test_left_associative() {
        let Expr::Binary(outer) = parse("a - b - c") else {
            panic!("expected binary");
        };
        assert!(matches!(outer.left(), Expr::Binary(_)));
        assert_eq!(outer.right().to_source(), "c");
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let Expr::Binary(or) = parse("a = 1 or b = 2 and c = 3") else {
            panic!("expected binary");
        };
        assert!(or.operator().is_keyword(Keyword::Or));
        let Expr::Binary(and) = or.right() else {
            panic!("expected AND on the right");
        };
        assert!(and.operator().is_keyword(Keyword::And));
    }

    #[test]
    fn test_prefix_not_covers_comparison() {
        let Expr::Binary(and) = parse("not a = b and c = d") else {
            panic!("expected binary");
        };
        let Expr::Unary(not) = and.left() else {
            panic!("expected NOT");
        };
        assert!(not.is_not());
        assert!(matches!(not.operand(), Expr::Binary(_)));
    }

    #[test]
    fn test_infix_not_forms() {
        assert!(matches!(parse("a not like 'x%'"), Expr::Like(_)));
        assert!(matches!(parse("a not between 1 and 2"), Expr::Between(_)));
        assert!(matches!(parse("a not in (1, 2)"), Expr::In(_)));
        assert!(matches!(parse("a is not null"), Expr::IsNull(_)));
    }

    #[test]
    fn test_between_inside_and() {
        let Expr::Binary(and) = parse("a between 1 and 2 and b = 3") else {
            panic!("expected binary");
        };
        assert!(matches!(and.left(), Expr::Between(_)));
    }

    #[test]
    fn test_call_and_cast() {
        let Expr::Call(call) = parse("dbo.fn(1, 'x')") else {
            panic!("expected call");
        };
        assert_eq!(call.arguments().len(), 2);
        assert_eq!(call.function_name().as_deref(), Some("dbo.fn"));

        let Expr::Cast(cast) = parse("try_cast(x as decimal(10, 2))") else {
            panic!("expected cast");
        };
        assert!(cast.is_try());
    }

    #[test]
    fn test_unparsable_arguments_stay_raw() {
        let Expr::Call(call) = parse("count(distinct x)") else {
            panic!("expected call");
        };
        assert!(matches!(call.args(), Some(Expr::Raw(_))));
        assert_eq!(call.to_source(), "count(distinct x)");
    }

    #[test]
    fn test_empty_call() {
        let Expr::Call(call) = parse("getdate()") else {
            panic!("expected call");
        };
        assert!(call.args().is_none());
    }

    #[test]
    fn test_case() {
        let Expr::Case(case) = parse("case when a = 1 then 'one' else 'many' end") else {
            panic!("expected case");
        };
        assert_eq!(case.whens().len(), 1);
        assert!(case.else_result().is_some());
    }

    #[test]
    fn test_window() {
        let Expr::Window(window) =
            parse("row_number() over (partition by a order by b desc rows unbounded preceding)")
        else {
            panic!("expected window");
        };
        assert!(window.over().partition_by().is_some());
        assert!(window.over().frame().is_some());
    }

    #[test]
    fn test_comma_builds_flat_list() {
        let Expr::List(list) = parse("1, 2, 3") else {
            panic!("expected list");
        };
        assert_eq!(list.len(), 3);
        assert_eq!(list.separators().len(), 2);
    }

    #[test]
    fn test_collate_and_unary() {
        assert!(matches!(parse("name collate Latin1_General_CI_AS"), Expr::Collate(_)));
        assert!(matches!(parse("-x"), Expr::Unary(_)));
        assert!(matches!(parse("~1"), Expr::Unary(_)));
    }

    #[test]
    fn test_errors() {
        assert!(parse_err("1 +").contains("expected expression, found end of input"));
        assert!(parse_err("from").contains("expected expression, found 'from'"));
        assert!(parse_err("a in ()").contains("expected values in IN list"));
        assert!(parse_err("(a").contains("missing ')'"));
    }

    #[test]
    fn test_incomplete_paren_body_is_an_error() {
        assert!(parse_err("(1 +)").contains("expected expression, found ')'"));
        assert!(parse_err("f(1 + + )").contains("expected expression, found ')'"));
        assert!(parse_err("a in (1,,2)").contains("expected expression, found ','"));
        assert!(parse_err("f(g(1 *), 2)").contains("found ')'"));
    }

    #[test]
    fn test_dialect_paren_body_stays_raw() {
        let Expr::Paren(paren) = parse("(1 2)") else {
            panic!("expected parenthesized expression");
        };
        assert!(matches!(paren.inner(), Expr::Raw(_)));
        let Expr::In(in_expr) = parse("a in (1, default)") else {
            panic!("expected IN");
        };
        assert!(matches!(in_expr.values(), Expr::Raw(_)));
    }

    #[test]
    fn test_query_in_parens() {
        let Expr::In(in_expr) = parse("a in (select b from t)") else {
            panic!("expected IN");
        };
        assert!(in_expr.values().is_query());
    }
}
