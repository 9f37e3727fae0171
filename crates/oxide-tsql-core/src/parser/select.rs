//! `SELECT` blocks, table sources and the clauses that follow a query.

use std::rc::Rc;

use super::error::Result;
use super::pratt::Precedence;
use super::Parser;
use crate::ast::{
    AliasExpr, Clause, Expr, ExprList, FetchClause, JoinExpr, OffsetFetch, OrderByExpr, ParenExpr,
    SelectClauses, SelectExpr, TableHintExpr, TopClause,
};
use crate::lexer::{Keyword, Token, TokenKind};

impl Parser<'_> {
    /// `SELECT [ALL|DISTINCT] [TOP ...] columns [INTO] [FROM] [WHERE]
    /// [GROUP BY] [HAVING]`.
    ///
    /// `ORDER BY`, set operators and `FOR`/`OPTION` are infix operators on
    /// the finished query.
    pub(crate) fn parse_select(&mut self) -> Result<SelectExpr> {
        let select = self.keyword(Keyword::Select)?;
        let quantifier = self.eat_any(&[Keyword::All, Keyword::Distinct]);
        let top = if self.at(Keyword::Top) {
            Some(Rc::new(self.parse_top()?))
        } else {
            None
        };
        let columns = self.assignment_scope(true).parse_select_columns()?;

        let mut scope = self.assignment_scope(false);
        let mut clauses = SelectClauses::default();
        if let Some(into) = scope.eat(Keyword::Into) {
            let target = scope.parse_expr(Precedence::Unary)?;
            clauses.into = Some(Rc::new(Clause::new(vec![into], &[Keyword::Into], target)?));
        }
        if let Some(from) = scope.eat(Keyword::From) {
            let sources = scope.parse_table_sources()?;
            clauses.from = Some(Rc::new(Clause::new(vec![from], &[Keyword::From], sources)?));
        }
        if let Some(keyword) = scope.eat(Keyword::Where) {
            let condition = scope.parse_expr(Precedence::Comma)?;
            clauses.where_clause = Some(Rc::new(Clause::new(
                vec![keyword],
                &[Keyword::Where],
                condition,
            )?));
        }
        if scope.at(Keyword::Group) {
            let keywords = vec![scope.take(), scope.keyword(Keyword::By)?];
            let items = scope.parse_expr(Precedence::SetOperator)?;
            clauses.group_by = Some(Rc::new(Clause::new(
                keywords,
                &[Keyword::Group, Keyword::By],
                items,
            )?));
        }
        if let Some(having) = scope.eat(Keyword::Having) {
            let condition = scope.parse_expr(Precedence::Comma)?;
            clauses.having = Some(Rc::new(Clause::new(vec![having], &[Keyword::Having], condition)?));
        }
        Ok(SelectExpr::new(select, quantifier, top, columns, clauses)?)
    }

    /// `TOP n`, `TOP (expr)`, with `PERCENT` and `WITH TIES`.
    fn parse_top(&mut self) -> Result<TopClause> {
        let top = self.take();
        let mut scope = self.assignment_scope(false);
        let (lparen, count, rparen) = match scope.eat_kind(TokenKind::LeftParen) {
            Some(lparen) => {
                let count = scope.parse_expr(Precedence::None)?;
                let rparen = scope.kind(TokenKind::RightParen, "')'")?;
                (lparen, count, rparen)
            }
            None => {
                let count = scope.parse_expr(Precedence::Unary)?;
                (Token::placeholder(), count, Token::placeholder())
            }
        };
        let percent = scope.eat(Keyword::Percent);
        let with_ties = if scope.at(Keyword::With) && scope.peek_is(Keyword::Ties) {
            Some((scope.take(), scope.take()))
        } else {
            None
        };
        Ok(TopClause::new(top, lparen, count, rparen, percent, with_ties)?)
    }

    /// The select list, always as a list node so single-column and
    /// multi-column queries share a shape.
    fn parse_select_columns(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_select_item()?];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat_kind(TokenKind::Comma) {
            separators.push(comma);
            items.push(self.parse_select_item()?);
        }
        Ok(ExprList::new(items, separators)?.into())
    }

    fn parse_select_item(&mut self) -> Result<Expr> {
        let expr = self.parse_expr(Precedence::Comma)?;
        self.parse_alias(expr, |token| {
            token.is_plain_identifier() || token.kind() == TokenKind::String
        })
    }

    /// `expr [AS] alias`. Without `AS`, `accepts` decides whether the current
    /// token is an alias.
    fn parse_alias(&mut self, expr: Expr, accepts: impl Fn(&Token) -> bool) -> Result<Expr> {
        if let Some(as_token) = self.eat(Keyword::As) {
            let alias = self.cursor.expect(
                |t| t.is_identifier() || t.kind() == TokenKind::String,
                "alias",
                true,
            );
            let Some(alias) = alias else {
                return self.fail("invalid alias");
            };
            return Ok(AliasExpr::new(expr, as_token, alias)?.into());
        }
        if accepts(self.current()) {
            let alias = self.take();
            return Ok(AliasExpr::new(expr, Token::placeholder(), alias)?.into());
        }
        Ok(expr)
    }

    /// Comma-separated join chains after `FROM`.
    pub(crate) fn parse_table_sources(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_join_chain()?];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat_kind(TokenKind::Comma) {
            separators.push(comma);
            items.push(self.parse_join_chain()?);
        }
        if items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(ExprList::new(items, separators)?.into())
    }

    fn parse_join_chain(&mut self) -> Result<Expr> {
        let mut left = self.parse_table_source()?;
        while let Some(operator) = self.parse_join_operator()? {
            let right = self.parse_table_source()?;
            let conditional = !(operator[0].is_keyword(Keyword::Cross)
                || operator.last().is_some_and(|t| t.is_keyword(Keyword::Apply)));
            let on = if conditional {
                let on = self.keyword(Keyword::On)?;
                Some((on, self.parse_expr(Precedence::Comma)?))
            } else {
                None
            };
            left = JoinExpr::new(left, operator, right, on)?.into();
        }
        Ok(left)
    }

    fn parse_join_operator(&mut self) -> Result<Option<Vec<Token>>> {
        let token = self.current().clone();
        let operator = match token.keyword() {
            Some(Keyword::Join) => vec![self.take()],
            Some(Keyword::Inner) => vec![self.take(), self.keyword(Keyword::Join)?],
            Some(Keyword::Left | Keyword::Right | Keyword::Full)
                if self.peek_is_any(&[Keyword::Join, Keyword::Outer]) =>
            {
                let mut operator = vec![self.take()];
                if let Some(outer) = self.eat(Keyword::Outer) {
                    operator.push(outer);
                }
                operator.push(self.keyword(Keyword::Join)?);
                operator
            }
            Some(Keyword::Cross) => {
                let cross = self.take();
                match self.eat(Keyword::Apply) {
                    Some(apply) => vec![cross, apply],
                    None => vec![cross, self.keyword(Keyword::Join)?],
                }
            }
            Some(Keyword::Outer) if self.peek_is(Keyword::Apply) => vec![self.take(), self.take()],
            _ => return Ok(None),
        };
        Ok(Some(operator))
    }

    /// A table, derived table or parenthesized join, with its alias and
    /// table hints.
    fn parse_table_source(&mut self) -> Result<Expr> {
        let source = if self.at_kind(TokenKind::LeftParen)
            && !self.peek_is(Keyword::Select)
            && self.cursor.raw_lookahead().kind() != TokenKind::LeftParen
        {
            let lparen = self.take();
            let inner = self.parse_table_sources()?;
            let rparen = self.kind(TokenKind::RightParen, "')'")?;
            ParenExpr::new(lparen, inner, rparen)?.into()
        } else {
            self.parse_expr(Precedence::Unary)?
        };
        let source = self.parse_alias(source, Token::is_plain_identifier)?;
        if !(self.at(Keyword::With) && self.cursor.raw_lookahead().kind() == TokenKind::LeftParen) {
            return Ok(source);
        }
        let with = self.take();
        let lparen = self.take();
        let (hints, rparen) = self.parse_paren_body()?;
        let Some(hints) = hints else {
            return self.fail("expected table hints");
        };
        Ok(TableHintExpr::new(source, with, lparen, hints, rparen)?.into())
    }

    /// `query ORDER BY items [OFFSET n ROWS [FETCH FIRST|NEXT n ROWS ONLY]]`.
    pub(crate) fn parse_order_by(&mut self, query: Expr) -> Result<Expr> {
        let mut scope = self.assignment_scope(false);
        let keywords = vec![scope.take(), scope.keyword(Keyword::By)?];
        let items = scope.parse_sort_items()?;
        let order_by = Rc::new(Clause::new(keywords, &[Keyword::Order, Keyword::By], items)?);
        let offset = if scope.at(Keyword::Offset) {
            Some(Rc::new(scope.parse_offset()?))
        } else {
            None
        };
        Ok(OrderByExpr::new(query, order_by, offset)?.into())
    }

    fn parse_offset(&mut self) -> Result<OffsetFetch> {
        let offset = self.take();
        let count = self.parse_expr(Precedence::Comma)?;
        let rows = self.row_keyword()?;
        let fetch = match self.eat(Keyword::Fetch) {
            Some(fetch) => {
                let direction = self.cursor.expect(
                    |t| t.is_any_keyword(&[Keyword::First, Keyword::Next]),
                    "FIRST or NEXT",
                    true,
                );
                let Some(direction) = direction else {
                    return self.fail("invalid FETCH clause");
                };
                let count = self.parse_expr(Precedence::Comma)?;
                let rows = self.row_keyword()?;
                let only = self.keyword(Keyword::Only)?;
                Some(FetchClause::new(fetch, direction, count, rows, only)?)
            }
            None => None,
        };
        Ok(OffsetFetch::new(offset, count, rows, fetch)?)
    }

    fn row_keyword(&mut self) -> Result<Token> {
        match self.eat_any(&[Keyword::Row, Keyword::Rows]) {
            Some(rows) => Ok(rows),
            None => self.fail(format!(
                "expected ROW or ROWS, found {}",
                self.current().describe()
            )),
        }
    }
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

    fn select(input: &str) -> Rc<SelectExpr> {
        parse(input).downcast::<SelectExpr>().unwrap()
    }

    #[test]
    fn test_select_clauses() {
        let query = select("select distinct top 10 a, b as x, c 'y' from t where a = 1 group by a, b having count(*) > 1");
        assert!(query.is_distinct());
        assert_eq!(query.columns().len(), 3);
        assert!(query.from().is_some());
        assert!(query.where_clause().is_some());
        assert!(matches!(query.group_by(), Some(Expr::List(_))));
        assert!(query.having().is_some());
    }

    #[test]
    fn test_single_column_is_a_list() {
        let query = select("select 1");
        assert!(matches!(query.column_list(), Expr::List(_)));
        assert_eq!(query.columns().len(), 1);
    }

    #[test]
    fn test_variable_assignment_in_select_list() {
        let query = select("select @x = a, @y += 1 from t where a = 2");
        assert!(query.columns().iter().all(|c| matches!(c, Expr::Assignment(_))));
        let Some(Expr::Binary(condition)) = query.where_clause() else {
            panic!("expected comparison");
        };
        assert!(condition.is_comparison());
    }

    #[test]
    fn test_top_forms() {
        let query = select("select top (@n) percent with ties a from t");
        let top = query.top().unwrap();
        assert!(top.is_percent());
        assert!(top.with_ties());
        assert_eq!(top.count().to_source(), "@n");

        let query = select("select top 5 * from t");
        assert_eq!(query.columns()[0].to_clean_string(), "*");
    }

    #[test]
    fn test_joins() {
        let query = select(
            "select * from a inner join b on a.id = b.id left outer join c on c.id = b.id cross apply f(a.x) as z",
        );
        let Some(Expr::Join(join)) = query.from() else {
            panic!("expected join");
        };
        assert_eq!(join.join_kind(), "CROSS APPLY");
        assert!(join.condition().is_none());
        let Expr::Join(inner) = join.left() else {
            panic!("expected nested join");
        };
        assert_eq!(inner.join_kind(), "LEFT OUTER JOIN");
    }

    #[test]
    fn test_table_hints_and_derived_tables() {
        let query = select("select * from t as x with (nolock), (select 1 as n) d");
        let Some(Expr::List(sources)) = query.from() else {
            panic!("expected two sources");
        };
        assert!(matches!(sources.items()[0], Expr::TableHint(_)));
        assert!(matches!(sources.items()[1], Expr::Alias(_)));
    }

    #[test]
    fn test_order_by_offset_fetch() {
        let Expr::OrderBy(ordered) =
            parse("select a from t order by a desc, b offset 10 rows fetch next 5 rows only")
        else {
            panic!("expected ORDER BY");
        };
        assert_eq!(ordered.items().len(), 2);
        assert!(ordered.offset().and_then(OffsetFetch::fetch).is_some());
    }

    #[test]
    fn test_union_then_order_by() {
        let Expr::OrderBy(ordered) = parse("select a from t union all select b from u order by 1") else {
            panic!("expected ORDER BY over the union");
        };
        let Expr::SetOperation(union) = ordered.query() else {
            panic!("expected union");
        };
        assert!(union.is_all());
    }

    #[test]
    fn test_query_options() {
        let Expr::QueryOption(option) = parse("select a from t option (recompile)") else {
            panic!("expected OPTION");
        };
        assert_eq!(option.options().len(), 3);
        let Expr::QueryOption(for_xml) = parse("select a from t for xml path(''), type") else {
            panic!("expected FOR XML");
        };
        assert!(for_xml.keyword().is_keyword(Keyword::For));
    }

    #[test]
    fn test_union_needs_query() {
        let mut parser = Parser::new("select 1 union 2");
        let err = parser.parse_expr(Precedence::None).unwrap_err();
        assert!(err.to_string().contains("expected query after UNION"));
    }
}
