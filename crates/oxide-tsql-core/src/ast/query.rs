//! Query nodes: `SELECT`, its clauses, and the query combinators.

use std::rc::Rc;

use super::error::{check, check_keyword, check_kind, check_paren_pair, ShapeError};
use super::{Child, Expr, RawTokens, SyntaxNode};
use crate::lexer::{Keyword, Token, TokenKind};

/// A keyword-introduced clause: `FROM x`, `WHERE x`, `GROUP BY x`,
/// `PARTITION BY x`, `ORDER BY x`, `INTO x`.
#[derive(Debug, Clone)]
pub struct Clause {
    pub(crate) keywords: Vec<Token>,
    pub(crate) body: Expr,
}

impl Clause {
    /// Creates a clause introduced by exactly the keywords in `expected`.
    pub fn new(keywords: Vec<Token>, expected: &[Keyword], body: Expr) -> Result<Self, ShapeError> {
        if keywords.len() != expected.len() || expected.is_empty() {
            return Err(ShapeError::Invalid {
                node: "Clause",
                reason: "keyword count does not match",
            });
        }
        for (token, keyword) in keywords.iter().zip(expected) {
            check_keyword("Clause", "keyword", token, *keyword)?;
        }
        Ok(Self { keywords, body })
    }

    #[must_use]
    pub fn keywords(&self) -> &[Token] {
        &self.keywords
    }

    /// Returns true if the clause starts with `keyword`.
    #[must_use]
    pub fn is(&self, keyword: Keyword) -> bool {
        self.keywords[0].is_keyword(keyword)
    }

    #[must_use]
    pub const fn body(&self) -> &Expr {
        &self.body
    }
}

impl SyntaxNode for Clause {
    fn kind_name(&self) -> &'static str {
        "Clause"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children: Vec<Child<'_>> = self.keywords.iter().map(Child::Token).collect();
        children.push(self.body.child());
        children
    }
}

fn check_clause(
    clause: Option<&Rc<Clause>>,
    expected: Keyword,
    node: &'static str,
) -> Result<(), ShapeError> {
    match clause {
        Some(clause) => check_keyword(node, "clause", &clause.keywords[0], expected),
        None => Ok(()),
    }
}

/// `TOP (n) [PERCENT] [WITH TIES]`. The parentheses may be absent for a
/// literal or variable count.
#[derive(Debug, Clone)]
pub struct TopClause {
    pub(crate) top: Token,
    pub(crate) lparen: Token,
    pub(crate) count: Expr,
    pub(crate) rparen: Token,
    pub(crate) percent: Option<Token>,
    pub(crate) with_ties: Option<(Token, Token)>,
}

impl TopClause {
    pub fn new(
        top: Token,
        lparen: Token,
        count: Expr,
        rparen: Token,
        percent: Option<Token>,
        with_ties: Option<(Token, Token)>,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "TopClause";
        check_keyword(NODE, "top", &top, Keyword::Top)?;
        check_paren_pair(NODE, &lparen, &rparen)?;
        if let Some(percent) = &percent {
            check_keyword(NODE, "percent", percent, Keyword::Percent)?;
        }
        if let Some((with, ties)) = &with_ties {
            check_keyword(NODE, "with", with, Keyword::With)?;
            check_keyword(NODE, "ties", ties, Keyword::Ties)?;
        }
        Ok(Self {
            top,
            lparen,
            count,
            rparen,
            percent,
            with_ties,
        })
    }

    #[must_use]
    pub const fn count(&self) -> &Expr {
        &self.count
    }

    #[must_use]
    pub const fn is_percent(&self) -> bool {
        self.percent.is_some()
    }

    #[must_use]
    pub const fn with_ties(&self) -> bool {
        self.with_ties.is_some()
    }
}

impl SyntaxNode for TopClause {
    fn kind_name(&self) -> &'static str {
        "TopClause"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Token(&self.top),
            Child::Token(&self.lparen),
            self.count.child(),
            Child::Token(&self.rparen),
        ];
        if let Some(percent) = &self.percent {
            children.push(Child::Token(percent));
        }
        if let Some((with, ties)) = &self.with_ties {
            children.push(Child::Token(with));
            children.push(Child::Token(ties));
        }
        children
    }
}

/// A `SELECT` query block.
#[derive(Debug, Clone)]
pub struct SelectExpr {
    pub(crate) select: Token,
    pub(crate) quantifier: Option<Token>,
    pub(crate) top: Option<Rc<TopClause>>,
    pub(crate) columns: Expr,
    pub(crate) into: Option<Rc<Clause>>,
    pub(crate) from: Option<Rc<Clause>>,
    pub(crate) where_clause: Option<Rc<Clause>>,
    pub(crate) group_by: Option<Rc<Clause>>,
    pub(crate) having: Option<Rc<Clause>>,
}

/// The optional clauses of a [`SelectExpr`], in source order.
#[derive(Debug, Clone, Default)]
pub struct SelectClauses {
    pub into: Option<Rc<Clause>>,
    pub from: Option<Rc<Clause>>,
    pub where_clause: Option<Rc<Clause>>,
    pub group_by: Option<Rc<Clause>>,
    pub having: Option<Rc<Clause>>,
}

impl SelectExpr {
    pub fn new(
        select: Token,
        quantifier: Option<Token>,
        top: Option<Rc<TopClause>>,
        columns: Expr,
        clauses: SelectClauses,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "SelectExpr";
        check_keyword(NODE, "select", &select, Keyword::Select)?;
        if let Some(quantifier) = &quantifier {
            check(
                NODE,
                "quantifier",
                quantifier,
                "ALL or DISTINCT",
                quantifier.is_any_keyword(&[Keyword::All, Keyword::Distinct]),
            )?;
        }
        check_clause(clauses.into.as_ref(), Keyword::Into, NODE)?;
        check_clause(clauses.from.as_ref(), Keyword::From, NODE)?;
        check_clause(clauses.where_clause.as_ref(), Keyword::Where, NODE)?;
        check_clause(clauses.group_by.as_ref(), Keyword::Group, NODE)?;
        check_clause(clauses.having.as_ref(), Keyword::Having, NODE)?;
        Ok(Self {
            select,
            quantifier,
            top,
            columns,
            into: clauses.into,
            from: clauses.from,
            where_clause: clauses.where_clause,
            group_by: clauses.group_by,
            having: clauses.having,
        })
    }

    #[must_use]
    pub fn is_distinct(&self) -> bool {
        self.quantifier
            .as_ref()
            .is_some_and(|q| q.is_keyword(Keyword::Distinct))
    }

    #[must_use]
    pub fn top(&self) -> Option<&TopClause> {
        self.top.as_deref()
    }

    /// The select list slot.
    #[must_use]
    pub const fn column_list(&self) -> &Expr {
        &self.columns
    }

    /// The individual select items.
    #[must_use]
    pub fn columns(&self) -> Vec<&Expr> {
        self.columns.items()
    }

    #[must_use]
    pub fn into_target(&self) -> Option<&Expr> {
        self.into.as_deref().map(Clause::body)
    }

    #[must_use]
    pub fn from(&self) -> Option<&Expr> {
        self.from.as_deref().map(Clause::body)
    }

    #[must_use]
    pub fn where_clause(&self) -> Option<&Expr> {
        self.where_clause.as_deref().map(Clause::body)
    }

    #[must_use]
    pub fn group_by(&self) -> Option<&Expr> {
        self.group_by.as_deref().map(Clause::body)
    }

    #[must_use]
    pub fn having(&self) -> Option<&Expr> {
        self.having.as_deref().map(Clause::body)
    }
}

impl SyntaxNode for SelectExpr {
    fn kind_name(&self) -> &'static str {
        "SelectExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![Child::Token(&self.select)];
        if let Some(quantifier) = &self.quantifier {
            children.push(Child::Token(quantifier));
        }
        if let Some(top) = &self.top {
            children.push(Child::Node(top.as_ref()));
        }
        children.push(self.columns.child());
        for clause in [
            &self.into,
            &self.from,
            &self.where_clause,
            &self.group_by,
            &self.having,
        ]
        .into_iter()
        .flatten()
        {
            children.push(Child::Node(clause.as_ref()));
        }
        children
    }
}

/// `left UNION [ALL] right`, `left EXCEPT right`, `left INTERSECT right`.
#[derive(Debug, Clone)]
pub struct SetOperationExpr {
    pub(crate) left: Expr,
    pub(crate) operator: Token,
    pub(crate) all: Option<Token>,
    pub(crate) right: Expr,
}

impl SetOperationExpr {
    pub fn new(
        left: Expr,
        operator: Token,
        all: Option<Token>,
        right: Expr,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "SetOperationExpr";
        check(
            NODE,
            "operator",
            &operator,
            "UNION, EXCEPT or INTERSECT",
            operator.is_any_keyword(&[Keyword::Union, Keyword::Except, Keyword::Intersect]),
        )?;
        if let Some(all) = &all {
            check_keyword(NODE, "all", all, Keyword::All)?;
            check_keyword(NODE, "operator", &operator, Keyword::Union)?;
        }
        Ok(Self {
            left,
            operator,
            all,
            right,
        })
    }

    #[must_use]
    pub const fn left(&self) -> &Expr {
        &self.left
    }

    #[must_use]
    pub const fn operator(&self) -> &Token {
        &self.operator
    }

    #[must_use]
    pub const fn right(&self) -> &Expr {
        &self.right
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.all.is_some()
    }
}

impl SyntaxNode for SetOperationExpr {
    fn kind_name(&self) -> &'static str {
        "SetOperationExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![self.left.child(), Child::Token(&self.operator)];
        if let Some(all) = &self.all {
            children.push(Child::Token(all));
        }
        children.push(self.right.child());
        children
    }
}

/// `FETCH FIRST|NEXT n ROW|ROWS ONLY`.
#[derive(Debug, Clone)]
pub struct FetchClause {
    pub(crate) fetch: Token,
    pub(crate) direction: Token,
    pub(crate) count: Expr,
    pub(crate) rows: Token,
    pub(crate) only: Token,
}

impl FetchClause {
    pub fn new(
        fetch: Token,
        direction: Token,
        count: Expr,
        rows: Token,
        only: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "FetchClause";
        check_keyword(NODE, "fetch", &fetch, Keyword::Fetch)?;
        check(
            NODE,
            "direction",
            &direction,
            "FIRST or NEXT",
            direction.is_any_keyword(&[Keyword::First, Keyword::Next]),
        )?;
        check(
            NODE,
            "rows",
            &rows,
            "ROW or ROWS",
            rows.is_any_keyword(&[Keyword::Row, Keyword::Rows]),
        )?;
        check_keyword(NODE, "only", &only, Keyword::Only)?;
        Ok(Self {
            fetch,
            direction,
            count,
            rows,
            only,
        })
    }

    #[must_use]
    pub const fn count(&self) -> &Expr {
        &self.count
    }
}

/// `OFFSET n ROW|ROWS [FETCH ...]` after an `ORDER BY`.
#[derive(Debug, Clone)]
pub struct OffsetFetch {
    pub(crate) offset: Token,
    pub(crate) count: Expr,
    pub(crate) rows: Token,
    pub(crate) fetch: Option<FetchClause>,
}

impl OffsetFetch {
    pub fn new(
        offset: Token,
        count: Expr,
        rows: Token,
        fetch: Option<FetchClause>,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "OffsetFetch";
        check_keyword(NODE, "offset", &offset, Keyword::Offset)?;
        check(
            NODE,
            "rows",
            &rows,
            "ROW or ROWS",
            rows.is_any_keyword(&[Keyword::Row, Keyword::Rows]),
        )?;
        Ok(Self {
            offset,
            count,
            rows,
            fetch,
        })
    }

    #[must_use]
    pub const fn offset(&self) -> &Expr {
        &self.count
    }

    #[must_use]
    pub const fn fetch(&self) -> Option<&FetchClause> {
        self.fetch.as_ref()
    }
}

impl SyntaxNode for OffsetFetch {
    fn kind_name(&self) -> &'static str {
        "OffsetFetch"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Token(&self.offset),
            self.count.child(),
            Child::Token(&self.rows),
        ];
        if let Some(fetch) = &self.fetch {
            children.extend([
                Child::Token(&fetch.fetch),
                Child::Token(&fetch.direction),
                fetch.count.child(),
                Child::Token(&fetch.rows),
                Child::Token(&fetch.only),
            ]);
        }
        children
    }
}

/// `query ORDER BY items [OFFSET ... FETCH ...]`.
#[derive(Debug, Clone)]
pub struct OrderByExpr {
    pub(crate) query: Expr,
    pub(crate) order_by: Rc<Clause>,
    pub(crate) offset: Option<Rc<OffsetFetch>>,
}

impl OrderByExpr {
    pub fn new(
        query: Expr,
        order_by: Rc<Clause>,
        offset: Option<Rc<OffsetFetch>>,
    ) -> Result<Self, ShapeError> {
        check_keyword("OrderByExpr", "order", &order_by.keywords[0], Keyword::Order)?;
        Ok(Self {
            query,
            order_by,
            offset,
        })
    }

    #[must_use]
    pub const fn query(&self) -> &Expr {
        &self.query
    }

    /// The ordering items.
    #[must_use]
    pub fn items(&self) -> Vec<&Expr> {
        self.order_by.body.items()
    }

    #[must_use]
    pub fn offset(&self) -> Option<&OffsetFetch> {
        self.offset.as_deref()
    }
}

impl SyntaxNode for OrderByExpr {
    fn kind_name(&self) -> &'static str {
        "OrderByExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![self.query.child(), Child::Node(self.order_by.as_ref())];
        if let Some(offset) = &self.offset {
            children.push(Child::Node(offset.as_ref()));
        }
        children
    }
}

/// `query FOR XML|JSON|BROWSE ...` or `query OPTION (...)`. The option text
/// is kept as raw tokens.
#[derive(Debug, Clone)]
pub struct QueryOptionExpr {
    pub(crate) query: Expr,
    pub(crate) keyword: Token,
    pub(crate) options: Rc<RawTokens>,
}

impl QueryOptionExpr {
    pub fn new(query: Expr, keyword: Token, options: Rc<RawTokens>) -> Result<Self, ShapeError> {
        check(
            "QueryOptionExpr",
            "keyword",
            &keyword,
            "FOR or OPTION",
            keyword.is_any_keyword(&[Keyword::For, Keyword::Option]),
        )?;
        if options.is_empty() {
            return Err(ShapeError::EmptyList {
                node: "QueryOptionExpr",
                list: "options",
            });
        }
        Ok(Self {
            query,
            keyword,
            options,
        })
    }

    #[must_use]
    pub const fn query(&self) -> &Expr {
        &self.query
    }

    #[must_use]
    pub const fn keyword(&self) -> &Token {
        &self.keyword
    }

    #[must_use]
    pub fn options(&self) -> &[Token] {
        self.options.tokens()
    }
}

impl SyntaxNode for QueryOptionExpr {
    fn kind_name(&self) -> &'static str {
        "QueryOptionExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            self.query.child(),
            Child::Token(&self.keyword),
            Child::Node(self.options.as_ref()),
        ]
    }
}

/// `OVER ([PARTITION BY ...] [ORDER BY ...] [frame])`.
#[derive(Debug, Clone)]
pub struct OverClause {
    pub(crate) over: Token,
    pub(crate) lparen: Token,
    pub(crate) partition: Option<Rc<Clause>>,
    pub(crate) order: Option<Rc<Clause>>,
    pub(crate) frame: Option<Rc<RawTokens>>,
    pub(crate) rparen: Token,
}

impl OverClause {
    pub fn new(
        over: Token,
        lparen: Token,
        partition: Option<Rc<Clause>>,
        order: Option<Rc<Clause>>,
        frame: Option<Rc<RawTokens>>,
        rparen: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "OverClause";
        check_keyword(NODE, "over", &over, Keyword::Over)?;
        check_kind(NODE, "open paren", &lparen, TokenKind::LeftParen, "'('")?;
        check_clause(partition.as_ref(), Keyword::Partition, NODE)?;
        check_clause(order.as_ref(), Keyword::Order, NODE)?;
        check_kind(NODE, "close paren", &rparen, TokenKind::RightParen, "')'")?;
        Ok(Self {
            over,
            lparen,
            partition,
            order,
            frame,
            rparen,
        })
    }

    #[must_use]
    pub fn partition_by(&self) -> Option<&Expr> {
        self.partition.as_deref().map(Clause::body)
    }

    #[must_use]
    pub fn order_by(&self) -> Option<&Expr> {
        self.order.as_deref().map(Clause::body)
    }

    #[must_use]
    pub fn frame(&self) -> Option<&[Token]> {
        self.frame.as_deref().map(RawTokens::tokens)
    }
}

impl SyntaxNode for OverClause {
    fn kind_name(&self) -> &'static str {
        "OverClause"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![Child::Token(&self.over), Child::Token(&self.lparen)];
        if let Some(partition) = &self.partition {
            children.push(Child::Node(partition.as_ref()));
        }
        if let Some(order) = &self.order {
            children.push(Child::Node(order.as_ref()));
        }
        if let Some(frame) = &self.frame {
            children.push(Child::Node(frame.as_ref()));
        }
        children.push(Child::Token(&self.rparen));
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LiteralExpr;
    use crate::lexer::Span;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, Span::default())
    }

    fn kw(text: &str) -> Token {
        tok(TokenKind::Identifier, text)
    }

    fn one() -> Expr {
        LiteralExpr::new(tok(TokenKind::Integer, "1")).unwrap().into()
    }

    #[test]
    fn test_clause_checks_keywords() {
        assert!(Clause::new(vec![kw("group"), kw("by")], &[Keyword::Group, Keyword::By], one()).is_ok());
        assert!(Clause::new(vec![kw("group")], &[Keyword::Group, Keyword::By], one()).is_err());
        assert!(Clause::new(vec![kw("where")], &[Keyword::From], one()).is_err());
    }

    #[test]
    fn test_select_rejects_misplaced_clause() {
        let where_clause = Rc::new(Clause::new(vec![kw("WHERE")], &[Keyword::Where], one()).unwrap());
        let clauses = SelectClauses {
            from: Some(where_clause),
            ..SelectClauses::default()
        };
        assert!(SelectExpr::new(kw("SELECT"), None, None, one(), clauses).is_err());
    }

    #[test]
    fn test_top_parens_are_paired() {
        let top = TopClause::new(
            kw("TOP"),
            Token::placeholder(),
            one(),
            Token::placeholder(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(top.children().len(), 4);
        assert_eq!(top.tokens().len(), 2);
        assert!(TopClause::new(
            kw("TOP"),
            tok(TokenKind::LeftParen, "("),
            one(),
            Token::placeholder(),
            None,
            None
        )
        .is_err());
    }

    #[test]
    fn test_union_all_only() {
        assert!(SetOperationExpr::new(one(), kw("UNION"), Some(kw("ALL")), one()).is_ok());
        assert!(SetOperationExpr::new(one(), kw("EXCEPT"), Some(kw("ALL")), one()).is_err());
    }
}
