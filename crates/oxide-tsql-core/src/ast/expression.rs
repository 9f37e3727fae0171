//! Expression nodes.

use std::rc::Rc;

use super::error::{check, check_identifier, check_keyword, check_kind, ShapeError};
use super::{
    Child, DataType, ExprList, OrderByExpr, OverClause, QueryOptionExpr, RawTokens, SelectExpr,
    SetOperationExpr, SyntaxNode,
};
use crate::lexer::{Keyword, Token, TokenKind};

node_enum! {
    /// An expression.
    ///
    /// Queries are expressions too: a `SELECT` is parsed by the expression
    /// engine and combined with set operators, `ORDER BY` and query options
    /// as infix operators.
    pub enum Expr {
        Literal(LiteralExpr) => visit_literal,
        Name(NameExpr) => visit_name,
        Unary(UnaryExpr) => visit_unary,
        Binary(BinaryExpr) => visit_binary,
        Assignment(AssignmentExpr) => visit_assignment,
        IsNull(IsNullExpr) => visit_is_null,
        Like(LikeExpr) => visit_like,
        Between(BetweenExpr) => visit_between,
        In(InExpr) => visit_in,
        Paren(ParenExpr) => visit_paren,
        Call(CallExpr) => visit_call,
        Window(WindowExpr) => visit_window,
        Cast(CastExpr) => visit_cast,
        Case(CaseExpr) => visit_case,
        Collate(CollateExpr) => visit_collate,
        List(ExprList) => visit_list,
        Alias(AliasExpr) => visit_alias,
        Sort(SortExpr) => visit_sort,
        Join(JoinExpr) => visit_join,
        TableHint(TableHintExpr) => visit_table_hint,
        Select(SelectExpr) => visit_select,
        SetOperation(SetOperationExpr) => visit_set_operation,
        OrderBy(OrderByExpr) => visit_order_by,
        QueryOption(QueryOptionExpr) => visit_query_option,
        Raw(RawTokens) => visit_raw,
    }
}

impl Expr {
    /// Returns true for queries: `SELECT`, set operations, ordered or
    /// optioned queries, and parenthesized queries.
    #[must_use]
    pub fn is_query(&self) -> bool {
        match self {
            Self::Select(_) | Self::SetOperation(_) | Self::OrderBy(_) | Self::QueryOption(_) => {
                true
            }
            Self::Paren(paren) => paren.inner.is_query(),
            _ => false,
        }
    }

    /// The items of a list, or this expression alone.
    #[must_use]
    pub fn items(&self) -> Vec<&Self> {
        match self {
            Self::List(list) => list.iter().collect(),
            other => vec![other],
        }
    }

    #[must_use]
    pub fn as_name(&self) -> Option<&NameExpr> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    pub(crate) fn child(&self) -> Child<'_> {
        Child::Node(self.as_node())
    }
}

/// A literal: number, string, binary or `NULL`.
#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub(crate) token: Token,
}

impl LiteralExpr {
    pub fn new(token: Token) -> Result<Self, ShapeError> {
        check(
            "LiteralExpr",
            "value",
            &token,
            "literal",
            token.kind().is_literal() || token.is_keyword(Keyword::Null),
        )?;
        Ok(Self { token })
    }

    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.token.is_keyword(Keyword::Null)
    }
}

impl SyntaxNode for LiteralExpr {
    fn kind_name(&self) -> &'static str {
        "LiteralExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::Token(&self.token)]
    }
}

/// A possibly multi-part name: `col`, `t.col`, `db..t`, `t.*`, `@var`,
/// `*`. The slots are the name parts and the dots between them.
#[derive(Debug, Clone)]
pub struct NameExpr {
    pub(crate) parts: Vec<Token>,
}

impl NameExpr {
    pub fn new(parts: Vec<Token>) -> Result<Self, ShapeError> {
        const NODE: &str = "NameExpr";
        if parts.is_empty() {
            return Err(ShapeError::EmptyList {
                node: NODE,
                list: "parts",
            });
        }
        let last = parts.len() - 1;
        let mut expect_part = true;
        for (i, token) in parts.iter().enumerate() {
            if token.kind() == TokenKind::Dot {
                check(NODE, "separator", token, "name part", i > 0 && i < last)?;
                expect_part = true;
            } else {
                check(NODE, "part", token, "'.'", expect_part)?;
                let is_star = token.kind() == TokenKind::Star;
                check(
                    NODE,
                    "part",
                    token,
                    "identifier",
                    token.is_identifier() || (is_star && i == last),
                )?;
                expect_part = false;
            }
        }
        Ok(Self { parts })
    }

    /// A single-part name.
    pub fn single(token: Token) -> Result<Self, ShapeError> {
        Self::new(vec![token])
    }

    /// All slot tokens, dots included.
    #[must_use]
    pub fn tokens_with_dots(&self) -> &[Token] {
        &self.parts
    }

    /// The name parts without the dots.
    pub fn parts(&self) -> impl Iterator<Item = &Token> {
        self.parts.iter().filter(|t| t.kind() != TokenKind::Dot)
    }

    #[must_use]
    pub fn last_part(&self) -> &Token {
        &self.parts[self.parts.len() - 1]
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        self.parts.len() == 1
    }

    /// Returns true for a lone `@variable`.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.is_single() && self.parts[0].is_variable()
    }

    /// Returns true for `*` and `t.*`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.last_part().kind() == TokenKind::Star
    }

    /// Returns true for a single unquoted keyword name, e.g. `CAST`.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.is_single() && self.parts[0].is_keyword(keyword)
    }

    /// The canonical dotted name, e.g. `dbo.my table` for `dbo.[my table]`.
    #[must_use]
    pub fn name(&self) -> String {
        self.parts
            .iter()
            .map(|t| if t.kind() == TokenKind::Dot { ".".into() } else { t.value() })
            .collect()
    }
}

impl SyntaxNode for NameExpr {
    fn kind_name(&self) -> &'static str {
        "NameExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        self.parts.iter().map(Child::Token).collect()
    }
}

/// A prefix operator: `-x`, `+x`, `~x`, `NOT x`.
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub(crate) operator: Token,
    pub(crate) operand: Expr,
}

impl UnaryExpr {
    pub fn new(operator: Token, operand: Expr) -> Result<Self, ShapeError> {
        check(
            "UnaryExpr",
            "operator",
            &operator,
            "prefix operator",
            matches!(
                operator.kind(),
                TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde
            ) || operator.is_keyword(Keyword::Not),
        )?;
        Ok(Self { operator, operand })
    }

    #[must_use]
    pub const fn operator(&self) -> &Token {
        &self.operator
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub fn is_not(&self) -> bool {
        self.operator.is_keyword(Keyword::Not)
    }
}

impl SyntaxNode for UnaryExpr {
    fn kind_name(&self) -> &'static str {
        "UnaryExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::Token(&self.operator), self.operand.child()]
    }
}

/// An infix operator: arithmetic, bitwise, comparison, `AND`, `OR`.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub(crate) left: Expr,
    pub(crate) operator: Token,
    pub(crate) right: Expr,
}

impl BinaryExpr {
    pub fn new(left: Expr, operator: Token, right: Expr) -> Result<Self, ShapeError> {
        let kind = operator.kind();
        check(
            "BinaryExpr",
            "operator",
            &operator,
            "binary operator",
            kind.is_arithmetic()
                || kind.is_comparison()
                || operator.is_any_keyword(&[Keyword::And, Keyword::Or]),
        )?;
        Ok(Self {
            left,
            operator,
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

    /// Returns true for `AND` and `OR`.
    #[must_use]
    pub fn is_logical(&self) -> bool {
        self.operator.is_any_keyword(&[Keyword::And, Keyword::Or])
    }

    #[must_use]
    pub fn is_comparison(&self) -> bool {
        self.operator.kind().is_comparison()
    }
}

impl SyntaxNode for BinaryExpr {
    fn kind_name(&self) -> &'static str {
        "BinaryExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            self.left.child(),
            Child::Token(&self.operator),
            self.right.child(),
        ]
    }
}

/// `name = value` in assignment context, or a compound assignment.
#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub(crate) target: Expr,
    pub(crate) operator: Token,
    pub(crate) value: Expr,
}

impl AssignmentExpr {
    pub fn new(target: Expr, operator: Token, value: Expr) -> Result<Self, ShapeError> {
        const NODE: &str = "AssignmentExpr";
        if target.as_name().is_none() {
            return Err(ShapeError::Invalid {
                node: NODE,
                reason: "assignment target must be a name",
            });
        }
        check(
            NODE,
            "operator",
            &operator,
            "assignment operator",
            operator.kind().is_assignment(),
        )?;
        Ok(Self {
            target,
            operator,
            value,
        })
    }

    #[must_use]
    pub const fn target(&self) -> &Expr {
        &self.target
    }

    #[must_use]
    pub const fn operator(&self) -> &Token {
        &self.operator
    }

    #[must_use]
    pub const fn value(&self) -> &Expr {
        &self.value
    }
}

impl SyntaxNode for AssignmentExpr {
    fn kind_name(&self) -> &'static str {
        "AssignmentExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            self.target.child(),
            Child::Token(&self.operator),
            self.value.child(),
        ]
    }
}

/// `operand IS [NOT] NULL`.
#[derive(Debug, Clone)]
pub struct IsNullExpr {
    pub(crate) operand: Expr,
    pub(crate) is_token: Token,
    pub(crate) not_token: Option<Token>,
    pub(crate) null_token: Token,
}

impl IsNullExpr {
    pub fn new(
        operand: Expr,
        is_token: Token,
        not_token: Option<Token>,
        null_token: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "IsNullExpr";
        check_keyword(NODE, "is", &is_token, Keyword::Is)?;
        if let Some(not) = &not_token {
            check_keyword(NODE, "not", not, Keyword::Not)?;
        }
        check_keyword(NODE, "null", &null_token, Keyword::Null)?;
        Ok(Self {
            operand,
            is_token,
            not_token,
            null_token,
        })
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub const fn is_not(&self) -> bool {
        self.not_token.is_some()
    }

    #[must_use]
    pub const fn null_token(&self) -> &Token {
        &self.null_token
    }
}

impl SyntaxNode for IsNullExpr {
    fn kind_name(&self) -> &'static str {
        "IsNullExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![self.operand.child(), Child::Token(&self.is_token)];
        if let Some(not) = &self.not_token {
            children.push(Child::Token(not));
        }
        children.push(Child::Token(&self.null_token));
        children
    }
}

/// `operand [NOT] LIKE pattern [ESCAPE escape]`.
#[derive(Debug, Clone)]
pub struct LikeExpr {
    pub(crate) operand: Expr,
    pub(crate) not_token: Option<Token>,
    pub(crate) like: Token,
    pub(crate) pattern: Expr,
    pub(crate) escape: Option<(Token, Expr)>,
}

impl LikeExpr {
    pub fn new(
        operand: Expr,
        not_token: Option<Token>,
        like: Token,
        pattern: Expr,
        escape: Option<(Token, Expr)>,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "LikeExpr";
        if let Some(not) = &not_token {
            check_keyword(NODE, "not", not, Keyword::Not)?;
        }
        check_keyword(NODE, "like", &like, Keyword::Like)?;
        if let Some((keyword, _)) = &escape {
            check_keyword(NODE, "escape", keyword, Keyword::Escape)?;
        }
        Ok(Self {
            operand,
            not_token,
            like,
            pattern,
            escape,
        })
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub const fn pattern(&self) -> &Expr {
        &self.pattern
    }

    #[must_use]
    pub fn escape(&self) -> Option<&Expr> {
        self.escape.as_ref().map(|(_, e)| e)
    }

    #[must_use]
    pub const fn is_not(&self) -> bool {
        self.not_token.is_some()
    }
}

impl SyntaxNode for LikeExpr {
    fn kind_name(&self) -> &'static str {
        "LikeExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![self.operand.child()];
        if let Some(not) = &self.not_token {
            children.push(Child::Token(not));
        }
        children.push(Child::Token(&self.like));
        children.push(self.pattern.child());
        if let Some((keyword, escape)) = &self.escape {
            children.push(Child::Token(keyword));
            children.push(escape.child());
        }
        children
    }
}

/// `operand [NOT] BETWEEN low AND high`.
#[derive(Debug, Clone)]
pub struct BetweenExpr {
    pub(crate) operand: Expr,
    pub(crate) not_token: Option<Token>,
    pub(crate) between: Token,
    pub(crate) low: Expr,
    pub(crate) and: Token,
    pub(crate) high: Expr,
}

impl BetweenExpr {
    pub fn new(
        operand: Expr,
        not_token: Option<Token>,
        between: Token,
        low: Expr,
        and: Token,
        high: Expr,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "BetweenExpr";
        if let Some(not) = &not_token {
            check_keyword(NODE, "not", not, Keyword::Not)?;
        }
        check_keyword(NODE, "between", &between, Keyword::Between)?;
        check_keyword(NODE, "and", &and, Keyword::And)?;
        Ok(Self {
            operand,
            not_token,
            between,
            low,
            and,
            high,
        })
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub const fn low(&self) -> &Expr {
        &self.low
    }

    #[must_use]
    pub const fn high(&self) -> &Expr {
        &self.high
    }

    #[must_use]
    pub const fn is_not(&self) -> bool {
        self.not_token.is_some()
    }
}

impl SyntaxNode for BetweenExpr {
    fn kind_name(&self) -> &'static str {
        "BetweenExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![self.operand.child()];
        if let Some(not) = &self.not_token {
            children.push(Child::Token(not));
        }
        children.extend([
            Child::Token(&self.between),
            self.low.child(),
            Child::Token(&self.and),
            self.high.child(),
        ]);
        children
    }
}

/// `operand [NOT] IN (values)`, where `values` is a list or a subquery.
#[derive(Debug, Clone)]
pub struct InExpr {
    pub(crate) operand: Expr,
    pub(crate) not_token: Option<Token>,
    pub(crate) in_token: Token,
    pub(crate) lparen: Token,
    pub(crate) values: Expr,
    pub(crate) rparen: Token,
}

impl InExpr {
    pub fn new(
        operand: Expr,
        not_token: Option<Token>,
        in_token: Token,
        lparen: Token,
        values: Expr,
        rparen: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "InExpr";
        if let Some(not) = &not_token {
            check_keyword(NODE, "not", not, Keyword::Not)?;
        }
        check_keyword(NODE, "in", &in_token, Keyword::In)?;
        check_kind(NODE, "open paren", &lparen, TokenKind::LeftParen, "'('")?;
        check_kind(NODE, "close paren", &rparen, TokenKind::RightParen, "')'")?;
        Ok(Self {
            operand,
            not_token,
            in_token,
            lparen,
            values,
            rparen,
        })
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub const fn values(&self) -> &Expr {
        &self.values
    }

    #[must_use]
    pub const fn is_not(&self) -> bool {
        self.not_token.is_some()
    }
}

impl SyntaxNode for InExpr {
    fn kind_name(&self) -> &'static str {
        "InExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![self.operand.child()];
        if let Some(not) = &self.not_token {
            children.push(Child::Token(not));
        }
        children.extend([
            Child::Token(&self.in_token),
            Child::Token(&self.lparen),
            self.values.child(),
            Child::Token(&self.rparen),
        ]);
        children
    }
}

/// A parenthesized expression or subquery.
#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub(crate) lparen: Token,
    pub(crate) inner: Expr,
    pub(crate) rparen: Token,
}

impl ParenExpr {
    pub fn new(lparen: Token, inner: Expr, rparen: Token) -> Result<Self, ShapeError> {
        check_kind("ParenExpr", "open paren", &lparen, TokenKind::LeftParen, "'('")?;
        check_kind("ParenExpr", "close paren", &rparen, TokenKind::RightParen, "')'")?;
        Ok(Self {
            lparen,
            inner,
            rparen,
        })
    }

    #[must_use]
    pub const fn inner(&self) -> &Expr {
        &self.inner
    }
}

impl SyntaxNode for ParenExpr {
    fn kind_name(&self) -> &'static str {
        "ParenExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.lparen),
            self.inner.child(),
            Child::Token(&self.rparen),
        ]
    }
}

/// A function call. The argument slot is dropped for `f()`.
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub(crate) callee: Expr,
    pub(crate) lparen: Token,
    pub(crate) args: Option<Expr>,
    pub(crate) rparen: Token,
}

impl CallExpr {
    pub fn new(
        callee: Expr,
        lparen: Token,
        args: Option<Expr>,
        rparen: Token,
    ) -> Result<Self, ShapeError> {
        check_kind("CallExpr", "open paren", &lparen, TokenKind::LeftParen, "'('")?;
        check_kind("CallExpr", "close paren", &rparen, TokenKind::RightParen, "')'")?;
        Ok(Self {
            callee,
            lparen,
            args,
            rparen,
        })
    }

    #[must_use]
    pub const fn callee(&self) -> &Expr {
        &self.callee
    }

    /// The argument slot: a list, a single expression, or raw tokens.
    #[must_use]
    pub const fn args(&self) -> Option<&Expr> {
        self.args.as_ref()
    }

    /// The individual arguments.
    #[must_use]
    pub fn arguments(&self) -> Vec<&Expr> {
        self.args.as_ref().map_or_else(Vec::new, Expr::items)
    }

    /// The function name, when the callee is a name.
    #[must_use]
    pub fn function_name(&self) -> Option<String> {
        self.callee.as_name().map(NameExpr::name)
    }
}

impl SyntaxNode for CallExpr {
    fn kind_name(&self) -> &'static str {
        "CallExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![self.callee.child(), Child::Token(&self.lparen)];
        if let Some(args) = &self.args {
            children.push(args.child());
        }
        children.push(Child::Token(&self.rparen));
        children
    }
}

/// A call with an `OVER (...)` window.
#[derive(Debug, Clone)]
pub struct WindowExpr {
    pub(crate) function: Expr,
    pub(crate) over: Rc<OverClause>,
}

impl WindowExpr {
    pub fn new(function: Expr, over: Rc<OverClause>) -> Result<Self, ShapeError> {
        if !matches!(function, Expr::Call(_)) {
            return Err(ShapeError::Invalid {
                node: "WindowExpr",
                reason: "OVER applies to a function call",
            });
        }
        Ok(Self { function, over })
    }

    #[must_use]
    pub const fn function(&self) -> &Expr {
        &self.function
    }

    #[must_use]
    pub fn over(&self) -> &OverClause {
        &self.over
    }
}

impl SyntaxNode for WindowExpr {
    fn kind_name(&self) -> &'static str {
        "WindowExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![self.function.child(), Child::Node(self.over.as_ref())]
    }
}

/// `CAST(operand AS type)` or `TRY_CAST(...)`.
#[derive(Debug, Clone)]
pub struct CastExpr {
    pub(crate) cast: Token,
    pub(crate) lparen: Token,
    pub(crate) operand: Expr,
    pub(crate) as_token: Token,
    pub(crate) data_type: DataType,
    pub(crate) rparen: Token,
}

impl CastExpr {
    pub fn new(
        cast: Token,
        lparen: Token,
        operand: Expr,
        as_token: Token,
        data_type: DataType,
        rparen: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "CastExpr";
        check(
            NODE,
            "cast",
            &cast,
            "CAST",
            cast.is_any_keyword(&[Keyword::Cast, Keyword::TryCast]),
        )?;
        check_kind(NODE, "open paren", &lparen, TokenKind::LeftParen, "'('")?;
        check_keyword(NODE, "as", &as_token, Keyword::As)?;
        check_kind(NODE, "close paren", &rparen, TokenKind::RightParen, "')'")?;
        Ok(Self {
            cast,
            lparen,
            operand,
            as_token,
            data_type,
            rparen,
        })
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    #[must_use]
    pub fn is_try(&self) -> bool {
        self.cast.is_keyword(Keyword::TryCast)
    }
}

impl SyntaxNode for CastExpr {
    fn kind_name(&self) -> &'static str {
        "CastExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.cast),
            Child::Token(&self.lparen),
            self.operand.child(),
            Child::Token(&self.as_token),
            Child::Node(self.data_type.as_node()),
            Child::Token(&self.rparen),
        ]
    }
}

/// One `WHEN condition THEN result` arm of a `CASE`.
#[derive(Debug, Clone)]
pub struct WhenClause {
    pub(crate) when: Token,
    pub(crate) condition: Expr,
    pub(crate) then: Token,
    pub(crate) result: Expr,
}

impl WhenClause {
    pub fn new(when: Token, condition: Expr, then: Token, result: Expr) -> Result<Self, ShapeError> {
        check_keyword("WhenClause", "when", &when, Keyword::When)?;
        check_keyword("WhenClause", "then", &then, Keyword::Then)?;
        Ok(Self {
            when,
            condition,
            then,
            result,
        })
    }

    #[must_use]
    pub const fn condition(&self) -> &Expr {
        &self.condition
    }

    #[must_use]
    pub const fn result(&self) -> &Expr {
        &self.result
    }
}

impl SyntaxNode for WhenClause {
    fn kind_name(&self) -> &'static str {
        "WhenClause"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.when),
            self.condition.child(),
            Child::Token(&self.then),
            self.result.child(),
        ]
    }
}

/// `CASE [operand] WHEN ... THEN ... [ELSE ...] END`.
///
/// With an operand this is a simple case; without one a searched case.
#[derive(Debug, Clone)]
pub struct CaseExpr {
    pub(crate) case: Token,
    pub(crate) operand: Option<Expr>,
    pub(crate) whens: Vec<Rc<WhenClause>>,
    pub(crate) else_clause: Option<(Token, Expr)>,
    pub(crate) end: Token,
}

impl CaseExpr {
    pub fn new(
        case: Token,
        operand: Option<Expr>,
        whens: Vec<Rc<WhenClause>>,
        else_clause: Option<(Token, Expr)>,
        end: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "CaseExpr";
        check_keyword(NODE, "case", &case, Keyword::Case)?;
        if whens.is_empty() {
            return Err(ShapeError::EmptyList {
                node: NODE,
                list: "WHEN arms",
            });
        }
        if let Some((keyword, _)) = &else_clause {
            check_keyword(NODE, "else", keyword, Keyword::Else)?;
        }
        check_keyword(NODE, "end", &end, Keyword::End)?;
        Ok(Self {
            case,
            operand,
            whens,
            else_clause,
            end,
        })
    }

    #[must_use]
    pub const fn operand(&self) -> Option<&Expr> {
        self.operand.as_ref()
    }

    #[must_use]
    pub fn whens(&self) -> &[Rc<WhenClause>] {
        &self.whens
    }

    #[must_use]
    pub fn else_result(&self) -> Option<&Expr> {
        self.else_clause.as_ref().map(|(_, e)| e)
    }

    #[must_use]
    pub const fn is_simple_case(&self) -> bool {
        self.operand.is_some()
    }

    #[must_use]
    pub const fn has_else(&self) -> bool {
        self.else_clause.is_some()
    }
}

impl SyntaxNode for CaseExpr {
    fn kind_name(&self) -> &'static str {
        "CaseExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![Child::Token(&self.case)];
        if let Some(operand) = &self.operand {
            children.push(operand.child());
        }
        for when in &self.whens {
            children.push(Child::Node(when.as_ref()));
        }
        if let Some((keyword, result)) = &self.else_clause {
            children.push(Child::Token(keyword));
            children.push(result.child());
        }
        children.push(Child::Token(&self.end));
        children
    }
}

/// `operand COLLATE collation_name`.
#[derive(Debug, Clone)]
pub struct CollateExpr {
    pub(crate) operand: Expr,
    pub(crate) collate: Token,
    pub(crate) collation: Token,
}

impl CollateExpr {
    pub fn new(operand: Expr, collate: Token, collation: Token) -> Result<Self, ShapeError> {
        check_keyword("CollateExpr", "collate", &collate, Keyword::Collate)?;
        check_identifier("CollateExpr", "collation", &collation)?;
        Ok(Self {
            operand,
            collate,
            collation,
        })
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub const fn collation(&self) -> &Token {
        &self.collation
    }
}

impl SyntaxNode for CollateExpr {
    fn kind_name(&self) -> &'static str {
        "CollateExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            self.operand.child(),
            Child::Token(&self.collate),
            Child::Token(&self.collation),
        ]
    }
}

/// `operand [AS] alias` in a select list or table source.
#[derive(Debug, Clone)]
pub struct AliasExpr {
    pub(crate) operand: Expr,
    pub(crate) as_token: Token,
    pub(crate) alias: Token,
}

impl AliasExpr {
    pub fn new(operand: Expr, as_token: Token, alias: Token) -> Result<Self, ShapeError> {
        const NODE: &str = "AliasExpr";
        check(
            NODE,
            "as",
            &as_token,
            "AS",
            as_token.is_placeholder() || as_token.is_keyword(Keyword::As),
        )?;
        check(
            NODE,
            "alias",
            &alias,
            "alias",
            alias.is_identifier() || alias.kind() == TokenKind::String,
        )?;
        Ok(Self {
            operand,
            as_token,
            alias,
        })
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub const fn alias(&self) -> &Token {
        &self.alias
    }

    #[must_use]
    pub fn has_as(&self) -> bool {
        !self.as_token.is_placeholder()
    }
}

impl SyntaxNode for AliasExpr {
    fn kind_name(&self) -> &'static str {
        "AliasExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            self.operand.child(),
            Child::Token(&self.as_token),
            Child::Token(&self.alias),
        ]
    }
}

/// An ordering item with an explicit direction: `expr ASC|DESC`.
#[derive(Debug, Clone)]
pub struct SortExpr {
    pub(crate) operand: Expr,
    pub(crate) direction: Token,
}

impl SortExpr {
    pub fn new(operand: Expr, direction: Token) -> Result<Self, ShapeError> {
        check(
            "SortExpr",
            "direction",
            &direction,
            "ASC or DESC",
            direction.is_any_keyword(&[Keyword::Asc, Keyword::Desc]),
        )?;
        Ok(Self { operand, direction })
    }

    #[must_use]
    pub const fn operand(&self) -> &Expr {
        &self.operand
    }

    #[must_use]
    pub fn is_descending(&self) -> bool {
        self.direction.is_keyword(Keyword::Desc)
    }
}

impl SyntaxNode for SortExpr {
    fn kind_name(&self) -> &'static str {
        "SortExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![self.operand.child(), Child::Token(&self.direction)]
    }
}

/// A join between two table sources.
///
/// The operator is one to three keywords (`JOIN`, `LEFT OUTER JOIN`,
/// `CROSS APPLY`, ...). The `ON` slots are dropped for cross joins and
/// `APPLY`.
#[derive(Debug, Clone)]
pub struct JoinExpr {
    pub(crate) left: Expr,
    pub(crate) operator: Vec<Token>,
    pub(crate) right: Expr,
    pub(crate) on: Option<(Token, Expr)>,
}

impl JoinExpr {
    pub fn new(
        left: Expr,
        operator: Vec<Token>,
        right: Expr,
        on: Option<(Token, Expr)>,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "JoinExpr";
        let Some(last) = operator.last() else {
            return Err(ShapeError::EmptyList {
                node: NODE,
                list: "join operator",
            });
        };
        check(
            NODE,
            "operator",
            last,
            "JOIN or APPLY",
            operator.len() <= 3 && last.is_any_keyword(&[Keyword::Join, Keyword::Apply]),
        )?;
        let unconditional = last.is_keyword(Keyword::Apply) || operator[0].is_keyword(Keyword::Cross);
        if unconditional == on.is_some() {
            return Err(ShapeError::Invalid {
                node: NODE,
                reason: "ON is required for conditional joins only",
            });
        }
        if let Some((keyword, _)) = &on {
            check_keyword(NODE, "on", keyword, Keyword::On)?;
        }
        Ok(Self {
            left,
            operator,
            right,
            on,
        })
    }

    #[must_use]
    pub const fn left(&self) -> &Expr {
        &self.left
    }

    #[must_use]
    pub const fn right(&self) -> &Expr {
        &self.right
    }

    #[must_use]
    pub fn condition(&self) -> Option<&Expr> {
        self.on.as_ref().map(|(_, e)| e)
    }

    /// The join operator in canonical form, e.g. `LEFT OUTER JOIN`.
    #[must_use]
    pub fn join_kind(&self) -> String {
        self.operator
            .iter()
            .map(|t| t.text().to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SyntaxNode for JoinExpr {
    fn kind_name(&self) -> &'static str {
        "JoinExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![self.left.child()];
        children.extend(self.operator.iter().map(Child::Token));
        children.push(self.right.child());
        if let Some((keyword, condition)) = &self.on {
            children.push(Child::Token(keyword));
            children.push(condition.child());
        }
        children
    }
}

/// A table source with hints: `t WITH (NOLOCK)`.
#[derive(Debug, Clone)]
pub struct TableHintExpr {
    pub(crate) table: Expr,
    pub(crate) with: Token,
    pub(crate) lparen: Token,
    pub(crate) hints: Expr,
    pub(crate) rparen: Token,
}

impl TableHintExpr {
    pub fn new(
        table: Expr,
        with: Token,
        lparen: Token,
        hints: Expr,
        rparen: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "TableHintExpr";
        check_keyword(NODE, "with", &with, Keyword::With)?;
        check_kind(NODE, "open paren", &lparen, TokenKind::LeftParen, "'('")?;
        check_kind(NODE, "close paren", &rparen, TokenKind::RightParen, "')'")?;
        Ok(Self {
            table,
            with,
            lparen,
            hints,
            rparen,
        })
    }

    #[must_use]
    pub const fn table(&self) -> &Expr {
        &self.table
    }

    #[must_use]
    pub const fn hints(&self) -> &Expr {
        &self.hints
    }
}

impl SyntaxNode for TableHintExpr {
    fn kind_name(&self) -> &'static str {
        "TableHintExpr"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            self.table.child(),
            Child::Token(&self.with),
            Child::Token(&self.lparen),
            self.hints.child(),
            Child::Token(&self.rparen),
        ]
    }
}
