//! Statement nodes.

use std::rc::Rc;

use super::error::{
    check, check_identifier, check_keyword, check_kind, check_terminator, check_variable,
    ShapeError,
};
use super::{
    Child, CreateInlineFunctionStmt, CreateProcedureStmt, CreateScalarFunctionStmt,
    CreateTableFunctionStmt, CreateViewStmt, DataType, Expr, RawTokens, SeparatedList,
    StatementList, SyntaxNode,
};
use crate::lexer::{Keyword, Token, TokenKind};

node_enum! {
    /// A statement.
    pub enum Stmt {
        Empty(EmptyStmt) => visit_empty,
        Expression(ExpressionStmt) => visit_expression,
        Block(BlockStmt) => visit_block,
        BeginTransaction(BeginTransactionStmt) => visit_begin_transaction,
        TryCatch(TryCatchStmt) => visit_try_catch,
        If(IfStmt) => visit_if,
        While(WhileStmt) => visit_while,
        MonoKeyword(MonoKeywordStmt) => visit_mono_keyword,
        Return(ReturnStmt) => visit_return,
        Goto(GotoStmt) => visit_goto,
        Label(LabelStmt) => visit_label,
        SetVariable(SetVariableStmt) => visit_set_variable,
        SetOption(SetOptionStmt) => visit_set_option,
        Declare(DeclareStmt) => visit_declare,
        DeclareCursor(DeclareCursorStmt) => visit_declare_cursor,
        CreateProcedure(CreateProcedureStmt) => visit_create_procedure,
        CreateView(CreateViewStmt) => visit_create_view,
        CreateScalarFunction(CreateScalarFunctionStmt) => visit_create_scalar_function,
        CreateInlineFunction(CreateInlineFunctionStmt) => visit_create_inline_function,
        CreateTableFunction(CreateTableFunctionStmt) => visit_create_table_function,
        Unmodeled(UnmodeledStmt) => visit_unmodeled,
    }
}

impl Stmt {
    /// The name of the object a `CREATE`/`ALTER` statement defines.
    #[must_use]
    pub fn object_name(&self) -> Option<String> {
        match self {
            Self::CreateProcedure(stmt) => Some(stmt.name.name()),
            Self::CreateView(stmt) => Some(stmt.name.name()),
            Self::CreateScalarFunction(stmt) => Some(stmt.signature.name.name()),
            Self::CreateInlineFunction(stmt) => Some(stmt.signature.name.name()),
            Self::CreateTableFunction(stmt) => Some(stmt.signature.name.name()),
            _ => None,
        }
    }

    pub(crate) fn child(&self) -> Child<'_> {
        Child::Node(self.as_node())
    }
}

/// A lone `;`.
#[derive(Debug, Clone)]
pub struct EmptyStmt {
    pub(crate) terminator: Token,
}

impl EmptyStmt {
    pub fn new(terminator: Token) -> Result<Self, ShapeError> {
        check_kind("EmptyStmt", "terminator", &terminator, TokenKind::Semicolon, "';'")?;
        Ok(Self { terminator })
    }
}

impl SyntaxNode for EmptyStmt {
    fn kind_name(&self) -> &'static str {
        "EmptyStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::Token(&self.terminator)]
    }
}

/// An expression used as a statement, in practice a query.
#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub(crate) expr: Expr,
    pub(crate) terminator: Token,
}

impl ExpressionStmt {
    pub fn new(expr: Expr, terminator: Token) -> Result<Self, ShapeError> {
        check_terminator("ExpressionStmt", &terminator)?;
        Ok(Self { expr, terminator })
    }

    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    #[must_use]
    pub fn has_terminator(&self) -> bool {
        !self.terminator.is_placeholder()
    }
}

impl SyntaxNode for ExpressionStmt {
    fn kind_name(&self) -> &'static str {
        "ExpressionStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![self.expr.child(), Child::Token(&self.terminator)]
    }
}

/// `BEGIN statements END`.
#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub(crate) begin: Token,
    pub(crate) body: Rc<StatementList>,
    pub(crate) end: Token,
    pub(crate) terminator: Token,
}

impl BlockStmt {
    pub fn new(
        begin: Token,
        body: Rc<StatementList>,
        end: Token,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        check_keyword("BlockStmt", "begin", &begin, Keyword::Begin)?;
        check_keyword("BlockStmt", "end", &end, Keyword::End)?;
        check_terminator("BlockStmt", &terminator)?;
        Ok(Self {
            begin,
            body,
            end,
            terminator,
        })
    }

    #[must_use]
    pub fn body(&self) -> &StatementList {
        &self.body
    }
}

impl SyntaxNode for BlockStmt {
    fn kind_name(&self) -> &'static str {
        "BlockStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.begin),
            Child::Node(self.body.as_ref()),
            Child::Token(&self.end),
            Child::Token(&self.terminator),
        ]
    }
}

/// `BEGIN TRAN[SACTION] [name]`.
#[derive(Debug, Clone)]
pub struct BeginTransactionStmt {
    pub(crate) begin: Token,
    pub(crate) transaction: Token,
    pub(crate) name: Option<Token>,
    pub(crate) terminator: Token,
}

impl BeginTransactionStmt {
    pub fn new(
        begin: Token,
        transaction: Token,
        name: Option<Token>,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "BeginTransactionStmt";
        check_keyword(NODE, "begin", &begin, Keyword::Begin)?;
        check(
            NODE,
            "transaction",
            &transaction,
            "TRAN or TRANSACTION",
            transaction.is_any_keyword(&[Keyword::Tran, Keyword::Transaction]),
        )?;
        if let Some(name) = &name {
            check_identifier(NODE, "name", name)?;
        }
        check_terminator(NODE, &terminator)?;
        Ok(Self {
            begin,
            transaction,
            name,
            terminator,
        })
    }

    #[must_use]
    pub const fn name(&self) -> Option<&Token> {
        self.name.as_ref()
    }
}

impl SyntaxNode for BeginTransactionStmt {
    fn kind_name(&self) -> &'static str {
        "BeginTransactionStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![Child::Token(&self.begin), Child::Token(&self.transaction)];
        if let Some(name) = &self.name {
            children.push(Child::Token(name));
        }
        children.push(Child::Token(&self.terminator));
        children
    }
}

/// `BEGIN TRY ... END TRY BEGIN CATCH ... END CATCH`.
///
/// Each keyword pair is stored as `[BEGIN|END, TRY|CATCH]`.
#[derive(Debug, Clone)]
pub struct TryCatchStmt {
    pub(crate) begin_try: [Token; 2],
    pub(crate) try_body: Rc<StatementList>,
    pub(crate) end_try: [Token; 2],
    pub(crate) begin_catch: [Token; 2],
    pub(crate) catch_body: Rc<StatementList>,
    pub(crate) end_catch: [Token; 2],
    pub(crate) terminator: Token,
}

impl TryCatchStmt {
    pub fn new(
        begin_try: [Token; 2],
        try_body: Rc<StatementList>,
        end_try: [Token; 2],
        begin_catch: [Token; 2],
        catch_body: Rc<StatementList>,
        end_catch: [Token; 2],
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "TryCatchStmt";
        for ([first, second], (outer, inner)) in [&begin_try, &end_try, &begin_catch, &end_catch]
            .into_iter()
            .zip([
                (Keyword::Begin, Keyword::Try),
                (Keyword::End, Keyword::Try),
                (Keyword::Begin, Keyword::Catch),
                (Keyword::End, Keyword::Catch),
            ])
        {
            check_keyword(NODE, "keyword", first, outer)?;
            check_keyword(NODE, "keyword", second, inner)?;
        }
        check_terminator(NODE, &terminator)?;
        Ok(Self {
            begin_try,
            try_body,
            end_try,
            begin_catch,
            catch_body,
            end_catch,
            terminator,
        })
    }

    #[must_use]
    pub fn try_body(&self) -> &StatementList {
        &self.try_body
    }

    #[must_use]
    pub fn catch_body(&self) -> &StatementList {
        &self.catch_body
    }
}

impl SyntaxNode for TryCatchStmt {
    fn kind_name(&self) -> &'static str {
        "TryCatchStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children: Vec<Child<'_>> = self.begin_try.iter().map(Child::Token).collect();
        children.push(Child::Node(self.try_body.as_ref()));
        children.extend(self.end_try.iter().map(Child::Token));
        children.extend(self.begin_catch.iter().map(Child::Token));
        children.push(Child::Node(self.catch_body.as_ref()));
        children.extend(self.end_catch.iter().map(Child::Token));
        children.push(Child::Token(&self.terminator));
        children
    }
}

/// `IF condition statement [ELSE statement]`.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub(crate) if_token: Token,
    pub(crate) condition: Expr,
    pub(crate) then: Stmt,
    pub(crate) else_clause: Option<(Token, Stmt)>,
}

impl IfStmt {
    pub fn new(
        if_token: Token,
        condition: Expr,
        then: Stmt,
        else_clause: Option<(Token, Stmt)>,
    ) -> Result<Self, ShapeError> {
        check_keyword("IfStmt", "if", &if_token, Keyword::If)?;
        if let Some((keyword, _)) = &else_clause {
            check_keyword("IfStmt", "else", keyword, Keyword::Else)?;
        }
        Ok(Self {
            if_token,
            condition,
            then,
            else_clause,
        })
    }

    #[must_use]
    pub const fn condition(&self) -> &Expr {
        &self.condition
    }

    #[must_use]
    pub const fn then(&self) -> &Stmt {
        &self.then
    }

    #[must_use]
    pub fn else_branch(&self) -> Option<&Stmt> {
        self.else_clause.as_ref().map(|(_, s)| s)
    }

    #[must_use]
    pub const fn has_else(&self) -> bool {
        self.else_clause.is_some()
    }
}

impl SyntaxNode for IfStmt {
    fn kind_name(&self) -> &'static str {
        "IfStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Token(&self.if_token),
            self.condition.child(),
            self.then.child(),
        ];
        if let Some((keyword, stmt)) = &self.else_clause {
            children.push(Child::Token(keyword));
            children.push(stmt.child());
        }
        children
    }
}

/// `WHILE condition statement`.
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub(crate) while_token: Token,
    pub(crate) condition: Expr,
    pub(crate) body: Stmt,
}

impl WhileStmt {
    pub fn new(while_token: Token, condition: Expr, body: Stmt) -> Result<Self, ShapeError> {
        check_keyword("WhileStmt", "while", &while_token, Keyword::While)?;
        Ok(Self {
            while_token,
            condition,
            body,
        })
    }

    #[must_use]
    pub const fn condition(&self) -> &Expr {
        &self.condition
    }

    #[must_use]
    pub const fn body(&self) -> &Stmt {
        &self.body
    }
}

impl SyntaxNode for WhileStmt {
    fn kind_name(&self) -> &'static str {
        "WhileStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.while_token),
            self.condition.child(),
            self.body.child(),
        ]
    }
}

/// `BREAK` or `CONTINUE`.
#[derive(Debug, Clone)]
pub struct MonoKeywordStmt {
    pub(crate) keyword: Token,
    pub(crate) terminator: Token,
}

impl MonoKeywordStmt {
    pub fn new(keyword: Token, terminator: Token) -> Result<Self, ShapeError> {
        check(
            "MonoKeywordStmt",
            "keyword",
            &keyword,
            "BREAK or CONTINUE",
            keyword.is_any_keyword(&[Keyword::Break, Keyword::Continue]),
        )?;
        check_terminator("MonoKeywordStmt", &terminator)?;
        Ok(Self {
            keyword,
            terminator,
        })
    }

    #[must_use]
    pub const fn keyword(&self) -> &Token {
        &self.keyword
    }
}

impl SyntaxNode for MonoKeywordStmt {
    fn kind_name(&self) -> &'static str {
        "MonoKeywordStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::Token(&self.keyword), Child::Token(&self.terminator)]
    }
}

/// `RETURN [value]`.
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub(crate) return_token: Token,
    pub(crate) value: Option<Expr>,
    pub(crate) terminator: Token,
}

impl ReturnStmt {
    pub fn new(
        return_token: Token,
        value: Option<Expr>,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        check_keyword("ReturnStmt", "return", &return_token, Keyword::Return)?;
        check_terminator("ReturnStmt", &terminator)?;
        Ok(Self {
            return_token,
            value,
            terminator,
        })
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Expr> {
        self.value.as_ref()
    }
}

impl SyntaxNode for ReturnStmt {
    fn kind_name(&self) -> &'static str {
        "ReturnStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![Child::Token(&self.return_token)];
        if let Some(value) = &self.value {
            children.push(value.child());
        }
        children.push(Child::Token(&self.terminator));
        children
    }
}

/// `GOTO label`.
#[derive(Debug, Clone)]
pub struct GotoStmt {
    pub(crate) goto: Token,
    pub(crate) label: Token,
    pub(crate) terminator: Token,
}

impl GotoStmt {
    pub fn new(goto: Token, label: Token, terminator: Token) -> Result<Self, ShapeError> {
        check_keyword("GotoStmt", "goto", &goto, Keyword::Goto)?;
        check_identifier("GotoStmt", "label", &label)?;
        check_terminator("GotoStmt", &terminator)?;
        Ok(Self {
            goto,
            label,
            terminator,
        })
    }

    #[must_use]
    pub const fn label(&self) -> &Token {
        &self.label
    }
}

impl SyntaxNode for GotoStmt {
    fn kind_name(&self) -> &'static str {
        "GotoStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.goto),
            Child::Token(&self.label),
            Child::Token(&self.terminator),
        ]
    }
}

/// `label:`.
#[derive(Debug, Clone)]
pub struct LabelStmt {
    pub(crate) label: Token,
    pub(crate) colon: Token,
}

impl LabelStmt {
    pub fn new(label: Token, colon: Token) -> Result<Self, ShapeError> {
        check_identifier("LabelStmt", "label", &label)?;
        check_kind("LabelStmt", "colon", &colon, TokenKind::Colon, "':'")?;
        Ok(Self { label, colon })
    }

    #[must_use]
    pub const fn label(&self) -> &Token {
        &self.label
    }
}

impl SyntaxNode for LabelStmt {
    fn kind_name(&self) -> &'static str {
        "LabelStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::Token(&self.label), Child::Token(&self.colon)]
    }
}

/// `SET @variable = value`, or a compound assignment such as `+=`.
#[derive(Debug, Clone)]
pub struct SetVariableStmt {
    pub(crate) set: Token,
    pub(crate) variable: Token,
    pub(crate) operator: Token,
    pub(crate) value: Expr,
    pub(crate) terminator: Token,
}

impl SetVariableStmt {
    pub fn new(
        set: Token,
        variable: Token,
        operator: Token,
        value: Expr,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "SetVariableStmt";
        check_keyword(NODE, "set", &set, Keyword::Set)?;
        check_variable(NODE, "variable", &variable)?;
        check(
            NODE,
            "operator",
            &operator,
            "assignment operator",
            operator.kind().is_assignment(),
        )?;
        check_terminator(NODE, &terminator)?;
        Ok(Self {
            set,
            variable,
            operator,
            value,
            terminator,
        })
    }

    #[must_use]
    pub const fn variable(&self) -> &Token {
        &self.variable
    }

    #[must_use]
    pub const fn operator(&self) -> &Token {
        &self.operator
    }

    #[must_use]
    pub const fn value(&self) -> &Expr {
        &self.value
    }

    #[must_use]
    pub fn has_terminator(&self) -> bool {
        !self.terminator.is_placeholder()
    }
}

impl SyntaxNode for SetVariableStmt {
    fn kind_name(&self) -> &'static str {
        "SetVariableStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.set),
            Child::Token(&self.variable),
            Child::Token(&self.operator),
            self.value.child(),
            Child::Token(&self.terminator),
        ]
    }
}

/// `SET option[, option...] value`, e.g. `SET NOCOUNT ON` or
/// `SET ANSI_NULLS, QUOTED_IDENTIFIER OFF`. The value is kept as raw
/// tokens.
#[derive(Debug, Clone)]
pub struct SetOptionStmt {
    pub(crate) set: Token,
    pub(crate) options: Rc<SeparatedList<Token>>,
    pub(crate) value: Rc<RawTokens>,
    pub(crate) terminator: Token,
}

impl SetOptionStmt {
    pub fn new(
        set: Token,
        options: Rc<SeparatedList<Token>>,
        value: Rc<RawTokens>,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "SetOptionStmt";
        check_keyword(NODE, "set", &set, Keyword::Set)?;
        for option in options.iter() {
            check_identifier(NODE, "option", option)?;
        }
        check_terminator(NODE, &terminator)?;
        Ok(Self {
            set,
            options,
            value,
            terminator,
        })
    }

    #[must_use]
    pub fn options(&self) -> &[Token] {
        self.options.items()
    }

    #[must_use]
    pub fn value(&self) -> &[Token] {
        self.value.tokens()
    }
}

impl SyntaxNode for SetOptionStmt {
    fn kind_name(&self) -> &'static str {
        "SetOptionStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.set),
            Child::Node(self.options.as_ref()),
            Child::Node(self.value.as_ref()),
            Child::Token(&self.terminator),
        ]
    }
}

/// One variable of a `DECLARE`: `@name [AS] type [= value]`.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub(crate) name: Token,
    pub(crate) as_token: Token,
    pub(crate) data_type: DataType,
    pub(crate) value: Option<(Token, Expr)>,
}

impl VarDecl {
    pub fn new(
        name: Token,
        as_token: Token,
        data_type: DataType,
        value: Option<(Token, Expr)>,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "VarDecl";
        check_variable(NODE, "name", &name)?;
        check(
            NODE,
            "as",
            &as_token,
            "AS",
            as_token.is_placeholder() || as_token.is_keyword(Keyword::As),
        )?;
        if let Some((eq, _)) = &value {
            check(
                NODE,
                "initializer",
                eq,
                "'='",
                matches!(eq.kind(), TokenKind::Eq | TokenKind::Assign),
            )?;
            if matches!(data_type, DataType::Table(_)) {
                return Err(ShapeError::Invalid {
                    node: NODE,
                    reason: "table variables take no initial value",
                });
            }
        }
        Ok(Self {
            name,
            as_token,
            data_type,
            value,
        })
    }

    #[must_use]
    pub const fn name(&self) -> &Token {
        &self.name
    }

    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    #[must_use]
    pub fn value(&self) -> Option<&Expr> {
        self.value.as_ref().map(|(_, e)| e)
    }
}

impl SyntaxNode for VarDecl {
    fn kind_name(&self) -> &'static str {
        "VarDecl"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Token(&self.name),
            Child::Token(&self.as_token),
            Child::Node(self.data_type.as_node()),
        ];
        if let Some((eq, value)) = &self.value {
            children.push(Child::Token(eq));
            children.push(value.child());
        }
        children
    }
}

/// `DECLARE @a int, @b varchar(10) = 'x'`.
#[derive(Debug, Clone)]
pub struct DeclareStmt {
    pub(crate) declare: Token,
    pub(crate) variables: Rc<SeparatedList<Rc<VarDecl>>>,
    pub(crate) terminator: Token,
}

impl DeclareStmt {
    pub fn new(
        declare: Token,
        variables: Rc<SeparatedList<Rc<VarDecl>>>,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        check_keyword("DeclareStmt", "declare", &declare, Keyword::Declare)?;
        check_terminator("DeclareStmt", &terminator)?;
        Ok(Self {
            declare,
            variables,
            terminator,
        })
    }

    #[must_use]
    pub fn variables(&self) -> &[Rc<VarDecl>] {
        self.variables.items()
    }
}

impl SyntaxNode for DeclareStmt {
    fn kind_name(&self) -> &'static str {
        "DeclareStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.declare),
            Child::Node(self.variables.as_ref()),
            Child::Token(&self.terminator),
        ]
    }
}

/// `DECLARE name [INSENSITIVE] [SCROLL] CURSOR [options] FOR query
/// [FOR UPDATE [OF columns]]`.
///
/// Cursor options and the `FOR UPDATE` tail are kept as raw tokens.
#[derive(Debug, Clone)]
pub struct DeclareCursorStmt {
    pub(crate) declare: Token,
    pub(crate) name: Token,
    pub(crate) iso_options: Rc<RawTokens>,
    pub(crate) cursor: Token,
    pub(crate) options: Rc<RawTokens>,
    pub(crate) for_token: Token,
    pub(crate) query: Expr,
    pub(crate) update: Option<Rc<RawTokens>>,
    pub(crate) terminator: Token,
}

/// The raw parts of a [`DeclareCursorStmt`].
#[derive(Debug, Clone)]
pub struct CursorOptions {
    /// Options between the name and `CURSOR`.
    pub iso: Rc<RawTokens>,
    /// Options between `CURSOR` and `FOR`.
    pub extended: Rc<RawTokens>,
    /// `FOR UPDATE [OF ...]`, when present.
    pub update: Option<Rc<RawTokens>>,
}

impl DeclareCursorStmt {
    pub fn new(
        declare: Token,
        name: Token,
        cursor: Token,
        for_token: Token,
        query: Expr,
        options: CursorOptions,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "DeclareCursorStmt";
        check_keyword(NODE, "declare", &declare, Keyword::Declare)?;
        check(
            NODE,
            "name",
            &name,
            "cursor name",
            name.is_identifier() && !name.is_variable(),
        )?;
        check_keyword(NODE, "cursor", &cursor, Keyword::Cursor)?;
        check_keyword(NODE, "for", &for_token, Keyword::For)?;
        if let Some(update) = &options.update {
            let tokens = update.tokens();
            if tokens.len() < 2
                || !tokens[0].is_keyword(Keyword::For)
                || !tokens[1].is_keyword(Keyword::Update)
            {
                return Err(ShapeError::Invalid {
                    node: NODE,
                    reason: "update clause must start with FOR UPDATE",
                });
            }
        }
        check_terminator(NODE, &terminator)?;
        Ok(Self {
            declare,
            name,
            iso_options: options.iso,
            cursor,
            options: options.extended,
            for_token,
            query,
            update: options.update,
            terminator,
        })
    }

    #[must_use]
    pub const fn name(&self) -> &Token {
        &self.name
    }

    #[must_use]
    pub fn options(&self) -> &[Token] {
        self.options.tokens()
    }

    #[must_use]
    pub const fn query(&self) -> &Expr {
        &self.query
    }

    #[must_use]
    pub const fn is_for_update(&self) -> bool {
        self.update.is_some()
    }
}

impl SyntaxNode for DeclareCursorStmt {
    fn kind_name(&self) -> &'static str {
        "DeclareCursorStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Token(&self.declare),
            Child::Token(&self.name),
            Child::Node(self.iso_options.as_ref()),
            Child::Token(&self.cursor),
            Child::Node(self.options.as_ref()),
            Child::Token(&self.for_token),
            self.query.child(),
        ];
        if let Some(update) = &self.update {
            children.push(Child::Node(update.as_ref()));
        }
        children.push(Child::Token(&self.terminator));
        children
    }
}

/// A statement the grammar does not model, kept as its tokens.
#[derive(Debug, Clone)]
pub struct UnmodeledStmt {
    pub(crate) tokens: Rc<RawTokens>,
    pub(crate) terminator: Token,
}

impl UnmodeledStmt {
    pub fn new(tokens: Rc<RawTokens>, terminator: Token) -> Result<Self, ShapeError> {
        if tokens.is_empty() {
            return Err(ShapeError::EmptyList {
                node: "UnmodeledStmt",
                list: "tokens",
            });
        }
        check_terminator("UnmodeledStmt", &terminator)?;
        Ok(Self { tokens, terminator })
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        self.tokens.tokens()
    }

    /// The first word of the statement, upper-cased.
    #[must_use]
    pub fn leading_keyword(&self) -> String {
        self.tokens.tokens()[0].text().to_ascii_uppercase()
    }

    #[must_use]
    pub fn has_terminator(&self) -> bool {
        !self.terminator.is_placeholder()
    }
}

impl SyntaxNode for UnmodeledStmt {
    fn kind_name(&self) -> &'static str {
        "UnmodeledStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Node(self.tokens.as_ref()),
            Child::Token(&self.terminator),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, Span::default())
    }

    fn kw(text: &str) -> Token {
        tok(TokenKind::Identifier, text)
    }

    #[test]
    fn test_terminator_slot_is_fixed() {
        let with = MonoKeywordStmt::new(kw("BREAK"), tok(TokenKind::Semicolon, ";")).unwrap();
        let without = MonoKeywordStmt::new(kw("BREAK"), Token::placeholder()).unwrap();
        assert_eq!(with.children().len(), without.children().len());
        assert_eq!(without.to_source(), "BREAK");
        assert!(MonoKeywordStmt::new(kw("BREAK"), kw("x")).is_err());
    }

    #[test]
    fn test_empty_statement_needs_semicolon() {
        assert!(EmptyStmt::new(Token::placeholder()).is_err());
        assert!(EmptyStmt::new(tok(TokenKind::Semicolon, ";")).is_ok());
    }

    #[test]
    fn test_unmodeled_requires_tokens() {
        let empty = Rc::new(RawTokens::new(Vec::new()).unwrap());
        assert!(UnmodeledStmt::new(empty, Token::placeholder()).is_err());
        let raw = Rc::new(RawTokens::new(vec![kw("print"), kw("@x")]).unwrap());
        let stmt = UnmodeledStmt::new(raw, Token::placeholder()).unwrap();
        assert_eq!(stmt.leading_keyword(), "PRINT");
    }

    #[test]
    fn test_try_catch_keywords() {
        let body = Rc::new(StatementList::default());
        let pair = |a: &str, b: &str| [kw(a), kw(b)];
        assert!(TryCatchStmt::new(
            pair("BEGIN", "TRY"),
            Rc::clone(&body),
            pair("END", "TRY"),
            pair("BEGIN", "CATCH"),
            Rc::clone(&body),
            pair("END", "CATCH"),
            Token::placeholder(),
        )
        .is_ok());
        assert!(TryCatchStmt::new(
            pair("BEGIN", "TRY"),
            Rc::clone(&body),
            pair("END", "CATCH"),
            pair("BEGIN", "CATCH"),
            body,
            pair("END", "CATCH"),
            Token::placeholder(),
        )
        .is_err());
    }
}
