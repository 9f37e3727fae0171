//! `CREATE`/`ALTER` statements for procedures, views and functions.

use std::rc::Rc;

use super::error::{
    check, check_keyword, check_paren_pair, check_terminator, check_variable, ShapeError,
};
use super::{
    BlockStmt, Child, DataType, Expr, NameExpr, RawTokens, SeparatedList, StatementList,
    SyntaxNode, TableType,
};
use crate::lexer::{Keyword, Token, TokenKind};

/// Checks the `CREATE`, `ALTER` or `CREATE OR ALTER` prefix.
fn check_create(node: &'static str, create: &[Token]) -> Result<(), ShapeError> {
    let ok = match create {
        [single] => single.is_any_keyword(&[Keyword::Create, Keyword::Alter]),
        [create, or, alter] => {
            create.is_keyword(Keyword::Create)
                && or.is_keyword(Keyword::Or)
                && alter.is_keyword(Keyword::Alter)
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ShapeError::Invalid {
            node,
            reason: "expected CREATE, ALTER or CREATE OR ALTER",
        })
    }
}

fn is_alter(create: &[Token]) -> bool {
    create.len() == 1 && create[0].is_keyword(Keyword::Alter)
}

fn is_create_or_alter(create: &[Token]) -> bool {
    create.len() == 3
}

/// A routine parameter:
/// `@name [AS] type [VARYING] [= default] [OUT|OUTPUT] [READONLY]`.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub(crate) name: Token,
    pub(crate) as_token: Token,
    pub(crate) data_type: DataType,
    pub(crate) varying: Option<Token>,
    pub(crate) default: Option<(Token, Expr)>,
    pub(crate) modifiers: Vec<Token>,
}

/// A comma-separated parameter list.
pub type ParamList = SeparatedList<Rc<ParamDecl>>;

impl ParamDecl {
    pub fn new(
        name: Token,
        as_token: Token,
        data_type: DataType,
        varying: Option<Token>,
        default: Option<(Token, Expr)>,
        modifiers: Vec<Token>,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "ParamDecl";
        check_variable(NODE, "name", &name)?;
        check(
            NODE,
            "as",
            &as_token,
            "AS",
            as_token.is_placeholder() || as_token.is_keyword(Keyword::As),
        )?;
        if let Some(varying) = &varying {
            check_keyword(NODE, "varying", varying, Keyword::Varying)?;
        }
        if let Some((eq, _)) = &default {
            check(
                NODE,
                "default",
                eq,
                "'='",
                matches!(eq.kind(), TokenKind::Eq | TokenKind::Assign),
            )?;
        }
        for modifier in &modifiers {
            check(
                NODE,
                "modifier",
                modifier,
                "OUT, OUTPUT or READONLY",
                modifier.is_any_keyword(&[Keyword::Out, Keyword::Output, Keyword::Readonly]),
            )?;
        }
        Ok(Self {
            name,
            as_token,
            data_type,
            varying,
            default,
            modifiers,
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
    pub fn default_value(&self) -> Option<&Expr> {
        self.default.as_ref().map(|(_, e)| e)
    }

    #[must_use]
    pub fn is_output(&self) -> bool {
        self.modifiers
            .iter()
            .any(|m| m.is_any_keyword(&[Keyword::Out, Keyword::Output]))
    }

    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.modifiers.iter().any(|m| m.is_keyword(Keyword::Readonly))
    }
}

impl SyntaxNode for ParamDecl {
    fn kind_name(&self) -> &'static str {
        "ParamDecl"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Token(&self.name),
            Child::Token(&self.as_token),
            Child::Node(self.data_type.as_node()),
        ];
        if let Some(varying) = &self.varying {
            children.push(Child::Token(varying));
        }
        if let Some((eq, value)) = &self.default {
            children.push(Child::Token(eq));
            children.push(Child::Node(value.as_node()));
        }
        children.extend(self.modifiers.iter().map(Child::Token));
        children
    }
}

/// `WITH option, ...` on a routine, kept as raw tokens.
#[derive(Debug, Clone)]
pub struct RoutineOptions {
    pub(crate) with: Token,
    pub(crate) options: Rc<RawTokens>,
}

impl RoutineOptions {
    pub fn new(with: Token, options: Rc<RawTokens>) -> Result<Self, ShapeError> {
        check_keyword("RoutineOptions", "with", &with, Keyword::With)?;
        if options.is_empty() {
            return Err(ShapeError::EmptyList {
                node: "RoutineOptions",
                list: "options",
            });
        }
        Ok(Self { with, options })
    }

    #[must_use]
    pub fn options(&self) -> &[Token] {
        self.options.tokens()
    }
}

impl SyntaxNode for RoutineOptions {
    fn kind_name(&self) -> &'static str {
        "RoutineOptions"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![Child::Token(&self.with), Child::Node(self.options.as_ref())]
    }
}

/// `CREATE|ALTER PROC[EDURE] name [(] params [)] [WITH options]
/// [FOR REPLICATION] AS body`.
#[derive(Debug, Clone)]
pub struct CreateProcedureStmt {
    pub(crate) create: Vec<Token>,
    pub(crate) procedure: Token,
    pub(crate) name: Rc<NameExpr>,
    pub(crate) lparen: Token,
    pub(crate) params: Option<Rc<ParamList>>,
    pub(crate) rparen: Token,
    pub(crate) options: Option<Rc<RoutineOptions>>,
    pub(crate) replication: Option<[Token; 2]>,
    pub(crate) as_token: Token,
    pub(crate) body: Rc<StatementList>,
}

/// The header of a [`CreateProcedureStmt`], up to and including `AS`.
#[derive(Debug, Clone)]
pub struct ProcedureHeader {
    pub create: Vec<Token>,
    pub procedure: Token,
    pub name: Rc<NameExpr>,
    pub lparen: Token,
    pub params: Option<Rc<ParamList>>,
    pub rparen: Token,
    pub options: Option<Rc<RoutineOptions>>,
    pub replication: Option<[Token; 2]>,
    pub as_token: Token,
}

impl CreateProcedureStmt {
    pub fn new(header: ProcedureHeader, body: Rc<StatementList>) -> Result<Self, ShapeError> {
        const NODE: &str = "CreateProcedureStmt";
        check_create(NODE, &header.create)?;
        check(
            NODE,
            "procedure",
            &header.procedure,
            "PROC or PROCEDURE",
            header
                .procedure
                .is_any_keyword(&[Keyword::Proc, Keyword::Procedure]),
        )?;
        check_paren_pair(NODE, &header.lparen, &header.rparen)?;
        if let Some([for_token, replication]) = &header.replication {
            check_keyword(NODE, "for", for_token, Keyword::For)?;
            check_keyword(NODE, "replication", replication, Keyword::Replication)?;
        }
        check_keyword(NODE, "as", &header.as_token, Keyword::As)?;
        Ok(Self {
            create: header.create,
            procedure: header.procedure,
            name: header.name,
            lparen: header.lparen,
            params: header.params,
            rparen: header.rparen,
            options: header.options,
            replication: header.replication,
            as_token: header.as_token,
            body,
        })
    }

    #[must_use]
    pub fn name(&self) -> &NameExpr {
        &self.name
    }

    /// True for a plain `ALTER`, not for `CREATE OR ALTER`.
    #[must_use]
    pub fn is_alter(&self) -> bool {
        is_alter(&self.create)
    }

    #[must_use]
    pub fn is_create_or_alter(&self) -> bool {
        is_create_or_alter(&self.create)
    }

    #[must_use]
    pub fn params(&self) -> &[Rc<ParamDecl>] {
        self.params.as_deref().map_or(&[][..], SeparatedList::items)
    }

    #[must_use]
    pub fn options(&self) -> Option<&RoutineOptions> {
        self.options.as_deref()
    }

    #[must_use]
    pub const fn is_for_replication(&self) -> bool {
        self.replication.is_some()
    }

    #[must_use]
    pub fn body(&self) -> &StatementList {
        &self.body
    }
}

impl SyntaxNode for CreateProcedureStmt {
    fn kind_name(&self) -> &'static str {
        "CreateProcedureStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children: Vec<Child<'_>> = self.create.iter().map(Child::Token).collect();
        children.push(Child::Token(&self.procedure));
        children.push(Child::Node(self.name.as_ref()));
        children.push(Child::Token(&self.lparen));
        if let Some(params) = &self.params {
            children.push(Child::Node(params.as_ref()));
        }
        children.push(Child::Token(&self.rparen));
        if let Some(options) = &self.options {
            children.push(Child::Node(options.as_ref()));
        }
        if let Some(replication) = &self.replication {
            children.extend(replication.iter().map(Child::Token));
        }
        children.push(Child::Token(&self.as_token));
        children.push(Child::Node(self.body.as_ref()));
        children
    }
}

/// `CREATE|ALTER VIEW name [(columns)] [WITH options] AS query
/// [WITH CHECK OPTION]`.
#[derive(Debug, Clone)]
pub struct CreateViewStmt {
    pub(crate) create: Vec<Token>,
    pub(crate) view: Token,
    pub(crate) name: Rc<NameExpr>,
    pub(crate) lparen: Token,
    pub(crate) columns: Option<Rc<SeparatedList<Token>>>,
    pub(crate) rparen: Token,
    pub(crate) options: Option<Rc<RoutineOptions>>,
    pub(crate) as_token: Token,
    pub(crate) query: Expr,
    pub(crate) check_option: Option<[Token; 3]>,
    pub(crate) terminator: Token,
}

/// The header of a [`CreateViewStmt`], up to and including `AS`.
#[derive(Debug, Clone)]
pub struct ViewHeader {
    pub create: Vec<Token>,
    pub view: Token,
    pub name: Rc<NameExpr>,
    pub lparen: Token,
    pub columns: Option<Rc<SeparatedList<Token>>>,
    pub rparen: Token,
    pub options: Option<Rc<RoutineOptions>>,
    pub as_token: Token,
}

impl CreateViewStmt {
    pub fn new(
        header: ViewHeader,
        query: Expr,
        check_option: Option<[Token; 3]>,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "CreateViewStmt";
        check_create(NODE, &header.create)?;
        check_keyword(NODE, "view", &header.view, Keyword::View)?;
        check_paren_pair(NODE, &header.lparen, &header.rparen)?;
        if header.lparen.is_placeholder() != header.columns.is_none() {
            return Err(ShapeError::Invalid {
                node: NODE,
                reason: "column list needs parentheses",
            });
        }
        check_keyword(NODE, "as", &header.as_token, Keyword::As)?;
        if !query.is_query() {
            return Err(ShapeError::Invalid {
                node: NODE,
                reason: "view body must be a query",
            });
        }
        if let Some([with, check_token, option]) = &check_option {
            check_keyword(NODE, "with", with, Keyword::With)?;
            check_keyword(NODE, "check", check_token, Keyword::Check)?;
            check_keyword(NODE, "option", option, Keyword::Option)?;
        }
        check_terminator(NODE, &terminator)?;
        Ok(Self {
            create: header.create,
            view: header.view,
            name: header.name,
            lparen: header.lparen,
            columns: header.columns,
            rparen: header.rparen,
            options: header.options,
            as_token: header.as_token,
            query,
            check_option,
            terminator,
        })
    }

    pub(crate) fn header(&self) -> ViewHeader {
        ViewHeader {
            create: self.create.clone(),
            view: self.view.clone(),
            name: Rc::clone(&self.name),
            lparen: self.lparen.clone(),
            columns: self.columns.clone(),
            rparen: self.rparen.clone(),
            options: self.options.clone(),
            as_token: self.as_token.clone(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &NameExpr {
        &self.name
    }

    /// True for a plain `ALTER`, not for `CREATE OR ALTER`.
    #[must_use]
    pub fn is_alter(&self) -> bool {
        is_alter(&self.create)
    }

    #[must_use]
    pub fn is_create_or_alter(&self) -> bool {
        is_create_or_alter(&self.create)
    }

    #[must_use]
    pub fn columns(&self) -> &[Token] {
        self.columns.as_deref().map_or(&[][..], SeparatedList::items)
    }

    #[must_use]
    pub const fn query(&self) -> &Expr {
        &self.query
    }

    #[must_use]
    pub const fn has_check_option(&self) -> bool {
        self.check_option.is_some()
    }
}

impl SyntaxNode for CreateViewStmt {
    fn kind_name(&self) -> &'static str {
        "CreateViewStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children: Vec<Child<'_>> = self.create.iter().map(Child::Token).collect();
        children.push(Child::Token(&self.view));
        children.push(Child::Node(self.name.as_ref()));
        children.push(Child::Token(&self.lparen));
        if let Some(columns) = &self.columns {
            children.push(Child::Node(columns.as_ref()));
        }
        children.push(Child::Token(&self.rparen));
        if let Some(options) = &self.options {
            children.push(Child::Node(options.as_ref()));
        }
        children.push(Child::Token(&self.as_token));
        children.push(Child::Node(self.query.as_node()));
        if let Some(check_option) = &self.check_option {
            children.extend(check_option.iter().map(Child::Token));
        }
        children.push(Child::Token(&self.terminator));
        children
    }
}

/// `CREATE|ALTER FUNCTION name (params) RETURNS`, shared by the three
/// function forms.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub(crate) create: Vec<Token>,
    pub(crate) function: Token,
    pub(crate) name: Rc<NameExpr>,
    pub(crate) lparen: Token,
    pub(crate) params: Option<Rc<ParamList>>,
    pub(crate) rparen: Token,
    pub(crate) returns: Token,
}

impl FunctionSignature {
    pub fn new(
        create: Vec<Token>,
        function: Token,
        name: Rc<NameExpr>,
        lparen: Token,
        params: Option<Rc<ParamList>>,
        rparen: Token,
        returns: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "FunctionSignature";
        check_create(NODE, &create)?;
        check_keyword(NODE, "function", &function, Keyword::Function)?;
        check(
            NODE,
            "open paren",
            &lparen,
            "'('",
            lparen.kind() == TokenKind::LeftParen,
        )?;
        check(
            NODE,
            "close paren",
            &rparen,
            "')'",
            rparen.kind() == TokenKind::RightParen,
        )?;
        check_keyword(NODE, "returns", &returns, Keyword::Returns)?;
        Ok(Self {
            create,
            function,
            name,
            lparen,
            params,
            rparen,
            returns,
        })
    }

    #[must_use]
    pub fn name(&self) -> &NameExpr {
        &self.name
    }

    /// True for a plain `ALTER`, not for `CREATE OR ALTER`.
    #[must_use]
    pub fn is_alter(&self) -> bool {
        is_alter(&self.create)
    }

    #[must_use]
    pub fn is_create_or_alter(&self) -> bool {
        is_create_or_alter(&self.create)
    }

    #[must_use]
    pub fn params(&self) -> &[Rc<ParamDecl>] {
        self.params.as_deref().map_or(&[][..], SeparatedList::items)
    }
}

impl SyntaxNode for FunctionSignature {
    fn kind_name(&self) -> &'static str {
        "FunctionSignature"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children: Vec<Child<'_>> = self.create.iter().map(Child::Token).collect();
        children.push(Child::Token(&self.function));
        children.push(Child::Node(self.name.as_ref()));
        children.push(Child::Token(&self.lparen));
        if let Some(params) = &self.params {
            children.push(Child::Node(params.as_ref()));
        }
        children.push(Child::Token(&self.rparen));
        children.push(Child::Token(&self.returns));
        children
    }
}

fn check_optional_as(node: &'static str, as_token: &Token) -> Result<(), ShapeError> {
    check(
        node,
        "as",
        as_token,
        "AS",
        as_token.is_placeholder() || as_token.is_keyword(Keyword::As),
    )
}

/// `... RETURNS type [WITH options] [AS] BEGIN ... END`.
#[derive(Debug, Clone)]
pub struct CreateScalarFunctionStmt {
    pub(crate) signature: Rc<FunctionSignature>,
    pub(crate) return_type: DataType,
    pub(crate) options: Option<Rc<RoutineOptions>>,
    pub(crate) as_token: Token,
    pub(crate) body: Rc<BlockStmt>,
}

impl CreateScalarFunctionStmt {
    pub fn new(
        signature: Rc<FunctionSignature>,
        return_type: DataType,
        options: Option<Rc<RoutineOptions>>,
        as_token: Token,
        body: Rc<BlockStmt>,
    ) -> Result<Self, ShapeError> {
        if matches!(return_type, DataType::Table(_)) {
            return Err(ShapeError::Invalid {
                node: "CreateScalarFunctionStmt",
                reason: "scalar functions return a scalar type",
            });
        }
        check_optional_as("CreateScalarFunctionStmt", &as_token)?;
        Ok(Self {
            signature,
            return_type,
            options,
            as_token,
            body,
        })
    }

    #[must_use]
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    #[must_use]
    pub const fn return_type(&self) -> &DataType {
        &self.return_type
    }

    #[must_use]
    pub fn body(&self) -> &BlockStmt {
        &self.body
    }
}

impl SyntaxNode for CreateScalarFunctionStmt {
    fn kind_name(&self) -> &'static str {
        "CreateScalarFunctionStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Node(self.signature.as_ref()),
            Child::Node(self.return_type.as_node()),
        ];
        if let Some(options) = &self.options {
            children.push(Child::Node(options.as_ref()));
        }
        children.push(Child::Token(&self.as_token));
        children.push(Child::Node(self.body.as_ref()));
        children
    }
}

/// `... RETURNS TABLE [WITH options] [AS] RETURN query`.
#[derive(Debug, Clone)]
pub struct CreateInlineFunctionStmt {
    pub(crate) signature: Rc<FunctionSignature>,
    pub(crate) table: Token,
    pub(crate) options: Option<Rc<RoutineOptions>>,
    pub(crate) as_token: Token,
    pub(crate) return_token: Token,
    pub(crate) query: Expr,
    pub(crate) terminator: Token,
}

impl CreateInlineFunctionStmt {
    pub fn new(
        signature: Rc<FunctionSignature>,
        table: Token,
        options: Option<Rc<RoutineOptions>>,
        as_token: Token,
        return_token: Token,
        query: Expr,
        terminator: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "CreateInlineFunctionStmt";
        check_keyword(NODE, "table", &table, Keyword::Table)?;
        check_optional_as(NODE, &as_token)?;
        check_keyword(NODE, "return", &return_token, Keyword::Return)?;
        if !query.is_query() {
            return Err(ShapeError::Invalid {
                node: NODE,
                reason: "inline function body must be a query",
            });
        }
        check_terminator(NODE, &terminator)?;
        Ok(Self {
            signature,
            table,
            options,
            as_token,
            return_token,
            query,
            terminator,
        })
    }

    #[must_use]
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    #[must_use]
    pub const fn query(&self) -> &Expr {
        &self.query
    }
}

impl SyntaxNode for CreateInlineFunctionStmt {
    fn kind_name(&self) -> &'static str {
        "CreateInlineFunctionStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Node(self.signature.as_ref()),
            Child::Token(&self.table),
        ];
        if let Some(options) = &self.options {
            children.push(Child::Node(options.as_ref()));
        }
        children.extend([
            Child::Token(&self.as_token),
            Child::Token(&self.return_token),
            Child::Node(self.query.as_node()),
            Child::Token(&self.terminator),
        ]);
        children
    }
}

/// `... RETURNS @result TABLE (...) [WITH options] [AS] BEGIN ... END`.
#[derive(Debug, Clone)]
pub struct CreateTableFunctionStmt {
    pub(crate) signature: Rc<FunctionSignature>,
    pub(crate) variable: Token,
    pub(crate) table_type: Rc<TableType>,
    pub(crate) options: Option<Rc<RoutineOptions>>,
    pub(crate) as_token: Token,
    pub(crate) body: Rc<BlockStmt>,
}

impl CreateTableFunctionStmt {
    pub fn new(
        signature: Rc<FunctionSignature>,
        variable: Token,
        table_type: Rc<TableType>,
        options: Option<Rc<RoutineOptions>>,
        as_token: Token,
        body: Rc<BlockStmt>,
    ) -> Result<Self, ShapeError> {
        check_variable("CreateTableFunctionStmt", "variable", &variable)?;
        check_optional_as("CreateTableFunctionStmt", &as_token)?;
        Ok(Self {
            signature,
            variable,
            table_type,
            options,
            as_token,
            body,
        })
    }

    #[must_use]
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    /// The result table variable.
    #[must_use]
    pub const fn variable(&self) -> &Token {
        &self.variable
    }

    #[must_use]
    pub fn table_type(&self) -> &TableType {
        &self.table_type
    }

    #[must_use]
    pub fn body(&self) -> &BlockStmt {
        &self.body
    }
}

impl SyntaxNode for CreateTableFunctionStmt {
    fn kind_name(&self) -> &'static str {
        "CreateTableFunctionStmt"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![
            Child::Node(self.signature.as_ref()),
            Child::Token(&self.variable),
            Child::Node(self.table_type.as_ref()),
        ];
        if let Some(options) = &self.options {
            children.push(Child::Node(options.as_ref()));
        }
        children.push(Child::Token(&self.as_token));
        children.push(Child::Node(self.body.as_ref()));
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeName;
    use crate::lexer::Span;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, Span::default())
    }

    fn kw(text: &str) -> Token {
        tok(TokenKind::Identifier, text)
    }

    fn int_type() -> DataType {
        TypeName::simple(Rc::new(NameExpr::single(kw("int")).unwrap())).into()
    }

    #[test]
    fn test_create_prefix() {
        assert!(check_create("X", &[kw("create")]).is_ok());
        assert!(check_create("X", &[kw("ALTER")]).is_ok());
        assert!(check_create("X", &[kw("create"), kw("or"), kw("alter")]).is_ok());
        assert!(check_create("X", &[kw("create"), kw("alter")]).is_err());
        assert!(is_alter(&[kw("alter")]));
        assert!(!is_alter(&[kw("create"), kw("or"), kw("alter")]));
        assert!(is_create_or_alter(&[kw("create"), kw("or"), kw("alter")]));
        assert!(!is_create_or_alter(&[kw("alter")]));
    }

    #[test]
    fn test_param_modifiers() {
        let param = ParamDecl::new(
            kw("@total"),
            Token::placeholder(),
            int_type(),
            None,
            None,
            vec![kw("OUTPUT")],
        )
        .unwrap();
        assert!(param.is_output());
        assert!(!param.is_readonly());
        assert!(ParamDecl::new(kw("total"), Token::placeholder(), int_type(), None, None, vec![]).is_err());
        assert!(ParamDecl::new(
            kw("@t"),
            Token::placeholder(),
            int_type(),
            None,
            None,
            vec![kw("VARYING")]
        )
        .is_err());
    }

    #[test]
    fn test_routine_options_not_empty() {
        let empty = Rc::new(RawTokens::new(Vec::new()).unwrap());
        assert!(RoutineOptions::new(kw("WITH"), empty).is_err());
    }
}
