//! Data type declarations.

use std::rc::Rc;

use super::error::{check_keyword, check_kind, check_paren_pair, ShapeError};
use super::{Child, Expr, NameExpr, RawTokens, SyntaxNode};
use crate::lexer::{Keyword, Token, TokenKind};

node_enum! {
    /// A data type in a declaration, parameter, cast or `RETURNS` clause.
    pub enum DataType {
        Named(TypeName) => visit_type_name,
        Table(TableType) => visit_table_type,
    }
}

impl DataType {
    /// The type name, e.g. `varchar` or `dbo.MyType`; `TABLE` for table
    /// types.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Named(named) => named.name.name(),
            Self::Table(_) => "TABLE".to_string(),
        }
    }
}

/// A named type with optional arguments: `int`, `varchar(max)`,
/// `decimal(10, 2)`, `dbo.Amount`.
#[derive(Debug, Clone)]
pub struct TypeName {
    pub(crate) name: Rc<NameExpr>,
    pub(crate) lparen: Token,
    pub(crate) args: Option<Expr>,
    pub(crate) rparen: Token,
}

impl TypeName {
    pub fn new(
        name: Rc<NameExpr>,
        lparen: Token,
        args: Option<Expr>,
        rparen: Token,
    ) -> Result<Self, ShapeError> {
        check_paren_pair("TypeName", &lparen, &rparen)?;
        if lparen.is_placeholder() != args.is_none() {
            return Err(ShapeError::Invalid {
                node: "TypeName",
                reason: "type arguments need parentheses",
            });
        }
        Ok(Self {
            name,
            lparen,
            args,
            rparen,
        })
    }

    /// A type without arguments.
    #[must_use]
    pub fn simple(name: Rc<NameExpr>) -> Self {
        Self {
            name,
            lparen: Token::placeholder(),
            args: None,
            rparen: Token::placeholder(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &NameExpr {
        &self.name
    }

    /// The arguments: a length, `max`, or a precision and scale list.
    #[must_use]
    pub fn arguments(&self) -> Vec<&Expr> {
        self.args.as_ref().map_or_else(Vec::new, Expr::items)
    }
}

impl SyntaxNode for TypeName {
    fn kind_name(&self) -> &'static str {
        "TypeName"
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = vec![Child::Node(self.name.as_ref()), Child::Token(&self.lparen)];
        if let Some(args) = &self.args {
            children.push(Child::Node(args.as_node()));
        }
        children.push(Child::Token(&self.rparen));
        children
    }
}

/// `TABLE (column definitions)`. The definition is kept as raw tokens.
#[derive(Debug, Clone)]
pub struct TableType {
    pub(crate) table: Token,
    pub(crate) lparen: Token,
    pub(crate) definition: Rc<RawTokens>,
    pub(crate) rparen: Token,
}

impl TableType {
    pub fn new(
        table: Token,
        lparen: Token,
        definition: Rc<RawTokens>,
        rparen: Token,
    ) -> Result<Self, ShapeError> {
        const NODE: &str = "TableType";
        check_keyword(NODE, "table", &table, Keyword::Table)?;
        check_kind(NODE, "open paren", &lparen, TokenKind::LeftParen, "'('")?;
        check_kind(NODE, "close paren", &rparen, TokenKind::RightParen, "')'")?;
        Ok(Self {
            table,
            lparen,
            definition,
            rparen,
        })
    }

    #[must_use]
    pub fn definition(&self) -> &[Token] {
        self.definition.tokens()
    }
}

impl SyntaxNode for TableType {
    fn kind_name(&self) -> &'static str {
        "TableType"
    }

    fn children(&self) -> Vec<Child<'_>> {
        vec![
            Child::Token(&self.table),
            Child::Token(&self.lparen),
            Child::Node(self.definition.as_ref()),
            Child::Token(&self.rparen),
        ]
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

    #[test]
    fn test_simple_type_keeps_paren_slots() {
        let name = Rc::new(NameExpr::single(tok(TokenKind::Identifier, "int")).unwrap());
        let ty = TypeName::simple(name);
        assert_eq!(ty.children().len(), 3);
        assert_eq!(ty.to_source(), "int");
        assert!(ty.arguments().is_empty());
    }

    #[test]
    fn test_type_arguments_need_parens() {
        let name = Rc::new(NameExpr::single(tok(TokenKind::Identifier, "varchar")).unwrap());
        let ten: Expr = LiteralExpr::new(tok(TokenKind::Integer, "10")).unwrap().into();
        assert!(TypeName::new(
            Rc::clone(&name),
            Token::placeholder(),
            Some(ten.clone()),
            Token::placeholder()
        )
        .is_err());
        let ty = TypeName::new(
            name,
            tok(TokenKind::LeftParen, "("),
            Some(ten),
            tok(TokenKind::RightParen, ")"),
        )
        .unwrap();
        assert_eq!(DataType::from(ty).name(), "varchar");
    }
}
