//! Data types and `DECLARE` statements.

use std::rc::Rc;

use super::error::Result;
use super::pratt::Precedence;
use super::Parser;
use crate::ast::{
    CursorOptions, DataType, DeclareCursorStmt, DeclareStmt, NameExpr, RawTokens, SeparatedList, Stmt,
    TableType, TypeName, VarDecl,
};
use crate::lexer::{Keyword, Token, TokenKind};

impl Parser<'_> {
    /// A data type: `int`, `varchar(max)`, `dbo.Amount`, `TABLE (...)`.
    pub(crate) fn parse_data_type(&mut self) -> Result<DataType> {
        if self.at(Keyword::Table) {
            return Ok(self.parse_table_type()?.into());
        }
        let name = Rc::new(self.context_name("expected data type")?);
        let Some(lparen) = self.eat_kind(TokenKind::LeftParen) else {
            return Ok(TypeName::simple(name).into());
        };
        let (args, rparen) = self.parse_paren_body()?;
        if args.is_none() {
            return self.fail("expected type arguments");
        }
        Ok(TypeName::new(name, lparen, args, rparen)?.into())
    }

    /// `TABLE (column definitions)`, keeping the definitions raw.
    pub(crate) fn parse_table_type(&mut self) -> Result<TableType> {
        let table = self.keyword(Keyword::Table)?;
        let lparen = self.kind(TokenKind::LeftParen, "'('")?;
        let (definition, rparen) = self.collect().read_to_close_paren()?;
        if definition.is_empty() {
            return self.fail("expected column definitions");
        }
        Ok(TableType::new(table, lparen, Rc::new(RawTokens::new(definition)?), rparen)?)
    }

    fn context_name(&mut self, message: &str) -> Result<NameExpr> {
        let name = self.parse_name();
        self.context(name, message)
    }

    /// `DECLARE @a int, ...` or `DECLARE name CURSOR ...`.
    pub(crate) fn parse_declare(&mut self) -> Result<Stmt> {
        let declare = self.keyword(Keyword::Declare)?;
        if !self.current().is_variable() && self.current().is_plain_identifier() {
            return Ok(self.parse_declare_cursor(declare)?.into());
        }
        let mut items = vec![Rc::new(self.parse_var_decl()?)];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat_kind(TokenKind::Comma) {
            separators.push(comma);
            items.push(Rc::new(self.parse_var_decl()?));
        }
        let variables = Rc::new(SeparatedList::new(items, separators)?);
        let terminator = self.terminator();
        Ok(DeclareStmt::new(declare, variables, terminator)?.into())
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl> {
        let name = self.variable()?;
        let as_token = self.eat(Keyword::As).unwrap_or_else(Token::placeholder);
        let data_type = self.parse_data_type()?;
        let value = match self.eat_assign() {
            Some(_) if matches!(data_type, DataType::Table(_)) => {
                return self.fail("table variables take no initial value");
            }
            Some(eq) => {
                let value = self.assignment_scope(false).parse_expr(Precedence::Comma)?;
                Some((eq, value))
            }
            None => None,
        };
        Ok(VarDecl::new(name, as_token, data_type, value)?)
    }

    /// `DECLARE name [INSENSITIVE] [SCROLL] CURSOR [options] FOR query
    /// [FOR UPDATE [OF columns]]`.
    fn parse_declare_cursor(&mut self, declare: Token) -> Result<DeclareCursorStmt> {
        let name = self.take();
        let iso = self.raw_until(|t| t.is_keyword(Keyword::Cursor));
        let cursor = self.keyword(Keyword::Cursor)?;
        let extended = self.raw_until(|t| t.is_keyword(Keyword::For));
        let for_token = self.keyword(Keyword::For)?;
        let query = self.assignment_scope(false).parse_expr(Precedence::None)?;
        if !query.is_query() {
            return self.fail("expected query after FOR");
        }
        let update = if self.at(Keyword::For) && self.peek_is(Keyword::Update) {
            let tokens = self.parse_statement_tail();
            Some(Rc::new(RawTokens::new(tokens)?))
        } else {
            None
        };
        let options = CursorOptions {
            iso: Rc::new(RawTokens::new(iso)?),
            extended: Rc::new(RawTokens::new(extended)?),
            update,
        };
        let terminator = self.terminator();
        Ok(DeclareCursorStmt::new(
            declare, name, cursor, for_token, query, options, terminator,
        )?)
    }

    /// Takes tokens until `stop` matches, a `;`, or the end of input.
    fn raw_until(&mut self, stop: impl Fn(&Token) -> bool) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.current();
            if token.is_eof() || token.is_error() || token.kind() == TokenKind::Semicolon || stop(token) {
                return tokens;
            }
            tokens.push(self.take());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode;

    fn declare(input: &str) -> Stmt {
        let mut parser = Parser::new(input);
        let stmt = parser.parse_declare().unwrap();
        parser.expect_end().unwrap();
        stmt
    }

    #[test]
    fn test_data_types() {
        let mut parser = Parser::new("decimal(10, 2)");
        let ty = parser.parse_data_type().unwrap();
        assert_eq!(ty.name(), "decimal");
        let DataType::Named(named) = ty else {
            panic!("expected named type");
        };
        assert_eq!(named.arguments().len(), 2);

        let mut parser = Parser::new("varchar(max)");
        assert_eq!(parser.parse_data_type().unwrap().to_source(), "varchar(max)");

        let mut parser = Parser::new("table (id int primary key, name varchar(10))");
        assert!(matches!(parser.parse_data_type().unwrap(), DataType::Table(_)));
    }

    #[test]
    fn test_declare_variables() {
        let Stmt::Declare(decl) = declare("declare @a int = 1, @b as varchar(10), @t table (x int);") else {
            panic!("expected DECLARE");
        };
        let variables = decl.variables();
        assert_eq!(variables.len(), 3);
        assert_eq!(variables[0].value().map(SyntaxNode::to_source).as_deref(), Some("1"));
        assert_eq!(variables[1].data_type().name(), "varchar");
        assert!(matches!(variables[2].data_type(), DataType::Table(_)));
    }

    #[test]
    fn test_initial_value_is_an_assignment() {
        let Stmt::Declare(decl) = declare("declare @a bit = case when @x = 1 then 1 end") else {
            panic!("expected DECLARE");
        };
        let variable = &decl.variables()[0];
        let tokens = variable.tokens();
        let kinds: Vec<TokenKind> = tokens
            .iter()
            .filter(|t| t.text() == "=")
            .map(|t| t.kind())
            .collect();
        assert_eq!(kinds, [TokenKind::Assign, TokenKind::Eq]);
    }

    #[test]
    fn test_declare_cursor() {
        let Stmt::DeclareCursor(cursor) =
            declare("declare c scroll cursor local for select a from t for update of a")
        else {
            panic!("expected DECLARE CURSOR");
        };
        assert_eq!(cursor.name().text(), "c");
        assert!(cursor.query().is_query());
        assert!(cursor.is_for_update());
        assert_eq!(cursor.options().len(), 1);
    }

    #[test]
    fn test_table_variable_initializer_rejected() {
        let mut parser = Parser::new("declare @t table (x int) = 1");
        let err = parser.parse_declare().unwrap_err();
        assert!(err.to_string().contains("table variables take no initial value"));
    }

    #[test]
    fn test_empty_type_arguments_rejected() {
        let mut parser = Parser::new("varchar()");
        assert!(parser.parse_data_type().is_err());
    }
}
