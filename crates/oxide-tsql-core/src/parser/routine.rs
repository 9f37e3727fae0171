//! `CREATE`/`ALTER` for procedures, views and functions.

use std::rc::Rc;

use tracing::debug;

use super::error::{Error, Result};
use super::pratt::Precedence;
use super::scope::Collected;
use super::Parser;
use crate::ast::{
    BlockStmt, CreateInlineFunctionStmt, CreateProcedureStmt, CreateScalarFunctionStmt,
    CreateTableFunctionStmt, CreateViewStmt, FunctionSignature, ParamDecl, ParamList,
    ProcedureHeader, RawTokens, RoutineOptions, SeparatedList, StatementList, Stmt,
    UnmodeledStmt, ViewHeader,
};
use crate::lexer::{Keyword, Token, TokenKind};

impl Parser<'_> {
    /// `CREATE`, `ALTER` or `CREATE OR ALTER`, followed by the object kind.
    /// Objects other than procedures, views and functions are unmodeled.
    pub(crate) fn parse_create(&mut self) -> Result<Stmt> {
        let mut create = vec![self.take()];
        if create[0].is_keyword(Keyword::Create)
            && self.at(Keyword::Or)
            && self.peek_is(Keyword::Alter)
        {
            create.push(self.take());
            create.push(self.take());
        }
        match self.current().keyword() {
            Some(Keyword::Proc | Keyword::Procedure) => self.parse_procedure(create),
            Some(Keyword::View) => self.parse_view(create),
            Some(Keyword::Function) => self.parse_function(create),
            _ => self.parse_unmodeled_from(create),
        }
    }

    fn parse_procedure(&mut self, create: Vec<Token>) -> Result<Stmt> {
        let procedure = self.take();
        let name = Rc::new(self.parse_name()?);
        let (lparen, params, rparen) = if let Some(lparen) = self.eat_kind(TokenKind::LeftParen) {
            let params = self.parse_optional_params()?;
            (lparen, params, self.kind(TokenKind::RightParen, "')'")?)
        } else if self.current().is_variable() {
            let params = Rc::new(self.parse_params()?);
            (Token::placeholder(), Some(params), Token::placeholder())
        } else {
            (Token::placeholder(), None, Token::placeholder())
        };
        let options = self.parse_routine_options()?;
        let replication = if self.at(Keyword::For) && self.peek_is(Keyword::Replication) {
            Some([self.take(), self.take()])
        } else {
            None
        };
        let as_token = self.keyword(Keyword::As)?;
        self.reject_clr()?;
        let body = self.parse_procedure_body()?;
        let header = ProcedureHeader {
            create,
            procedure,
            name,
            lparen,
            params,
            rparen,
            options,
            replication,
            as_token,
        };
        Ok(CreateProcedureStmt::new(header, Rc::new(body))?.into())
    }

    /// The statements of a procedure, up to the end of input.
    fn parse_procedure_body(&mut self) -> Result<StatementList> {
        if self.at_end() {
            return self.fail("expected procedure body");
        }
        let mut collector = self.collect();
        match collector.parse_statements() {
            Ok(body) => {
                collector.finish();
                Ok(body)
            }
            Err(Error::Syntax(err)) => {
                debug!(error = %err, "keeping procedure body as unmodeled tokens");
                let collected = collector.read_to_end(true);
                self.recover_body(collected)
            }
            Err(err) => Err(err),
        }
    }

    fn recover_body(&mut self, collected: Collected) -> Result<StatementList> {
        let wrapped = collected
            .tokens
            .first()
            .is_some_and(|t| t.is_keyword(Keyword::Begin))
            && collected
                .tokens
                .last()
                .is_some_and(|t| t.is_keyword(Keyword::End));
        if wrapped {
            let block = self.recover_block(collected)?;
            return Ok(StatementList::new(vec![block.into()]));
        }
        if collected.tokens.is_empty() {
            return self.fail("expected procedure body");
        }
        let terminator = collected.terminator.unwrap_or_else(Token::placeholder);
        let raw = Rc::new(RawTokens::new(collected.tokens)?);
        Ok(StatementList::new(vec![
            UnmodeledStmt::new(raw, terminator)?.into(),
        ]))
    }

    fn parse_view(&mut self, create: Vec<Token>) -> Result<Stmt> {
        let view = self.take();
        let name = Rc::new(self.parse_name()?);
        let (lparen, columns, rparen) = match self.eat_kind(TokenKind::LeftParen) {
            Some(lparen) => {
                let columns = Rc::new(self.parse_column_names()?);
                (lparen, Some(columns), self.kind(TokenKind::RightParen, "')'")?)
            }
            None => (Token::placeholder(), None, Token::placeholder()),
        };
        let options = self.parse_routine_options()?;
        let as_token = self.keyword(Keyword::As)?;
        let query = self.assignment_scope(false).parse_expr(Precedence::None)?;
        if !query.is_query() {
            return self.fail("expected query");
        }
        let check_option = if self.at(Keyword::With) && self.peek_is(Keyword::Check) {
            Some([self.take(), self.take(), self.keyword(Keyword::Option)?])
        } else {
            None
        };
        let terminator = self.terminator();
        let header = ViewHeader {
            create,
            view,
            name,
            lparen,
            columns,
            rparen,
            options,
            as_token,
        };
        Ok(CreateViewStmt::new(header, query, check_option, terminator)?.into())
    }

    fn parse_column_names(&mut self) -> Result<SeparatedList<Token>> {
        let mut columns = vec![self.identifier("column name")?];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat_kind(TokenKind::Comma) {
            separators.push(comma);
            columns.push(self.identifier("column name")?);
        }
        Ok(SeparatedList::new(columns, separators)?)
    }

    /// `FUNCTION name (params) RETURNS`, then one of the three function
    /// forms depending on what is returned.
    fn parse_function(&mut self, create: Vec<Token>) -> Result<Stmt> {
        let function = self.take();
        let name = Rc::new(self.parse_name()?);
        let lparen = self.kind(TokenKind::LeftParen, "'('")?;
        let params = self.parse_optional_params()?;
        let rparen = self.kind(TokenKind::RightParen, "')'")?;
        let returns = self.keyword(Keyword::Returns)?;
        let signature = Rc::new(FunctionSignature::new(
            create, function, name, lparen, params, rparen, returns,
        )?);
        if self.at(Keyword::Table) {
            return self.parse_inline_function(signature);
        }
        if self.current().is_variable() {
            return self.parse_table_function(signature);
        }
        let return_type = self.parse_data_type()?;
        let options = self.parse_routine_options()?;
        let as_token = self.eat(Keyword::As).unwrap_or_else(Token::placeholder);
        self.reject_clr()?;
        let body = self.parse_function_body()?;
        Ok(CreateScalarFunctionStmt::new(signature, return_type, options, as_token, body)?.into())
    }

    /// `RETURNS TABLE [WITH options] [AS] RETURN query`.
    fn parse_inline_function(&mut self, signature: Rc<FunctionSignature>) -> Result<Stmt> {
        let table = self.take();
        let options = self.parse_routine_options()?;
        let as_token = self.eat(Keyword::As).unwrap_or_else(Token::placeholder);
        let return_token = self.keyword(Keyword::Return)?;
        let query = self.assignment_scope(false).parse_expr(Precedence::None)?;
        if !query.is_query() {
            return self.fail("expected query after RETURN");
        }
        let terminator = self.terminator();
        Ok(CreateInlineFunctionStmt::new(
            signature,
            table,
            options,
            as_token,
            return_token,
            query,
            terminator,
        )?
        .into())
    }

    /// `RETURNS @result TABLE (...) [WITH options] [AS] BEGIN ... END`.
    fn parse_table_function(&mut self, signature: Rc<FunctionSignature>) -> Result<Stmt> {
        let variable = self.take();
        let table_type = Rc::new(self.parse_table_type()?);
        let options = self.parse_routine_options()?;
        let as_token = self.eat(Keyword::As).unwrap_or_else(Token::placeholder);
        self.reject_clr()?;
        let body = self.parse_function_body()?;
        Ok(CreateTableFunctionStmt::new(
            signature, variable, table_type, options, as_token, body,
        )?
        .into())
    }

    fn parse_function_body(&mut self) -> Result<Rc<BlockStmt>> {
        if !self.at(Keyword::Begin) {
            return self.fail(format!("expected BEGIN, found {}", self.current().describe()));
        }
        Ok(Rc::new(self.parse_block_recovering()?))
    }

    /// `AS EXTERNAL NAME assembly.class.method`.
    fn reject_clr(&self) -> Result<()> {
        if self.at(Keyword::External) && self.peek_is(Keyword::Name) {
            return Err(Error::Unsupported("CLR routine"));
        }
        Ok(())
    }

    /// `WITH option, ...` up to `AS`, `FOR`, `BEGIN` or `RETURN`. An `AS`
    /// directly after `EXECUTE` belongs to the option.
    fn parse_routine_options(&mut self) -> Result<Option<Rc<RoutineOptions>>> {
        let Some(with) = self.eat(Keyword::With) else {
            return Ok(None);
        };
        let mut tokens: Vec<Token> = Vec::new();
        loop {
            let token = self.current();
            let after_execute = tokens
                .last()
                .is_some_and(|t| t.is_any_keyword(&[Keyword::Exec, Keyword::Execute]));
            if token.is_eof()
                || token.is_error()
                || token.kind() == TokenKind::Semicolon
                || (token.is_keyword(Keyword::As) && !after_execute)
                || token.is_any_keyword(&[Keyword::For, Keyword::Begin, Keyword::Return])
            {
                break;
            }
            tokens.push(self.take());
        }
        if tokens.is_empty() {
            return self.fail("expected routine option");
        }
        let options = Rc::new(RawTokens::new(tokens)?);
        Ok(Some(Rc::new(RoutineOptions::new(with, options)?)))
    }

    /// Parameters inside parentheses, or none before an immediate `)`.
    fn parse_optional_params(&mut self) -> Result<Option<Rc<ParamList>>> {
        if self.at_kind(TokenKind::RightParen) {
            return Ok(None);
        }
        Ok(Some(Rc::new(self.parse_params()?)))
    }

    fn parse_params(&mut self) -> Result<ParamList> {
        let mut params = vec![self.parse_param()?];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat_kind(TokenKind::Comma) {
            separators.push(comma);
            params.push(self.parse_param()?);
        }
        Ok(SeparatedList::new(params, separators)?)
    }

    /// `@name [AS] type [VARYING] [= default] [OUT|OUTPUT] [READONLY]`.
    fn parse_param(&mut self) -> Result<Rc<ParamDecl>> {
        let name = self.variable()?;
        let as_token = self.eat(Keyword::As).unwrap_or_else(Token::placeholder);
        let data_type = self.parse_data_type()?;
        let varying = self.eat(Keyword::Varying);
        let default = match self.eat_assign() {
            Some(eq) => {
                let value = self.assignment_scope(false).parse_expr(Precedence::Comma)?;
                Some((eq, value))
            }
            None => None,
        };
        let mut modifiers = Vec::new();
        while let Some(modifier) =
            self.eat_any(&[Keyword::Out, Keyword::Output, Keyword::Readonly])
        {
            modifiers.push(modifier);
        }
        Ok(Rc::new(ParamDecl::new(
            name, as_token, data_type, varying, default, modifiers,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode;

    fn statement(input: &str) -> Result<Stmt> {
        let mut parser = Parser::new(input);
        let stmt = parser.parse_statement()?;
        parser.expect_end()?;
        Ok(stmt)
    }

    #[test]
    fn test_procedure_with_parens() {
        let Stmt::CreateProcedure(proc) =
            statement("create procedure dbo.p (@a int = 1, @b varchar(10) output) as select @a")
                .unwrap()
        else {
            panic!("expected procedure");
        };
        assert_eq!(proc.name().name(), "dbo.p");
        assert!(!proc.is_alter());
        let params = proc.params();
        assert_eq!(params.len(), 2);
        assert!(params[0].default_value().is_some());
        assert!(params[1].is_output());
        assert_eq!(proc.body().len(), 1);
    }

    #[test]
    fn test_param_default_is_an_assignment() {
        let Stmt::CreateProcedure(proc) = statement("create proc p @a int = 1 as return").unwrap()
        else {
            panic!("expected procedure");
        };
        let param = &proc.params()[0];
        let eq = param.tokens().into_iter().find(|t| t.text() == "=");
        assert_eq!(eq.map(Token::kind), Some(TokenKind::Assign));
        assert_eq!(
            param.default_value().map(SyntaxNode::to_clean_string).as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_procedure_bare_params_and_options() {
        let Stmt::CreateProcedure(proc) = statement(
            "create or alter proc p @t dbo.Items readonly with recompile, execute as owner as begin set nocount on; end",
        )
        .unwrap() else {
            panic!("expected procedure");
        };
        assert!(proc.is_create_or_alter());
        assert!(proc.params()[0].is_readonly());
        assert_eq!(proc.options().map(|o| o.options().len()), Some(5));
        assert!(matches!(proc.body().statements()[0], Stmt::Block(_)));
    }

    #[test]
    fn test_alter_procedure_for_replication() {
        let Stmt::CreateProcedure(proc) =
            statement("alter proc p for replication as return").unwrap()
        else {
            panic!("expected procedure");
        };
        assert!(proc.is_alter());
        assert!(proc.params().is_empty());
    }

    #[test]
    fn test_procedure_body_recovery() {
        let Stmt::CreateProcedure(proc) = statement("create proc p as select (1;").unwrap() else {
            panic!("expected procedure");
        };
        let Stmt::Unmodeled(body) = &proc.body().statements()[0] else {
            panic!("expected unmodeled body");
        };
        assert_eq!(body.leading_keyword(), "SELECT");
        assert_eq!(proc.to_source(), "create proc p as select (1;");
    }

    #[test]
    fn test_view() {
        let Stmt::CreateView(view) = statement(
            "create view v (a, b) with schemabinding as select x, y from t with check option",
        )
        .unwrap() else {
            panic!("expected view");
        };
        assert_eq!(view.columns().len(), 2);
        assert!(view.query().is_query());
        assert!(view.has_check_option());
    }

    #[test]
    fn test_view_requires_query() {
        let err = statement("create view v as 1").unwrap_err();
        assert!(err.to_string().contains("expected query"));
    }

    #[test]
    fn test_scalar_function() {
        let Stmt::CreateScalarFunction(func) =
            statement("create function f(@a int) returns int with schemabinding as begin return @a + 1 end")
                .unwrap()
        else {
            panic!("expected scalar function");
        };
        assert_eq!(func.signature().params().len(), 1);
        assert_eq!(func.return_type().name(), "int");
        assert_eq!(func.body().body().len(), 1);
    }

    #[test]
    fn test_inline_function() {
        let Stmt::CreateInlineFunction(func) =
            statement("create function f() returns table as return (select 1 as one)").unwrap()
        else {
            panic!("expected inline function");
        };
        assert!(func.signature().params().is_empty());
        assert!(func.query().is_query());
    }

    #[test]
    fn test_table_function() {
        let Stmt::CreateTableFunction(func) = statement(
            "create function f() returns @r table (id int) as begin insert @r values (1) return end",
        )
        .unwrap() else {
            panic!("expected table function");
        };
        assert_eq!(func.variable().text(), "@r");
        assert_eq!(func.table_type().to_source().trim(), "table (id int)");
        assert_eq!(func.body().body().len(), 2);
    }

    #[test]
    fn test_function_body_needs_begin() {
        let err = statement("create function f() returns int as return 1").unwrap_err();
        assert!(err.to_string().contains("expected BEGIN"));
    }

    #[test]
    fn test_clr_rejected() {
        let err = statement("create proc p as external name a.b.c").unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_other_objects_unmodeled() {
        let Stmt::Unmodeled(stmt) = statement("create table t (a int)").unwrap() else {
            panic!("expected unmodeled");
        };
        assert_eq!(stmt.leading_keyword(), "CREATE");
    }
}
