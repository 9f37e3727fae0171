//! Statement dispatch, blocks and control flow.

use std::rc::Rc;

use tracing::debug;

use super::error::{Error, Result};
use super::pratt::Precedence;
use super::scope::Collected;
use super::Parser;
use crate::ast::{
    BeginTransactionStmt, BlockStmt, EmptyStmt, ExpressionStmt, GotoStmt, IfStmt, LabelStmt,
    MonoKeywordStmt, RawTokens, ReturnStmt, SeparatedList, SetOptionStmt, SetVariableStmt,
    StatementList, Stmt, TryCatchStmt, UnmodeledStmt, WhileStmt,
};
use crate::lexer::{Keyword, Token, TokenKind};

/// Keywords that end an unmodeled statement outside parentheses and `CASE`.
const BOUNDARY_KEYWORDS: &[Keyword] = &[
    Keyword::End,
    Keyword::Else,
    Keyword::Begin,
    Keyword::If,
    Keyword::While,
    Keyword::Return,
    Keyword::Declare,
    Keyword::Goto,
    Keyword::Break,
    Keyword::Continue,
];

impl Parser<'_> {
    /// Parses one statement, consuming an optional trailing `;`.
    pub fn parse_statement(&mut self) -> Result<Stmt> {
        self.nested(Self::dispatch_statement)
    }

    /// Parses statements up to the end of input.
    pub fn parse_statements(&mut self) -> Result<StatementList> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(StatementList::new(statements))
    }

    /// Parses a statement that makes up the whole input. A `BEGIN ... END`
    /// block recovers a body it cannot parse.
    pub(crate) fn parse_top_statement(&mut self) -> Result<Stmt> {
        if self.at(Keyword::Begin) && !self.peek_is_any(NOT_BLOCK) {
            return Ok(self.parse_block_recovering()?.into());
        }
        self.parse_statement()
    }

    fn dispatch_statement(&mut self) -> Result<Stmt> {
        let token = self.current().clone();
        match token.kind() {
            TokenKind::Semicolon => return Ok(EmptyStmt::new(self.take())?.into()),
            TokenKind::LeftParen => return self.parse_expression_statement(),
            TokenKind::Identifier => {}
            TokenKind::Error => return self.fail_at_error(),
            _ => return self.fail(format!("expected statement, found {}", token.describe())),
        }
        match token.keyword() {
            Some(Keyword::Begin) => self.parse_begin(),
            Some(Keyword::If) => self.parse_if(),
            Some(Keyword::While) => self.parse_while(),
            Some(Keyword::Break | Keyword::Continue) => {
                let keyword = self.take();
                let terminator = self.terminator();
                Ok(MonoKeywordStmt::new(keyword, terminator)?.into())
            }
            Some(Keyword::Return) => self.parse_return(),
            Some(Keyword::Goto) => {
                let goto = self.take();
                let label = self.identifier("label")?;
                let terminator = self.terminator();
                Ok(GotoStmt::new(goto, label, terminator)?.into())
            }
            Some(Keyword::Set) => self.parse_set(),
            Some(Keyword::Declare) => self.parse_declare(),
            Some(Keyword::Create | Keyword::Alter) => self.parse_create(),
            Some(Keyword::Select) => self.parse_expression_statement(),
            Some(Keyword::End) if self.peek_is(Keyword::Conversation) => self.parse_unmodeled(),
            Some(Keyword::End | Keyword::Else) => {
                self.fail(format!("unexpected {}", token.describe()))
            }
            _ if token.is_plain_identifier()
                && self.cursor.raw_lookahead().kind() == TokenKind::Colon =>
            {
                let label = self.take();
                let colon = self.take();
                Ok(LabelStmt::new(label, colon)?.into())
            }
            _ if starts_statement(&token) => self.parse_unmodeled(),
            _ => self.fail(format!("expected statement, found {}", token.describe())),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.assignment_scope(false).parse_expr(Precedence::None)?;
        let terminator = self.terminator();
        Ok(ExpressionStmt::new(expr, terminator)?.into())
    }

    fn parse_begin(&mut self) -> Result<Stmt> {
        if self.peek_is_any(&[Keyword::Tran, Keyword::Transaction]) {
            let begin = self.take();
            let transaction = self.take();
            let name = self
                .cursor
                .expect(|t| t.is_identifier() && !t.is_reserved(), "name", false);
            let terminator = self.terminator();
            return Ok(BeginTransactionStmt::new(begin, transaction, name, terminator)?.into());
        }
        if self.peek_is(Keyword::Try) {
            return self.parse_try_catch();
        }
        if self.peek_is_any(&[Keyword::Dialog, Keyword::Conversation, Keyword::Distributed]) {
            return self.parse_unmodeled();
        }
        Ok(self.parse_block()?.into())
    }

    /// `BEGIN statements END`.
    pub(crate) fn parse_block(&mut self) -> Result<BlockStmt> {
        let begin = self.keyword(Keyword::Begin)?;
        let body = self.parse_block_body()?;
        let end = self.keyword(Keyword::End);
        let end = self.context(end, "missing END")?;
        let terminator = self.terminator();
        Ok(BlockStmt::new(begin, Rc::new(body), end, terminator)?)
    }

    /// Statements up to an `END` that closes the enclosing block.
    fn parse_block_body(&mut self) -> Result<StatementList> {
        let mut statements = Vec::new();
        while !self.at_end() && !(self.at(Keyword::End) && !self.peek_is(Keyword::Conversation)) {
            statements.push(self.parse_statement()?);
        }
        Ok(StatementList::new(statements))
    }

    /// A block that reads to the end of input. When its statements do not
    /// parse, the body between `BEGIN` and `END` is kept as one unmodeled
    /// statement.
    pub(crate) fn parse_block_recovering(&mut self) -> Result<BlockStmt> {
        let mut collector = self.collect();
        match collector.parse_block() {
            Ok(block) => {
                collector.finish();
                Ok(block)
            }
            Err(Error::Syntax(err)) => {
                debug!(error = %err, "keeping block body as unmodeled tokens");
                let collected = collector.read_to_end(true);
                self.recover_block(collected)
            }
            Err(err) => Err(err),
        }
    }

    /// Rebuilds `BEGIN tokens END [;]` as a block around one unmodeled
    /// statement.
    pub(crate) fn recover_block(&mut self, collected: Collected) -> Result<BlockStmt> {
        let mut tokens = collected.tokens.into_iter();
        let (Some(begin), Some(end)) = (tokens.next(), tokens.next_back()) else {
            return self.fail("missing END");
        };
        if !begin.is_keyword(Keyword::Begin) || !end.is_keyword(Keyword::End) {
            return self.fail("missing END");
        }
        let inner: Vec<Token> = tokens.collect();
        let mut body = Vec::new();
        if !inner.is_empty() {
            let raw = Rc::new(RawTokens::new(inner)?);
            body.push(UnmodeledStmt::new(raw, Token::placeholder())?.into());
        }
        let terminator = collected.terminator.unwrap_or_else(Token::placeholder);
        Ok(BlockStmt::new(
            begin,
            Rc::new(StatementList::new(body)),
            end,
            terminator,
        )?)
    }

    /// `BEGIN TRY ... END TRY BEGIN CATCH ... END CATCH`.
    fn parse_try_catch(&mut self) -> Result<Stmt> {
        let begin_try = [self.take(), self.take()];
        let try_body = self.parse_block_body()?;
        let end_try = [self.keyword(Keyword::End)?, self.keyword(Keyword::Try)?];
        let begin_catch = [self.keyword(Keyword::Begin)?, self.keyword(Keyword::Catch)?];
        let catch_body = self.parse_block_body()?;
        let end_catch = [self.keyword(Keyword::End)?, self.keyword(Keyword::Catch)?];
        let terminator = self.terminator();
        Ok(TryCatchStmt::new(
            begin_try,
            Rc::new(try_body),
            end_try,
            begin_catch,
            Rc::new(catch_body),
            end_catch,
            terminator,
        )?
        .into())
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let if_token = self.take();
        let condition = self.assignment_scope(false).parse_expr(Precedence::Comma)?;
        let then = self.parse_statement()?;
        let else_clause = match self.eat(Keyword::Else) {
            Some(keyword) => Some((keyword, self.parse_statement()?)),
            None => None,
        };
        Ok(IfStmt::new(if_token, condition, then, else_clause)?.into())
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let while_token = self.take();
        let condition = self.assignment_scope(false).parse_expr(Precedence::Comma)?;
        let body = self.parse_statement()?;
        Ok(WhileStmt::new(while_token, condition, body)?.into())
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        let return_token = self.take();
        let value = if self.current().starts_expression() && !self.at(Keyword::Select) {
            Some(self.assignment_scope(false).parse_expr(Precedence::Comma)?)
        } else {
            None
        };
        let terminator = self.terminator();
        Ok(ReturnStmt::new(return_token, value, terminator)?.into())
    }

    /// `SET @v = expr`, `SET @v += expr`, or `SET option[, ...] value`.
    fn parse_set(&mut self) -> Result<Stmt> {
        let set = self.take();
        if self.current().is_variable() {
            let next = self.cursor.raw_lookahead().kind();
            if next != TokenKind::Eq && !next.is_assignment() {
                return self.fail("expected assignment to variable");
            }
            let variable = self.take();
            let (operator, value) = {
                let mut scope = self.assignment_scope(true);
                let operator = scope.take();
                (operator, scope.parse_expr(Precedence::Assignment)?)
            };
            let terminator = self.terminator();
            return Ok(SetVariableStmt::new(set, variable, operator, value, terminator)?.into());
        }
        let mut options = vec![self.kind(TokenKind::Identifier, "option name")?];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat_kind(TokenKind::Comma) {
            separators.push(comma);
            options.push(self.kind(TokenKind::Identifier, "option name")?);
        }
        let options = Rc::new(SeparatedList::new(options, separators)?);
        let value = Rc::new(RawTokens::new(self.parse_statement_tail())?);
        let terminator = self.terminator();
        Ok(SetOptionStmt::new(set, options, value, terminator)?.into())
    }

    fn parse_unmodeled(&mut self) -> Result<Stmt> {
        let first = self.take();
        self.parse_unmodeled_from(vec![first])
    }

    /// An unmodeled statement starting with the already consumed `prefix`.
    pub(crate) fn parse_unmodeled_from(&mut self, prefix: Vec<Token>) -> Result<Stmt> {
        let tokens = self.collect_statement(prefix);
        let terminator = self.terminator();
        Ok(UnmodeledStmt::new(Rc::new(RawTokens::new(tokens)?), terminator)?.into())
    }

    /// Tokens up to the end of the current statement.
    pub(crate) fn parse_statement_tail(&mut self) -> Vec<Token> {
        self.collect_statement(Vec::new())
    }

    /// Extends `tokens` up to a `;`, the end of input, an unbalanced `)`,
    /// or a keyword that starts the next statement outside parentheses and
    /// `CASE ... END`.
    fn collect_statement(&mut self, mut tokens: Vec<Token>) -> Vec<Token> {
        let mut parens = 0usize;
        let mut cases = 0usize;
        loop {
            let token = self.current();
            if token.is_eof() || token.is_error() {
                break;
            }
            match token.kind() {
                TokenKind::Semicolon if parens == 0 => break,
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen if parens == 0 => break,
                TokenKind::RightParen => parens -= 1,
                TokenKind::Identifier if parens == 0 => {
                    if token.is_keyword(Keyword::Case) {
                        cases += 1;
                    } else if token.is_keyword(Keyword::End) && cases > 0 {
                        cases -= 1;
                    } else if cases == 0 && ends_statement(token, &tokens) {
                        break;
                    }
                }
                _ => {}
            }
            tokens.push(self.take());
        }
        tokens
    }
}

/// `BEGIN` followed by one of these does not open a block.
const NOT_BLOCK: &[Keyword] = &[
    Keyword::Tran,
    Keyword::Transaction,
    Keyword::Try,
    Keyword::Dialog,
    Keyword::Conversation,
    Keyword::Distributed,
];

/// Keywords that begin a statement the grammar keeps as raw tokens, along
/// with `SELECT`, `SET`, `CREATE` and `ALTER`, which have their own rules.
const STATEMENT_KEYWORDS: &[Keyword] = &[
    Keyword::Alter,
    Keyword::Backup,
    Keyword::Bulk,
    Keyword::Checkpoint,
    Keyword::Close,
    Keyword::Commit,
    Keyword::Create,
    Keyword::Dbcc,
    Keyword::Deallocate,
    Keyword::Delete,
    Keyword::Deny,
    Keyword::Disable,
    Keyword::Drop,
    Keyword::Enable,
    Keyword::Exec,
    Keyword::Execute,
    Keyword::Fetch,
    Keyword::Get,
    Keyword::Grant,
    Keyword::Insert,
    Keyword::Kill,
    Keyword::Merge,
    Keyword::Move,
    Keyword::Open,
    Keyword::Print,
    Keyword::Raiserror,
    Keyword::Receive,
    Keyword::Reconfigure,
    Keyword::Restore,
    Keyword::Revert,
    Keyword::Revoke,
    Keyword::Rollback,
    Keyword::Save,
    Keyword::Select,
    Keyword::Send,
    Keyword::Set,
    Keyword::Shutdown,
    Keyword::Throw,
    Keyword::Truncate,
    Keyword::Update,
    Keyword::Use,
    Keyword::Waitfor,
    Keyword::With,
];

/// Statement keywords that never occur inside another statement.
const STANDALONE_KEYWORDS: &[Keyword] = &[
    Keyword::Checkpoint,
    Keyword::Dbcc,
    Keyword::Kill,
    Keyword::Print,
    Keyword::Raiserror,
    Keyword::Reconfigure,
    Keyword::Revert,
    Keyword::Shutdown,
    Keyword::Truncate,
    Keyword::Use,
    Keyword::Waitfor,
];

/// Leading keywords of statements whose own syntax embeds other statement
/// keywords, as in `GRANT SELECT, UPDATE ON t` or `WHEN MATCHED THEN DELETE`.
const EMBEDDING_KEYWORDS: &[Keyword] = &[
    Keyword::Alter,
    Keyword::Backup,
    Keyword::Bulk,
    Keyword::Create,
    Keyword::Deny,
    Keyword::Grant,
    Keyword::Merge,
    Keyword::Restore,
    Keyword::Revoke,
    Keyword::With,
];

/// A statement keyword right after one of these is part of the current
/// statement, as in `FOR UPDATE` or `INSTEAD OF DELETE`.
const CONTINUING_KEYWORDS: &[Keyword] = &[Keyword::For, Keyword::Of];

/// Returns true if `token` can begin a statement kept as raw tokens.
fn starts_statement(token: &Token) -> bool {
    token.is_any_keyword(STATEMENT_KEYWORDS)
}

fn ends_statement(token: &Token, collected: &[Token]) -> bool {
    if token.is_any_keyword(BOUNDARY_KEYWORDS) {
        // DROP TABLE IF EXISTS
        return !(token.is_keyword(Keyword::If)
            && collected.len() == 2
            && collected[0].is_keyword(Keyword::Drop));
    }
    // Non-reserved statement words double as names. A CTE needs a `;`
    // before it, and WITH also opens hints and options.
    if !token.is_reserved() || !starts_statement(token) || token.is_keyword(Keyword::With) {
        return false;
    }
    if token.is_any_keyword(STANDALONE_KEYWORDS) {
        return true;
    }
    let (Some(leader), Some(previous)) = (collected.first(), collected.last()) else {
        return true;
    };
    if leader.is_any_keyword(EMBEDDING_KEYWORDS) || previous.is_any_keyword(CONTINUING_KEYWORDS) {
        return false;
    }
    // OFFSET n ROWS FETCH NEXT
    if token.is_keyword(Keyword::Fetch) && previous.is_any_keyword(&[Keyword::Row, Keyword::Rows]) {
        return false;
    }
    match leader.keyword() {
        // INSERT ... SELECT, INSERT ... EXEC
        Some(Keyword::Insert) => {
            !token.is_any_keyword(&[Keyword::Select, Keyword::Exec, Keyword::Execute])
        }
        Some(Keyword::Update) => !token.is_keyword(Keyword::Set),
        _ => true,
    }
}
