//! The parser and its token-level helpers.
//!
//! The grammar itself lives in the sibling modules (`expr`, `select`,
//! `stmt`, `decl`, `routine`), each adding methods to [`Parser`].

use super::cursor::Cursor;
use super::error::{Error, ParseError, Result};
use super::scope::{AssignmentScope, Collector};
use crate::lexer::{Keyword, Lexer, Token, TokenKind, TokenSource};

/// Default limit on nested expressions and statements.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting of expressions and statements before the parser
    /// gives up with an error.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// T-SQL parser.
///
/// One parser handles one text. Trees it returns share tokens through `Rc`
/// and are not `Send`.
pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    depth: usize,
    options: ParserOptions,
}

impl<'a> Parser<'a> {
    /// Creates a parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::from_source(Lexer::new(input))
    }

    /// Creates a parser over any token source.
    #[must_use]
    pub fn from_source(source: impl TokenSource + 'a) -> Self {
        Self {
            cursor: Cursor::new(source),
            depth: 0,
            options: ParserOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns true once all input has been consumed.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.cursor.current().is_eof()
    }

    /// Fails unless all input has been consumed.
    pub fn expect_end(&mut self) -> Result<()> {
        if self.at_end() {
            return Ok(());
        }
        if let Some(err) = self.cursor.error() {
            return Err(err.into());
        }
        let message = format!(
            "expected end of input, found {}",
            self.cursor.current().describe()
        );
        self.fail(message)
    }

    pub(crate) fn current(&self) -> &Token {
        self.cursor.current()
    }

    pub(crate) fn at(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    pub(crate) fn at_kind(&self, kind: TokenKind) -> bool {
        self.current().kind() == kind
    }

    /// Returns true if the token after the current one is `keyword`.
    pub(crate) fn peek_is(&self, keyword: Keyword) -> bool {
        self.cursor.raw_lookahead().is_keyword(keyword)
    }

    pub(crate) fn peek_is_any(&self, keywords: &[Keyword]) -> bool {
        self.cursor.raw_lookahead().is_any_keyword(keywords)
    }

    /// Consumes the current token unconditionally.
    pub(crate) fn take(&mut self) -> Token {
        let token = self.current().clone();
        self.cursor.advance();
        token
    }

    pub(crate) fn eat(&mut self, keyword: Keyword) -> Option<Token> {
        self.cursor
            .expect(|t| t.is_keyword(keyword), keyword.as_str(), false)
    }

    pub(crate) fn eat_any(&mut self, keywords: &[Keyword]) -> Option<Token> {
        self.cursor
            .expect(|t| t.is_any_keyword(keywords), "keyword", false)
    }

    pub(crate) fn eat_kind(&mut self, kind: TokenKind) -> Option<Token> {
        self.cursor.expect(|t| t.kind() == kind, "token", false)
    }

    /// Consumes an `=` read in assignment context, as before a parameter
    /// default or a variable's initial value.
    pub(crate) fn eat_assign(&mut self) -> Option<Token> {
        self.assignment_scope(true).eat_kind(TokenKind::Assign)
    }

    /// Consumes the required keyword.
    pub(crate) fn keyword(&mut self, keyword: Keyword) -> Result<Token> {
        let found = self
            .cursor
            .expect(|t| t.is_keyword(keyword), keyword.as_str(), true);
        self.required(found)
    }

    /// Consumes a required token of `kind`, described as `what` in errors.
    pub(crate) fn kind(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        let found = self.cursor.expect(|t| t.kind() == kind, what, true);
        self.required(found)
    }

    /// Consumes a required identifier that is not a reserved keyword.
    pub(crate) fn identifier(&mut self, what: &str) -> Result<Token> {
        let found = self
            .cursor
            .expect(|t| t.is_identifier() && !t.is_reserved(), what, true);
        self.required(found)
    }

    pub(crate) fn variable(&mut self) -> Result<Token> {
        let found = self.cursor.expect(Token::is_variable, "variable", true);
        self.required(found)
    }

    /// The optional statement terminator, or a placeholder.
    pub(crate) fn terminator(&mut self) -> Token {
        self.eat_kind(TokenKind::Semicolon)
            .unwrap_or_else(Token::placeholder)
    }

    fn required(&self, found: Option<Token>) -> Result<Token> {
        found.ok_or_else(|| self.installed_error().into())
    }

    fn installed_error(&self) -> ParseError {
        self.cursor
            .error()
            .unwrap_or_else(|| ParseError::new("syntax error", self.current().span()))
    }

    /// Installs an error at the current token and returns it.
    pub(crate) fn fail<T>(&mut self, message: impl Into<String>) -> Result<T> {
        Err(self.cursor.set_current_error(message).into())
    }

    /// Fails at an error token with the installed error, or with the
    /// lexer's message when none is installed yet.
    pub(crate) fn fail_at_error<T>(&mut self) -> Result<T> {
        match self.cursor.error() {
            Some(err) => Err(err.into()),
            None => {
                let message = self.current().describe();
                self.fail(message)
            }
        }
    }

    /// Prefixes a syntax error with `message`, keeping its root cause.
    pub(crate) fn context<T>(&mut self, result: Result<T>, message: &str) -> Result<T> {
        match result {
            Err(Error::Syntax(_)) => self.fail(message),
            other => other,
        }
    }

    /// Runs `f` one nesting level deeper, failing past the depth limit.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return self.fail("nesting too deep");
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Enters or leaves assignment context until the guard is dropped.
    pub(crate) fn assignment_scope(&mut self, assignment: bool) -> AssignmentScope<'_, 'a> {
        AssignmentScope::new(self, assignment)
    }

    /// Starts collecting tokens until the guard is finished or dropped.
    pub(crate) fn collect(&mut self) -> Collector<'_, 'a> {
        Collector::new(self)
    }
}
