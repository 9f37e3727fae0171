//! Token cursor with one token of lookahead.

use super::error::ParseError;
use crate::lexer::{Token, TokenKind, TokenSource};

/// Walks a [`TokenSource`] for the grammar.
///
/// Besides the current token and one token of lookahead, the cursor holds
/// the parse error token, the assignment-context flag that decides whether
/// `=` is read as comparison or assignment, and the stack of active token
/// collectors.
pub struct Cursor<'a> {
    source: Box<dyn TokenSource + 'a>,
    /// The current token as produced by the source.
    current_raw: Token,
    /// The current token after assignment-context normalization.
    current: Token,
    lookahead: Token,
    error: Option<Token>,
    assignment: bool,
    eof_hits: u8,
    collectors: Vec<Vec<Token>>,
}

impl<'a> Cursor<'a> {
    pub fn new(source: impl TokenSource + 'a) -> Self {
        let mut source: Box<dyn TokenSource + 'a> = Box::new(source);
        let current_raw = source.next_token();
        let lookahead = if current_raw.is_eof() {
            current_raw.clone()
        } else {
            source.next_token()
        };
        Self {
            source,
            current: current_raw.clone(),
            current_raw,
            lookahead,
            error: None,
            assignment: false,
            eof_hits: 0,
            collectors: Vec::new(),
        }
    }

    /// The current token, or the error token once an error is installed.
    pub fn current(&self) -> &Token {
        self.error.as_ref().unwrap_or(&self.current)
    }

    /// The current token before normalization, ignoring any error.
    pub fn raw_current(&self) -> &Token {
        &self.current_raw
    }

    /// The token after the current one, before normalization.
    pub fn raw_lookahead(&self) -> &Token {
        &self.lookahead
    }

    /// Moves to the next token. Returns false when an error is installed,
    /// or when advancing at end of input for the second time in a row.
    pub fn advance(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.current_raw.is_eof() {
            self.eof_hits = self.eof_hits.saturating_add(1);
            return self.eof_hits < 2;
        }
        for collected in &mut self.collectors {
            collected.push(self.current_raw.clone());
        }
        let next = if self.lookahead.is_eof() {
            self.lookahead.clone()
        } else {
            self.source.next_token()
        };
        self.current_raw = std::mem::replace(&mut self.lookahead, next);
        self.current = self.normalize(&self.current_raw);
        self.eof_hits = u8::from(self.current_raw.is_eof());
        true
    }

    /// Consumes and returns the current token if it satisfies `predicate`.
    ///
    /// When it does not and `required` is set, installs an error naming
    /// `what`.
    pub fn expect(
        &mut self,
        predicate: impl FnOnce(&Token) -> bool,
        what: &str,
        required: bool,
    ) -> Option<Token> {
        if self.error.is_none() && predicate(&self.current) {
            let token = self.current.clone();
            self.advance();
            return Some(token);
        }
        if required {
            let message = if self.error.is_some() {
                format!("expected {what}")
            } else {
                format!("expected {what}, found {}", self.current.describe())
            };
            self.set_current_error(message);
        }
        None
    }

    /// Installs an error token at the current position. An existing error
    /// keeps its position and gets `message` prepended to its own.
    pub fn set_current_error(&mut self, message: impl Into<String>) -> ParseError {
        let message = message.into();
        let token = match &self.error {
            Some(existing) => {
                let root = existing.error_message().unwrap_or_default();
                Token::error(format!("{message}: {root}"), existing.span())
            }
            None => Token::error(message, self.current.span()),
        };
        let error = ParseError::new(token.error_message().unwrap_or_default(), token.span());
        self.error = Some(token);
        error
    }

    /// The installed error, if any.
    pub fn error(&self) -> Option<ParseError> {
        self.error
            .as_ref()
            .map(|token| ParseError::new(token.error_message().unwrap_or_default(), token.span()))
    }

    /// Removes the installed error. Only recovery paths that have captured
    /// the failed span call this.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Sets the assignment context and returns the previous value.
    pub fn set_assignment_context(&mut self, assignment: bool) -> bool {
        let previous = std::mem::replace(&mut self.assignment, assignment);
        self.current = self.normalize(&self.current_raw);
        previous
    }

    /// Starts recording every token advanced over.
    pub fn begin_collect(&mut self) {
        self.collectors.push(Vec::new());
    }

    /// Stops the innermost recording and returns its tokens.
    pub fn end_collect(&mut self) -> Vec<Token> {
        self.collectors.pop().unwrap_or_default()
    }

    /// The tokens recorded so far by the innermost collector.
    pub fn collected(&self) -> &[Token] {
        self.collectors.last().map_or(&[][..], Vec::as_slice)
    }

    fn normalize(&self, token: &Token) -> Token {
        if self.assignment && token.kind() == TokenKind::Eq {
            token.reclassified(TokenKind::Assign)
        } else {
            token.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn cursor(input: &str) -> Cursor<'_> {
        Cursor::new(Lexer::new(input))
    }

    #[test]
    fn test_lookahead() {
        let mut c = cursor("a b c");
        assert_eq!(c.current().text(), "a");
        assert_eq!(c.raw_lookahead().text(), "b");
        assert!(c.advance());
        assert_eq!(c.current().text(), "b");
        assert_eq!(c.raw_lookahead().text(), "c");
    }

    #[test]
    fn test_advance_stops_at_second_eof() {
        let mut c = cursor("a");
        assert!(c.advance());
        assert!(c.current().is_eof());
        assert!(!c.advance());
        assert!(!c.advance());
    }

    #[test]
    fn test_assignment_context_reclassifies_eq() {
        let mut c = cursor("= =");
        assert_eq!(c.current().kind(), TokenKind::Eq);
        assert!(!c.set_assignment_context(true));
        assert_eq!(c.current().kind(), TokenKind::Assign);
        assert_eq!(c.raw_current().kind(), TokenKind::Eq);
        c.advance();
        assert_eq!(c.current().kind(), TokenKind::Assign);
        assert!(c.set_assignment_context(false));
        assert_eq!(c.current().kind(), TokenKind::Eq);
    }

    #[test]
    fn test_error_short_circuits() {
        let mut c = cursor("a b");
        assert!(c.expect(Token::is_variable, "variable", true).is_none());
        assert!(c.current().is_error());
        assert!(!c.advance());
        assert!(c.expect(Token::is_identifier, "identifier", false).is_none());
        let err = c.error().unwrap();
        assert_eq!(err.message, "expected variable, found 'a'");
    }

    #[test]
    fn test_error_chains() {
        let mut c = cursor("a");
        c.set_current_error("inner");
        let err = c.set_current_error("outer");
        assert_eq!(err.message, "outer: inner");
        c.clear_error();
        assert_eq!(c.current().text(), "a");
    }

    #[test]
    fn test_collectors_nest() {
        let mut c = cursor("a b c d");
        c.begin_collect();
        c.advance();
        c.begin_collect();
        c.advance();
        c.advance();
        let inner = c.end_collect();
        c.advance();
        let outer = c.end_collect();
        let texts = |tokens: &[Token]| tokens.iter().map(|t| t.text().to_string()).collect::<Vec<_>>();
        assert_eq!(texts(&inner), ["b", "c"]);
        assert_eq!(texts(&outer), ["a", "b", "c", "d"]);
    }
}
