//! Scoped parser state: assignment context and token collectors.
//!
//! Both guards borrow the parser mutably and dereference to it, so grammar
//! code keeps calling parser methods through the guard. Their effect ends
//! when the guard is dropped, on every exit path.

use std::ops::{Deref, DerefMut};

use super::error::Result;
use super::Parser;
use crate::lexer::{Token, TokenKind};

/// Sets the assignment context for its lifetime and restores the previous
/// value on drop.
pub struct AssignmentScope<'p, 'a> {
    parser: &'p mut Parser<'a>,
    previous: bool,
}

impl<'p, 'a> AssignmentScope<'p, 'a> {
    pub(crate) fn new(parser: &'p mut Parser<'a>, assignment: bool) -> Self {
        let previous = parser.cursor.set_assignment_context(assignment);
        Self { parser, previous }
    }
}

impl<'a> Deref for AssignmentScope<'_, 'a> {
    type Target = Parser<'a>;

    fn deref(&self) -> &Self::Target {
        self.parser
    }
}

impl DerefMut for AssignmentScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.parser
    }
}

impl Drop for AssignmentScope<'_, '_> {
    fn drop(&mut self) {
        self.parser.cursor.set_assignment_context(self.previous);
    }
}

/// Tokens captured by [`Collector::read_to_end`].
#[derive(Debug, Clone)]
pub struct Collected {
    pub tokens: Vec<Token>,
    /// The trailing `;`, split off when requested.
    pub terminator: Option<Token>,
}

/// Records every token the parser advances over while it is alive.
pub struct Collector<'p, 'a> {
    parser: &'p mut Parser<'a>,
    finished: bool,
}

impl<'p, 'a> Collector<'p, 'a> {
    pub(crate) fn new(parser: &'p mut Parser<'a>) -> Self {
        parser.cursor.begin_collect();
        Self {
            parser,
            finished: false,
        }
    }

    /// Stops recording and returns the tokens seen so far.
    pub fn finish(mut self) -> Vec<Token> {
        self.end()
    }

    /// Discards any error and consumes the rest of the input.
    pub fn read_to_end(mut self, strip_terminator: bool) -> Collected {
        self.parser.cursor.clear_error();
        while !self.parser.cursor.raw_current().is_eof() {
            self.parser.cursor.advance();
        }
        let mut tokens = self.end();
        let terminator = if strip_terminator
            && tokens
                .last()
                .is_some_and(|t| t.kind() == TokenKind::Semicolon)
        {
            tokens.pop()
        } else {
            None
        };
        Collected { tokens, terminator }
    }

    /// Discards any error and consumes tokens up to the `)` that closes the
    /// parenthesis opened just before this collector started. Returns the
    /// tokens in between and the closing parenthesis.
    pub fn read_to_close_paren(mut self) -> Result<(Vec<Token>, Token)> {
        self.parser.cursor.clear_error();
        let mut depth = self
            .parser
            .cursor
            .collected()
            .iter()
            .fold(0usize, |depth, token| match token.kind() {
                TokenKind::LeftParen => depth + 1,
                TokenKind::RightParen => depth.saturating_sub(1),
                _ => depth,
            });
        loop {
            match self.parser.cursor.raw_current().kind() {
                TokenKind::Eof => return self.parser.fail("missing ')'"),
                TokenKind::RightParen if depth == 0 => break,
                TokenKind::RightParen => depth -= 1,
                TokenKind::LeftParen => depth += 1,
                _ => {}
            }
            self.parser.cursor.advance();
        }
        let tokens = self.end();
        let rparen = self.parser.cursor.raw_current().clone();
        self.parser.cursor.advance();
        Ok((tokens, rparen))
    }

    fn end(&mut self) -> Vec<Token> {
        self.finished = true;
        self.parser.cursor.end_collect()
    }
}

impl<'a> Deref for Collector<'_, 'a> {
    type Target = Parser<'a>;

    fn deref(&self) -> &Self::Target {
        self.parser
    }
}

impl DerefMut for Collector<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.parser
    }
}

impl Drop for Collector<'_, '_> {
    fn drop(&mut self) {
        if !self.finished {
            self.parser.cursor.end_collect();
        }
    }
}
