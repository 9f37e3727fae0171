//! T-SQL lexer.
//!
//! A hand-written lexer producing tokens that carry their exact source text
//! and the surrounding whitespace and comments as trivia.

mod source;
mod span;
mod token;
mod tokenizer;

pub use source::TokenSource;
pub use span::Span;
pub use token::{Keyword, Token, TokenFlags, TokenKind, Trivia, TriviaKind};
pub use tokenizer::Lexer;
