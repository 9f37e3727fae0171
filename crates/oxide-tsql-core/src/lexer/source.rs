//! The token source contract consumed by the parser.

use super::{Span, Token};

/// A producer of tokens.
///
/// Implementations yield every token of the input in order, each carrying its
/// own trivia, and then keep returning an `Eof` token.
pub trait TokenSource {
    /// Returns the next token.
    fn next_token(&mut self) -> Token;
}

/// Replays a pre-built token list, then an empty `Eof`.
impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Token {
        self.next().unwrap_or_else(|| Token::eof(Span::default()))
    }
}
