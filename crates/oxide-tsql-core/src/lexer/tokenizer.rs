//! T-SQL tokenizer implementation.

use super::{Span, Token, TokenKind, TokenSource, Trivia, TriviaKind};

/// A lexer that tokenizes T-SQL input.
///
/// Whitespace and comments are kept as trivia on the neighbouring tokens so
/// that the token stream reproduces the input exactly.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    /// Scans whitespace and comments. With `same_line` the scan stops after
    /// the first newline.
    fn scan_trivia(&mut self, same_line: bool) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        loop {
            let start = self.pos;
            let kind = match self.peek() {
                Some('\n') => {
                    self.advance();
                    TriviaKind::Newline
                }
                Some('\r') => {
                    self.advance();
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                    TriviaKind::Newline
                }
                Some(c) if c.is_whitespace() => {
                    self.advance_while(|c| c.is_whitespace() && c != '\n' && c != '\r');
                    TriviaKind::Whitespace
                }
                Some('-') if self.peek_next() == Some('-') => {
                    self.advance_while(|c| c != '\n' && c != '\r');
                    TriviaKind::LineComment
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.skip_block_comment();
                    TriviaKind::BlockComment
                }
                _ => break,
            };
            trivia.push(Trivia::new(kind, &self.input[start..self.pos]));
            if same_line && kind == TriviaKind::Newline {
                break;
            }
        }
        trivia
    }

    /// Skips a block comment, honouring nested `/* */` pairs. An unterminated
    /// comment runs to the end of input.
    fn skip_block_comment(&mut self) {
        self.advance(); // /
        self.advance(); // *
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    depth -= 1;
                }
                Some('/') if self.peek() == Some('*') => {
                    self.advance();
                    depth += 1;
                }
                Some(_) => {}
                None => break,
            }
        }
    }

    /// Creates a span from start to current position.
    const fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Creates a token with the current span.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, &self.input[self.start..self.pos], self.make_span())
    }

    fn make_error(&self, message: impl Into<String>) -> Token {
        Token::error(message, self.make_span())
    }

    /// Consumes `next` if present, yielding `long`, otherwise `short`.
    fn either(&mut self, next: char, long: TokenKind, short: TokenKind) -> Token {
        if self.peek() == Some(next) {
            self.advance();
            self.make_token(long)
        } else {
            self.make_token(short)
        }
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '@' | '#' | '$')
    }

    /// Scans an identifier, keyword, `@variable` or `#temp` name.
    fn scan_identifier(&mut self) -> Token {
        self.advance_while(Self::is_identifier_char);
        self.make_token(TokenKind::Identifier)
    }

    /// Scans a delimited identifier (`[name]` or `"name"`). A doubled closing
    /// delimiter is an escaped delimiter.
    fn scan_delimited(&mut self, close: char, kind: TokenKind, what: &str) -> Token {
        loop {
            match self.advance() {
                Some(c) if c == close => {
                    if self.peek() == Some(close) {
                        self.advance();
                    } else {
                        return self.make_token(kind);
                    }
                }
                Some(_) => {}
                None => return self.make_error(format!("Unterminated {what}")),
            }
        }
    }

    /// Scans a number: integer, decimal or float.
    fn scan_number(&mut self) -> Token {
        let mut kind = TokenKind::Integer;

        self.advance_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') {
            kind = TokenKind::Decimal;
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            let exponent_follows = match self.peek_next() {
                Some('+' | '-') => true,
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_follows {
                kind = TokenKind::Float;
                self.advance();
                if self.peek().is_some_and(|c| c == '+' || c == '-') {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit());
            }
        }

        self.make_token(kind)
    }

    /// Scans a `0x...` binary literal.
    fn scan_binary(&mut self) -> Token {
        self.advance(); // 0
        self.advance(); // x
        self.advance_while(|c| c.is_ascii_hexdigit());
        self.make_token(TokenKind::Binary)
    }

    /// Scans the token starting at the current position, without trivia.
    fn scan_token(&mut self) -> Option<Token> {
        self.start = self.pos;
        let c = self.advance()?;

        let token = match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '~' => self.make_token(TokenKind::Tilde),
            '=' => self.make_token(TokenKind::Eq),
            '+' => self.either('=', TokenKind::PlusAssign, TokenKind::Plus),
            '-' => self.either('=', TokenKind::MinusAssign, TokenKind::Minus),
            '*' => self.either('=', TokenKind::StarAssign, TokenKind::Star),
            '/' => self.either('=', TokenKind::SlashAssign, TokenKind::Slash),
            '%' => self.either('=', TokenKind::PercentAssign, TokenKind::Percent),
            '&' => self.either('=', TokenKind::AmpAssign, TokenKind::Amp),
            '|' => self.either('=', TokenKind::PipeAssign, TokenKind::Pipe),
            '^' => self.either('=', TokenKind::CaretAssign, TokenKind::Caret),
            ':' => self.either(':', TokenKind::DoubleColon, TokenKind::Colon),
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '>' => self.either('=', TokenKind::GtEq, TokenKind::Gt),
            '!' => {
                let kind = match self.peek() {
                    Some('=') => Some(TokenKind::NotEq),
                    Some('<') => Some(TokenKind::NotLt),
                    Some('>') => Some(TokenKind::NotGt),
                    _ => None,
                };
                match kind {
                    Some(kind) => {
                        self.advance();
                        self.make_token(kind)
                    }
                    None => self.make_error("Unexpected character: !"),
                }
            }
            '.' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos = self.start;
                    self.scan_number()
                } else {
                    self.make_token(TokenKind::Dot)
                }
            }

            '\'' => self.scan_delimited('\'', TokenKind::String, "string literal"),
            'N' | 'n' if self.peek() == Some('\'') => {
                self.advance();
                self.scan_delimited('\'', TokenKind::NationalString, "string literal")
            }
            '[' => self.scan_delimited(']', TokenKind::Identifier, "bracketed identifier"),
            '"' => self.scan_delimited('"', TokenKind::Identifier, "quoted identifier"),

            '0' if self.peek().is_some_and(|c| c == 'x' || c == 'X') => {
                self.pos = self.start;
                self.scan_binary()
            }
            c if c.is_ascii_digit() => {
                self.pos = self.start;
                self.scan_number()
            }

            '@' if !self.peek().is_some_and(Self::is_identifier_char) => {
                self.make_error("Unexpected character: @")
            }
            c if c.is_alphabetic() || matches!(c, '_' | '@' | '#') => {
                self.pos = self.start;
                self.scan_identifier()
            }

            _ => self.make_error(format!("Unexpected character: {c}")),
        };
        Some(token)
    }

    /// Scans the next token together with its trivia.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        let leading = self.scan_trivia(false);
        let Some(token) = self.scan_token() else {
            return Token::eof(Span::empty(self.pos)).with_trivia(leading, Vec::new());
        };

        let mut trailing = self.scan_trivia(true);
        // Trivia running to the end of input belongs to the last real token.
        let resume = self.pos;
        let rest = self.scan_trivia(false);
        if self.pos == self.input.len() {
            trailing.extend(rest);
        } else {
            self.pos = resume;
        }

        token.with_trivia(leading, trailing)
    }

    /// Tokenizes the entire input and returns all tokens, ending with `Eof`.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Token {
        Lexer::next_token(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize()
    }

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind()).collect()
    }

    fn reassemble(input: &str) -> String {
        let mut out = String::new();
        for token in tokenize(input) {
            token.write_source(&mut out);
        }
        out
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn test_whitespace_only_lands_on_eof() {
        let tokens = tokenize("  \n\t -- note");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].leading().len(), 4);
        assert_eq!(reassemble("  \n\t -- note"), "  \n\t -- note");
    }

    #[test]
    fn test_trailing_trivia_stops_after_newline() {
        let tokens = tokenize("a -- one\n  /* two */ b");
        let a = &tokens[0];
        assert_eq!(a.trailing().len(), 3);
        assert_eq!(a.trailing()[1].kind, TriviaKind::LineComment);
        assert_eq!(a.trailing()[2].kind, TriviaKind::Newline);
        let b = &tokens[1];
        assert_eq!(b.leading().len(), 3);
        assert_eq!(b.leading()[1].kind, TriviaKind::BlockComment);
    }

    #[test]
    fn test_end_trivia_attaches_to_last_token() {
        let tokens = tokenize("select 1\n\n-- done\n");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text(), "1");
        assert_eq!(tokens[1].trailing().len(), 4);
        assert!(tokens[2].leading().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_input() {
        let input = "CREATE PROC p /* x /* nested */ y */ AS\r\n  SET @a += N'it''s' -- c\n;";
        assert_eq!(reassemble(input), input);
    }

    #[test]
    fn test_identifier_forms() {
        let tokens = tokenize("[my col] \"q\" @v @@rowcount #t ##g dbo");
        assert!(tokens[..7].iter().all(Token::is_identifier));
        assert!(tokens[0].is_quoted());
        assert_eq!(tokens[0].value(), "my col");
        assert!(tokens[2].is_variable());
        assert_eq!(tokens[3].text(), "@@rowcount");
        assert_eq!(tokens[5].text(), "##g");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            token_kinds("42 3.14 .5 1. 1e10 2.5E-3 0x1F"),
            vec![
                TokenKind::Integer,
                TokenKind::Decimal,
                TokenKind::Decimal,
                TokenKind::Decimal,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Binary,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize("'it''s' N'x' n'y'");
        assert_eq!(tokens[0].kind(), TokenKind::String);
        assert_eq!(tokens[0].value(), "it's");
        assert_eq!(tokens[1].kind(), TokenKind::NationalString);
        assert_eq!(tokens[2].kind(), TokenKind::NationalString);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("= <> != !< !> <= >= < > += -= *= /= %= &= |= ^= :: :"),
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::NotLt,
                TokenKind::NotGt,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::PlusAssign,
                TokenKind::MinusAssign,
                TokenKind::StarAssign,
                TokenKind::SlashAssign,
                TokenKind::PercentAssign,
                TokenKind::AmpAssign,
                TokenKind::PipeAssign,
                TokenKind::CaretAssign,
                TokenKind::DoubleColon,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexical_errors() {
        let tokens = tokenize("'open");
        assert!(tokens[0].is_error());
        assert_eq!(tokens[0].error_message(), Some("Unterminated string literal"));
        assert!(tokenize("{")[0].is_error());
        assert!(tokenize("[x")[0].is_error());
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("SELECT  a");
        assert_eq!(tokens[0].span(), Span::new(0, 6));
        assert_eq!(tokens[1].span(), Span::new(8, 9));
    }
}
