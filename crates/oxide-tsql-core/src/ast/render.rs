//! Text rendering of token sequences.

use crate::lexer::Token;

/// Concatenates tokens with their trivia, reproducing the source text.
pub(crate) fn source(tokens: &[&Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_source(&mut out);
    }
    out
}

/// Joins token texts, replacing any trivia between two tokens by a single
/// space. Trivia before the first and after the last token is dropped, and
/// so are tokens without text such as the end of input.
pub(crate) fn clean(tokens: &[&Token]) -> String {
    let mut out = String::new();
    let mut separated = false;
    for token in tokens.iter().filter(|t| !t.text().is_empty()) {
        if !out.is_empty() && (separated || !token.leading().is_empty()) {
            out.push(' ');
        }
        out.push_str(token.text());
        separated = !token.trailing().is_empty();
    }
    out
}
