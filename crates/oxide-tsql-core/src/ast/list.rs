//! List nodes.

use super::error::{check_kind, ShapeError};
use super::{Child, Expr, ListItem, Stmt, SyntaxNode};
use crate::lexer::{Token, TokenKind};

/// A comma-separated list. Holds at least one item and exactly one
/// separator between consecutive items.
#[derive(Debug, Clone)]
pub struct SeparatedList<T> {
    pub(crate) items: Vec<T>,
    pub(crate) separators: Vec<Token>,
}

/// A comma-separated list of expressions.
pub type ExprList = SeparatedList<Expr>;

impl<T: ListItem> SeparatedList<T> {
    pub fn new(items: Vec<T>, separators: Vec<Token>) -> Result<Self, ShapeError> {
        if items.is_empty() {
            return Err(ShapeError::EmptyList {
                node: T::LIST_KIND,
                list: "items",
            });
        }
        if separators.len() + 1 != items.len() {
            return Err(ShapeError::Separators {
                node: T::LIST_KIND,
                items: items.len(),
                expected: items.len() - 1,
                found: separators.len(),
            });
        }
        for separator in &separators {
            check_kind(T::LIST_KIND, "separator", separator, TokenKind::Comma, "','")?;
        }
        Ok(Self { items, separators })
    }

    /// A list of one item.
    #[must_use]
    pub fn single(item: T) -> Self {
        Self {
            items: vec![item],
            separators: Vec::new(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn separators(&self) -> &[Token] {
        &self.separators
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; lists are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The same list with the items replaced, keeping the separators.
    pub(crate) fn with_items(&self, items: Vec<T>) -> Self {
        Self {
            items,
            separators: self.separators.clone(),
        }
    }
}

impl<'a, T: ListItem> IntoIterator for &'a SeparatedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: ListItem> SyntaxNode for SeparatedList<T> {
    fn kind_name(&self) -> &'static str {
        T::LIST_KIND
    }

    fn children(&self) -> Vec<Child<'_>> {
        let mut children = Vec::with_capacity(self.items.len() * 2);
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                children.push(Child::Token(&self.separators[i - 1]));
            }
            children.push(item.as_child());
        }
        children
    }
}

/// A sequence of statements, as found in a block or a routine body.
#[derive(Debug, Clone, Default)]
pub struct StatementList {
    pub(crate) statements: Vec<Stmt>,
}

impl StatementList {
    #[must_use]
    pub const fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    #[must_use]
    pub fn statements(&self) -> &[Stmt] {
        &self.statements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stmt> {
        self.statements.iter()
    }
}

impl SyntaxNode for StatementList {
    fn kind_name(&self) -> &'static str {
        "StatementList"
    }

    fn children(&self) -> Vec<Child<'_>> {
        self.statements
            .iter()
            .map(|stmt| Child::Node(stmt.as_node()))
            .collect()
    }
}

impl std::fmt::Display for StatementList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_source())
    }
}

/// Tokens kept verbatim where the grammar does not model the syntax
/// (query hints, cursor options, window frames, unparsable arguments).
#[derive(Debug, Clone)]
pub struct RawTokens {
    pub(crate) tokens: Vec<Token>,
}

impl RawTokens {
    pub fn new(tokens: Vec<Token>) -> Result<Self, ShapeError> {
        if let Some(bad) = tokens
            .iter()
            .find(|t| t.is_placeholder() || t.is_eof() || t.is_error())
        {
            return Err(ShapeError::UnexpectedToken {
                node: "RawTokens",
                slot: "tokens",
                expected: "source token",
                found: format!("{:?}", bad.kind()),
            });
        }
        Ok(Self { tokens })
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl SyntaxNode for RawTokens {
    fn kind_name(&self) -> &'static str {
        "RawTokens"
    }

    fn children(&self) -> Vec<Child<'_>> {
        self.tokens.iter().map(Child::Token).collect()
    }
}
