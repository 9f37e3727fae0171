//! Syntax tree types for T-SQL.
//!
//! Nodes are immutable and shared through `Rc`. Every node exposes its
//! children as an ordered, fixed-length list of slots ([`Child`]), each
//! either a token or a nested node. Absent optional punctuation (a missing
//! terminator, omitted parentheses) keeps its slot as a placeholder token;
//! absent optional clauses and negations drop their slots entirely and the
//! node records which shape it has.

use std::fmt;
use std::rc::Rc;

use crate::lexer::{Span, Token};

/// Declares a sum type over concrete node types, with identity comparison,
/// visitor dispatch and conversions.
macro_rules! node_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident($ty:ty) => $visit:ident, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub enum $name {
            $( $(#[$vmeta])* $variant(std::rc::Rc<$ty>), )*
        }

        impl $name {
            /// Returns true if both values hold the same node instance.
            #[must_use]
            pub fn ptr_eq(&self, other: &Self) -> bool {
                match (self, other) {
                    $( (Self::$variant(a), Self::$variant(b)) => std::rc::Rc::ptr_eq(a, b), )*
                    _ => false,
                }
            }

            /// The concrete node as a trait object.
            #[must_use]
            pub fn as_node(&self) -> &dyn $crate::ast::SyntaxNode {
                match self {
                    $( Self::$variant(node) => node.as_ref(), )*
                }
            }

            /// Dispatches to the visitor method of the concrete variant.
            pub fn accept<V: $crate::ast::Visitor + ?Sized>(&self, visitor: &mut V) -> Self {
                match self {
                    $( Self::$variant(node) => visitor.$visit(node), )*
                }
            }

            /// Returns the concrete node if it is a `T`, otherwise gives
            /// `self` back.
            pub fn downcast<T: $crate::ast::Variant<Self>>(self) -> Result<std::rc::Rc<T>, Self> {
                T::extract(self)
            }
        }

        impl $crate::ast::SyntaxNode for $name {
            fn kind_name(&self) -> &'static str {
                self.as_node().kind_name()
            }

            fn children(&self) -> Vec<$crate::ast::Child<'_>> {
                self.as_node().children()
            }
        }

        impl $crate::ast::ListItem for $name {
            const LIST_KIND: &'static str = concat!(stringify!($name), "List");

            fn as_child(&self) -> $crate::ast::Child<'_> {
                $crate::ast::Child::Node(self.as_node())
            }

            fn same(&self, other: &Self) -> bool {
                self.ptr_eq(other)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&$crate::ast::SyntaxNode::to_source(self))
            }
        }

        $(
            impl From<$ty> for $name {
                fn from(node: $ty) -> Self {
                    Self::$variant(std::rc::Rc::new(node))
                }
            }

            impl From<std::rc::Rc<$ty>> for $name {
                fn from(node: std::rc::Rc<$ty>) -> Self {
                    Self::$variant(node)
                }
            }

            impl $crate::ast::Variant<$name> for $ty {
                const KIND: &'static str = stringify!($ty);

                fn extract(node: $name) -> Result<std::rc::Rc<Self>, $name> {
                    match node {
                        $name::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

mod error;
mod expression;
mod list;
mod query;
mod render;
mod routine;
mod statement;
mod types;
pub mod visit;

pub use error::ShapeError;
pub use expression::{
    AliasExpr, AssignmentExpr, BetweenExpr, BinaryExpr, CallExpr, CaseExpr, CastExpr,
    CollateExpr, Expr, InExpr, IsNullExpr, JoinExpr, LikeExpr, LiteralExpr, NameExpr, ParenExpr,
    SortExpr, TableHintExpr, UnaryExpr, WhenClause, WindowExpr,
};
pub use list::{ExprList, RawTokens, SeparatedList, StatementList};
pub use query::{
    Clause, FetchClause, OffsetFetch, OrderByExpr, OverClause, QueryOptionExpr, SelectClauses,
    SelectExpr, SetOperationExpr, TopClause,
};
pub use routine::{
    CreateInlineFunctionStmt, CreateProcedureStmt, CreateScalarFunctionStmt,
    CreateTableFunctionStmt, CreateViewStmt, FunctionSignature, ParamDecl, ParamList,
    ProcedureHeader, RoutineOptions, ViewHeader,
};
pub use statement::{
    BeginTransactionStmt, BlockStmt, CursorOptions, DeclareCursorStmt, DeclareStmt, EmptyStmt,
    ExpressionStmt, GotoStmt, IfStmt, LabelStmt, MonoKeywordStmt, ReturnStmt, SetOptionStmt,
    SetVariableStmt, Stmt, TryCatchStmt, UnmodeledStmt, VarDecl, WhileStmt,
};
pub use types::{DataType, TableType, TypeName};
pub use visit::Visitor;

/// One slot of a node.
#[derive(Debug, Clone, Copy)]
pub enum Child<'a> {
    Token(&'a Token),
    Node(&'a dyn SyntaxNode),
}

/// Behaviour shared by every syntax tree node.
pub trait SyntaxNode: fmt::Debug {
    /// The concrete node type name, used in diagnostics.
    fn kind_name(&self) -> &'static str;

    /// The ordered slots of this node.
    fn children(&self) -> Vec<Child<'_>>;

    /// All real tokens under this node, in source order.
    fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        collect_tokens(self.children(), &mut out);
        out
    }

    /// The first non-placeholder token.
    fn first_token(&self) -> Option<&Token> {
        self.children().into_iter().find_map(|child| match child {
            Child::Token(token) => (!token.is_placeholder()).then_some(token),
            Child::Node(node) => node.first_token(),
        })
    }

    /// The last non-placeholder token.
    fn last_token(&self) -> Option<&Token> {
        self.children().into_iter().rev().find_map(|child| match child {
            Child::Token(token) => (!token.is_placeholder()).then_some(token),
            Child::Node(node) => node.last_token(),
        })
    }

    /// The source range from the first to the last token.
    fn span(&self) -> Span {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => first.span().merge(last.span()),
            _ => Span::default(),
        }
    }

    /// The verbatim source text, trivia included.
    fn to_source(&self) -> String {
        render::source(&self.tokens())
    }

    /// The source text without comments and with whitespace runs collapsed
    /// to one space.
    fn to_clean_string(&self) -> String {
        render::clean(&self.tokens())
    }
}

fn collect_tokens<'a>(children: Vec<Child<'a>>, out: &mut Vec<&'a Token>) {
    for child in children {
        match child {
            Child::Token(token) => {
                if !token.is_placeholder() {
                    out.push(token);
                }
            }
            Child::Node(node) => collect_tokens(node.children(), out),
        }
    }
}

/// An element of a [`SeparatedList`].
pub trait ListItem: Clone + fmt::Debug {
    /// Kind name reported by lists of this item type.
    const LIST_KIND: &'static str = "SeparatedList";

    fn as_child(&self) -> Child<'_>;

    /// Identity comparison used by the rewriter.
    fn same(&self, other: &Self) -> bool;
}

impl ListItem for Token {
    const LIST_KIND: &'static str = "NameList";

    fn as_child(&self) -> Child<'_> {
        Child::Token(self)
    }

    fn same(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: SyntaxNode + 'static> ListItem for Rc<T> {
    fn as_child(&self) -> Child<'_> {
        Child::Node(self.as_ref())
    }

    fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

/// A concrete node type that is one variant of the sum type `E`.
pub trait Variant<E>: SyntaxNode + Sized {
    /// The concrete node type name.
    const KIND: &'static str;

    /// Unwraps `node` if it holds this variant.
    fn extract(node: E) -> Result<Rc<Self>, E>;
}
