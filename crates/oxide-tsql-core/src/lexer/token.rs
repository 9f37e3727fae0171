//! Token types for the T-SQL lexer.
//!
//! A [`Token`] is an immutable, reference-counted value. Cloning a token is
//! cheap and keeps its identity, which the syntax tree relies on when a
//! rewrite reuses unchanged parts of a tree.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use super::Span;

macro_rules! keywords {
    (
        reserved { $($reserved:ident => $rtext:literal,)* }
        contextual { $($contextual:ident => $ctext:literal,)* }
    ) => {
        /// Keywords the grammar recognizes.
        ///
        /// Reserved keywords cannot be used as bare identifiers. Contextual
        /// keywords only act as keywords in specific grammar positions and are
        /// otherwise plain identifiers.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($reserved,)*
            $($contextual,)*
        }

        impl Keyword {
            /// Looks up a keyword case-insensitively.
            #[must_use]
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                let upper = s.to_ascii_uppercase();
                match upper.as_str() {
                    $($rtext => Some(Self::$reserved),)*
                    $($ctext => Some(Self::$contextual),)*
                    _ => None,
                }
            }

            /// Returns the canonical upper-case spelling.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$reserved => $rtext,)*
                    $(Self::$contextual => $ctext,)*
                }
            }

            /// Returns true for reserved keywords.
            #[must_use]
            pub const fn is_reserved(self) -> bool {
                matches!(self, $(Self::$reserved)|*)
            }
        }
    };
}

keywords! {
    reserved {
        Add => "ADD",
        All => "ALL",
        Alter => "ALTER",
        And => "AND",
        Any => "ANY",
        As => "AS",
        Asc => "ASC",
        Authorization => "AUTHORIZATION",
        Backup => "BACKUP",
        Begin => "BEGIN",
        Between => "BETWEEN",
        Break => "BREAK",
        Browse => "BROWSE",
        Bulk => "BULK",
        By => "BY",
        Cascade => "CASCADE",
        Case => "CASE",
        Check => "CHECK",
        Checkpoint => "CHECKPOINT",
        Close => "CLOSE",
        Clustered => "CLUSTERED",
        Coalesce => "COALESCE",
        Collate => "COLLATE",
        Column => "COLUMN",
        Commit => "COMMIT",
        Compute => "COMPUTE",
        Constraint => "CONSTRAINT",
        Contains => "CONTAINS",
        Continue => "CONTINUE",
        Convert => "CONVERT",
        Create => "CREATE",
        Cross => "CROSS",
        Current => "CURRENT",
        CurrentDate => "CURRENT_DATE",
        CurrentTime => "CURRENT_TIME",
        CurrentTimestamp => "CURRENT_TIMESTAMP",
        CurrentUser => "CURRENT_USER",
        Cursor => "CURSOR",
        Database => "DATABASE",
        Dbcc => "DBCC",
        Deallocate => "DEALLOCATE",
        Declare => "DECLARE",
        Default => "DEFAULT",
        Delete => "DELETE",
        Deny => "DENY",
        Desc => "DESC",
        Distinct => "DISTINCT",
        Distributed => "DISTRIBUTED",
        Drop => "DROP",
        Else => "ELSE",
        End => "END",
        Escape => "ESCAPE",
        Except => "EXCEPT",
        Exec => "EXEC",
        Execute => "EXECUTE",
        Exists => "EXISTS",
        External => "EXTERNAL",
        Fetch => "FETCH",
        File => "FILE",
        For => "FOR",
        Foreign => "FOREIGN",
        From => "FROM",
        Full => "FULL",
        Function => "FUNCTION",
        Goto => "GOTO",
        Grant => "GRANT",
        Group => "GROUP",
        Having => "HAVING",
        Identity => "IDENTITY",
        If => "IF",
        In => "IN",
        Index => "INDEX",
        Inner => "INNER",
        Insert => "INSERT",
        Intersect => "INTERSECT",
        Into => "INTO",
        Is => "IS",
        Join => "JOIN",
        Key => "KEY",
        Kill => "KILL",
        Left => "LEFT",
        Like => "LIKE",
        Merge => "MERGE",
        Nocheck => "NOCHECK",
        Nonclustered => "NONCLUSTERED",
        Not => "NOT",
        Null => "NULL",
        Nullif => "NULLIF",
        Of => "OF",
        Off => "OFF",
        On => "ON",
        Open => "OPEN",
        Option => "OPTION",
        Or => "OR",
        Order => "ORDER",
        Outer => "OUTER",
        Over => "OVER",
        Percent => "PERCENT",
        Pivot => "PIVOT",
        Primary => "PRIMARY",
        Print => "PRINT",
        Proc => "PROC",
        Procedure => "PROCEDURE",
        Raiserror => "RAISERROR",
        Reconfigure => "RECONFIGURE",
        References => "REFERENCES",
        Restore => "RESTORE",
        Return => "RETURN",
        Revert => "REVERT",
        Revoke => "REVOKE",
        Right => "RIGHT",
        Rollback => "ROLLBACK",
        Rowcount => "ROWCOUNT",
        Save => "SAVE",
        Schema => "SCHEMA",
        Select => "SELECT",
        SessionUser => "SESSION_USER",
        Set => "SET",
        Shutdown => "SHUTDOWN",
        Some => "SOME",
        SystemUser => "SYSTEM_USER",
        Table => "TABLE",
        Then => "THEN",
        To => "TO",
        Top => "TOP",
        Tran => "TRAN",
        Transaction => "TRANSACTION",
        Truncate => "TRUNCATE",
        TryConvert => "TRY_CONVERT",
        Union => "UNION",
        Unique => "UNIQUE",
        Unpivot => "UNPIVOT",
        Update => "UPDATE",
        Use => "USE",
        User => "USER",
        Values => "VALUES",
        Varying => "VARYING",
        View => "VIEW",
        Waitfor => "WAITFOR",
        When => "WHEN",
        Where => "WHERE",
        While => "WHILE",
        With => "WITH",
    }
    contextual {
        Apply => "APPLY",
        Cast => "CAST",
        Catch => "CATCH",
        Conversation => "CONVERSATION",
        Dialog => "DIALOG",
        Disable => "DISABLE",
        Enable => "ENABLE",
        First => "FIRST",
        Get => "GET",
        Json => "JSON",
        Move => "MOVE",
        Name => "NAME",
        Next => "NEXT",
        Offset => "OFFSET",
        Only => "ONLY",
        Out => "OUT",
        Output => "OUTPUT",
        Partition => "PARTITION",
        Readonly => "READONLY",
        Receive => "RECEIVE",
        Replication => "REPLICATION",
        Returns => "RETURNS",
        Row => "ROW",
        Rows => "ROWS",
        Send => "SEND",
        Throw => "THROW",
        Ties => "TIES",
        Try => "TRY",
        TryCast => "TRY_CAST",
        Xml => "XML",
    }
}

impl Keyword {
    /// Returns true if a reserved keyword may still begin an expression
    /// (`NULL`, `CASE`, `EXISTS`, built-in functions such as `LEFT(...)`).
    #[must_use]
    pub const fn starts_expression(self) -> bool {
        !self.is_reserved()
            || matches!(
                self,
                Self::Null
                    | Self::Case
                    | Self::Select
                    | Self::Not
                    | Self::Exists
                    | Self::All
                    | Self::Any
                    | Self::Some
                    | Self::Convert
                    | Self::TryConvert
                    | Self::Coalesce
                    | Self::Nullif
                    | Self::Left
                    | Self::Right
                    | Self::CurrentDate
                    | Self::CurrentTime
                    | Self::CurrentTimestamp
                    | Self::CurrentUser
                    | Self::SessionUser
                    | Self::SystemUser
                    | Self::User
            )
    }
}

/// Token kinds.
///
/// Keywords, quoted identifiers, variables and temporary object names are all
/// [`TokenKind::Identifier`]; they are told apart through [`TokenFlags`] and
/// [`Token::keyword`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Integer,
    Decimal,
    Float,
    String,
    NationalString,
    Binary,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,

    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    NotLt,
    NotGt,

    /// `=` seen in assignment context.
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,

    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Dot,
    Colon,
    DoubleColon,

    /// Stand-in for absent optional syntax in a node slot.
    Placeholder,
    /// Lexical or grammar error.
    Error,
    Eof,
}

impl TokenKind {
    /// Returns true for literal kinds.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::Decimal
                | Self::Float
                | Self::String
                | Self::NationalString
                | Self::Binary
        )
    }

    /// Returns true for comparison operators.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq | Self::NotLt | Self::NotGt
        )
    }

    /// Returns true for `=` in assignment context and the compound assignments.
    #[must_use]
    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::PlusAssign
                | Self::MinusAssign
                | Self::StarAssign
                | Self::SlashAssign
                | Self::PercentAssign
                | Self::AmpAssign
                | Self::PipeAssign
                | Self::CaretAssign
        )
    }

    /// Returns true for arithmetic, bitwise and string operators.
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Star
                | Self::Slash
                | Self::Percent
                | Self::Amp
                | Self::Pipe
                | Self::Caret
        )
    }
}

bitflags! {
    /// Classification bits computed once when a token is created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        /// Reserved keyword.
        const RESERVED = 1;
        /// `[bracketed]` or `"double-quoted"` identifier.
        const QUOTED = 1 << 1;
        /// `@variable` (also set for system variables).
        const VARIABLE = 1 << 2;
        /// `@@system_variable`.
        const SYSTEM_VARIABLE = 1 << 3;
        /// `#temp` or `##global_temp` name.
        const TEMPORARY = 1 << 4;
        const COMPARISON = 1 << 5;
        const ASSIGNMENT = 1 << 6;
    }
}

/// Kinds of trivia attached to tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaKind {
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
}

/// Source text between tokens that the grammar ignores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl Trivia {
    #[must_use]
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Returns true for line and block comments.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self.kind, TriviaKind::LineComment | TriviaKind::BlockComment)
    }
}

#[derive(Debug)]
struct TokenData {
    kind: TokenKind,
    text: Box<str>,
    keyword: Option<Keyword>,
    flags: TokenFlags,
    span: Span,
    leading: Rc<[Trivia]>,
    trailing: Rc<[Trivia]>,
    message: Option<Box<str>>,
}

/// A lexical token with its exact source text and surrounding trivia.
#[derive(Clone)]
pub struct Token(Rc<TokenData>);

impl Token {
    /// Creates a token without trivia. Keyword and flags are derived from
    /// `kind` and `text`.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        let text: String = text.into();
        let (keyword, flags) = classify(kind, &text);
        Self(Rc::new(TokenData {
            kind,
            text: text.into_boxed_str(),
            keyword,
            flags,
            span,
            leading: Rc::from(Vec::new()),
            trailing: Rc::from(Vec::new()),
            message: None,
        }))
    }

    /// An error token carrying `message`.
    #[must_use]
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        let message: String = message.into();
        Self(Rc::new(TokenData {
            kind: TokenKind::Error,
            text: Box::from(""),
            keyword: None,
            flags: TokenFlags::empty(),
            span,
            leading: Rc::from(Vec::new()),
            trailing: Rc::from(Vec::new()),
            message: Some(message.into_boxed_str()),
        }))
    }

    /// The end-of-input token.
    #[must_use]
    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    /// A placeholder filling the slot of absent optional syntax.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(TokenKind::Placeholder, "", Span::default())
    }

    /// Returns a copy of this token carrying the given trivia.
    #[must_use]
    pub fn with_trivia(self, leading: Vec<Trivia>, trailing: Vec<Trivia>) -> Self {
        let data = &self.0;
        Self(Rc::new(TokenData {
            kind: data.kind,
            text: data.text.clone(),
            keyword: data.keyword,
            flags: data.flags,
            span: data.span,
            leading: Rc::from(leading),
            trailing: Rc::from(trailing),
            message: data.message.clone(),
        }))
    }

    /// Returns a copy of this token with a different kind, keeping text,
    /// trivia and position.
    #[must_use]
    pub(crate) fn reclassified(&self, kind: TokenKind) -> Self {
        let data = &self.0;
        let (keyword, flags) = classify(kind, &data.text);
        Self(Rc::new(TokenData {
            kind,
            text: data.text.clone(),
            keyword,
            flags,
            span: data.span,
            leading: Rc::clone(&data.leading),
            trailing: Rc::clone(&data.trailing),
            message: data.message.clone(),
        }))
    }

    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.0.kind
    }

    /// The exact source text of the token.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.0.text
    }

    /// The canonical value: quoted identifiers lose their delimiters and
    /// string literals are unescaped.
    #[must_use]
    pub fn value(&self) -> Cow<'_, str> {
        let text = self.text();
        match self.kind() {
            TokenKind::Identifier if text.starts_with('[') => unquote(text, '[', ']'),
            TokenKind::Identifier if text.starts_with('"') => unquote(text, '"', '"'),
            TokenKind::String => unquote(text, '\'', '\''),
            TokenKind::NationalString => unquote(text.get(1..).unwrap_or(text), '\'', '\''),
            _ => Cow::Borrowed(text),
        }
    }

    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        self.0.keyword
    }

    #[must_use]
    pub fn flags(&self) -> TokenFlags {
        self.0.flags
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.0.span
    }

    #[must_use]
    pub fn leading(&self) -> &[Trivia] {
        &self.0.leading
    }

    #[must_use]
    pub fn trailing(&self) -> &[Trivia] {
        &self.0.trailing
    }

    /// The message of an error token.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.0.message.as_deref()
    }

    /// Returns true if this is the unquoted keyword `keyword`.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.0.keyword == Some(keyword)
    }

    /// Returns true if this is one of `keywords`.
    #[must_use]
    pub fn is_any_keyword(&self, keywords: &[Keyword]) -> bool {
        self.0.keyword.is_some_and(|k| keywords.contains(&k))
    }

    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.kind() == TokenKind::Identifier
    }

    /// An identifier usable as a bare name: not a reserved keyword and not a
    /// variable.
    #[must_use]
    pub fn is_plain_identifier(&self) -> bool {
        self.is_identifier()
            && !self
                .flags()
                .intersects(TokenFlags::RESERVED | TokenFlags::VARIABLE)
    }

    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.flags().contains(TokenFlags::RESERVED)
    }

    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.flags().contains(TokenFlags::QUOTED)
    }

    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.flags().contains(TokenFlags::VARIABLE)
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.kind() == TokenKind::Placeholder
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind() == TokenKind::Error
    }

    /// Returns true if an expression may begin with this token.
    #[must_use]
    pub fn starts_expression(&self) -> bool {
        match self.kind() {
            TokenKind::Identifier => self.keyword().is_none_or(Keyword::starts_expression),
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Tilde
            | TokenKind::LeftParen
            | TokenKind::Star => true,
            kind => kind.is_literal(),
        }
    }

    /// Returns true if both values are the same token instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Appends leading trivia, text and trailing trivia to `out`.
    pub fn write_source(&self, out: &mut String) {
        for trivia in self.leading() {
            out.push_str(&trivia.text);
        }
        out.push_str(self.text());
        for trivia in self.trailing() {
            out.push_str(&trivia.text);
        }
    }

    /// Short description used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind() {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Placeholder => "nothing".to_string(),
            TokenKind::Error => self.error_message().unwrap_or("error").to_string(),
            _ => format!("'{}'", self.text()),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}({:?})@{}..{}",
            self.kind(),
            self.text(),
            self.span().start,
            self.span().end
        )?;
        if let Some(message) = self.error_message() {
            write!(f, " {message:?}")?;
        }
        Ok(())
    }
}

fn classify(kind: TokenKind, text: &str) -> (Option<Keyword>, TokenFlags) {
    let mut flags = TokenFlags::empty();
    let mut keyword = None;
    if kind == TokenKind::Identifier {
        if text.starts_with('[') || text.starts_with('"') {
            flags |= TokenFlags::QUOTED;
        } else if text.starts_with("@@") {
            flags |= TokenFlags::VARIABLE | TokenFlags::SYSTEM_VARIABLE;
        } else if text.starts_with('@') {
            flags |= TokenFlags::VARIABLE;
        } else if text.starts_with('#') {
            flags |= TokenFlags::TEMPORARY;
        } else if let Some(kw) = Keyword::from_str(text) {
            keyword = Some(kw);
            if kw.is_reserved() {
                flags |= TokenFlags::RESERVED;
            }
        }
    } else if kind.is_comparison() {
        flags |= TokenFlags::COMPARISON;
    } else if kind.is_assignment() {
        flags |= TokenFlags::ASSIGNMENT;
    }
    (keyword, flags)
}

fn unquote(text: &str, open: char, close: char) -> Cow<'_, str> {
    let inner = text
        .strip_prefix(open)
        .and_then(|t| t.strip_suffix(close))
        .unwrap_or(text);
    let doubled: String = [close, close].iter().collect();
    if inner.contains(&doubled) {
        Cow::Owned(inner.replace(&doubled, &close.to_string()))
    } else {
        Cow::Borrowed(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str) -> Token {
        Token::new(TokenKind::Identifier, text, Span::default())
    }

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("Try_Cast"), Some(Keyword::TryCast));
        assert_eq!(Keyword::from_str("customer"), None);
    }

    #[test]
    fn test_keyword_reserved() {
        assert!(Keyword::Select.is_reserved());
        assert!(!Keyword::Returns.is_reserved());
        assert!(Keyword::Null.starts_expression());
        assert!(!Keyword::From.starts_expression());
        assert!(Keyword::Cast.starts_expression());
    }

    #[test]
    fn test_identifier_flags() {
        assert!(ident("FROM").is_reserved());
        assert!(ident("[from]").is_quoted());
        assert_eq!(ident("[from]").keyword(), None);
        assert!(ident("@x").is_variable());
        assert!(ident("@@rowcount")
            .flags()
            .contains(TokenFlags::SYSTEM_VARIABLE));
        assert!(ident("#tmp").flags().contains(TokenFlags::TEMPORARY));
        assert_eq!(ident("returns").keyword(), Some(Keyword::Returns));
        assert!(!ident("returns").is_reserved());
    }

    #[test]
    fn test_value_unquotes() {
        assert_eq!(ident("[a]]b]").value(), "a]b");
        assert_eq!(ident("\"a\"\"b\"").value(), "a\"b");
        let s = Token::new(TokenKind::String, "'it''s'", Span::default());
        assert_eq!(s.value(), "it's");
        let n = Token::new(TokenKind::NationalString, "N'abc'", Span::default());
        assert_eq!(n.value(), "abc");
    }

    #[test]
    fn test_reclassified_keeps_text() {
        let eq = Token::new(TokenKind::Eq, "=", Span::new(3, 4));
        assert!(eq.flags().contains(TokenFlags::COMPARISON));
        let assign = eq.reclassified(TokenKind::Assign);
        assert_eq!(assign.kind(), TokenKind::Assign);
        assert_eq!(assign.text(), "=");
        assert_eq!(assign.span(), Span::new(3, 4));
        assert!(assign.flags().contains(TokenFlags::ASSIGNMENT));
        assert!(!assign.ptr_eq(&eq));
    }

    #[test]
    fn test_write_source_with_trivia() {
        let token = ident("a").with_trivia(
            vec![Trivia::new(TriviaKind::Whitespace, "  ")],
            vec![Trivia::new(TriviaKind::LineComment, "-- c"), Trivia::new(TriviaKind::Newline, "\n")],
        );
        let mut out = String::new();
        token.write_source(&mut out);
        assert_eq!(out, "  a-- c\n");
    }
}
