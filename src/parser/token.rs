use std::fmt;

use crate::error::Shape;
use crate::expr::Expr;

/// Lexical class of a [`Token`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    Number,
    Identifier,
    UnaryPlus,
    UnaryMinus,
    BinaryPlus,
    BinaryMinus,
    /// `+` before the previous token has decided whether it is unary or binary
    AmbiguousPlus,
    AmbiguousMinus,
    Multiply,
    Divide,
    Modulus,
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    LogicalAnd,
    LogicalOr,
    LogicalNot,
    ResolvedScalar,
    ResolvedVector,
    Unknown,
}

impl TokenKind {
    /// Operators and brackets spelled with exactly two characters
    pub fn from_digraph(s: &str) -> Option<Self> {
        use TokenKind::*;
        match s {
            "<=" => Some(LessEqual),
            ">=" => Some(GreaterEqual),
            "!=" => Some(NotEqual),
            "==" => Some(Equal),
            "&&" => Some(LogicalAnd),
            "||" => Some(LogicalOr),
            _ => None,
        }
    }

    /// Operators and brackets spelled with a single character
    pub fn from_punctuation(c: char) -> Option<Self> {
        use TokenKind::*;
        match c {
            '(' => Some(OpenParen),
            ')' => Some(CloseParen),
            '[' => Some(OpenSquare),
            ']' => Some(CloseSquare),
            '+' => Some(AmbiguousPlus),
            '-' => Some(AmbiguousMinus),
            '*' => Some(Multiply),
            '/' => Some(Divide),
            '%' => Some(Modulus),
            '<' => Some(Less),
            '>' => Some(Greater),
            '!' => Some(LogicalNot),
            _ => None,
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, TokenKind::ResolvedScalar | TokenKind::ResolvedVector)
    }

    pub fn is_binary_operator(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            BinaryPlus
                | BinaryMinus
                | Multiply
                | Divide
                | Modulus
                | Equal
                | NotEqual
                | Greater
                | Less
                | GreaterEqual
                | LessEqual
                | LogicalAnd
                | LogicalOr
        )
    }

    pub fn is_unary_operator(self) -> bool {
        matches!(
            self,
            TokenKind::UnaryPlus | TokenKind::UnaryMinus | TokenKind::LogicalNot
        )
    }

    /// The closing bracket for an opening one
    pub fn closer(self) -> Option<Self> {
        match self {
            TokenKind::OpenParen => Some(TokenKind::CloseParen),
            TokenKind::OpenSquare => Some(TokenKind::CloseSquare),
            _ => None,
        }
    }

    fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::Scalar => TokenKind::ResolvedScalar,
            Shape::Vector => TokenKind::ResolvedVector,
        }
    }
}

/// A classified piece of source text. Resolved tokens carry the [`Expr`] they stand for.
pub struct Token<C> {
    kind: TokenKind,
    text: String,
    value: Option<Expr<C>>,
}

impl<C> Token<C> {
    /// Unresolved token straight out of the tokenizer
    pub(crate) fn lexeme(kind: TokenKind, text: impl Into<String>) -> Self {
        debug_assert!(!kind.is_resolved(), "resolved tokens need a value");
        Token {
            kind,
            text: text.into(),
            value: None,
        }
    }

    /// Token standing for `expr`, shaped after it and named by its name
    pub fn resolved(expr: Expr<C>) -> Self {
        Token {
            kind: TokenKind::for_shape(expr.shape()),
            text: expr.name().to_string(),
            value: Some(expr),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> Option<&Expr<C>> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Expr<C>> {
        self.value
    }

    pub(crate) fn reclassify(&mut self, kind: TokenKind) {
        debug_assert!(!kind.is_resolved() && self.value.is_none());
        self.kind = kind;
    }

    /// Rename both the token text and the expression it carries
    pub(crate) fn rename(&mut self, name: &str) {
        self.text = name.to_string();
        if let Some(expr) = &mut self.value {
            expr.set_name(name);
        }
    }
}

impl<C> Clone for Token<C> {
    fn clone(&self) -> Self {
        Token {
            kind: self.kind,
            text: self.text.clone(),
            value: self.value.clone(),
        }
    }
}

impl<C> fmt::Debug for Token<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .finish()
    }
}

impl<C> fmt::Display for Token<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.text)
    }
}
