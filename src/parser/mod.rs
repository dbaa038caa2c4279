//! Compiles expression strings into [`Expr`]s.
//!
//! The pipeline is: strip whitespace, tokenize, reject unknown tokens, resolve
//! identifiers and numbers, resolve bracketed groups recursively, then run the
//! fixed sequence of reduction passes in [`passes`] until one token is left.

pub mod error;
pub mod passes;
pub mod schema;
pub mod token;
pub mod tokenizer;

use std::fmt;

use itertools::Itertools;
use log::{debug, trace};

use crate::expr::Expr;

pub use error::ParseError;
pub use schema::{Schema, VariableTable};
pub use token::{Token, TokenKind};
pub use tokenizer::{strip_whitespace, tokenize};

use passes::{
    apply_subscripts, apply_unary, disambiguate_plus_minus, find_close, merge_parentheses,
    reduce_binary, resolve_leaves, BINARY_PRECEDENCE,
};

/// Parser for one expression string.
///
/// Parsing is lazy and memoized: the first call to [`Parser::resolve`] runs the
/// whole pipeline, later calls return the cached result. Changing the source
/// with [`Parser::set_source`] throws the cached tokens away.
pub struct Parser<'s, C, S: ?Sized> {
    schema: &'s S,
    source: String,
    tokens: Vec<Token<C>>,
    tokenized: bool,
    solved: bool,
}

impl<'s, C: 'static, S: Schema<C> + ?Sized> Parser<'s, C, S> {
    pub fn new(source: &str, schema: &'s S) -> Self {
        Parser {
            schema,
            source: strip_whitespace(source),
            tokens: Vec::new(),
            tokenized: false,
            solved: false,
        }
    }

    /// Parser over an already tokenized sub-range of a bigger expression
    fn from_tokens(tokens: Vec<Token<C>>, schema: &'s S) -> Self {
        Parser {
            schema,
            source: tokens.iter().map(Token::text).collect(),
            tokens,
            tokenized: true,
            solved: false,
        }
    }

    /// The whitespace-free expression text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: &str) -> &mut Self {
        self.source = strip_whitespace(source);
        self.tokens.clear();
        self.tokenized = false;
        self.solved = false;
        self
    }

    /// Current token list: empty before tokenizing, a single resolved token once solved
    pub fn tokens(&self) -> &[Token<C>] {
        &self.tokens
    }

    pub fn tokenize(&mut self) -> &[Token<C>] {
        if !self.tokenized {
            self.tokens = tokenize(&self.source);
            self.tokenized = true;
        }
        &self.tokens
    }

    /// Reduce the expression to its single resolved token
    pub fn resolve_as_token(&mut self) -> Result<Token<C>, ParseError> {
        self.solve()?;
        self.tokens
            .first()
            .cloned()
            .ok_or_else(|| self.unresolved(&self.tokens))
    }

    /// Compile the expression. The result is named exactly like the
    /// whitespace-free source.
    pub fn resolve(&mut self) -> Result<Expr<C>, ParseError> {
        let token = self.resolve_as_token()?;
        token.into_value().ok_or_else(|| self.unresolved(&self.tokens))
    }

    fn solve(&mut self) -> Result<(), ParseError> {
        if self.solved {
            return Ok(());
        }
        debug!("parsing \"{}\"", self.source);

        self.tokenize();
        self.check_for_unknowns()?;

        let tokens = resolve_leaves(self.tokens.clone(), self.schema, &self.source)?;
        let tokens = self.evaluate_groupings(tokens)?;
        // parentheses collapse first so that `(v*2)[1]` can be subscripted
        let tokens = self.trace_pass("parentheses", merge_parentheses(tokens));
        let tokens = self.trace_pass("subscripts", apply_subscripts(tokens));
        let tokens = self.trace_pass("plus/minus", disambiguate_plus_minus(tokens));
        let mut tokens = self.trace_pass("unary", apply_unary(tokens));
        for operators in BINARY_PRECEDENCE {
            tokens = self.trace_pass("binary", reduce_binary(tokens, operators));
        }

        self.check_solved(&tokens)?;
        self.tokens = tokens;
        self.cleanup_name();
        self.solved = true;

        if let Some(expr) = self.tokens.first().and_then(Token::value) {
            debug!("parsed \"{}\" as {} expression", self.source, expr.shape());
        }
        Ok(())
    }

    fn check_for_unknowns(&self) -> Result<(), ParseError> {
        let mut offset = 0;
        for token in &self.tokens {
            if token.kind() == TokenKind::Unknown {
                return Err(ParseError::UnknownToken {
                    token: token.text().to_string(),
                    span: (offset, token.text().len()).into(),
                    src: self.source.clone(),
                });
            }
            offset += token.text().len();
        }
        Ok(())
    }

    /// Replace the inside of every matched bracket pair by the single token it
    /// parses to. The brackets stay so that the subscript and parenthesis
    /// passes can see them.
    fn evaluate_groupings(&self, tokens: Vec<Token<C>>) -> Result<Vec<Token<C>>, ParseError> {
        let mut grouped = Vec::with_capacity(tokens.len());
        let mut open = 0;
        while open < tokens.len() {
            match find_close(&tokens, open) {
                Some(close) if close > open + 1 => {
                    let inner = tokens[open + 1..close].to_vec();
                    let merged = Parser::from_tokens(inner, self.schema).resolve_as_token()?;
                    grouped.push(tokens[open].clone());
                    grouped.push(merged);
                    grouped.push(tokens[close].clone());
                    open = close + 1;
                }
                // unmatched or empty brackets stay as they are
                _ => {
                    grouped.push(tokens[open].clone());
                    open += 1;
                }
            }
        }
        Ok(self.trace_pass("groupings", grouped))
    }

    fn check_solved(&self, tokens: &[Token<C>]) -> Result<(), ParseError> {
        match tokens {
            [token] if token.kind().is_resolved() => Ok(()),
            _ => Err(self.unresolved(tokens)),
        }
    }

    fn unresolved(&self, tokens: &[Token<C>]) -> ParseError {
        ParseError::UnresolvedExpression {
            remaining: format!("[{}]", tokens.iter().join(", ")),
            span: (0, self.source.len()).into(),
            src: self.source.clone(),
        }
    }

    /// Name the result after the source rather than the composed operator names
    fn cleanup_name(&mut self) {
        if let [token] = self.tokens.as_mut_slice() {
            token.rename(&self.source);
        }
    }

    fn trace_pass(&self, pass: &str, tokens: Vec<Token<C>>) -> Vec<Token<C>> {
        trace!(
            "\"{}\" after {} pass: [{}]",
            self.source,
            pass,
            tokens.iter().join(", ")
        );
        tokens
    }
}

impl<C, S: ?Sized> fmt::Display for Parser<'_, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.source, self.tokens.iter().join(", "))
    }
}
