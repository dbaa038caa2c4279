use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Errors that stop an expression from compiling, using miette for diagnostics.
///
/// `src` is always the whitespace-free text the parser worked on, so spans are
/// byte offsets into it.
#[allow(dead_code)] // Fields are used by miette's derive macros
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum ParseError {
    #[error("Function string \"{src}\" contains unknown token \"{token}\"")]
    #[diagnostic(
        code(cutexpr::unknown_token),
        help("Valid tokens are numbers, identifiers, ( ) [ ] and the operators + - * / % ! && || == != < > <= >=")
    )]
    UnknownToken {
        token: String,
        #[label("unknown token")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Could not condense \"{src}\" to a single value, left with {remaining}")]
    #[diagnostic(
        code(cutexpr::unresolved),
        help("Check for unbalanced brackets, a missing operand, or two values with no operator between them")
    )]
    UnresolvedExpression {
        remaining: String,
        #[label("does not reduce to one value")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unknown variable: {name}")]
    #[diagnostic(code(cutexpr::unknown_variable))]
    UnknownVariable {
        name: String,
        #[label("not defined for these events")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Invalid numeric literal: {literal}")]
    #[diagnostic(code(cutexpr::invalid_number))]
    InvalidNumber {
        literal: String,
        #[label("not a number")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },
}

impl ParseError {
    /// The (whitespace-free) expression text the error refers to
    pub fn source_text(&self) -> &str {
        match self {
            ParseError::UnknownToken { src, .. }
            | ParseError::UnresolvedExpression { src, .. }
            | ParseError::UnknownVariable { src, .. }
            | ParseError::InvalidNumber { src, .. } => src,
        }
    }
}
