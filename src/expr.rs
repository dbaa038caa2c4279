pub mod operator;
pub mod value;

use std::fmt;
use std::sync::Arc;

use crate::error::{EvalError, EvalResult, Shape};
use crate::parser::passes::disambiguate;
use crate::parser::token::TokenKind;
use crate::parser::tokenizer::{strip_whitespace, Tokenizer};

use self::value::Value;

pub type ScalarFn<C> = Arc<dyn Fn(&C) -> EvalResult<f64> + Send + Sync>;
pub type VectorFn<C> = Arc<dyn Fn(&C) -> EvalResult<Vec<f64>> + Send + Sync>;

/// Per-event function backing an [`Expr`], in exactly one of the two shapes.
pub enum Payload<C> {
    Scalar(ScalarFn<C>),
    Vector(VectorFn<C>),
}

impl<C> Clone for Payload<C> {
    fn clone(&self) -> Self {
        match self {
            Payload::Scalar(f) => Payload::Scalar(Arc::clone(f)),
            Payload::Vector(f) => Payload::Vector(Arc::clone(f)),
        }
    }
}

impl<C> Payload<C> {
    pub fn shape(&self) -> Shape {
        match self {
            Payload::Scalar(_) => Shape::Scalar,
            Payload::Vector(_) => Shape::Vector,
        }
    }
}

/// A named, lazily evaluated function over per-event data of type `C`.
///
/// The name is the canonical text of the expression. It is used for display,
/// as a deduplication key, and (through [`Expr::plain_name`]) for building
/// file names. Composing two `Expr`s with an operator produces a new `Expr`
/// whose function calls both operands every time it is evaluated; nothing is
/// cached between events.
pub struct Expr<C> {
    name: String,
    payload: Payload<C>,
}

impl<C> Clone for Expr<C> {
    fn clone(&self) -> Self {
        Expr {
            name: self.name.clone(),
            payload: self.payload.clone(),
        }
    }
}

impl<C> fmt::Debug for Expr<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expr")
            .field("name", &self.name)
            .field("shape", &self.shape())
            .finish()
    }
}

impl<C> fmt::Display for Expr<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl<C: 'static> Expr<C> {
    /// Scalar expression from an infallible per-event function
    pub fn scalar(
        name: impl Into<String>,
        f: impl Fn(&C) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::try_scalar(name, move |c| Ok(f(c)))
    }

    /// Vector expression from an infallible per-event function
    pub fn vector(
        name: impl Into<String>,
        f: impl Fn(&C) -> Vec<f64> + Send + Sync + 'static,
    ) -> Self {
        Self::try_vector(name, move |c| Ok(f(c)))
    }

    pub fn try_scalar(
        name: impl Into<String>,
        f: impl Fn(&C) -> EvalResult<f64> + Send + Sync + 'static,
    ) -> Self {
        Expr {
            name: name.into(),
            payload: Payload::Scalar(Arc::new(f)),
        }
    }

    pub fn try_vector(
        name: impl Into<String>,
        f: impl Fn(&C) -> EvalResult<Vec<f64>> + Send + Sync + 'static,
    ) -> Self {
        Expr {
            name: name.into(),
            payload: Payload::Vector(Arc::new(f)),
        }
    }

    /// Context-independent scalar, named by the shortest text that round-trips `x`
    pub fn constant(x: f64) -> Self {
        Self::scalar(x.to_string(), move |_| x)
    }
}

impl<C: 'static> From<f64> for Expr<C> {
    fn from(x: f64) -> Self {
        Expr::constant(x)
    }
}

impl<C> Expr<C> {
    pub fn from_payload(name: impl Into<String>, payload: Payload<C>) -> Self {
        Expr {
            name: name.into(),
            payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn payload(&self) -> &Payload<C> {
        &self.payload
    }

    pub(crate) fn into_parts(self) -> (String, Payload<C>) {
        (self.name, self.payload)
    }

    pub fn shape(&self) -> Shape {
        self.payload.shape()
    }

    pub fn is_scalar(&self) -> bool {
        self.shape() == Shape::Scalar
    }

    pub fn is_vector(&self) -> bool {
        self.shape() == Shape::Vector
    }

    /// Evaluate against one event, whichever shape this expression has
    pub fn eval(&self, ctx: &C) -> EvalResult<Value> {
        match &self.payload {
            Payload::Scalar(f) => f(ctx).map(Value::Scalar),
            Payload::Vector(f) => f(ctx).map(Value::Vector),
        }
    }

    pub fn eval_scalar(&self, ctx: &C) -> EvalResult<f64> {
        match &self.payload {
            Payload::Scalar(f) => f(ctx),
            Payload::Vector(_) => Err(self.shape_mismatch(Shape::Scalar)),
        }
    }

    pub fn eval_vector(&self, ctx: &C) -> EvalResult<Vec<f64>> {
        match &self.payload {
            Payload::Vector(f) => f(ctx),
            Payload::Scalar(_) => Err(self.shape_mismatch(Shape::Vector)),
        }
    }

    fn shape_mismatch(&self, expected: Shape) -> EvalError {
        EvalError::ShapeMismatch {
            name: self.name.clone(),
            expected,
        }
    }

    /// Name with every operator and bracket spelled out, safe to embed in a file name.
    ///
    /// `met>200&&njets>=6` becomes `metGTR200ANDnjetsGEQ6`.
    pub fn plain_name(&self) -> String {
        let mut plain = strip_whitespace(&self.name);
        for (symbol, word) in PLAIN_NAME_SUBSTITUTIONS {
            plain = plain.replace(symbol, word);
        }
        while plain.contains("__") {
            plain = plain.replace("__", "_");
        }
        plain.retain(|c| c.is_ascii_alphanumeric() || c == '_');
        plain
    }

    /// Name spaced out around binary operators, with `&&`/`||` written as words
    pub fn pretty_name(&self) -> String {
        let stripped = strip_whitespace(&self.name);
        let mut pretty = String::with_capacity(stripped.len() * 2);
        let mut previous = None;
        for (kind, text) in Tokenizer::new(&stripped) {
            let kind = disambiguate(kind, previous);
            match kind {
                TokenKind::LogicalAnd => pretty.push_str(" and "),
                TokenKind::LogicalOr => pretty.push_str(" or "),
                k if k.is_binary_operator() => {
                    pretty.push(' ');
                    pretty.push_str(text);
                    pretty.push(' ');
                }
                _ => pretty.push_str(text),
            }
            previous = Some(kind);
        }
        pretty
    }
}

// digraphs go first so "<=" is not split into "<" and "="
const PLAIN_NAME_SUBSTITUTIONS: [(&str, &str); 19] = [
    ("&&", "AND"),
    ("||", "OR"),
    ("==", "EQL"),
    ("!=", "NEQ"),
    ("<=", "LEQ"),
    (">=", "GEQ"),
    ("(", "OP"),
    (")", "CP"),
    ("[", "OB"),
    ("]", "CB"),
    ("+", "PLS"),
    ("-", "MNS"),
    ("*", "TMS"),
    ("/", "DIV"),
    ("%", "MOD"),
    ("!", "NOT"),
    ("<", "LES"),
    (">", "GTR"),
    (".", "p"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_ignores_context() {
        let c: Expr<()> = Expr::constant(2.5);
        assert_eq!(c.name(), "2.5");
        assert_eq!(c.eval_scalar(&()), Ok(2.5));
    }

    #[test]
    fn test_shape_mismatch_on_wrong_accessor() {
        let v: Expr<()> = Expr::vector("jets_pt", |_| vec![1.0]);
        assert!(matches!(
            v.eval_scalar(&()),
            Err(EvalError::ShapeMismatch { expected: Shape::Scalar, .. })
        ));
        assert_eq!(v.eval_vector(&()), Ok(vec![1.0]));
    }

    #[test]
    fn test_plain_name_spells_out_operators() {
        let e: Expr<()> = Expr::constant(0.0).with_name("met>200&&njets>=6");
        assert_eq!(e.plain_name(), "metGTR200ANDnjetsGEQ6");

        let e: Expr<()> = Expr::constant(0.0).with_name("(ht - 1.5)/2 != x_y[0]");
        assert_eq!(e.plain_name(), "OPhtMNS1p5CPDIV2NEQx_yOB0CB");

        let e: Expr<()> = Expr::constant(0.0).with_name("a__b$");
        assert_eq!(e.plain_name(), "a_b");
    }

    #[test]
    fn test_pretty_name_spaces_binary_operators_only() {
        let e: Expr<()> = Expr::constant(0.0).with_name("-met>200&&njets>=6||!x");
        assert_eq!(e.pretty_name(), "-met > 200 and njets >= 6 or !x");

        let e: Expr<()> = Expr::constant(0.0).with_name("4--2");
        assert_eq!(e.pretty_name(), "4 - -2");
    }
}
