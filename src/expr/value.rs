use serde::Serialize;

use crate::error::Shape;

/// Result of evaluating an [`Expr`](super::Expr) against one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Value {
    pub fn shape(&self) -> Shape {
        match self {
            Value::Scalar(_) => Shape::Scalar,
            Value::Vector(_) => Shape::Vector,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(x) => Some(*x),
            Value::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            Value::Scalar(_) => None,
        }
    }

    /// Whether a cut with this value selects anything: a non-zero scalar, or a
    /// vector with at least one non-zero entry.
    pub fn passes(&self) -> bool {
        match self {
            Value::Scalar(x) => *x != 0.0,
            Value::Vector(v) => have_pass(v),
        }
    }
}

/// True if any entry of a per-object cut result is non-zero
pub fn have_pass(v: &[f64]) -> bool {
    v.iter().any(|x| *x != 0.0)
}
