use thiserror::Error;

/// Errors raised while evaluating an [`Expr`](crate::Expr) against one event.
///
/// These only exist at evaluation time: vector lengths depend on the event, so
/// nothing here can be detected while parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("index {index} out of range for '{name}' with {len} entries")]
    IndexOutOfRange { name: String, index: f64, len: usize },

    #[error("cannot broadcast a scalar against empty vector '{name}'")]
    EmptyVectorBroadcast { name: String },

    #[error("'{name}' is not a {expected}")]
    ShapeMismatch { name: String, expected: Shape },

    #[error("event has no column named '{name}'")]
    MissingColumn { name: String },
}

/// The two shapes an expression can take per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Vector,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::Vector => write!(f, "vector"),
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
