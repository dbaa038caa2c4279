pub mod error;
pub mod expr;
pub mod parser;
pub mod record;

pub use error::{EvalError, EvalResult, Shape};
pub use expr::value::{have_pass, Value};
pub use expr::{Expr, Payload};
pub use parser::{
    strip_whitespace, tokenize, ParseError, Parser, Schema, Token, TokenKind, VariableTable,
};
pub use record::{Column, Record, RecordSchema};

/// Compile `source` against `schema` in one go.
///
/// ```
/// use cutexpr::{parse, Expr, VariableTable};
///
/// let schema = VariableTable::new()
///     .with(Expr::scalar("met", |event: &(f64, f64)| event.0))
///     .with(Expr::scalar("njets", |event: &(f64, f64)| event.1));
/// let cut = parse("met>200&&njets>=6", &schema).unwrap();
/// assert_eq!(cut.name(), "met>200&&njets>=6");
/// assert_eq!(cut.eval_scalar(&(250.0, 7.0)), Ok(1.0));
/// assert_eq!(cut.eval_scalar(&(250.0, 5.0)), Ok(0.0));
/// ```
pub fn parse<C: 'static, S: Schema<C> + ?Sized>(
    source: &str,
    schema: &S,
) -> Result<Expr<C>, ParseError> {
    Parser::new(source, schema).resolve()
}
