//! Operator composition for [`Expr`].
//!
//! Every operator takes its operands by value and returns a new `Expr` whose
//! function captures the operand functions. Scalars broadcast across vectors;
//! two vectors combine index by index and stop at the shorter one.

use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Sub, SubAssign,
};
use std::sync::Arc;

use super::{Expr, Payload};
use crate::error::{EvalError, EvalResult};

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn truthy(x: f64) -> bool {
    x != 0.0
}

fn require_entries(v: &[f64], name: &str) -> EvalResult<()> {
    if v.is_empty() {
        Err(EvalError::EmptyVectorBroadcast {
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Apply `op` to a single operand, elementwise when it is a vector
fn unary<C: 'static>(symbol: &str, operand: Expr<C>, op: fn(f64) -> f64) -> Expr<C> {
    let (name, payload) = operand.into_parts();
    let payload = match payload {
        Payload::Scalar(f) => Payload::Scalar(Arc::new(move |c: &C| f(c).map(op))),
        Payload::Vector(f) => {
            Payload::Vector(Arc::new(move |c: &C| Ok(f(c)?.into_iter().map(op).collect())))
        }
    };
    Expr::from_payload(format!("{}({})", symbol, name), payload)
}

/// Combine two operands with `op`, broadcasting a scalar over a vector
fn binary<C: 'static>(lhs: Expr<C>, symbol: &str, rhs: Expr<C>, op: fn(f64, f64) -> f64) -> Expr<C> {
    let (lhs_name, lhs) = lhs.into_parts();
    let (rhs_name, rhs) = rhs.into_parts();
    let name = format!("({}){}({})", lhs_name, symbol, rhs_name);
    let payload = match (lhs, rhs) {
        (Payload::Scalar(a), Payload::Scalar(b)) => {
            Payload::Scalar(Arc::new(move |c: &C| Ok(op(a(c)?, b(c)?))))
        }
        (Payload::Vector(a), Payload::Scalar(b)) => Payload::Vector(Arc::new(move |c: &C| {
            let v = a(c)?;
            require_entries(&v, &lhs_name)?;
            let s = b(c)?;
            Ok(v.into_iter().map(|x| op(x, s)).collect())
        })),
        (Payload::Scalar(a), Payload::Vector(b)) => Payload::Vector(Arc::new(move |c: &C| {
            let s = a(c)?;
            let v = b(c)?;
            require_entries(&v, &rhs_name)?;
            Ok(v.into_iter().map(|x| op(s, x)).collect())
        })),
        // zip stops at the shorter operand
        (Payload::Vector(a), Payload::Vector(b)) => Payload::Vector(Arc::new(move |c: &C| {
            let x = a(c)?;
            let y = b(c)?;
            Ok(x.into_iter().zip(y).map(|(x, y)| op(x, y)).collect())
        })),
    };
    Expr::from_payload(name, payload)
}

/// `&&`/`||`. Two scalars short-circuit: the right operand is only evaluated
/// when the left one does not already decide the result.
fn logical<C: 'static>(lhs: Expr<C>, rhs: Expr<C>, is_and: bool) -> Expr<C> {
    let symbol = if is_and { "&&" } else { "||" };
    let (lhs_name, lhs) = lhs.into_parts();
    let (rhs_name, rhs) = rhs.into_parts();
    match (lhs, rhs) {
        (Payload::Scalar(a), Payload::Scalar(b)) => Expr::from_payload(
            format!("({}){}({})", lhs_name, symbol, rhs_name),
            Payload::Scalar(Arc::new(move |c: &C| {
                let left = truthy(a(c)?);
                if left != is_and {
                    return Ok(flag(left));
                }
                Ok(flag(truthy(b(c)?)))
            })),
        ),
        (a, b) => {
            let op: fn(f64, f64) -> f64 = if is_and {
                |a, b| flag(truthy(a) && truthy(b))
            } else {
                |a, b| flag(truthy(a) || truthy(b))
            };
            binary(
                Expr::from_payload(lhs_name, a),
                symbol,
                Expr::from_payload(rhs_name, b),
                op,
            )
        }
    }
}

impl<C: 'static> Expr<C> {
    /// Unary `+`; keeps the value, only the name changes
    pub fn pos(self) -> Self {
        unary("+", self, |x| x)
    }

    pub fn equal(self, rhs: Self) -> Self {
        binary(self, "==", rhs, |a, b| flag(a == b))
    }

    pub fn not_equal(self, rhs: Self) -> Self {
        binary(self, "!=", rhs, |a, b| flag(a != b))
    }

    pub fn greater(self, rhs: Self) -> Self {
        binary(self, ">", rhs, |a, b| flag(a > b))
    }

    pub fn less(self, rhs: Self) -> Self {
        binary(self, "<", rhs, |a, b| flag(a < b))
    }

    pub fn greater_equal(self, rhs: Self) -> Self {
        binary(self, ">=", rhs, |a, b| flag(a >= b))
    }

    pub fn less_equal(self, rhs: Self) -> Self {
        binary(self, "<=", rhs, |a, b| flag(a <= b))
    }

    pub fn and(self, rhs: Self) -> Self {
        logical(self, rhs, true)
    }

    pub fn or(self, rhs: Self) -> Self {
        logical(self, rhs, false)
    }

    /// Pick one entry of a vector expression.
    ///
    /// The index is truncated toward zero. Returns `None` unless `self` is a
    /// vector and `index` a scalar; an index outside the vector is reported
    /// as [`EvalError::IndexOutOfRange`] when the result is evaluated.
    pub fn subscript(self, index: Self) -> Option<Self> {
        let name = format!("{}[{}]", self.name(), index.name());
        let (vector_name, vector) = self.into_parts();
        let (_, index) = index.into_parts();
        let (Payload::Vector(v), Payload::Scalar(i)) = (vector, index) else {
            return None;
        };
        Some(Expr::try_scalar(name, move |c: &C| {
            let values = v(c)?;
            let raw = i(c)?;
            let position = raw.trunc();
            let out_of_range = || EvalError::IndexOutOfRange {
                name: vector_name.clone(),
                index: raw,
                len: values.len(),
            };
            // also rejects NaN
            if !(position >= 0.0) {
                return Err(out_of_range());
            }
            values.get(position as usize).copied().ok_or_else(out_of_range)
        }))
    }
}

macro_rules! arithmetic_operator {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $symbol:literal, $op:expr) => {
        impl<C: 'static> $trait for Expr<C> {
            type Output = Expr<C>;

            fn $method(self, rhs: Self) -> Self::Output {
                binary(self, $symbol, rhs, $op)
            }
        }

        impl<C: 'static> $assign_trait for Expr<C> {
            fn $assign_method(&mut self, rhs: Self) {
                *self = binary(self.clone(), $symbol, rhs, $op);
            }
        }
    };
}

arithmetic_operator!(Add, add, AddAssign, add_assign, "+", |a, b| a + b);
arithmetic_operator!(Sub, sub, SubAssign, sub_assign, "-", |a, b| a - b);
arithmetic_operator!(Mul, mul, MulAssign, mul_assign, "*", |a, b| a * b);
arithmetic_operator!(Div, div, DivAssign, div_assign, "/", |a, b| a / b);
arithmetic_operator!(Rem, rem, RemAssign, rem_assign, "%", |a, b| a % b);

impl<C: 'static> Neg for Expr<C> {
    type Output = Expr<C>;

    fn neg(self) -> Self::Output {
        unary("-", self, |x| -x)
    }
}

impl<C: 'static> Not for Expr<C> {
    type Output = Expr<C>;

    fn not(self) -> Self::Output {
        unary("!", self, |x| flag(!truthy(x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jets() -> Expr<Vec<f64>> {
        Expr::vector("jets", |event: &Vec<f64>| event.clone())
    }

    #[test]
    fn test_names_compose_syntactically() {
        let e: Expr<()> = Expr::constant(2.0) + Expr::constant(3.0) * Expr::constant(4.0);
        assert_eq!(e.name(), "(2)+((3)*(4))");
        assert_eq!(e.eval_scalar(&()), Ok(14.0));

        let e: Expr<()> = -Expr::constant(1.0);
        assert_eq!(e.name(), "-(1)");
    }

    #[test]
    fn test_compound_assignment() {
        let mut e: Expr<()> = Expr::constant(6.0);
        e -= Expr::constant(1.0);
        e *= Expr::constant(2.0);
        e %= Expr::constant(4.0);
        assert_eq!(e.eval_scalar(&()), Ok(2.0));
    }

    #[test]
    fn test_scalar_broadcasts_over_vector() {
        let e = jets() * Expr::constant(2.0);
        assert_eq!(e.eval_vector(&vec![1.0, 2.5]), Ok(vec![2.0, 5.0]));

        let e = Expr::constant(10.0) - jets();
        assert_eq!(e.eval_vector(&vec![1.0, 2.0]), Ok(vec![9.0, 8.0]));
    }

    #[test]
    fn test_broadcast_over_empty_vector_fails() {
        let e = jets().greater(Expr::constant(30.0));
        assert_eq!(
            e.eval_vector(&vec![]),
            Err(EvalError::EmptyVectorBroadcast {
                name: "jets".to_string()
            })
        );
    }

    #[test]
    fn test_logical_scalars_short_circuit() {
        let boom: Expr<()> = Expr::try_scalar("boom", |_| {
            Err(EvalError::MissingColumn {
                name: "boom".to_string(),
            })
        });
        let e = Expr::constant(0.0).and(boom.clone());
        assert_eq!(e.eval_scalar(&()), Ok(0.0));
        let e = Expr::constant(3.0).or(boom.clone());
        assert_eq!(e.eval_scalar(&()), Ok(1.0));
        let e = Expr::constant(1.0).and(boom);
        assert!(e.eval_scalar(&()).is_err());
    }

    #[test]
    fn test_subscript_truncates_and_checks_range() {
        let e = jets().subscript(Expr::constant(1.9)).unwrap();
        assert_eq!(e.name(), "jets[1.9]");
        assert_eq!(e.eval_scalar(&vec![5.0, 6.0, 7.0]), Ok(6.0));

        let e = jets().subscript(Expr::constant(-1.0)).unwrap();
        assert!(matches!(
            e.eval_scalar(&vec![5.0]),
            Err(EvalError::IndexOutOfRange { len: 1, .. })
        ));

        assert!(Expr::<Vec<f64>>::constant(1.0)
            .subscript(Expr::constant(0.0))
            .is_none());
    }
}
