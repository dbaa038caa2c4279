//! A simple map-backed event record and the schema that reads from it.
//!
//! Real analyses plug their own event type in as the context; this one is
//! enough to drive the command line tool and to test expressions against
//! hand-written events.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult, Shape};
use crate::expr::Expr;
use crate::parser::Schema;

/// One named quantity of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Column {
    pub fn shape(&self) -> Shape {
        match self {
            Column::Scalar(_) => Shape::Scalar,
            Column::Vector(_) => Shape::Vector,
        }
    }
}

/// One event: column name to value. Deserializes from a JSON object such as
/// `{"met": 250, "jets_pt": [120.5, 64, 31]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    columns: HashMap<String, Column>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scalar(mut self, name: impl Into<String>, x: f64) -> Self {
        self.columns.insert(name.into(), Column::Scalar(x));
        self
    }

    pub fn with_vector(mut self, name: impl Into<String>, v: Vec<f64>) -> Self {
        self.columns.insert(name.into(), Column::Vector(v));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Option<Column> {
        self.columns.insert(name.into(), column)
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    pub fn scalar(&self, name: &str) -> EvalResult<f64> {
        match self.lookup(name)? {
            Column::Scalar(x) => Ok(*x),
            Column::Vector(_) => Err(EvalError::ShapeMismatch {
                name: name.to_string(),
                expected: Shape::Scalar,
            }),
        }
    }

    pub fn vector(&self, name: &str) -> EvalResult<Vec<f64>> {
        match self.lookup(name)? {
            Column::Vector(v) => Ok(v.clone()),
            Column::Scalar(_) => Err(EvalError::ShapeMismatch {
                name: name.to_string(),
                expected: Shape::Vector,
            }),
        }
    }

    fn lookup(&self, name: &str) -> EvalResult<&Column> {
        self.columns.get(name).ok_or_else(|| EvalError::MissingColumn {
            name: name.to_string(),
        })
    }
}

/// Schema of [`Record`] columns, by name and shape.
///
/// Expressions it resolves read their column from whichever record they are
/// evaluated against; a record lacking the column fails with
/// [`EvalError::MissingColumn`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSchema {
    shapes: HashMap<String, Shape>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of the columns of `records`. When records disagree on the shape
    /// of a column the first one seen wins.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut schema = Self::new();
        for record in records {
            for (name, column) in record.columns() {
                schema
                    .shapes
                    .entry(name.to_string())
                    .or_insert_with(|| column.shape());
            }
        }
        schema
    }

    pub fn with_column(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.shapes.insert(name.into(), shape);
        self
    }

    pub fn shape_of(&self, name: &str) -> Option<Shape> {
        self.shapes.get(name).copied()
    }
}

impl Schema<Record> for RecordSchema {
    fn resolve(&self, name: &str) -> Option<Expr<Record>> {
        let key = name.to_string();
        let expr = match self.shape_of(name)? {
            Shape::Scalar => Expr::try_scalar(name, move |r: &Record| r.scalar(&key)),
            Shape::Vector => Expr::try_vector(name, move |r: &Record| r.vector(&key)),
        };
        Some(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_mixed_columns() {
        let record: Record =
            serde_json::from_str(r#"{"met": 250, "jets_pt": [120.5, 64, 31]}"#).unwrap();
        assert_eq!(record.scalar("met"), Ok(250.0));
        assert_eq!(record.vector("jets_pt"), Ok(vec![120.5, 64.0, 31.0]));
        assert!(matches!(
            record.scalar("jets_pt"),
            Err(EvalError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            record.scalar("ht"),
            Err(EvalError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_schema_keeps_first_shape_seen() {
        let a = Record::new().with_scalar("x", 1.0);
        let b = Record::new().with_vector("x", vec![1.0]).with_scalar("y", 2.0);
        let schema = RecordSchema::from_records([&a, &b]);
        assert_eq!(schema.shape_of("x"), Some(Shape::Scalar));
        assert_eq!(schema.shape_of("y"), Some(Shape::Scalar));
        assert_eq!(schema.shape_of("z"), None);
    }
}
