use std::collections::HashMap;

use crate::expr::Expr;

/// Knows what the identifiers of an expression mean.
///
/// The parser never interprets a variable name itself: it asks the schema for
/// an [`Expr`] and only looks at whether that is scalar or vector shaped.
pub trait Schema<C> {
    fn resolve(&self, name: &str) -> Option<Expr<C>>;
}

impl<C, F> Schema<C> for F
where
    F: Fn(&str) -> Option<Expr<C>>,
{
    fn resolve(&self, name: &str) -> Option<Expr<C>> {
        self(name)
    }
}

/// Schema backed by a fixed set of named expressions
pub struct VariableTable<C> {
    variables: HashMap<String, Expr<C>>,
}

impl<C> Default for VariableTable<C> {
    fn default() -> Self {
        VariableTable {
            variables: HashMap::new(),
        }
    }
}

impl<C> VariableTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `expr` under its name, replacing any previous entry
    pub fn insert(&mut self, expr: Expr<C>) -> Option<Expr<C>> {
        self.variables.insert(expr.name().to_string(), expr)
    }

    pub fn with(mut self, expr: Expr<C>) -> Self {
        self.insert(expr);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Expr<C>> {
        self.variables.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<C> FromIterator<Expr<C>> for VariableTable<C> {
    fn from_iter<I: IntoIterator<Item = Expr<C>>>(iter: I) -> Self {
        let mut table = Self::new();
        for expr in iter {
            table.insert(expr);
        }
        table
    }
}

impl<C> Schema<C> for VariableTable<C> {
    fn resolve(&self, name: &str) -> Option<Expr<C>> {
        self.get(name).cloned()
    }
}
