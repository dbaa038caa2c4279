#![allow(dead_code)]

use cutexpr::{Expr, VariableTable};

/// Hand-made event used across the integration tests
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub met: f64,
    pub njets: f64,
    pub s: f64,
    pub v: Vec<f64>,
    pub v2: Vec<f64>,
}

pub fn event() -> Event {
    Event {
        met: 250.0,
        njets: 7.0,
        s: 10.0,
        v: vec![1.0, 2.0, 3.0],
        v2: vec![1.0, 2.0],
    }
}

pub fn schema() -> VariableTable<Event> {
    VariableTable::new()
        .with(Expr::scalar("met", |e: &Event| e.met))
        .with(Expr::scalar("njets", |e: &Event| e.njets))
        .with(Expr::scalar("s", |e: &Event| e.s))
        .with(Expr::vector("v", |e: &Event| e.v.clone()))
        .with(Expr::vector("v2", |e: &Event| e.v2.clone()))
}

/// Parse and evaluate a scalar expression against [`event`]
pub fn scalar(source: &str) -> f64 {
    cutexpr::parse(source, &schema())
        .unwrap_or_else(|e| panic!("failed to parse {}: {}", source, e))
        .eval_scalar(&event())
        .unwrap_or_else(|e| panic!("failed to evaluate {}: {}", source, e))
}

/// Parse and evaluate a vector expression against `event`
pub fn vector_on(source: &str, event: &Event) -> Vec<f64> {
    cutexpr::parse(source, &schema())
        .unwrap_or_else(|e| panic!("failed to parse {}: {}", source, e))
        .eval_vector(event)
        .unwrap_or_else(|e| panic!("failed to evaluate {}: {}", source, e))
}
