mod common;

use common::{event, schema};
use cutexpr::{parse, tokenize};
use proptest::prelude::*;

/// A fully parenthesized expression together with the value it must evaluate to
#[derive(Debug, Clone)]
struct Case {
    source: String,
    value: f64,
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn leaf() -> impl Strategy<Value = Case> {
    let e = event();
    prop_oneof![
        Just(Case { source: "met".into(), value: e.met }),
        Just(Case { source: "njets".into(), value: e.njets }),
        Just(Case { source: "s".into(), value: e.s }),
        Just(Case { source: "v[0]".into(), value: e.v[0] }),
        (0u32..100).prop_map(|n| Case {
            source: n.to_string(),
            value: n as f64
        }),
    ]
}

fn binary(lhs: Case, op: &str, rhs: Case) -> Case {
    let (a, b) = (lhs.value, rhs.value);
    let value = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => a / b,
        "%" => a % b,
        "<" => flag(a < b),
        ">" => flag(a > b),
        "<=" => flag(a <= b),
        ">=" => flag(a >= b),
        "==" => flag(a == b),
        "!=" => flag(a != b),
        "&&" => flag(a != 0.0 && b != 0.0),
        "||" => flag(a != 0.0 || b != 0.0),
        _ => unreachable!(),
    };
    Case {
        source: format!("({}){}({})", lhs.source, op, rhs.source),
        value,
    }
}

fn unary(op: &str, operand: Case) -> Case {
    let value = match op {
        "-" => -operand.value,
        "+" => operand.value,
        _ => flag(operand.value == 0.0),
    };
    Case {
        source: format!("{}({})", op, operand.source),
        value,
    }
}

fn case() -> impl Strategy<Value = Case> {
    leaf().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec![
                    "+", "-", "*", "/", "%", "<", ">", "<=", ">=", "==", "!=", "&&", "||"
                ]),
                inner.clone()
            )
                .prop_map(|(lhs, op, rhs)| binary(lhs, op, rhs)),
            (prop::sample::select(vec!["-", "+", "!"]), inner)
                .prop_map(|(op, operand)| unary(op, operand)),
        ]
    })
}

fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

proptest! {
    #[test]
    fn parsed_expression_matches_reference(case in case()) {
        let expr = parse(&case.source, &schema()).unwrap();
        let value = expr.eval_scalar(&event()).unwrap();
        prop_assert!(same(value, case.value), "{} gave {} not {}", case.source, value, case.value);
    }

    #[test]
    fn reparsing_the_name_is_stable(case in case()) {
        let expr = parse(&case.source, &schema()).unwrap();
        prop_assert_eq!(expr.name(), case.source.as_str());
        let again = parse(expr.name(), &schema()).unwrap();
        prop_assert_eq!(again.name(), expr.name());
        let (a, b) = (expr.eval_scalar(&event()).unwrap(), again.eval_scalar(&event()).unwrap());
        prop_assert!(same(a, b));
    }

    #[test]
    fn whitespace_does_not_matter(case in case(), gaps in prop::collection::vec(0usize..3, 0..64)) {
        let spaced: String = case
            .source
            .chars()
            .zip(gaps.iter().chain(std::iter::repeat(&0)))
            .flat_map(|(c, n)| std::iter::once(c).chain(std::iter::repeat(' ').take(*n)))
            .collect();
        let expr = parse(&spaced, &schema()).unwrap();
        prop_assert_eq!(expr.name(), case.source.as_str());
    }

    #[test]
    fn tokens_partition_the_input(source in "[a-z0-9_.+\\-*/%<>=!&|()\\[\\] #@]{0,40}") {
        let stripped: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        let joined: String = tokenize::<()>(&source).iter().map(|t| t.text()).collect();
        prop_assert_eq!(joined, stripped);
    }

    #[test]
    fn arbitrary_input_never_panics(source in "[a-z0-9.+\\-*/%<>=!&|()\\[\\]]{0,24}") {
        let _ = parse(&source, &schema()).map(|expr| expr.eval(&event()));
    }
}
