mod common;

use common::{event, schema, Event};

#[test]
fn test_one_expression_many_threads() {
    let expr = cutexpr::parse("v[1]*s+met/njets>20&&!(v[0]>5)", &schema()).unwrap();
    let events: Vec<Event> = (0..64)
        .map(|i| Event {
            met: i as f64,
            ..event()
        })
        .collect();

    let results: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = events
            .chunks(16)
            .map(|chunk| {
                let expr = &expr;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|e| expr.eval_scalar(e).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let expected: Vec<f64> = events
        .iter()
        .map(|e| expr.eval_scalar(e).unwrap())
        .collect();
    assert_eq!(results, expected);
}

#[test]
fn test_clones_share_across_threads() {
    let expr = cutexpr::parse("v+s", &schema()).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let expr = expr.clone();
            std::thread::spawn(move || {
                let e = Event {
                    s: i as f64,
                    ..event()
                };
                expr.eval_vector(&e).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let i = i as f64;
        assert_eq!(handle.join().unwrap(), vec![1.0 + i, 2.0 + i, 3.0 + i]);
    }
}
