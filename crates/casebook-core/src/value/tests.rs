use crate::value::{Float64, Value};
use std::collections::BTreeMap;

#[test]
fn rank_orders_null_bool_number_text_list_map() {
    let mut values = vec![
        Value::Map(BTreeMap::new()),
        Value::List(vec![]),
        Value::from("a"),
        Value::Int(3),
        Value::Bool(false),
        Value::Null,
    ];
    values.sort();

    assert_eq!(
        values,
        vec![
            Value::Null,
            Value::Bool(false),
            Value::Int(3),
            Value::from("a"),
            Value::List(vec![]),
            Value::Map(BTreeMap::new()),
        ]
    );
}

#[test]
fn int_and_float_compare_numerically() {
    assert_eq!(Value::Int(7), Value::Float(Float64::new(7.0)));
    assert!(Value::Int(7) < Value::Float(Float64::new(7.5)));
}

#[test]
fn int_and_float_compare_without_precision_loss() {
    let big = Value::Int(9_007_199_254_740_993);
    let nearest = Value::Float(Float64::new(9_007_199_254_740_992.0));

    assert_ne!(big, nearest);
    assert!(big > nearest);
    assert!(Value::Int(i64::MAX) < Value::Float(Float64::new(9.3e18)));
    assert!(Value::Int(i64::MIN) > Value::Float(Float64::new(f64::NEG_INFINITY)));
    assert!(Value::Int(-2) > Value::Float(Float64::new(-2.5)));
    assert_eq!(Value::Int(0), Value::Float(Float64::new(-0.0)));
    assert_eq!(Value::Float(Float64::new(0.0)), Value::Float(Float64::new(-0.0)));
}

#[test]
fn lists_compare_elementwise_then_by_length() {
    let short = Value::from(vec!["a", "b"]);
    let long = Value::from(vec!["a", "b", "c"]);
    let later = Value::from(vec!["b"]);

    assert!(short < long);
    assert!(long < later);
}

#[test]
fn truthiness_accepts_form_encoded_booleans() {
    assert!(Value::Bool(true).is_truthy());
    assert!(Value::from("true").is_truthy());
    assert!(Value::from("TRUE").is_truthy());
    assert!(!Value::from("yes").is_truthy());
    assert!(!Value::Null.is_truthy());
}

#[test]
fn json_shape_is_untagged() {
    let mut map = BTreeMap::new();
    map.insert("age".to_string(), Value::Int(7));
    map.insert("flag".to_string(), Value::Bool(true));
    map.insert("name".to_string(), Value::from("timmy"));
    map.insert("note".to_string(), Value::Null);

    let json = serde_json::to_string(&Value::Map(map.clone())).expect("serialize value");
    assert_eq!(json, r#"{"age":7,"flag":true,"name":"timmy","note":null}"#);

    let back: Value = serde_json::from_str(&json).expect("deserialize value");
    assert_eq!(back, Value::Map(map));
}
