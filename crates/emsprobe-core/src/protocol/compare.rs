//! Response comparison used by the conformance runner.
//!
//! When both sides parse as JSON they are compared structurally: object key
//! order and whitespace are ignored, arrays are compared element-wise in order,
//! and numbers compare by value (`1` equals `1.0`). Otherwise the raw strings
//! must match exactly.

use serde_json::{Number, Value};

/// Which rule decided the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Structural,
    Literal,
}

/// Outcome of comparing an expected response with an actual one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub pass: bool,
    pub rule: Comparison,
}

pub fn compare_responses(expected: &str, actual: &str) -> Verdict {
    match (
        serde_json::from_str::<Value>(expected),
        serde_json::from_str::<Value>(actual),
    ) {
        (Ok(e), Ok(a)) => Verdict {
            pass: json_eq(&e, &a),
            rule: Comparison::Structural,
        },
        _ => Verdict {
            pass: expected == actual,
            rule: Comparison::Literal,
        },
    }
}

/// Structural JSON equality.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| json_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| json_eq(l, r)))
        }
        _ => false,
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
