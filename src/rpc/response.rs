use serde_json::Value;

/// Providers answer either with the bare value or with an object carrying it
/// in a `result` field. Returns the value in both cases.
pub fn unwrap_result(response: Value) -> Value {
    match response {
        Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// First element of an account list response, after unwrapping.
pub fn first_entry(response: Value) -> Option<Value> {
    match unwrap_result(response) {
        Value::Array(items) => items.into_iter().next().filter(is_present),
        _ => None,
    }
}

/// Whether a provider value counts as set. `null`, `false`, `0` and empty
/// strings are all treated as "nothing came back".
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
