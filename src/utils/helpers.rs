use serde::Serialize;
use serde_json::{Value, json};

/// Wraps a payload in the `{status: "success", data}` envelope.
pub fn success<T: Serialize>(data: T) -> Value {
    json!({
        "status": "success",
        "data": data,
    })
}
