//! Response envelope shared by every endpoint: `{success, output, error}`.

use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize = Value> {
    pub success: bool,
    pub output: T,
    pub error: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(output: T) -> Self {
        Self {
            success: true,
            output,
            error: String::new(),
        }
    }
}

impl Envelope<Value> {
    /// Failed call; `output` is an empty string.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: Value::String(String::new()),
            error: error.into(),
        }
    }
}

/// Wrap a handler output in a successful envelope.
pub fn ok<T: Serialize>(output: T) -> Json<Envelope<T>> {
    Json(Envelope::success(output))
}
