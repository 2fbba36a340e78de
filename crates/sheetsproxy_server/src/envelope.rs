use axum::Json;
use serde::Serialize;

/// Uniform response body.
///
/// Serializes as `{"status": "success", "data": ...}` or
/// `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success { data: T },
    Error { message: String },
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Envelope::Success { data })
    }
}

impl Envelope<()> {
    pub fn error(message: impl Into<String>) -> Json<Self> {
        Json(Envelope::Error {
            message: message.into(),
        })
    }
}
