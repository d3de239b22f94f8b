//! Application-level handler errors.

use axum::http::StatusCode;

use crate::engine::Response;

/// A failure reported by a framework handler.
///
/// Errors are a normal dispatch outcome: they are written to the response if
/// the handler did not commit one itself, and never affect wrapper release.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct HandlerError {
    status: StatusCode,
    message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Write the error unless the response is already committed.
    pub fn write_to(&self, response: &mut Response) {
        if response.committed() {
            return;
        }
        response.write_text(self.status, &self.message);
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::bad_request(e.to_string())
    }
}
