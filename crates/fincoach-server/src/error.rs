use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fincoach_core::{AgentError, ErrorKind};
use serde::Serialize;

/// HTTP-facing error. Agent errors map onto stable machine-readable codes
/// so the frontend can branch without parsing messages.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }
}

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        let (status, code) = match err.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "AGENT_NOT_FOUND"),
            ErrorKind::Timeout => (StatusCode::REQUEST_TIMEOUT, "AGENT_TIMEOUT"),
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::DependencyUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "DEPENDENCY_UNAVAILABLE")
            }
            ErrorKind::Execution => (StatusCode::INTERNAL_SERVER_ERROR, "AGENT_EXECUTION_ERROR"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code,
            }),
        )
            .into_response()
    }
}
