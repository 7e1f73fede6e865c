use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

/// Failure reported by the model client. Only the message reaches the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Authentication error: {0}")] Auth(String),
    #[error("Network error: {0}")] Transport(String),
    #[error("Service error: {0}")] Remote(String),
}

/// The normalized model output was not syntactically valid JSON.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Parsing error: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        Self { message: e.to_string(), line: e.line(), column: e.column() }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Please upload a photo first.")]
    InputMissing,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InputMissing => "input_missing",
            GenerationError::Service(_) => "service_error",
            GenerationError::Parse(_) => "parse_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GenerationError::InputMissing => StatusCode::BAD_REQUEST,
            GenerationError::Service(ServiceError::Auth(_)) => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::Service(_) | GenerationError::Parse(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Errors surfaced by the JSON API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("photo too large, upload a smaller image")]
    PayloadTooLarge,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<UnknownOption> for ApiError {
    fn from(e: UnknownOption) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound => "not_found",
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::PayloadTooLarge => "payload_too_large",
            ApiError::Generation(e) => e.kind(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Generation(e) => e.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.kind(), "message": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
