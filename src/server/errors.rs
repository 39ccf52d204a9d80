use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::proxy::UpstreamError;
use crate::protocol::ErrorResponse;

/// Errors a gateway operation reports to its caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller-side precondition failed, e.g. a missing prompt.
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("{message}")]
    Unauthorized {
        message: String,
        details: Option<String>,
    },

    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: UpstreamError,
    },
}

impl GatewayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        GatewayError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) | GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            GatewayError::BadRequest(message) => ErrorResponse {
                error: message,
                details: None,
            },
            GatewayError::InvalidBody(details) => ErrorResponse {
                error: "Invalid request body".to_string(),
                details: Some(details),
            },
            GatewayError::Unauthorized { message, details } => ErrorResponse {
                error: message,
                details,
            },
            GatewayError::Upstream { context, source } => ErrorResponse {
                error: context.to_string(),
                details: Some(source.to_string()),
            },
        };
        (status, Json(body)).into_response()
    }
}
