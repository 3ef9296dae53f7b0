use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures a caller is expected to branch on.
///
/// Data-quality problems inside a well-formed payload (unknown grades,
/// missing scores, unknown courses) are never reported here.
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Malformed results payload: {0}")]
    MalformedPayload(String),

    #[error("Authentication failed. Please login again.")]
    Unauthorized,

    #[error("Authorization header required")]
    MissingAuthorization,

    #[error("Requested resource not found.")]
    NotFound,

    #[error("Upstream API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PortalError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::MissingField(_) | PortalError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PortalError::Unauthorized | PortalError::MissingAuthorization => {
                StatusCode::UNAUTHORIZED
            }
            PortalError::MalformedPayload(_) => StatusCode::BAD_GATEWAY,
            PortalError::NotFound | PortalError::Upstream { .. } | PortalError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            PortalError::MissingField(_)
            | PortalError::InvalidRequest(_)
            | PortalError::Unauthorized
            | PortalError::MissingAuthorization => {
                json!({ "message": self.to_string() })
            }
            _ => json!({
                "message": "Internal server error",
                "error": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
