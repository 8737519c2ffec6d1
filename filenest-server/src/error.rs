//! Server error types

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::pages;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or malformed registration field
    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    Conflict,

    /// Email domain refused by the allow/deny lists
    #[error("This email service provider is not allowed")]
    Policy,

    /// Account file could not be written, or an insert lost a race
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Unmatched route, missing file, or an unknown confirmation token
    #[error("{0}")]
    NotFound(String),

    #[error("No resource given")]
    NoResource,

    #[error("This resource does not exist")]
    UnknownResource,

    #[error("Email confirmation is disabled")]
    ConfirmationDisabled,
}

impl From<filenest_core::Error> for ServerError {
    fn from(err: filenest_core::Error) -> Self {
        match err {
            filenest_core::Error::InvalidToken(_) => ServerError::NotFound("Invalid link".to_string()),
            other => ServerError::Validation(other.to_string()),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::NOT_ACCEPTABLE,
            ServerError::Conflict => StatusCode::CONFLICT,
            ServerError::Policy => StatusCode::NOT_ACCEPTABLE,
            ServerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::NoResource => StatusCode::BAD_REQUEST,
            ServerError::UnknownResource => StatusCode::NOT_IMPLEMENTED,
            ServerError::ConfirmationDisabled => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::Persistence(msg) => {
                tracing::error!("Persistence error: {}", msg);
                "Could not insert user".to_string()
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => {
                tracing::debug!(status = status.as_u16(), "Rejected: {}", other);
                other.to_string()
            }
        };

        (status, Html(pages::error_page(status, &message))).into_response()
    }
}
