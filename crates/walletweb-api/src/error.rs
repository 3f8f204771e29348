//! Error types for walletweb-api

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walletweb_core::RequestError;
use walletweb_utils::escape_html;

/// Error codes for API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    NotFound,
    BadRequest,
    Unauthorized,
    UpstreamError,
    BindFailed,
    ServerError,
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ApiErrorCode::BadRequest => write!(f, "BAD_REQUEST"),
            ApiErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ApiErrorCode::UpstreamError => write!(f, "UPSTREAM_ERROR"),
            ApiErrorCode::BindFailed => write!(f, "BIND_FAILED"),
            ApiErrorCode::ServerError => write!(f, "SERVER_ERROR"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Wallet API error: {0}")]
    Upstream(#[from] RequestError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

impl ApiError {
    pub fn code(&self) -> ApiErrorCode {
        match self {
            ApiError::NotFound { .. } => ApiErrorCode::NotFound,
            ApiError::BadRequest { .. } => ApiErrorCode::BadRequest,
            ApiError::Unauthorized => ApiErrorCode::Unauthorized,
            ApiError::Upstream(e) if e.is_unauthorized() => ApiErrorCode::Unauthorized,
            ApiError::Upstream(_) => ApiErrorCode::UpstreamError,
            ApiError::Bind { .. } => ApiErrorCode::BindFailed,
            ApiError::Server(_) => ApiErrorCode::ServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.code() {
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ApiErrorCode::BindFailed | ApiErrorCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { .. } => "No encontramos lo que buscabas".to_string(),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Unauthorized => "Tu sesión expiró".to_string(),
            ApiError::Upstream(e) => e.message.clone(),
            ApiError::Bind { .. } | ApiError::Server(_) => "Error interno".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!(target: "walletweb::api", "[{}] {}", self.code(), self);
        } else {
            log::debug!(target: "walletweb::api", "[{}] {}", self.code(), self);
        }
        let content = format!(
            r#"<div class='max-w-md mx-auto mt-16 bg-white rounded-xl shadow-sm p-6 text-center'>
    <p class='text-4xl mb-4'>⚠️</p>
    <h2 class='text-xl font-semibold mb-2'>{}</h2>
    <a href='/send-money' class='text-indigo-600 hover:underline'>Volver</a>
</div>"#,
            escape_html(&self.user_message())
        );
        (status, Html(crate::base_html("Error", &content))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound { resource: "x".to_string() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::from(RequestError::new(401, "x")).code(), ApiErrorCode::Unauthorized);
        assert_eq!(ApiError::from(RequestError::new(500, "x")).status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_upstream_message_is_shown() {
        let error = ApiError::from(RequestError::new(400, "Saldo insuficiente"));
        assert_eq!(error.user_message(), "Saldo insuficiente");
        assert_eq!(error.code().to_string(), "UPSTREAM_ERROR");
    }
}
