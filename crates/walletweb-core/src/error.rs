//! Error types for walletweb-core
//!
//! `RequestError` is the uniform shape every wallet API failure is normalized
//! into. `CoreError` covers flow-level failures and carries codes, severities
//! and user-facing suggestions.

use thiserror::Error;
use serde::{Deserialize, Serialize};

/// HTTP status that forces the session to end
pub const UNAUTHORIZED: u16 = 401;

/// Message used when an error body carries no `message` field
pub const GENERIC_REQUEST_ERROR: &str = "Error en la petición";

/// Normalized failure of a wallet API call
///
/// `status` is the HTTP status of the response, or `0` when no response was
/// received at all.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("request failed with status {status}: {message}")]
pub struct RequestError {
    pub status: u16,
    pub message: String,
}

impl RequestError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// Build from a non-2xx status and the raw error body
    ///
    /// The message comes from the body's `message` field when the body is a
    /// JSON object carrying a non-empty string there.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string());
        Self { status, message }
    }

    /// A transport-level failure with no HTTP response
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == UNAUTHORIZED
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Destination alias/CVU did not match any account
    DestinationNotFound,
    /// The signed-in user has no account
    AccountNotFound,
    /// Receipt requested for a transaction outside the user's activity
    TransactionNotFound,
    /// The wallet API rejected or failed the request
    RequestFailed,
    /// The wallet API answered 401
    Unauthorized,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DestinationNotFound => "DESTINATION_NOT_FOUND",
            ErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            ErrorCode::RequestFailed => "REQUEST_FAILED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loggable summary of a failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    /// Upstream HTTP status, when the error came from the wallet API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Hints for the operator reading the log
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (status {})", status)?;
        }
        for (i, suggestion) in self.suggestions.iter().enumerate() {
            let lead = if i == 0 { "\nSuggestions:" } else { "" };
            write!(f, "{}\n  - {}", lead, suggestion)?;
        }
        Ok(())
    }
}

/// How loudly an error is logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Expected outcome of user input
    Info,
    /// The page degrades but still renders
    Warning,
    /// The wallet API is failing or unreachable
    Error,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "info",
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the send-money flow
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No account matches '{destination}'")]
    DestinationNotFound { destination: String },

    #[error("No account found for user {user_id}")]
    AccountNotFound { user_id: String },

    #[error("Transaction {id} is not in the account activity")]
    TransactionNotFound { id: String },

    #[error("Wallet API error: {0}")]
    Request(#[from] RequestError),
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::DestinationNotFound { .. } => ErrorCode::DestinationNotFound,
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::Request(e) if e.is_unauthorized() => ErrorCode::Unauthorized,
            CoreError::Request(_) => ErrorCode::RequestFailed,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::DestinationNotFound { .. } | CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::AccountNotFound { .. } => ErrorSeverity::Warning,
            CoreError::Request(e) if e.status >= 500 || e.status == 0 => ErrorSeverity::Error,
            CoreError::Request(_) => ErrorSeverity::Warning,
        }
    }

    /// Whether this error must end the session
    pub fn is_unauthorized(&self) -> bool {
        self.code() == ErrorCode::Unauthorized
    }

    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());
        match self {
            CoreError::DestinationNotFound { .. } => {
                details.with_suggestion("Matching is exact and case-sensitive on CVU or alias.")
            }
            CoreError::AccountNotFound { .. } => {
                details.with_suggestion("The wallet API listed no account owned by the signed-in user.")
            }
            CoreError::TransactionNotFound { .. } => details,
            CoreError::Request(e) if e.status == 0 => details
                .with_status(0)
                .with_suggestion("Check that api.base_url points at a reachable wallet API."),
            CoreError::Request(e) if e.is_unauthorized() => details
                .with_status(e.status)
                .with_suggestion("The session token expired or was revoked; sign in again."),
            CoreError::Request(e) => details.with_status(e.status),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Where an error happened, for the log line
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub operation: String,
    pub user_id: Option<String>,
    pub request_id: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Sink for flow errors
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Writes errors through the `log` facade under the `walletweb::error` target
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let level = match error.severity() {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        };
        log::log!(
            target: "walletweb::error",
            level,
            "{} - Operation: {} - User: {:?}",
            error.to_details(),
            context.operation,
            context.user_id
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "walletweb::error",
            "{} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user_id
        );
    }
}
