// ── Core error types ──
//
// User-facing errors from lookr-core. Callers never match on HTTP details;
// the `From<lookr_api::Error>` impl folds transport and API failures into
// these variants.

use thiserror::Error;

use lookr_api::{ApiError, DecodeError, FieldError, TransportError};

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Looker: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Remote errors ────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Rate limited{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    /// An attribute or response body did not fit the declared schema.
    #[error("Invalid data: {0}")]
    Decode(#[from] DecodeError),

    #[error("{resource} response carries no id")]
    MissingId { resource: &'static str },

    #[error("Unknown resource type: {name}")]
    UnknownResource { name: String },

    // ── Control ──────────────────────────────────────────────────────
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(" -- retry after {secs}s"))
        .unwrap_or_default()
}

// ── Conversion from API errors ───────────────────────────────────────

impl From<lookr_api::Error> for CoreError {
    fn from(err: lookr_api::Error) -> Self {
        match err {
            lookr_api::Error::Transport(e) => match e {
                TransportError::Network { message } => Self::ConnectionFailed { reason: message },
                TransportError::Unauthorized { message, .. } => {
                    Self::AuthenticationFailed { message }
                }
                TransportError::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
                TransportError::Tls(msg) => Self::ConnectionFailed {
                    reason: format!("TLS error: {msg}"),
                },
            },
            lookr_api::Error::Api(e) => match e {
                ApiError::NotFound { message } => Self::NotFound { message },
                ApiError::Conflict { message } => Self::Conflict { message },
                ApiError::Validation {
                    message, errors, ..
                } => Self::ValidationFailed {
                    message,
                    fields: errors,
                },
                ApiError::RateLimited { retry_after_secs } => {
                    Self::RateLimited { retry_after_secs }
                }
                ApiError::ServerError { status, message } | ApiError::Status { status, message } => {
                    Self::Api {
                        message,
                        status: Some(status),
                    }
                }
                ApiError::Opaque { status, body } => Self::Api {
                    message: if body.is_empty() {
                        format!("HTTP {status}")
                    } else {
                        body
                    },
                    status: Some(status),
                },
            },
            lookr_api::Error::Decode(e) => Self::Decode(e),
            lookr_api::Error::Cancelled => Self::Cancelled,
            lookr_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
        }
    }
}
