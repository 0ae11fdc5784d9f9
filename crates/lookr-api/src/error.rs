use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the `lookr-api` crate.
///
/// Every engine operation either returns a decoded value or one of these.
/// The three nested families mirror where the failure happened: on the
/// wire, at the remote API, or while decoding a payload.
/// `lookr-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The caller's cancellation token fired before the call completed.
    #[error("Request cancelled")]
    Cancelled,

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if the remote API reported the entity as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(ApiError::NotFound { .. }))
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Nothing in this crate retries; the flag is for callers layering a
    /// backoff policy on top.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => matches!(
                e,
                TransportError::Network { .. } | TransportError::Timeout { .. }
            ),
            Self::Api(e) => matches!(
                e,
                ApiError::RateLimited { .. } | ApiError::ServerError { .. }
            ),
            _ => false,
        }
    }

    /// The HTTP status attached to the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Unauthorized { status, .. }) => *status,
            Self::Api(e) => Some(e.status()),
            _ => None,
        }
    }
}

// ── Transport ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset mid-body, etc.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The server rejected the credential (HTTP 401/403), or the credential
    /// could not be sent at all (`status` is `None`).
    #[error("Unauthorized: {message}")]
    Unauthorized { status: Option<u16>, message: String },

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake, certificate, or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),
}

// ── Remote API ──────────────────────────────────────────────────────

/// One entry of a structured validation error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation failed: {message}{}", format_field_errors(.errors))]
    Validation {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Rate limited{}", format_retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Structured error body on a status with no dedicated variant.
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded as a structured error.
    #[error("Unexpected response (HTTP {status}): {body}")]
    Opaque { status: u16, body: String },
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::RateLimited { .. } => 429,
            Self::Validation { status, .. }
            | Self::ServerError { status, .. }
            | Self::Status { status, .. }
            | Self::Opaque { status, .. } => *status,
        }
    }
}

fn format_retry_hint(retry_after_secs: &Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(" -- retry after {secs}s"))
        .unwrap_or_default()
}

fn format_field_errors(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let joined = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    format!(" ({joined})")
}

// ── Decoding ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DecodeError {
    /// A dynamic value of one kind was supplied where another is declared.
    #[error("{field}: expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The kind matched but the value did not parse (timestamps, enums).
    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Malformed response body: {message}")]
    MalformedBody { message: String, body: String },
}

impl DecodeError {
    /// Build a `MalformedBody` from a serde error and the offending body.
    pub(crate) fn malformed(err: &serde_json::Error, body: &str) -> Self {
        let end = body
            .char_indices()
            .map(|(i, _)| i)
            .nth(200)
            .unwrap_or(body.len());
        let preview = &body[..end];
        Self::MalformedBody {
            message: format!("{err} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_fields() {
        let err = ApiError::Validation {
            status: 422,
            message: "Validation Failed".into(),
            errors: vec![FieldError {
                field: "name".into(),
                code: Some("missing_field".into()),
                message: "This field is required.".into(),
            }],
        };
        assert_eq!(
            err.to_string(),
            "Validation failed: Validation Failed (name: This field is required.)"
        );
    }

    #[test]
    fn transient_classification() {
        assert!(Error::from(ApiError::RateLimited { retry_after_secs: Some(3) }).is_transient());
        assert!(Error::from(TransportError::Timeout { timeout_secs: 30 }).is_transient());
        assert!(!Error::from(ApiError::NotFound { message: String::new() }).is_transient());
        assert!(!Error::Cancelled.is_transient());
    }

    #[test]
    fn malformed_preview_is_char_safe() {
        let body = "é".repeat(300);
        let serde_err = serde_json::from_str::<u8>(&body).unwrap_err();
        let DecodeError::MalformedBody { message, body: raw } =
            DecodeError::malformed(&serde_err, &body)
        else {
            panic!("expected MalformedBody");
        };
        assert_eq!(raw.len(), body.len());
        assert!(message.contains("body preview"));
    }
}
