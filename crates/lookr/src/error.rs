//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use lookr_config::ConfigError;
use lookr_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Looker: {reason}")]
    #[diagnostic(
        code(lookr::connection_failed),
        help(
            "Check that the instance URL is correct and reachable.\n\
             Use --insecure (-k) for self-signed certificates, or set ca_cert in the profile."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(lookr::timeout),
        help("Increase the timeout with --timeout or in the profile.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(lookr::auth_failed),
        help(
            "Verify the API3 client id and secret, or the access token.\n\
             Tokens can be passed with --token or LOOKR_ACCESS_TOKEN."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(lookr::no_credentials),
        help(
            "Configure credentials with: lookr config init --url <URL> --client-id <ID>\n\
             Or pass --token / set LOOKR_ACCESS_TOKEN."
        )
    )]
    NoCredentials { profile: String },

    // ── Remote state ─────────────────────────────────────────────────
    #[error("{kind} '{id}' not found")]
    #[diagnostic(
        code(lookr::not_found),
        help("Run: lookr list {kind}")
    )]
    NotFound { kind: String, id: String },

    #[error("Conflict: {message}")]
    #[diagnostic(code(lookr::conflict))]
    Conflict { message: String },

    #[error("{kind} '{id}' still exists after delete")]
    #[diagnostic(
        code(lookr::delete_unconfirmed),
        help("The server accepted the delete but still reports the entity. Retry later.")
    )]
    DeleteUnconfirmed { kind: String, id: String },

    #[error("Rejected by Looker: {message}")]
    #[diagnostic(code(lookr::validation), help("{details}"))]
    Rejected { message: String, details: String },

    #[error("Rate limited by Looker")]
    #[diagnostic(code(lookr::rate_limited), help("{hint}"))]
    RateLimited { hint: String },

    #[error("API error: {message}")]
    #[diagnostic(code(lookr::api_error))]
    Api { message: String },

    // ── Local input ──────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lookr::validation))]
    Validation { field: String, reason: String },

    #[error("Attribute file {path} could not be parsed")]
    #[diagnostic(
        code(lookr::attribute_file),
        help("The file must hold one JSON or YAML map of attributes.")
    )]
    AttributeFile {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid attributes: {message}")]
    #[diagnostic(code(lookr::invalid_attributes))]
    InvalidAttributes { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(lookr::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: lookr config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No Looker instance configured")]
    #[diagnostic(
        code(lookr::no_config),
        help(
            "Create a profile with: lookr config init --url <URL>\n\
             Or pass --base-url. Config is read from: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(lookr::config))]
    Config(ConfigError),

    #[error("Operation cancelled")]
    #[diagnostic(code(lookr::cancelled))]
    Cancelled,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::DeleteUnconfirmed { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::AttributeFile { .. }
            | Self::InvalidAttributes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed { reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            // Callers that know the kind and id report NotFound themselves.
            CoreError::NotFound { message } => Self::Api { message },
            CoreError::Conflict { message } => Self::Conflict { message },
            CoreError::ValidationFailed { message, fields } => Self::Rejected {
                message,
                details: fields
                    .iter()
                    .map(|f| format!("{}: {}", f.field, f.message))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },
            CoreError::RateLimited { retry_after_secs } => Self::RateLimited {
                hint: retry_after_secs.map_or_else(
                    || "Wait a moment and retry.".into(),
                    |secs| format!("Retry after {secs}s."),
                ),
            },
            CoreError::Api { message, status } => Self::Api {
                message: match status {
                    Some(code) => format!("{message} (HTTP {code})"),
                    None => message,
                },
            },
            err @ (CoreError::Decode(_) | CoreError::UnknownResource { .. }) => {
                Self::InvalidAttributes {
                    message: err.to_string(),
                }
            }
            err @ CoreError::MissingId { .. } => Self::Api {
                message: err.to_string(),
            },
            CoreError::Cancelled => Self::Cancelled,
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(run lookr config show)".into(),
            },
            other => Self::Config(other),
        }
    }
}
