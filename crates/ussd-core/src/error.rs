//! Error types for the USSD simulator core

use std::time::Duration;
use thiserror::Error;

/// Result type for USSD core operations
pub type UssdResult<T> = Result<T, UssdError>;

/// Errors that can occur in the USSD core
#[derive(Debug, Clone, Error)]
pub enum UssdError {
    /// A configuration value failed validation
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// A configuration file could not be read or parsed
    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigFile { path: String, reason: String },

    /// A second session was requested while one is still active
    #[error("A USSD session is already active: {session_id}")]
    SessionAlreadyActive { session_id: String },

    /// A turn failed to reach the backend or produced an unusable reply
    #[error("USSD turn failed: {0}")]
    Transport(#[from] TransportFailure),

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Why a single turn failed
///
/// Every variant is recovered locally by rendering the fallback message;
/// the categories exist for diagnostics and event consumers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// The backend answered with a 4xx status
    #[error("backend rejected the request with HTTP {status}")]
    ClientError { status: u16, body: String },

    /// The backend answered with a 5xx status
    #[error("backend failed with HTTP {status}")]
    ServerError { status: u16, body: String },

    /// Any other non-2xx status
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// No reply within the configured window
    #[error("no reply within {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// Connection, DNS or I/O failure
    #[error("network error: {reason}")]
    Network { reason: String },

    /// 2xx reply whose body is not JSON or lacks a string `message`
    #[error("malformed response body: {reason}")]
    MalformedResponse { reason: String },
}

impl TransportFailure {
    /// Classify a non-2xx HTTP status
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            400..=499 => Self::ClientError { status, body: body.into() },
            500..=599 => Self::ServerError { status, body: body.into() },
            _ => Self::UnexpectedStatus { status },
        }
    }

    /// Short machine-friendly label, used in logs and events
    pub fn category(&self) -> &'static str {
        match self {
            Self::ClientError { .. } => "client_error",
            Self::ServerError { .. } => "server_error",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::Timeout { .. } => "timeout",
            Self::Network { .. } => "network",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}

impl UssdError {
    /// Create a configuration validation error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the same operation may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::SessionAlreadyActive { .. } => false,
            Self::InvalidConfiguration { .. } | Self::ConfigFile { .. } => false,
            Self::Internal { .. } => false,
        }
    }
}
