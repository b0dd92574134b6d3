//! Error taxonomy for broker gateway operations
//!
//! Validation errors fail fast before any network call; remote failures carry
//! the operation context (connection, destination) they occurred under.
//! "No message available" is never an error; it is `Ok(None)` at the call
//! sites that can observe it.

use thiserror::Error;

/// Main error type for gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Connection '{id}' already exists")]
    DuplicateId { id: String },

    #[error("Connection '{id}' not found. Registered connections: {known}")]
    NotFound { id: String, known: String },

    #[error("Connection '{id}' is not active")]
    Inactive { id: String },

    #[error("Not connected to broker")]
    NotConnected,

    #[error("Remote call failed ({context}): {message}")]
    RemoteCallFailed {
        context: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl GatewayError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a duplicate connection id error
    pub fn duplicate_id<S: Into<String>>(id: S) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Create a not-found error enumerating the ids currently registered
    pub fn not_found<S: Into<String>>(id: S, known_ids: &[String]) -> Self {
        let known = if known_ids.is_empty() {
            "(none)".to_string()
        } else {
            known_ids.join(", ")
        };
        Self::NotFound {
            id: id.into(),
            known,
        }
    }

    /// Create an inactive connection error
    pub fn inactive<S: Into<String>>(id: S) -> Self {
        Self::Inactive { id: id.into() }
    }

    /// Create a remote call failure with operation context
    pub fn remote<C: Into<String>, M: Into<String>>(
        context: C,
        status: Option<u16>,
        message: M,
    ) -> Self {
        Self::RemoteCallFailed {
            context: context.into(),
            status,
            message: message.into(),
        }
    }

    /// Re-wrap a remote failure with the connection id it occurred under
    pub fn with_connection(self, id: &str) -> Self {
        match self {
            Self::RemoteCallFailed {
                context,
                status,
                message,
            } => Self::RemoteCallFailed {
                context: format!("connection '{id}', {context}"),
                status,
                message,
            },
            other => other,
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
