//! Error types for turbomcp-muster
//!
//! Follows TurboMCP's layered error hierarchy:
//! - Transport/protocol errors are wrapped, never re-derived
//! - Aggregation-specific errors carry enough context to route back to the
//!   right upstream server without leaking it to the downstream client

use thiserror::Error;

/// Result type for muster operations
pub type ProxyResult<T> = std::result::Result<T, MusterError>;

/// Main error type for turbomcp-muster
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MusterError {
    /// A client addressed a name that no server ever published
    #[error("unknown name: {name}")]
    UnknownName { name: String },

    /// The name is known but its owning server is not currently reachable
    #[error("{kind} '{name}' is not available (server {server} unreachable)")]
    NotAvailable {
        kind: String,
        name: String,
        server: String,
    },

    /// The tool matched a destructive pattern and yolo mode is off
    #[error("tool '{name}' is blocked as destructive (enable yolo mode to allow it)")]
    BlockedDestructive { name: String },

    /// The resolved server is registered but not connected
    #[error("server '{server}' is unavailable")]
    ServerUnavailable { server: String },

    /// The upstream server returned an error for a forwarded call
    #[error("upstream '{server}' failed: {message}")]
    UpstreamFailure { server: String, message: String },

    /// No credentials are on file for a server that requires them
    #[error("credentials missing for server '{server}'")]
    CredentialsMissing { server: String },

    /// A token refresh attempt failed
    #[error("token refresh failed for session '{session_id}': {message}")]
    TokenRefreshFailed { session_id: String, message: String },

    /// Transport-layer error, forwarded from turbomcp-transport
    #[error("transport error: {0}")]
    Transport(#[from] turbomcp_transport::TransportError),

    /// Protocol-layer error, forwarded from turbomcp-protocol
    #[error("protocol error: {0}")]
    Protocol(#[from] Box<turbomcp_protocol::Error>),

    /// Configuration is missing or malformed
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// JSON (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MusterError {
    /// Build an [`MusterError::UnknownName`]
    pub fn unknown_name(name: impl Into<String>) -> Self {
        Self::UnknownName { name: name.into() }
    }

    /// Build an [`MusterError::NotAvailable`]
    pub fn not_available(
        kind: impl Into<String>,
        name: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self::NotAvailable {
            kind: kind.into(),
            name: name.into(),
            server: server.into(),
        }
    }

    /// Build an [`MusterError::BlockedDestructive`]
    pub fn blocked_destructive(name: impl Into<String>) -> Self {
        Self::BlockedDestructive { name: name.into() }
    }

    /// Build an [`MusterError::ServerUnavailable`]
    pub fn server_unavailable(server: impl Into<String>) -> Self {
        Self::ServerUnavailable {
            server: server.into(),
        }
    }

    /// Build an [`MusterError::UpstreamFailure`]
    pub fn upstream_failure(server: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Build an [`MusterError::CredentialsMissing`]
    pub fn credentials_missing(server: impl Into<String>) -> Self {
        Self::CredentialsMissing {
            server: server.into(),
        }
    }

    /// Build an [`MusterError::TokenRefreshFailed`]
    pub fn token_refresh_failed(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TokenRefreshFailed {
            session_id: session_id.into(),
            message: message.into(),
        }
    }

    /// Build an [`MusterError::Configuration`]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Strip internal detail before a message reaches a downstream client.
    ///
    /// Upstream error text and transport internals stay server-side; only
    /// the error kind and the name the client already knows about survive.
    pub fn sanitize(&self) -> String {
        match self {
            Self::UnknownName { name } => format!("unknown name: {name}"),
            Self::NotAvailable { kind, name, .. } => format!("{kind} '{name}' is not available"),
            Self::BlockedDestructive { name } => format!("'{name}' is blocked as destructive"),
            Self::ServerUnavailable { .. } => "server is unavailable".to_string(),
            Self::UpstreamFailure { .. } => "upstream call failed".to_string(),
            Self::CredentialsMissing { .. } => "credentials missing".to_string(),
            Self::TokenRefreshFailed { .. } => "authentication failed".to_string(),
            Self::Transport(_) => "transport error occurred".to_string(),
            Self::Protocol(_) => "protocol error occurred".to_string(),
            Self::Configuration { .. } => "configuration error".to_string(),
            Self::Serialization(_) => "serialization error".to_string(),
            Self::Io(_) => "I/O error".to_string(),
        }
    }

    /// Whether retrying the same call might succeed without operator action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServerUnavailable { .. } | Self::NotAvailable { .. } | Self::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_hides_upstream_message() {
        let err = MusterError::upstream_failure("filesystem", "connection reset by peer");
        assert_eq!(err.sanitize(), "upstream call failed");
        assert!(!err.sanitize().contains("connection reset"));
    }

    #[test]
    fn sanitize_keeps_client_visible_name() {
        let err = MusterError::unknown_name("delete_everything");
        assert_eq!(err.sanitize(), "unknown name: delete_everything");
    }

    #[test]
    fn retryable_classification() {
        assert!(MusterError::server_unavailable("s1").is_retryable());
        assert!(!MusterError::credentials_missing("s1").is_retryable());
    }
}
