//! Configuration types for turbomcp-muster

use serde::{Deserialize, Serialize};

/// Transport the aggregator's own frontend listens on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Server-Sent Events over HTTP
    #[default]
    Sse,
    /// Streamable HTTP (single endpoint, chunked responses)
    StreamableHttp,
    /// Standard I/O (subprocess)
    Stdio,
}

/// OAuth-related aggregator settings
///
/// Loading these from a file or environment is an external collaborator;
/// this struct only defines and validates the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Whether the aggregator performs its own OAuth dance for clients
    pub enabled: bool,

    /// Public URL clients use to reach this aggregator (for redirect URIs)
    pub public_url: Option<String>,

    /// OAuth client id registered with the authorization server
    pub client_id: Option<String>,

    /// Path the aggregator's own HTTP frontend exposes for the OAuth callback
    pub callback_path: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            public_url: None,
            client_id: None,
            callback_path: "/oauth/callback".to_string(),
        }
    }
}

/// Aggregator-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusterConfig {
    /// Port the aggregator's own frontend listens on
    pub port: u16,

    /// Host/bind address for the aggregator's own frontend
    pub host: String,

    /// Frontend transport kind
    pub transport: TransportKind,

    /// When true, the destructive-tool denylist is bypassed entirely
    pub yolo: bool,

    /// Prefix applied to core/workflow tool names (spec default `"x"`)
    pub muster_prefix: String,

    /// OAuth settings, nested so they can be toggled as a unit
    pub oauth: OAuthConfig,
}

impl Default for MusterConfig {
    fn default() -> Self {
        Self {
            port: 8090,
            host: "127.0.0.1".to_string(),
            transport: TransportKind::default(),
            yolo: false,
            muster_prefix: "x".to_string(),
            oauth: OAuthConfig::default(),
        }
    }
}

impl MusterConfig {
    /// Validate the configuration, returning a human-readable error on failure
    pub fn validate(&self) -> Result<(), String> {
        if self.muster_prefix.is_empty() {
            return Err("muster_prefix must not be empty".to_string());
        }
        if self.muster_prefix.contains('_') {
            return Err("muster_prefix must not itself contain an underscore".to_string());
        }
        if self.oauth.enabled && self.oauth.client_id.is_none() {
            return Err("oauth.client_id is required when oauth.enabled is true".to_string());
        }
        Ok(())
    }
}
