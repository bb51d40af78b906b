//! turbomcp-muster: deterministic multi-server MCP aggregation core.
//!
//! Muster connects to many upstream MCP servers, gives every tool, prompt,
//! and resource a collision-free exposed name, reconciles that union into
//! a single outbound MCP server's catalog as upstreams come and go, and
//! routes calls back to the right upstream client — while multiplexing in
//! a set of in-process "management" tools under their own naming rules.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ NameTracker          deterministic exposed-id <-> original  │
//! │ ActiveItemSet        what is currently published outbound   │
//! │ ServerRegistry        upstream connections + cached catalogs│
//! │ CatalogReconciler     drives ActiveItemSet toward desired   │
//! │ ToolRouter/PromptRouter/ResourceRouter   forward calls       │
//! │ CoreToolMux           in-process management tools           │
//! │ SessionTokenProvider  per-session OAuth access tokens        │
//! │ TokenExchangeCoordinator  RFC 8693 token exchange via Dex    │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod active_set;
pub mod client;
pub mod config;
pub mod core_tools;
pub mod error;
pub mod name_tracker;
pub mod reconciler;
pub mod registry;
pub mod router;
pub mod token;
pub mod token_exchange;

pub use error::{MusterError, ProxyResult};

/// Common imports for embedding this core into an outbound MCP server.
pub mod prelude {
    pub use crate::active_set::ActiveItemSet;
    pub use crate::client::{TurbomcpUpstreamClient, UpstreamClient, UpstreamTransport};
    pub use crate::config::{MusterConfig, OAuthConfig, TransportKind};
    pub use crate::core_tools::{CoreToolMux, ProviderTool, ProviderToolResult, ToolArg, ToolProvider};
    pub use crate::error::{MusterError, ProxyResult};
    pub use crate::name_tracker::{ItemKind, NameTracker, CORE_SERVER_SENTINEL};
    pub use crate::reconciler::{CatalogReconciler, OutboundServer};
    pub use crate::registry::{AuthConfig, ServerInfo, ServerRegistry, ServerStatus, TokenExchangeConfig};
    pub use crate::router::{DestructiveDenylist, PromptRouter, ResourceRouter, ToolRouter};
    pub use crate::token::{OAuthHandler, RequestContext, SessionTokenProvider, TokenKey};
    pub use crate::token_exchange::{SecretsHandler, TokenExchangeCoordinator};
}
