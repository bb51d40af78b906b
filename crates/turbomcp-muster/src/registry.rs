//! Owns the set of upstream `ServerInfo` records and their cached catalogs,
//! and drives (de)registration events.

use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock as AsyncRwLock};
use turbomcp_protocol::types::{Prompt, Resource, Tool};

use crate::client::UpstreamClient;
use crate::error::{MusterError, ProxyResult};
use crate::name_tracker::NameTracker;

/// Connection status of a registered upstream server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Connected,
    Disconnected,
    AuthRequired,
}

/// RFC 8693 token exchange settings for a server, if it requires one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenExchangeConfig {
    pub enabled: bool,
    pub dex_token_endpoint: Option<String>,
    pub connector_id: Option<String>,
    /// Reference to a secret holding the exchange client's credentials.
    pub secret_ref: Option<String>,
    /// Namespace the secret lives in; defaults to the server's namespace,
    /// then `"default"`, if unset.
    pub namespace: Option<String>,
    pub scopes: Vec<String>,
    pub audience: Vec<String>,
}

impl TokenExchangeConfig {
    /// True iff enabled and both the Dex endpoint and connector id are
    /// non-empty (spec §4.H `should_use_token_exchange`).
    pub fn is_usable(&self) -> bool {
        self.enabled
            && self
                .dex_token_endpoint
                .as_deref()
                .is_some_and(|s| !s.is_empty())
            && self.connector_id.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Teleport-specific settings, kept intentionally opaque: the concrete
/// Teleport integration is an external collaborator (spec §1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeleportSettings {
    pub proxy_addr: Option<String>,
    pub cluster: Option<String>,
}

/// Per-server auth configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub kind: Option<String>,
    pub forward_token: bool,
    pub token_exchange: Option<TokenExchangeConfig>,
    pub teleport: Option<TeleportSettings>,
}

struct CachedCatalog {
    tools: Vec<Tool>,
    prompts: Vec<Prompt>,
    resources: Vec<Resource>,
    last_update: SystemTime,
}

impl Default for CachedCatalog {
    fn default() -> Self {
        Self {
            tools: Vec::new(),
            prompts: Vec::new(),
            resources: Vec::new(),
            last_update: SystemTime::UNIX_EPOCH,
        }
    }
}

/// A registered upstream server: identity, connection handle, cached
/// catalog, and auth configuration.
///
/// Mutation to the cached slices and `status` happens only through
/// accessor methods that acquire the record's reader/writer lock; readers
/// never observe a half-updated slice because writers replace the whole
/// catalog in one locked section.
pub struct ServerInfo {
    pub name: String,
    pub namespace: String,
    pub url: Option<String>,
    pub tool_prefix: Option<String>,
    pub client: Arc<dyn UpstreamClient>,
    pub auth_config: Option<AuthConfig>,
    status: AsyncRwLock<ServerStatus>,
    catalog: AsyncRwLock<CachedCatalog>,
}

impl ServerInfo {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        client: Arc<dyn UpstreamClient>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            url: None,
            tool_prefix: None,
            client,
            auth_config: None,
            status: AsyncRwLock::new(ServerStatus::Disconnected),
            catalog: AsyncRwLock::new(CachedCatalog::default()),
        }
    }

    pub async fn status(&self) -> ServerStatus {
        *self.status.read().await
    }

    pub async fn set_status(&self, status: ServerStatus) {
        *self.status.write().await = status;
    }

    pub async fn tools(&self) -> Vec<Tool> {
        self.catalog.read().await.tools.clone()
    }

    pub async fn prompts(&self) -> Vec<Prompt> {
        self.catalog.read().await.prompts.clone()
    }

    pub async fn resources(&self) -> Vec<Resource> {
        self.catalog.read().await.resources.clone()
    }

    pub async fn last_update(&self) -> SystemTime {
        self.catalog.read().await.last_update
    }

    /// Replace the entire cached catalog atomically.
    pub async fn replace_catalog(&self, tools: Vec<Tool>, prompts: Vec<Prompt>, resources: Vec<Resource>) {
        let mut catalog = self.catalog.write().await;
        catalog.tools = tools;
        catalog.prompts = prompts;
        catalog.resources = resources;
        catalog.last_update = SystemTime::now();
    }
}

/// An event fired whenever the registry's membership changes.
#[derive(Clone)]
pub enum RegistrationEvent {
    Register(Arc<ServerInfo>),
    Deregister(String),
}

/// Holds `server_name -> ServerInfo` and fans out registration events to
/// anyone (notably the `CatalogReconciler`) subscribed to changes.
pub struct ServerRegistry {
    servers: DashMap<String, Arc<ServerInfo>>,
    name_tracker: NameTracker,
    events: broadcast::Sender<RegistrationEvent>,
}

impl ServerRegistry {
    pub fn new(name_tracker: NameTracker) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            servers: DashMap::new(),
            name_tracker,
            events,
        }
    }

    pub fn name_tracker(&self) -> &NameTracker {
        &self.name_tracker
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistrationEvent> {
        self.events.subscribe()
    }

    /// Register (or replace) a server record, emitting a `Register` event.
    pub fn register(&self, server: Arc<ServerInfo>) {
        let name = server.name.clone();
        if let Some(prefix) = &server.tool_prefix {
            self.name_tracker.set_server_prefix(&name, prefix);
        }
        self.servers.insert(name, server.clone());
        let _ = self.events.send(RegistrationEvent::Register(server));
    }

    /// Remove a server record, emitting a `Deregister` event. No-op (but
    /// still emits) if the server was not registered.
    pub fn deregister(&self, server_name: &str) {
        self.servers.remove(server_name);
        let _ = self
            .events
            .send(RegistrationEvent::Deregister(server_name.to_string()));
    }

    pub fn get(&self, server_name: &str) -> Option<Arc<ServerInfo>> {
        self.servers.get(server_name).map(|r| r.value().clone())
    }

    /// Every registered server currently in `ServerStatus::Connected`, for
    /// walking when computing a desired catalog (spec §4.D). A server that
    /// has dropped to `Disconnected`/`AuthRequired` without being fully
    /// deregistered is excluded, so its cached tools fall out of the
    /// desired set on the next reconciliation pass.
    pub async fn connected_servers(&self) -> Vec<Arc<ServerInfo>> {
        let all: Vec<Arc<ServerInfo>> = self.servers.iter().map(|r| r.value().clone()).collect();
        let mut connected = Vec::with_capacity(all.len());
        for server in all {
            if server.status().await == ServerStatus::Connected {
                connected.push(server);
            }
        }
        connected
    }

    /// Fetch a live client handle for `server_name`. Fails with
    /// `ServerUnavailable` if the server is absent or not connected.
    pub async fn client(&self, server_name: &str) -> ProxyResult<Arc<dyn UpstreamClient>> {
        let server = self
            .servers
            .get(server_name)
            .ok_or_else(|| MusterError::server_unavailable(server_name))?
            .value()
            .clone();
        if server.status().await != ServerStatus::Connected {
            return Err(MusterError::server_unavailable(server_name));
        }
        Ok(server.client.clone())
    }

    /// Reverse-resolve an exposed tool id to `(server, original)`.
    pub fn resolve_tool(&self, exposed: &str) -> ProxyResult<(String, String)> {
        self.name_tracker.resolve_pair(exposed)
    }

    /// Reverse-resolve an exposed prompt id to `(server, original)`.
    pub fn resolve_prompt(&self, exposed: &str) -> ProxyResult<(String, String)> {
        self.name_tracker.resolve_pair(exposed)
    }

    /// Reverse-resolve an exposed resource URI to `(server, original)`.
    pub fn resolve_resource(&self, exposed: &str) -> ProxyResult<(String, String)> {
        self.name_tracker.resolve_pair(exposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::NullClient;

    fn test_registry() -> ServerRegistry {
        ServerRegistry::new(NameTracker::new("x"))
    }

    #[tokio::test]
    async fn register_then_client_requires_connected_status() {
        let registry = test_registry();
        let info = Arc::new(ServerInfo::new("serverA", "default", Arc::new(NullClient)));
        registry.register(info.clone());

        assert!(registry.client("serverA").await.is_err());
        info.set_status(ServerStatus::Connected).await;
        assert!(registry.client("serverA").await.is_ok());
    }

    #[tokio::test]
    async fn deregister_removes_server() {
        let registry = test_registry();
        let info = Arc::new(ServerInfo::new("serverA", "default", Arc::new(NullClient)));
        registry.register(info);
        registry.deregister("serverA");
        assert!(registry.get("serverA").is_none());
    }

    #[tokio::test]
    async fn unregistered_server_is_unavailable() {
        let registry = test_registry();
        assert!(matches!(
            registry.client("ghost").await,
            Err(MusterError::ServerUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn connected_servers_excludes_disconnected_ones() {
        let registry = test_registry();
        let connected = Arc::new(ServerInfo::new("serverA", "default", Arc::new(NullClient)));
        connected.set_status(ServerStatus::Connected).await;
        registry.register(connected);

        let disconnected = Arc::new(ServerInfo::new("serverB", "default", Arc::new(NullClient)));
        registry.register(disconnected);

        let auth_required = Arc::new(ServerInfo::new("serverC", "default", Arc::new(NullClient)));
        auth_required.set_status(ServerStatus::AuthRequired).await;
        registry.register(auth_required);

        let names: Vec<String> = registry
            .connected_servers()
            .await
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["serverA".to_string()]);
    }

    #[test]
    fn token_exchange_usable_requires_all_fields() {
        let mut cfg = TokenExchangeConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(!cfg.is_usable());
        cfg.dex_token_endpoint = Some("https://dex/token".to_string());
        cfg.connector_id = Some("ldap".to_string());
        assert!(cfg.is_usable());
    }
}
