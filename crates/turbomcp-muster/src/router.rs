//! Reverse-resolves an exposed id, enforces the destructive-tool gate,
//! fetches the upstream client or in-process tool mux, resolves a bearer
//! credential, and forwards the call (spec §4.E, §4.F, §4.G, §4.H).

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use turbomcp_protocol::types::{GetPromptResult, PromptInput, ReadResourceResult};

use crate::active_set::ActiveItemSet;
use crate::core_tools::CoreToolMux;
use crate::error::{MusterError, ProxyResult};
use crate::name_tracker::CORE_SERVER_SENTINEL;
use crate::registry::{ServerInfo, ServerRegistry, ServerStatus};
use crate::token::{RequestContext, SessionTokenProvider, TokenKey};
use crate::token_exchange::{is_id_token_expired, should_use_token_forwarding, TokenExchangeCoordinator};

/// A configurable set of tool-name glob patterns (`delete_*`, `destroy_*`,
/// `drop_*`, ...) that are blocked unless `yolo` mode is enabled.
///
/// Only a trailing `*` wildcard is supported, matching the glob-style
/// patterns spec §4.E names as examples; the concrete list is deployment
/// configuration, not something this core invents.
#[derive(Debug, Clone, Default)]
pub struct DestructiveDenylist {
    patterns: Vec<String>,
}

impl DestructiveDenylist {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_blocked(&self, original_name: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            if let Some(prefix) = pattern.strip_suffix('*') {
                original_name.starts_with(prefix)
            } else {
                original_name == pattern
            }
        })
    }
}

/// Where a resolved exposed id routes to.
enum Target {
    Core {
        original: String,
    },
    Upstream {
        server: Arc<ServerInfo>,
        original: String,
        client: Arc<dyn crate::client::UpstreamClient>,
    },
}

/// Shared liveness/resolve/gate/forward pipeline, parameterized by item
/// kind only at the call sites below.
struct RouterCore {
    registry: Arc<ServerRegistry>,
    core_tools: Option<Arc<CoreToolMux>>,
    yolo: bool,
    denylist: DestructiveDenylist,
    token_provider: Option<Arc<SessionTokenProvider>>,
    token_exchange: Option<Arc<TokenExchangeCoordinator>>,
}

impl RouterCore {
    /// Steps 1-4 of spec §4.E: liveness, resolve, destructive gate
    /// (tools only), client lookup. An exposed id resolved to the core
    /// sentinel server routes to `Target::Core` instead, component F's
    /// dispatch path.
    async fn prepare(
        &self,
        active: &ActiveItemSet,
        exposed_id: &str,
        kind_label: &str,
        gate_destructive: bool,
    ) -> ProxyResult<Target> {
        if !active.is_active(exposed_id) {
            return Err(MusterError::not_available(kind_label, exposed_id, "unknown"));
        }

        let (server_name, original) = self.registry.name_tracker().resolve_pair(exposed_id)?;

        if server_name == CORE_SERVER_SENTINEL && self.core_tools.is_some() {
            return Ok(Target::Core { original });
        }

        if gate_destructive && !self.yolo && self.denylist.is_blocked(&original) {
            return Err(MusterError::blocked_destructive(&original));
        }

        let server = self
            .registry
            .get(&server_name)
            .ok_or_else(|| MusterError::server_unavailable(&server_name))?;
        if server.status().await != ServerStatus::Connected {
            return Err(MusterError::server_unavailable(&server_name));
        }
        let client = server.client.clone();
        Ok(Target::Upstream { server, original, client })
    }

    /// Resolve a bearer for `server`, per spec §2's data flow: forwarding
    /// wins when configured, otherwise token exchange, otherwise no
    /// credential is attached at all.
    async fn resolve_bearer(&self, ctx: &RequestContext, server: &ServerInfo) -> Option<String> {
        let auth_config = server.auth_config.as_ref()?;

        if should_use_token_forwarding(auth_config) {
            let provider = self.token_provider.as_ref()?;
            let key = TokenKey::new(ctx.session_id.clone(), server.name.clone(), String::new());
            let token = provider.get_access_token(ctx, &key).await;
            return (!token.is_empty()).then_some(token);
        }

        let exchange_cfg = auth_config.token_exchange.as_ref()?;
        if !exchange_cfg.is_usable() {
            return None;
        }
        let coordinator = self.token_exchange.as_ref()?;
        let subject = ctx.subject_id_token.as_deref()?;
        if is_id_token_expired(subject) {
            return None;
        }
        coordinator
            .exchange(exchange_cfg, subject, &server.name, &server.namespace)
            .await
            .ok()
    }

    fn map_upstream_error(server: &str, e: MusterError) -> MusterError {
        match e {
            MusterError::UpstreamFailure { message, .. } => MusterError::upstream_failure(server, message),
            other => other,
        }
    }
}

/// Handler factory for tool calls.
pub struct ToolRouter {
    core: RouterCore,
}

impl ToolRouter {
    pub fn new(
        registry: Arc<ServerRegistry>,
        core_tools: Arc<CoreToolMux>,
        yolo: bool,
        denylist: DestructiveDenylist,
    ) -> Self {
        Self {
            core: RouterCore {
                registry,
                core_tools: Some(core_tools),
                yolo,
                denylist,
                token_provider: None,
                token_exchange: None,
            },
        }
    }

    /// Attach the provider that supplies forwarded bearer tokens.
    pub fn with_token_provider(mut self, provider: Arc<SessionTokenProvider>) -> Self {
        self.core.token_provider = Some(provider);
        self
    }

    /// Attach the coordinator that drives RFC 8693 token exchange.
    pub fn with_token_exchange(mut self, coordinator: Arc<TokenExchangeCoordinator>) -> Self {
        self.core.token_exchange = Some(coordinator);
        self
    }

    /// Resolve and forward a `call_tool` invocation for `exposed_id`. Core
    /// tool ids dispatch straight to `CoreToolMux::execute`; upstream ids
    /// forward through the resolved client with whatever bearer
    /// `RequestContext` yields.
    pub async fn call(
        &self,
        active: &ActiveItemSet,
        exposed_id: &str,
        arguments: Option<HashMap<String, Value>>,
        ctx: &RequestContext,
    ) -> ProxyResult<Value> {
        match self.core.prepare(active, exposed_id, "tool", true).await? {
            Target::Core { original } => {
                let core_tools = self
                    .core
                    .core_tools
                    .as_ref()
                    .expect("Target::Core only returned when core_tools is configured");
                let (content, is_error) = core_tools.execute(&original, arguments.unwrap_or_default()).await?;
                Ok(serde_json::json!({ "content": content, "is_error": is_error }))
            }
            Target::Upstream { server, original, client } => {
                let bearer = self.core.resolve_bearer(ctx, &server).await;
                client
                    .call_tool(&original, arguments.or_else(|| Some(HashMap::new())), bearer.as_deref())
                    .await
                    .map_err(|e| RouterCore::map_upstream_error(&server.name, e))
            }
        }
    }
}

/// Handler factory for prompt fetches.
pub struct PromptRouter {
    core: RouterCore,
}

impl PromptRouter {
    pub fn new(registry: Arc<ServerRegistry>) -> Self {
        Self {
            core: RouterCore {
                registry,
                core_tools: None,
                yolo: true,
                denylist: DestructiveDenylist::default(),
                token_provider: None,
                token_exchange: None,
            },
        }
    }

    pub fn with_token_provider(mut self, provider: Arc<SessionTokenProvider>) -> Self {
        self.core.token_provider = Some(provider);
        self
    }

    pub fn with_token_exchange(mut self, coordinator: Arc<TokenExchangeCoordinator>) -> Self {
        self.core.token_exchange = Some(coordinator);
        self
    }

    pub async fn get(
        &self,
        active: &ActiveItemSet,
        exposed_id: &str,
        arguments: Option<PromptInput>,
        ctx: &RequestContext,
    ) -> ProxyResult<GetPromptResult> {
        match self.core.prepare(active, exposed_id, "prompt", false).await? {
            Target::Core { .. } => Err(MusterError::unknown_name(exposed_id)),
            Target::Upstream { server, original, client } => {
                let bearer = self.core.resolve_bearer(ctx, &server).await;
                client
                    .get_prompt(&original, arguments, bearer.as_deref())
                    .await
                    .map_err(|e| RouterCore::map_upstream_error(&server.name, e))
            }
        }
    }
}

/// Handler factory for resource reads.
pub struct ResourceRouter {
    core: RouterCore,
}

impl ResourceRouter {
    pub fn new(registry: Arc<ServerRegistry>) -> Self {
        Self {
            core: RouterCore {
                registry,
                core_tools: None,
                yolo: true,
                denylist: DestructiveDenylist::default(),
                token_provider: None,
                token_exchange: None,
            },
        }
    }

    pub fn with_token_provider(mut self, provider: Arc<SessionTokenProvider>) -> Self {
        self.core.token_provider = Some(provider);
        self
    }

    pub fn with_token_exchange(mut self, coordinator: Arc<TokenExchangeCoordinator>) -> Self {
        self.core.token_exchange = Some(coordinator);
        self
    }

    pub async fn read(
        &self,
        active: &ActiveItemSet,
        exposed_id: &str,
        ctx: &RequestContext,
    ) -> ProxyResult<ReadResourceResult> {
        match self.core.prepare(active, exposed_id, "resource", false).await? {
            Target::Core { .. } => Err(MusterError::unknown_name(exposed_id)),
            Target::Upstream { server, original, client } => {
                let bearer = self.core.resolve_bearer(ctx, &server).await;
                client
                    .read_resource(&original, bearer.as_deref())
                    .await
                    .map_err(|e| RouterCore::map_upstream_error(&server.name, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::NullClient;
    use crate::core_tools::{ProviderTool, ProviderToolResult, ToolProvider};
    use crate::name_tracker::NameTracker;
    use crate::registry::AuthConfig;
    use async_trait::async_trait;

    fn registry_with_tool(tool_name: &str) -> (Arc<ServerRegistry>, String, ActiveItemSet) {
        let registry = Arc::new(ServerRegistry::new(NameTracker::new("x")));
        let exposed = registry.name_tracker().exposed_tool("serverA", tool_name);
        let server = Arc::new(ServerInfo::new("serverA", "default", Arc::new(NullClient)));
        registry.register(server);
        let active = ActiveItemSet::new();
        active.set_active(&exposed, true);
        (registry, exposed, active)
    }

    fn tool_router(registry: Arc<ServerRegistry>, yolo: bool, denylist: DestructiveDenylist) -> ToolRouter {
        ToolRouter::new(registry, Arc::new(CoreToolMux::new("x")), yolo, denylist)
    }

    #[test]
    fn denylist_matches_glob_prefix() {
        let list = DestructiveDenylist::new(["delete_*", "destroy_*"]);
        assert!(list.is_blocked("delete_everything"));
        assert!(!list.is_blocked("list_things"));
    }

    #[tokio::test]
    async fn blocks_destructive_tool_without_calling_upstream() {
        let (registry, exposed, active) = registry_with_tool("delete_file");
        let router = tool_router(registry, false, DestructiveDenylist::new(["delete_*"]));
        let result = router.call(&active, &exposed, None, &RequestContext::default()).await;
        assert!(matches!(result, Err(MusterError::BlockedDestructive { .. })));
    }

    #[tokio::test]
    async fn yolo_bypasses_denylist() {
        let (registry, exposed, active) = registry_with_tool("delete_file");
        let router = tool_router(registry.clone(), true, DestructiveDenylist::new(["delete_*"]));
        // NullClient's server isn't connected, so this should fail with
        // ServerUnavailable rather than BlockedDestructive, proving the
        // gate was bypassed.
        let result = router.call(&active, &exposed, None, &RequestContext::default()).await;
        assert!(matches!(result, Err(MusterError::ServerUnavailable { .. })));
    }

    #[tokio::test]
    async fn inactive_id_is_not_available() {
        let (registry, exposed, active) = registry_with_tool("read_file");
        active.set_active(&exposed, false);
        let router = tool_router(registry, false, DestructiveDenylist::default());
        let result = router.call(&active, &exposed, None, &RequestContext::default()).await;
        assert!(matches!(result, Err(MusterError::NotAvailable { .. })));
    }

    #[tokio::test]
    async fn unknown_id_surfaces_unknown_name() {
        let registry = Arc::new(ServerRegistry::new(NameTracker::new("x")));
        let active = ActiveItemSet::new();
        active.set_active("x_serverA_ghost", true);
        let router = tool_router(registry, false, DestructiveDenylist::default());
        let result = router.call(&active, "x_serverA_ghost", None, &RequestContext::default()).await;
        assert!(matches!(result, Err(MusterError::UnknownName { .. })));
    }

    struct EchoProvider;

    #[async_trait]
    impl ToolProvider for EchoProvider {
        fn get_tools(&self) -> Vec<ProviderTool> {
            vec![ProviderTool {
                name: "service_list".to_string(),
                description: None,
                args: vec![],
            }]
        }

        async fn execute(
            &self,
            original_name: &str,
            _args: HashMap<String, Value>,
        ) -> ProxyResult<ProviderToolResult> {
            Ok(ProviderToolResult {
                content: vec![Value::String(format!("ran {original_name}"))],
                is_error: false,
            })
        }
    }

    #[tokio::test]
    async fn core_tool_dispatches_through_the_mux() {
        let registry = Arc::new(ServerRegistry::new(NameTracker::new("x")));
        let mut mux = CoreToolMux::new("x");
        mux.register_provider(Arc::new(EchoProvider));
        let core_tools = Arc::new(mux);

        for (exposed, original) in core_tools.exposed_tool_pairs() {
            registry.name_tracker().record_core_tool(&exposed, &original);
        }

        let active = ActiveItemSet::new();
        active.set_active("core_service_list", true);

        let router = ToolRouter::new(registry, core_tools, false, DestructiveDenylist::default());
        let result = router
            .call(&active, "core_service_list", None, &RequestContext::default())
            .await
            .unwrap();
        assert_eq!(result["content"][0]["text"].as_str(), Some("ran service_list"));
    }

    #[tokio::test]
    async fn forwarded_bearer_reaches_the_client_call() {
        let registry = Arc::new(ServerRegistry::new(NameTracker::new("x")));
        let mut server = ServerInfo::new("serverA", "default", Arc::new(NullClient));
        server.auth_config = Some(AuthConfig {
            forward_token: true,
            ..Default::default()
        });
        server.set_status(ServerStatus::Connected).await;
        let server = Arc::new(server);
        registry.register(server.clone());

        struct EchoHandler;
        #[async_trait]
        impl crate::token::OAuthHandler for EchoHandler {
            fn is_enabled(&self) -> bool {
                true
            }
            async fn refresh_if_needed(&self, _: &RequestContext, _: &str, _: &str) -> String {
                "bearer-xyz".to_string()
            }
        }

        let core = RouterCore {
            registry: registry.clone(),
            core_tools: None,
            yolo: false,
            denylist: DestructiveDenylist::default(),
            token_provider: Some(Arc::new(SessionTokenProvider::new(Some(Arc::new(EchoHandler))))),
            token_exchange: None,
        };

        let ctx = RequestContext {
            session_id: "session-1".to_string(),
            ..Default::default()
        };
        let bearer = core.resolve_bearer(&ctx, &server).await;
        assert_eq!(bearer.as_deref(), Some("bearer-xyz"));
    }
}
