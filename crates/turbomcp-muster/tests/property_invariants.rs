//! Property-based coverage for invariants that span more than one module:
//! name-resolution round-tripping and reconciliation convergence.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::Value;
use turbomcp_protocol::types::{GetPromptResult, PromptInput, ReadResourceResult, Resource, Tool};

use turbomcp_muster::prelude::*;

/// An upstream that never answers; only its registration/catalog matters
/// for these properties, never its responses.
#[derive(Debug)]
struct UnreachableClient;

#[async_trait]
impl UpstreamClient for UnreachableClient {
    async fn list_tools(&self) -> ProxyResult<Vec<Tool>> {
        Ok(Vec::new())
    }
    async fn list_resources(&self) -> ProxyResult<Vec<Resource>> {
        Ok(Vec::new())
    }
    async fn list_prompts(&self) -> ProxyResult<Vec<turbomcp_protocol::types::Prompt>> {
        Ok(Vec::new())
    }
    async fn call_tool(
        &self,
        name: &str,
        _arguments: Option<HashMap<String, Value>>,
        _bearer: Option<&str>,
    ) -> ProxyResult<Value> {
        Err(MusterError::upstream_failure("unreachable", name.to_string()))
    }
    async fn read_resource(&self, uri: &str, _bearer: Option<&str>) -> ProxyResult<ReadResourceResult> {
        Err(MusterError::upstream_failure("unreachable", uri.to_string()))
    }
    async fn get_prompt(
        &self,
        name: &str,
        _arguments: Option<PromptInput>,
        _bearer: Option<&str>,
    ) -> ProxyResult<GetPromptResult> {
        Err(MusterError::upstream_failure("unreachable", name.to_string()))
    }
    async fn ping(&self) -> ProxyResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingOutbound;

#[async_trait]
impl OutboundServer for RecordingOutbound {
    async fn add_tool(&self, _exposed_id: &str) -> ProxyResult<()> {
        Ok(())
    }
    async fn remove_tools(&self, _exposed_ids: &[String]) -> ProxyResult<()> {
        Ok(())
    }
    async fn add_prompt(&self, _exposed_id: &str) -> ProxyResult<()> {
        Ok(())
    }
    async fn remove_prompts(&self, _exposed_ids: &[String]) -> ProxyResult<()> {
        Ok(())
    }
    async fn add_resource(&self, _exposed_id: &str) -> ProxyResult<()> {
        Ok(())
    }
    async fn remove_resources(&self, _exposed_ids: &[String]) -> ProxyResult<()> {
        Ok(())
    }
}

fn ident() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,12}"
}

proptest! {
    /// P4: every exposed tool id resolves back to the exact
    /// `(server, original)` pair that produced it, regardless of the
    /// server/tool name chosen.
    #[test]
    fn name_round_trip(server in ident(), tool in ident()) {
        let tracker = NameTracker::new("x");
        let exposed = tracker.exposed_tool(&server, &tool);
        let (resolved_server, resolved_tool) = tracker.resolve_pair(&exposed).unwrap();
        prop_assert_eq!(resolved_server, server);
        prop_assert_eq!(resolved_tool, tool);
    }

    /// P4, resource variant: a non-scheme URI round-trips the same way.
    #[test]
    fn resource_uri_round_trip(server in ident(), uri_segment in ident()) {
        let tracker = NameTracker::new("x");
        let exposed = tracker.exposed_resource_uri(&server, &uri_segment);
        let (resolved_server, resolved_uri) = tracker.resolve_pair(&exposed).unwrap();
        prop_assert_eq!(resolved_server, server);
        prop_assert_eq!(resolved_uri, uri_segment);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// P6: after one reconciliation pass, the active set equals exactly the
    /// exposed names of the connected server's current catalog; after the
    /// catalog is cleared and a second pass runs, the active set is empty.
    #[test]
    fn reconciliation_converges_on_the_connected_catalog(tool_names in prop::collection::hash_set(ident(), 0..8)) {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(async {
                let registry = Arc::new(ServerRegistry::new(NameTracker::new("x")));
                let server = Arc::new(ServerInfo::new("serverA", "default", Arc::new(UnreachableClient)));
                let tools: Vec<Tool> = tool_names
                    .iter()
                    .map(|name| Tool { name: name.clone(), ..Default::default() })
                    .collect();
                server.replace_catalog(tools, vec![], vec![]).await;
                server.set_status(ServerStatus::Connected).await;
                registry.register(server.clone());

                let reconciler = CatalogReconciler::new(
                    registry.clone(),
                    Arc::new(CoreToolMux::new("x")),
                    ActiveItemSet::new(),
                    ActiveItemSet::new(),
                    ActiveItemSet::new(),
                );
                let outbound = RecordingOutbound::default();
                reconciler.reconcile(&outbound).await.unwrap();

                let expected: HashSet<String> = tool_names
                    .iter()
                    .map(|name| format!("x_serverA_{name}"))
                    .collect();
                for exposed in &expected {
                    assert!(reconciler.active_tools().is_active(exposed));
                }

                // Disconnect without deregistering: the server falls out of
                // `connected_servers()`, so its tools leave the desired set
                // on the very next pass even though the record still exists.
                server.set_status(ServerStatus::Disconnected).await;
                reconciler.reconcile(&outbound).await.unwrap();
                for exposed in &expected {
                    assert!(!reconciler.active_tools().is_active(exposed));
                }
            });
    }
}
