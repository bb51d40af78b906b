//! Brings the outbound published catalog into equality with the desired
//! catalog computed from connected upstreams plus core tools.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::active_set::ActiveItemSet;
use crate::core_tools::CoreToolMux;
use crate::error::ProxyResult;
use crate::registry::ServerRegistry;

/// The outbound MCP server surface the reconciler publishes to and
/// unpublishes from. Kept as a trait so the core never depends on a
/// concrete transport/server implementation (spec §1).
#[async_trait]
pub trait OutboundServer: Send + Sync {
    async fn add_tool(&self, exposed_id: &str) -> ProxyResult<()>;
    async fn remove_tools(&self, exposed_ids: &[String]) -> ProxyResult<()>;
    async fn add_prompt(&self, exposed_id: &str) -> ProxyResult<()>;
    async fn remove_prompts(&self, exposed_ids: &[String]) -> ProxyResult<()>;
    async fn add_resource(&self, exposed_id: &str) -> ProxyResult<()>;
    async fn remove_resources(&self, exposed_ids: &[String]) -> ProxyResult<()>;
}

/// Computes the desired exposed catalog from the registry and core tool
/// providers, and reconciles it against the outbound MCP server and the
/// three `ActiveItemSet`s, removals before additions (spec §4.D).
pub struct CatalogReconciler {
    registry: Arc<ServerRegistry>,
    core_tools: Arc<CoreToolMux>,
    active_tools: ActiveItemSet,
    active_prompts: ActiveItemSet,
    active_resources: ActiveItemSet,
}

impl CatalogReconciler {
    pub fn new(
        registry: Arc<ServerRegistry>,
        core_tools: Arc<CoreToolMux>,
        active_tools: ActiveItemSet,
        active_prompts: ActiveItemSet,
        active_resources: ActiveItemSet,
    ) -> Self {
        Self {
            registry,
            core_tools,
            active_tools,
            active_prompts,
            active_resources,
        }
    }

    /// Shared handle to the in-process tool multiplexer, so a router can be
    /// built against the same instance this reconciler publishes from.
    pub fn core_tools(&self) -> Arc<CoreToolMux> {
        self.core_tools.clone()
    }

    pub fn active_tools(&self) -> &ActiveItemSet {
        &self.active_tools
    }

    pub fn active_prompts(&self) -> &ActiveItemSet {
        &self.active_prompts
    }

    pub fn active_resources(&self) -> &ActiveItemSet {
        &self.active_resources
    }

    /// Run one full reconciliation pass across tools, prompts, and
    /// resources. Publication failures for an individual item are logged
    /// and skipped, never aborting the rest of the pass (spec §4.D).
    pub async fn reconcile(&self, outbound: &dyn OutboundServer) -> ProxyResult<()> {
        self.reconcile_tools(outbound).await?;
        self.reconcile_prompts(outbound).await?;
        self.reconcile_resources(outbound).await?;
        Ok(())
    }

    async fn reconcile_tools(&self, outbound: &dyn OutboundServer) -> ProxyResult<()> {
        let tracker = self.registry.name_tracker();
        let core_pairs = self.core_tools.exposed_tool_pairs();
        let mut new_set: HashSet<String> = core_pairs.iter().map(|(exposed, _)| exposed.clone()).collect();

        let mut per_server_exposed: Vec<String> = Vec::new();
        for server in self.registry.connected_servers().await {
            for tool in server.tools().await {
                let exposed = tracker.exposed_tool(&server.name, &tool.name);
                new_set.insert(exposed.clone());
                per_server_exposed.push(exposed);
            }
        }

        let to_remove = self.active_tools.inactive_since(&new_set);
        if !to_remove.is_empty() {
            outbound.remove_tools(&to_remove).await?;
            self.active_tools.remove_many(&to_remove);
            debug!(count = to_remove.len(), "removed stale tools");
        }

        for exposed in per_server_exposed {
            if self.active_tools.is_active(&exposed) {
                continue;
            }
            match outbound.add_tool(&exposed).await {
                Ok(()) => self.active_tools.set_active(&exposed, true),
                Err(e) => warn!(exposed_id = %exposed, error = %e, "failed to publish tool, will retry next reconciliation"),
            }
        }

        for (exposed, original) in core_pairs {
            // Mirrored on every pass, not just first publish, so a router
            // can resolve the id even before it has been added outbound.
            tracker.record_core_tool(&exposed, &original);
            if self.active_tools.is_active(&exposed) {
                continue;
            }
            match outbound.add_tool(&exposed).await {
                Ok(()) => self.active_tools.set_active(&exposed, true),
                Err(e) => warn!(exposed_id = %exposed, error = %e, "failed to publish core tool, will retry next reconciliation"),
            }
        }

        info!(active = self.active_tools.len(), "tool reconciliation complete");
        Ok(())
    }

    async fn reconcile_prompts(&self, outbound: &dyn OutboundServer) -> ProxyResult<()> {
        let tracker = self.registry.name_tracker();
        let mut new_set: HashSet<String> = HashSet::new();
        let mut exposed_ids: Vec<String> = Vec::new();

        for server in self.registry.connected_servers().await {
            for prompt in server.prompts().await {
                let exposed = tracker.exposed_prompt(&server.name, &prompt.name);
                new_set.insert(exposed.clone());
                exposed_ids.push(exposed);
            }
        }

        let to_remove = self.active_prompts.inactive_since(&new_set);
        if !to_remove.is_empty() {
            outbound.remove_prompts(&to_remove).await?;
            self.active_prompts.remove_many(&to_remove);
        }

        for exposed in exposed_ids {
            if self.active_prompts.is_active(&exposed) {
                continue;
            }
            match outbound.add_prompt(&exposed).await {
                Ok(()) => self.active_prompts.set_active(&exposed, true),
                Err(e) => warn!(exposed_id = %exposed, error = %e, "failed to publish prompt, will retry next reconciliation"),
            }
        }

        Ok(())
    }

    async fn reconcile_resources(&self, outbound: &dyn OutboundServer) -> ProxyResult<()> {
        let tracker = self.registry.name_tracker();
        let mut new_set: HashSet<String> = HashSet::new();
        let mut exposed_ids: Vec<String> = Vec::new();

        for server in self.registry.connected_servers().await {
            for resource in server.resources().await {
                let exposed = tracker.exposed_resource_uri(&server.name, &resource.uri);
                new_set.insert(exposed.clone());
                exposed_ids.push(exposed);
            }
        }

        let to_remove = self.active_resources.inactive_since(&new_set);
        if !to_remove.is_empty() {
            outbound.remove_resources(&to_remove).await?;
            self.active_resources.remove_many(&to_remove);
        }

        for exposed in exposed_ids {
            if self.active_resources.is_active(&exposed) {
                continue;
            }
            match outbound.add_resource(&exposed).await {
                Ok(()) => self.active_resources.set_active(&exposed, true),
                Err(e) => warn!(exposed_id = %exposed, error = %e, "failed to publish resource, will retry next reconciliation"),
            }
        }

        Ok(())
    }
}
