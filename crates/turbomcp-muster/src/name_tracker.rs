//! Deterministic exposed-id prefixing and reverse name resolution.
//!
//! Mirrors the collision-bookkeeping shape of a hand-rolled aggregator: a
//! process-wide table mapping `exposed_id -> (server, original, kind)`,
//! guarded by a reader/writer lock so resolution never blocks on a
//! concurrent publish any longer than the insert itself takes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{MusterError, ProxyResult};

/// Sentinel server name recorded for in-process core tools, so a router can
/// tell a core-tool resolution apart from an upstream one without a second
/// lookup table.
pub const CORE_SERVER_SENTINEL: &str = "core";

/// The three kinds of item a NameTracker can hold a mapping for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Tool,
    Prompt,
    Resource,
}

impl ItemKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Prompt => "prompt",
            Self::Resource => "resource",
        }
    }
}

/// A single `exposed_id -> (server, original, kind)` record.
#[derive(Debug, Clone)]
pub struct NameMapping {
    pub server_name: String,
    pub original_id: String,
    pub kind: ItemKind,
}

#[derive(Default)]
struct Inner {
    mappings: HashMap<String, NameMapping>,
    server_prefixes: HashMap<String, String>,
}

/// Deterministic, collision-free exposed-id assignment with reverse lookup.
///
/// The resolution table is monotonically growing during normal operation —
/// entries are never removed once a name has been exposed, since the
/// mapping is a pure function of `(server, original, kind)` and is safe to
/// recompute identically on every call.
#[derive(Clone)]
pub struct NameTracker {
    inner: Arc<RwLock<Inner>>,
    muster_prefix: Arc<RwLock<String>>,
}

impl NameTracker {
    /// Create a tracker with the given muster prefix (empty defaults to `"x"`).
    pub fn new(muster_prefix: impl Into<String>) -> Self {
        let prefix = muster_prefix.into();
        let prefix = if prefix.is_empty() {
            "x".to_string()
        } else {
            prefix
        };
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            muster_prefix: Arc::new(RwLock::new(prefix)),
        }
    }

    fn muster_prefix(&self) -> String {
        self.muster_prefix.read().clone()
    }

    /// Record a per-server prefix override; an empty prefix means "use the
    /// server name itself".
    pub fn set_server_prefix(&self, server: &str, prefix: &str) {
        let mut inner = self.inner.write();
        if prefix.is_empty() {
            inner.server_prefixes.remove(server);
        } else {
            inner
                .server_prefixes
                .insert(server.to_string(), prefix.to_string());
        }
    }

    fn server_prefix(&self, server: &str) -> String {
        self.inner
            .read()
            .server_prefixes
            .get(server)
            .cloned()
            .unwrap_or_else(|| server.to_string())
    }

    fn record(&self, exposed_id: &str, server: &str, original_id: &str, kind: ItemKind) {
        self.inner.write().mappings.insert(
            exposed_id.to_string(),
            NameMapping {
                server_name: server.to_string(),
                original_id: original_id.to_string(),
                kind,
            },
        );
    }

    /// `M_` + (server-prefixed, double-prefix-avoided) `name`.
    fn tool_or_prompt_exposed(&self, server: &str, name: &str) -> String {
        let s = self.server_prefix(server);
        let m = self.muster_prefix();
        if name.starts_with(&format!("{s}_")) {
            format!("{m}_{name}")
        } else {
            format!("{m}_{s}_{name}")
        }
    }

    /// Mirror a core tool's exposed id into the same resolution table an
    /// upstream tool would land in, under `CORE_SERVER_SENTINEL`, so a
    /// router can resolve it the same way it resolves an upstream tool.
    pub fn record_core_tool(&self, exposed_id: &str, original_name: &str) {
        self.record(exposed_id, CORE_SERVER_SENTINEL, original_name, ItemKind::Tool);
    }

    /// Compute and record the exposed id for an upstream tool.
    pub fn exposed_tool(&self, server: &str, name: &str) -> String {
        let exposed = self.tool_or_prompt_exposed(server, name);
        self.record(&exposed, server, name, ItemKind::Tool);
        exposed
    }

    /// Compute and record the exposed id for an upstream prompt.
    pub fn exposed_prompt(&self, server: &str, name: &str) -> String {
        let exposed = self.tool_or_prompt_exposed(server, name);
        self.record(&exposed, server, name, ItemKind::Prompt);
        exposed
    }

    /// Compute and record the exposed URI for an upstream resource.
    ///
    /// URIs that already carry a scheme (`"://"`) pass through unchanged.
    pub fn exposed_resource_uri(&self, server: &str, uri: &str) -> String {
        if uri.contains("://") {
            self.record(uri, server, uri, ItemKind::Resource);
            return uri.to_string();
        }
        let s = self.server_prefix(server);
        let maybe_prefixed = if uri.starts_with(&format!("{s}_")) {
            uri.to_string()
        } else {
            format!("{s}_{uri}")
        };
        let exposed = if maybe_prefixed.contains("://") {
            maybe_prefixed
        } else {
            format!("{}_{maybe_prefixed}", self.muster_prefix())
        };
        self.record(&exposed, server, uri, ItemKind::Resource);
        exposed
    }

    /// Reverse-resolve an exposed id back to its origin.
    pub fn resolve(&self, exposed_id: &str) -> ProxyResult<(String, String, ItemKind)> {
        self.inner
            .read()
            .mappings
            .get(exposed_id)
            .map(|m| (m.server_name.clone(), m.original_id.clone(), m.kind))
            .ok_or_else(|| MusterError::unknown_name(exposed_id))
    }

    /// Convenience wrapper returning `(server, original)` only, for routers
    /// that already know the expected kind.
    pub fn resolve_pair(&self, exposed_id: &str) -> ProxyResult<(String, String)> {
        let (server, original, _kind) = self.resolve(exposed_id)?;
        Ok((server, original))
    }
}

impl std::fmt::Debug for NameTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameTracker")
            .field("muster_prefix", &self.muster_prefix())
            .field("entries", &self.inner.read().mappings.len())
            .finish()
    }
}

impl ItemKind {
    /// Human-readable name used in client-facing error messages.
    pub fn label(self) -> &'static str {
        self.as_str()
    }
}
