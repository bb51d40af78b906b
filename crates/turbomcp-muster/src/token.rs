//! Per-request access-token retrieval with proactive refresh and
//! single-flight coalescing (spec §4.G).

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

/// Identifies one OAuth token record. Two sessions sharing the same issuer
/// share token state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey {
    pub session_id: String,
    pub issuer: String,
    pub scope: String,
}

impl TokenKey {
    pub fn new(
        session_id: impl Into<String>,
        issuer: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            issuer: issuer.into(),
            scope: scope.into(),
        }
    }
}

/// Request-scoped cancellation/deadline context. Every outbound call this
/// core makes inherits the caller's deadline; no implicit deadlines are
/// introduced (spec §5).
///
/// Also carries the identifiers a router needs to resolve a bearer for the
/// call: the inbound session id (keys `TokenKey`) and, when the target
/// server uses token exchange rather than forwarding, the inbound identity
/// provider's id token to exchange.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub deadline: Option<Instant>,
    pub session_id: String,
    pub subject_id_token: Option<String>,
}

impl RequestContext {
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// The collaborator that actually owns the token store and knows how to
/// refresh a token for a given issuer.
#[async_trait]
pub trait OAuthHandler: Send + Sync {
    /// Whether OAuth handling is configured/enabled at all.
    fn is_enabled(&self) -> bool;

    /// Locate, refresh-if-stale, and return the access token for
    /// `(session_id, issuer)`. Returns `""` if unrecoverable — the
    /// upstream call is expected to subsequently fail with its own auth
    /// error, surfaced by the router as `UpstreamFailure`.
    async fn refresh_if_needed(
        &self,
        ctx: &RequestContext,
        session_id: &str,
        issuer: &str,
    ) -> String;
}

/// Per-`(session_id, issuer, scope)` access-token provider.
///
/// Single-flight is enforced with a per-key `tokio::sync::Mutex` guard:
/// concurrent callers for the same key serialize through the same lock, so
/// only the first actually triggers a refresh — by the time later callers
/// acquire the lock, `OAuthHandler::refresh_if_needed`'s own freshness
/// check finds the token already current and returns it without another
/// network round-trip.
pub struct SessionTokenProvider {
    handler: Option<Arc<dyn OAuthHandler>>,
    guards: Arc<DashMap<TokenKey, Arc<Mutex<()>>>>,
}

impl SessionTokenProvider {
    pub fn new(handler: Option<Arc<dyn OAuthHandler>>) -> Self {
        Self {
            handler,
            guards: Arc::new(DashMap::new()),
        }
    }

    /// Construct a provider sharing another's single-flight guard map, so
    /// independently-created providers for the same key still coalesce.
    pub fn with_shared_guards(
        handler: Option<Arc<dyn OAuthHandler>>,
        guards: Arc<DashMap<TokenKey, Arc<Mutex<()>>>>,
    ) -> Self {
        Self { handler, guards }
    }

    pub fn guards(&self) -> Arc<DashMap<TokenKey, Arc<Mutex<()>>>> {
        self.guards.clone()
    }

    /// Fetch an access token for `key`, or `""` if no handler is
    /// registered or it is disabled (spec §4.G step 1).
    pub async fn get_access_token(&self, ctx: &RequestContext, key: &TokenKey) -> String {
        let Some(handler) = &self.handler else {
            return String::new();
        };
        if !handler.is_enabled() {
            return String::new();
        }

        let guard = self
            .guards
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _permit = guard.lock().await;

        handler
            .refresh_if_needed(ctx, &key.session_id, &key.issuer)
            .await
    }
}
