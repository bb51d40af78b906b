//! RFC 8693 token exchange: swaps an identity-provider id token for a
//! downstream-scoped access token via Dex, when a server's auth config
//! requests it (spec §4.H).

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{MusterError, ProxyResult};
use crate::registry::TokenExchangeConfig;

const ID_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:id_token";

/// Client credentials for the token-exchange client, as loaded from a
/// secret store.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Loads client credentials for a token-exchange client out of whatever
/// secret store the deployment uses. Kept as a trait since the concrete
/// store (Kubernetes secrets, Vault, ...) is an external collaborator.
#[async_trait]
pub trait SecretsHandler: Send + Sync {
    async fn load_client_credentials(
        &self,
        secret_ref: &str,
        namespace: &str,
    ) -> ProxyResult<ClientCredentials>;
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    access_token: String,
}

/// Performs the RFC 8693 exchange for servers whose `auth_config` requests
/// it, composing the downstream scope string from the server's configured
/// scopes and audiences.
pub struct TokenExchangeCoordinator {
    http_client: reqwest::Client,
    secrets: std::sync::Arc<dyn SecretsHandler>,
}

impl TokenExchangeCoordinator {
    pub fn new(secrets: std::sync::Arc<dyn SecretsHandler>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            secrets,
        }
    }

    /// Whether `config` is fully configured to drive an exchange (spec
    /// §4.H `should_use_token_exchange`); delegates to the config's own
    /// check so the two call sites can't drift.
    pub fn should_use_token_exchange(config: &TokenExchangeConfig) -> bool {
        config.is_usable()
    }

    /// Exchange `subject_id_token` for an access token scoped to `server`,
    /// per `config`. `server_namespace` is used when `config.namespace` is
    /// unset.
    pub async fn exchange(
        &self,
        config: &TokenExchangeConfig,
        subject_id_token: &str,
        client_id_for_scope: &str,
        server_namespace: &str,
    ) -> ProxyResult<String> {
        if !config.is_usable() {
            return Err(MusterError::configuration(
                "token exchange requested but not fully configured",
            ));
        }

        let secret_ref = config
            .secret_ref
            .as_deref()
            .ok_or_else(|| MusterError::credentials_missing("token-exchange"))?;
        let namespace = config
            .namespace
            .clone()
            .unwrap_or_else(|| server_namespace.to_string());

        let credentials = self
            .secrets
            .load_client_credentials(secret_ref, &namespace)
            .await?;

        let scope = compose_scope(&config.scopes, &config.audience, client_id_for_scope);
        let dex_token_endpoint = config
            .dex_token_endpoint
            .as_deref()
            .expect("is_usable() guarantees this is set");
        let connector_id = config
            .connector_id
            .as_deref()
            .expect("is_usable() guarantees this is set");

        let form = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:token-exchange"),
            ("subject_token", subject_id_token),
            ("subject_token_type", ID_TOKEN_TYPE),
            ("connector_id", connector_id),
            ("scope", &scope),
        ];

        let response = self
            .http_client
            .post(dex_token_endpoint)
            .basic_auth(&credentials.client_id, Some(credentials.client_secret.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|e| MusterError::upstream_failure(dex_token_endpoint, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MusterError::upstream_failure(
                dex_token_endpoint,
                format!("exchange returned {status}: {body}"),
            ));
        }

        let parsed: ExchangeResponse = response
            .json()
            .await
            .map_err(|e| MusterError::upstream_failure(dex_token_endpoint, e.to_string()))?;

        Ok(parsed.access_token)
    }
}

/// Compose the downstream scope string: the server's base scopes, followed
/// by one `audience:server:client_id:<audience>` entry per non-empty
/// audience, space-separated, preserving input order.
fn compose_scope(base_scopes: &[String], audiences: &[String], client_id: &str) -> String {
    let mut parts: Vec<String> = base_scopes.to_vec();
    for audience in audiences {
        if audience.is_empty() {
            continue;
        }
        parts.push(format!("audience:server:client_id:{audience}"));
    }
    parts.join(" ")
}

/// Whether a server should have its inbound token forwarded verbatim
/// rather than exchanged (spec §4.H `should_use_token_forwarding`).
pub fn should_use_token_forwarding(auth_config: &crate::registry::AuthConfig) -> bool {
    auth_config.forward_token
}

/// Decode the payload (second segment) of a JWT-shaped string. Returns an
/// error if the token does not have three dot-separated segments or the
/// payload segment isn't valid base64url.
pub fn decode_jwt_payload(token: &str) -> ProxyResult<Vec<u8>> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (
        segments.next(),
        segments.next(),
        segments.next(),
    );
    let payload = payload.filter(|s| !s.is_empty()).ok_or_else(|| {
        MusterError::configuration("malformed id token: missing payload segment")
    })?;
    URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| MusterError::configuration(format!("malformed id token payload: {e}")))
}

#[derive(Debug, Deserialize, Default)]
struct IdTokenClaims {
    exp: Option<i64>,
    sub: Option<String>,
}

fn decode_claims(token: &str) -> Option<IdTokenClaims> {
    let bytes = decode_jwt_payload(token).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// True if `token` is missing an `exp` claim, has one in the past, or
/// can't be decoded at all — any decode failure is treated as expired.
pub fn is_id_token_expired(token: &str) -> bool {
    let Some(claims) = decode_claims(token) else {
        return true;
    };
    let Some(exp) = claims.exp else {
        return true;
    };
    let now = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(i64::MAX);
    exp <= now
}

/// Extract the `sub` claim from an id token, or `""` if absent/undecodable.
pub fn extract_user_id(token: &str) -> String {
    decode_claims(token)
        .and_then(|c| c.sub)
        .unwrap_or_default()
}
