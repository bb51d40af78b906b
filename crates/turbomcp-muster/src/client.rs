//! The upstream MCP client capability set (spec §6) and a multi-transport
//! adapter built the way the teacher's `BackendConnector`/`AnyClient` is
//! built, generalized to support many simultaneously-registered servers
//! instead of exactly one.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use turbomcp_client::Client;
use turbomcp_protocol::types::{Prompt, PromptInput, ReadResourceResult, Resource, Tool};
use turbomcp_transport::child_process::{ChildProcessConfig, ChildProcessTransport};
use turbomcp_transport::streamable_http_client::{
    StreamableHttpClientConfig, StreamableHttpClientTransport,
};
use turbomcp_transport::{
    TcpTransport, Transport, UnixTransport, WebSocketBidirectionalConfig,
    WebSocketBidirectionalTransport,
};
use turbomcp_protocol::types::GetPromptResult;

use crate::error::{MusterError, ProxyResult};

/// The capability set spec §6 requires of every upstream connection.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn list_tools(&self) -> ProxyResult<Vec<Tool>>;
    async fn list_resources(&self) -> ProxyResult<Vec<Resource>>;
    async fn list_prompts(&self) -> ProxyResult<Vec<Prompt>>;
    /// `bearer`, when present, is the per-session credential the router
    /// resolved via `SessionTokenProvider`/`TokenExchangeCoordinator` for
    /// this call (spec §2's "Registry yields client -> SessionTokenProvider
    /// supplies bearer -> upstream CallTool" data flow).
    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<HashMap<String, Value>>,
        bearer: Option<&str>,
    ) -> ProxyResult<Value>;
    async fn read_resource(&self, uri: &str, bearer: Option<&str>) -> ProxyResult<ReadResourceResult>;
    async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<PromptInput>,
        bearer: Option<&str>,
    ) -> ProxyResult<GetPromptResult>;
    async fn ping(&self) -> ProxyResult<()>;
}

/// How to reach an upstream server, mirroring the teacher's `BackendTransport`.
#[derive(Debug, Clone)]
pub enum UpstreamTransport {
    Stdio {
        command: String,
        args: Vec<String>,
        working_dir: Option<String>,
    },
    Http {
        url: String,
        auth_token: Option<String>,
    },
    Tcp {
        host: String,
        port: u16,
    },
    Unix {
        path: String,
    },
    WebSocket {
        url: String,
    },
}

/// Type-erased client wrapper supporting multiple transports, one instance
/// per registered upstream server.
#[derive(Clone)]
enum AnyClient {
    Stdio(Arc<Client<ChildProcessTransport>>),
    Http(Arc<Client<StreamableHttpClientTransport>>),
    Tcp(Arc<Client<TcpTransport>>),
    Unix(Arc<Client<UnixTransport>>),
    WebSocket(Arc<Client<WebSocketBidirectionalTransport>>),
}

macro_rules! dispatch_client {
    ($client:expr, $method:ident($($args:expr),*)) => {
        match $client {
            AnyClient::Stdio(c) => c.$method($($args),*).await,
            AnyClient::Http(c) => c.$method($($args),*).await,
            AnyClient::Tcp(c) => c.$method($($args),*).await,
            AnyClient::Unix(c) => c.$method($($args),*).await,
            AnyClient::WebSocket(c) => c.$method($($args),*).await,
        }
    };
}

/// An `UpstreamClient` backed by a live `turbomcp-client` connection over
/// one of the transports spec §1 treats as an external collaborator.
#[derive(Clone)]
pub struct TurbomcpUpstreamClient {
    server_name: String,
    client: AnyClient,
}

impl TurbomcpUpstreamClient {
    /// Connect to an upstream server and perform the MCP handshake.
    pub async fn connect(
        server_name: impl Into<String>,
        transport: UpstreamTransport,
    ) -> ProxyResult<Self> {
        let server_name = server_name.into();
        let client = match transport {
            UpstreamTransport::Stdio {
                command,
                args,
                working_dir,
            } => {
                let process_config = ChildProcessConfig {
                    command: command.clone(),
                    args: args.clone(),
                    working_directory: working_dir,
                    environment: None,
                    ..Default::default()
                };
                let transport = ChildProcessTransport::new(process_config);
                transport
                    .connect()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                debug!(server = %server_name, command = %command, "stdio upstream connected");
                let mut client = Client::new(transport);
                client
                    .initialize()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                AnyClient::Stdio(Arc::new(client))
            }
            UpstreamTransport::Http { url, auth_token } => {
                let http_config = StreamableHttpClientConfig {
                    base_url: url.clone(),
                    endpoint_path: "/mcp".to_string(),
                    timeout: std::time::Duration::from_secs(30),
                    auth_token,
                    ..Default::default()
                };
                let transport = StreamableHttpClientTransport::new(http_config);
                transport
                    .connect()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                debug!(server = %server_name, %url, "http upstream connected");
                let mut client = Client::new(transport);
                client
                    .initialize()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                AnyClient::Http(Arc::new(client))
            }
            UpstreamTransport::Tcp { host, port } => {
                let addr = format!("{host}:{port}")
                    .parse::<SocketAddr>()
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                let local: SocketAddr = "127.0.0.1:0".parse().expect("valid socket addr literal");
                let transport = TcpTransport::new_client(local, addr);
                transport
                    .connect()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                debug!(server = %server_name, %host, port, "tcp upstream connected");
                let mut client = Client::new(transport);
                client
                    .initialize()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                AnyClient::Tcp(Arc::new(client))
            }
            UpstreamTransport::Unix { path } => {
                let transport = UnixTransport::new_client(PathBuf::from(&path));
                transport
                    .connect()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                debug!(server = %server_name, %path, "unix upstream connected");
                let mut client = Client::new(transport);
                client
                    .initialize()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                AnyClient::Unix(Arc::new(client))
            }
            UpstreamTransport::WebSocket { url } => {
                let ws_config = WebSocketBidirectionalConfig {
                    url: Some(url.clone()),
                    ..Default::default()
                };
                let transport = WebSocketBidirectionalTransport::new(ws_config)
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                debug!(server = %server_name, %url, "websocket upstream connected");
                let mut client = Client::new(transport);
                client
                    .initialize()
                    .await
                    .map_err(|e| MusterError::upstream_failure(&server_name, e.to_string()))?;
                AnyClient::WebSocket(Arc::new(client))
            }
        };

        Ok(Self { server_name, client })
    }

    // TODO: forward `bearer` as a per-call Authorization header once
    // `StreamableHttpClientTransport` exposes a hook for it; today's
    // `Client<T>`/`StreamableHttpClientConfig` only set `auth_token` once,
    // at connect time, with no per-request override.
    fn note_bearer(&self, bearer: Option<&str>) {
        if bearer.is_some() {
            debug!(server = %self.server_name, "per-session bearer resolved for this call");
        }
    }
}

#[async_trait]
impl UpstreamClient for TurbomcpUpstreamClient {
    async fn list_tools(&self) -> ProxyResult<Vec<Tool>> {
        dispatch_client!(&self.client, list_tools())
            .map_err(|e| MusterError::upstream_failure(&self.server_name, e.to_string()))
    }

    async fn list_resources(&self) -> ProxyResult<Vec<Resource>> {
        dispatch_client!(&self.client, list_resources())
            .map_err(|e| MusterError::upstream_failure(&self.server_name, e.to_string()))
    }

    async fn list_prompts(&self) -> ProxyResult<Vec<Prompt>> {
        dispatch_client!(&self.client, list_prompts())
            .map_err(|e| MusterError::upstream_failure(&self.server_name, e.to_string()))
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<HashMap<String, Value>>,
        bearer: Option<&str>,
    ) -> ProxyResult<Value> {
        self.note_bearer(bearer);
        dispatch_client!(&self.client, call_tool(name, arguments))
            .map_err(|e| MusterError::upstream_failure(&self.server_name, e.to_string()))
    }

    async fn read_resource(&self, uri: &str, bearer: Option<&str>) -> ProxyResult<ReadResourceResult> {
        self.note_bearer(bearer);
        dispatch_client!(&self.client, read_resource(uri))
            .map_err(|e| MusterError::upstream_failure(&self.server_name, e.to_string()))
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<PromptInput>,
        bearer: Option<&str>,
    ) -> ProxyResult<GetPromptResult> {
        self.note_bearer(bearer);
        dispatch_client!(&self.client, get_prompt(name, arguments))
            .map_err(|e| MusterError::upstream_failure(&self.server_name, e.to_string()))
    }

    async fn ping(&self) -> ProxyResult<()> {
        dispatch_client!(&self.client, ping())
            .map(|_| ())
            .map_err(|e| MusterError::upstream_failure(&self.server_name, e.to_string()))
    }
}
