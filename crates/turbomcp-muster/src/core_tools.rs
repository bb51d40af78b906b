//! In-process "management" tool providers, multiplexed into the same
//! exposed catalog as upstream-derived tools under disciplined naming
//! rules (spec §4.F).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use turbomcp_protocol::types::{ContentBlock, TextContent, ToolInputSchema};

use crate::error::ProxyResult;

/// Management-pattern prefixes that route to the `core_` namespace.
///
/// This spec adopts the broader, second of two near-duplicate lists found
/// in the system this core was distilled from (`service_`, `serviceclass_`,
/// `mcpserver_`, `workflow_`, `config_`, `events`, `auth_`) rather than the
/// narrower one that also included `capability_`, `mcp_`, `api_` — see
/// DESIGN.md for the resolved open question.
const MANAGEMENT_PATTERNS: &[&str] = &[
    "service_",
    "serviceclass_",
    "mcpserver_",
    "workflow_",
    "config_",
    "events",
    "auth_",
];

const ACTION_PATTERN: &str = "action_";

/// One argument of an in-process provider tool.
#[derive(Debug, Clone)]
pub struct ToolArg {
    pub name: String,
    pub arg_type: String,
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<Value>,
    /// A richer schema fragment, if the provider has one; takes precedence
    /// over `arg_type`/`description` when building the JSON-Schema object
    /// (description from metadata still overrides schema description).
    pub schema: Option<Value>,
}

/// Metadata for one tool exposed by a `ToolProvider`.
#[derive(Debug, Clone)]
pub struct ProviderTool {
    pub name: String,
    pub description: Option<String>,
    pub args: Vec<ToolArg>,
}

/// The result of executing a provider tool.
#[derive(Debug, Clone)]
pub struct ProviderToolResult {
    pub content: Vec<Value>,
    pub is_error: bool,
}

/// An in-process "management" tool source — the abstract counterpart to an
/// upstream MCP server, for built-in tools that never leave this process.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    fn get_tools(&self) -> Vec<ProviderTool>;
    async fn execute(
        &self,
        original_name: &str,
        args: HashMap<String, Value>,
    ) -> ProxyResult<ProviderToolResult>;
}

/// Category this tool's name falls into under spec §4.F's prefix rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Management,
    Action,
    Plain,
}

fn categorize(name: &str) -> Category {
    if MANAGEMENT_PATTERNS.iter().any(|p| name.starts_with(p)) {
        Category::Management
    } else if name.starts_with(ACTION_PATTERN) {
        Category::Action
    } else {
        Category::Plain
    }
}

/// Apply spec §4.F's deterministic category prefixing to a provider tool
/// name, given the configured muster prefix.
pub fn exposed_core_tool_name(name: &str, muster_prefix: &str) -> String {
    match categorize(name) {
        Category::Management => format!("core_{name}"),
        Category::Action => format!("workflow_{}", name.strip_prefix(ACTION_PATTERN).unwrap_or(name)),
        Category::Plain => format!("{muster_prefix}_{name}"),
    }
}

/// Convert one provider argument into a JSON-Schema property value.
fn arg_to_schema_property(arg: &ToolArg) -> Value {
    if let Some(schema) = &arg.schema {
        let mut schema = schema.clone();
        if let (Some(desc), Some(obj)) = (&arg.description, schema.as_object_mut()) {
            obj.insert("description".to_string(), Value::String(desc.clone()));
        }
        return schema;
    }
    let mut obj = serde_json::Map::new();
    obj.insert("type".to_string(), Value::String(arg.arg_type.clone()));
    if let Some(desc) = &arg.description {
        obj.insert("description".to_string(), Value::String(desc.clone()));
    }
    if let Some(default) = &arg.default {
        obj.insert("default".to_string(), default.clone());
    }
    Value::Object(obj)
}

/// Build the full JSON-Schema input-schema object for a provider tool.
fn build_input_schema(tool: &ProviderTool) -> ToolInputSchema {
    let mut properties = HashMap::new();
    let mut required = Vec::new();
    for arg in &tool.args {
        properties.insert(arg.name.clone(), arg_to_schema_property(arg));
        if arg.required {
            required.push(arg.name.clone());
        }
    }
    ToolInputSchema {
        schema_type: "object".to_string(),
        properties: if properties.is_empty() { None } else { Some(properties) },
        required: if required.is_empty() { None } else { Some(required) },
        additional_properties: None,
    }
}

struct Registered {
    provider: Arc<dyn ToolProvider>,
    exposed_name: String,
    original_name: String,
    input_schema: ToolInputSchema,
    description: Option<String>,
}

/// Enumerates the registered in-process `ToolProvider`s, prefixes their
/// tools with the category rules, and wraps them in MCP-shaped handlers.
pub struct CoreToolMux {
    muster_prefix: String,
    providers: Vec<Arc<dyn ToolProvider>>,
}

impl CoreToolMux {
    pub fn new(muster_prefix: impl Into<String>) -> Self {
        Self {
            muster_prefix: muster_prefix.into(),
            providers: Vec::new(),
        }
    }

    pub fn register_provider(&mut self, provider: Arc<dyn ToolProvider>) {
        self.providers.push(provider);
    }

    fn registered_tools(&self) -> Vec<Registered> {
        let mut out = Vec::new();
        for provider in &self.providers {
            for tool in provider.get_tools() {
                let exposed_name = exposed_core_tool_name(&tool.name, &self.muster_prefix);
                out.push(Registered {
                    provider: provider.clone(),
                    exposed_name,
                    original_name: tool.name.clone(),
                    input_schema: build_input_schema(&tool),
                    description: tool.description.clone(),
                });
            }
        }
        out
    }

    /// The exposed names of every tool currently offered by registered
    /// providers, for union into the reconciler's desired set.
    pub fn exposed_tool_names(&self) -> Vec<String> {
        self.registered_tools()
            .into_iter()
            .map(|r| r.exposed_name)
            .collect()
    }

    /// `(exposed_name, original_name)` for every tool currently offered, so
    /// a caller can mirror the mapping into a `NameTracker`.
    pub fn exposed_tool_pairs(&self) -> Vec<(String, String)> {
        self.registered_tools()
            .into_iter()
            .map(|r| (r.exposed_name, r.original_name))
            .collect()
    }

    /// True if `exposed_name` belongs to a currently-registered provider.
    pub fn handles(&self, exposed_name: &str) -> bool {
        self.registered_tools()
            .iter()
            .any(|r| r.exposed_name == exposed_name)
    }

    /// Input schema for an already-computed exposed name, if any provider
    /// currently offers it.
    pub fn input_schema_for(&self, exposed_name: &str) -> Option<ToolInputSchema> {
        self.registered_tools()
            .into_iter()
            .find(|r| r.exposed_name == exposed_name)
            .map(|r| r.input_schema)
    }

    /// Description for an already-computed exposed name.
    pub fn description_for(&self, exposed_name: &str) -> Option<String> {
        self.registered_tools()
            .into_iter()
            .find(|r| r.exposed_name == exposed_name)
            .and_then(|r| r.description)
    }

    /// Invoke the provider tool behind an exposed name, converting its
    /// result into MCP content blocks (non-string elements become JSON
    /// text blocks).
    pub async fn execute(
        &self,
        exposed_name: &str,
        args: HashMap<String, Value>,
    ) -> ProxyResult<(Vec<ContentBlock>, bool)> {
        let registered = self
            .registered_tools()
            .into_iter()
            .find(|r| r.exposed_name == exposed_name)
            .ok_or_else(|| crate::error::MusterError::unknown_name(exposed_name))?;

        let result = registered
            .provider
            .execute(&registered.original_name, args)
            .await?;

        let content = result
            .content
            .into_iter()
            .map(|value| match value {
                Value::String(text) => ContentBlock::Text(TextContent {
                    text,
                    annotations: None,
                    meta: None,
                }),
                other => ContentBlock::Text(TextContent {
                    text: other.to_string(),
                    annotations: None,
                    meta: None,
                }),
            })
            .collect();

        Ok((content, result.is_error))
    }
}
