//! Handler name validation - prevents injection attacks using `syn::Ident`
//!
//! Validates handler names are valid Rust identifiers, preventing:
//! - Path traversal (`../etc/passwd`)
//! - Injection attempts (`handler"; DROP TABLE`)
//! - Reserved keywords (`async`, `impl`)
//! - Reserved system names (`admin`, `initialize`)

use crate::ServerResult;

#[cfg(feature = "security")]
const RESERVED_HANDLER_NAMES: &[&str] = &[
    "initialize",
    "initialized",
    "shutdown",
    "ping",
    "pong",
    "health",
    "status",
    "admin",
    "root",
    "system",
    "sudo",
    "su",
    "superuser",
    "internal",
    "private",
    "protected",
    "__init__",
    "__main__",
];

#[cfg(feature = "security")]
const MAX_HANDLER_NAME_LENGTH: usize = 128;

/// Validate handler name: must be valid Rust identifier, not a keyword or reserved name
#[cfg(feature = "security")]
pub fn validate_handler_name(name: &str) -> ServerResult<()> {
    use crate::McpError;

    if name.is_empty() {
        return Err(McpError::handler(
            "Handler name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_HANDLER_NAME_LENGTH {
        return Err(McpError::handler(format!(
            "Handler name '{}...' exceeds maximum length of {} characters",
            &name[..50.min(name.len())],
            MAX_HANDLER_NAME_LENGTH
        )));
    }

    syn::parse_str::<syn::Ident>(name).map_err(|e| {
        McpError::handler(format!(
            "Invalid handler name '{}': {} (must be valid Rust identifier)",
            name, e
        ))
    })?;

    if RESERVED_HANDLER_NAMES.contains(&name) {
        return Err(McpError::handler(format!(
            "Handler name '{}' is reserved for system use",
            name
        )));
    }

    Ok(())
}

/// No-op when security feature disabled (empty check only)
#[cfg(not(feature = "security"))]
pub fn validate_handler_name(name: &str) -> ServerResult<()> {
    use crate::McpError;

    if name.is_empty() {
        return Err(McpError::handler(
            "Handler name cannot be empty".to_string(),
        ));
    }

    Ok(())
}
