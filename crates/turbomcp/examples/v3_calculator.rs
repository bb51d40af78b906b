//! v3 Pristine Architecture Example - Calculator Server
//!
//! This example demonstrates the v3 architecture with zero-boilerplate macros.
//!
//! Features demonstrated:
//! - `#[server]` macro generates `McpHandler` trait implementation
//! - `#[tool]` attributes extract schemas from function signatures
//! - Transport-agnostic design (same code works on WASM and native)
//!
//! # Running
//!
//! ```bash
//! cargo run --example v3_calculator --features stdio
//! ```
//!
//! # Testing with CLI
//!
//! ```bash
//! # Initialize (MCP spec requires clientInfo)
//! echo '{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-11-25","clientInfo":{"name":"cli","version":"1.0"},"capabilities":{}}}' | cargo run --example v3_calculator --features stdio
//! echo '{"jsonrpc":"2.0","id":2,"method":"tools/list"}' | cargo run --example v3_calculator --features stdio
//! echo '{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"add","arguments":{"a":5,"b":3}}}' | cargo run --example v3_calculator --features stdio
//! ```

use turbomcp::prelude::*;

/// A simple calculator server demonstrating v3 pristine architecture.
#[derive(Clone)]
struct Calculator;

#[server(
    name = "v3-calculator",
    version = "1.0.0",
    description = "A pristine v3 calculator"
)]
impl Calculator {
    /// Add two numbers together.
    #[tool]
    async fn add(&self, a: i64, b: i64) -> i64 {
        a + b
    }

    /// Subtract b from a.
    #[tool]
    async fn subtract(&self, a: i64, b: i64) -> i64 {
        a - b
    }

    /// Multiply two numbers.
    #[tool]
    async fn multiply(&self, a: i64, b: i64) -> i64 {
        a * b
    }

    /// Greet someone by name.
    #[tool]
    async fn greet(&self, name: String) -> String {
        format!("Hello, {}!", name)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    tracing::info!("Starting v3 Calculator Server...");

    // Run the server on STDIO transport
    // The #[server] macro generates the McpHandler implementation
    // which provides run_stdio(), run_http(), run_tcp(), etc.
    Calculator.run_stdio().await?;

    Ok(())
}
