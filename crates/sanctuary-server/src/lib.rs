//! Sanctuary MCP Server
//!
//! Serves the Sanctuary journal tools to LLM clients over the Model Context
//! Protocol, either as a streamable HTTP endpoint or over stdio.

pub mod mcp;

pub use mcp::{serve_stdio, start_mcp_server, SanctuaryMcpServer};
