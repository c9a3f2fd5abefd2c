//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, stdio: bool) -> Result<()> {
    let db = open_db(db_path)?;

    if stdio {
        // stdout belongs to the protocol from here on
        return sanctuary_server::serve_stdio(db)
            .await
            .context("MCP stdio server failed");
    }

    println!("🚀 Starting Sanctuary MCP server...");
    println!("   Database: {}", db_path.display());
    println!("   Endpoint: http://{}:{}/mcp", host, port);
    println!();
    println!("   Press Ctrl+C to stop");

    sanctuary_server::start_mcp_server(db, host, port)
        .await
        .context("MCP server failed")
}
