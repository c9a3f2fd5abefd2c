//! MCP (Model Context Protocol) Server for Sanctuary
//!
//! Exposes the journal to LLMs via MCP tools, so an agent can record its own
//! interactions and ritual outcomes and ask for patterns across them.
//!
//! # Transports
//!
//! - Streamable HTTP at `http://<host>:<port>/mcp`, for local network clients
//! - stdio, for clients that spawn the server as a subprocess
//!
//! # Example
//!
//! ```bash
//! sanctuary serve --port 3001
//! sanctuary serve --stdio
//! ```
//!
//! # Available Tools
//!
//! - `log_interaction` - Record an encounter with a familiar
//! - `log_ritual` - Record the outcome of a ritual
//! - `get_interactions` - List interactions by model and time range
//! - `get_rituals` - List ritual outcomes by model and time range
//! - `get_insights` - Patterns across the whole journal
//! - `query_emotions_by_model` - Emotion counts per model
//! - `query_ritual_insights` - Patterns for a single ritual

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use sanctuary_core::db::Database;
use sanctuary_core::tools::{
    self, EntryFilterParams, LogInteractionParams, LogRitualParams, RitualInsightsParams,
};

/// Sanctuary MCP Server state
#[derive(Clone)]
pub struct SanctuaryMcpServer {
    /// Database handle (wrapped for thread-safe access)
    db: Arc<Mutex<Database>>,
    /// Tool router for MCP operations
    tool_router: ToolRouter<Self>,
}

impl SanctuaryMcpServer {
    /// Create a new MCP server with the given database
    pub fn new(db: Database) -> Self {
        Self::with_shared(Arc::new(Mutex::new(db)))
    }

    /// Create a server that shares a database handle with other sessions
    pub fn with_shared(db: Arc<Mutex<Database>>) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    /// Get database access for tool implementations
    pub(crate) async fn db(&self) -> tokio::sync::MutexGuard<'_, Database> {
        self.db.lock().await
    }
}

/// Convert a tool outcome into an MCP result with pretty-printed JSON text
fn into_tool_result<T: Serialize>(
    tool_name: &str,
    result: sanctuary_core::Result<T>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            debug!(tool = tool_name, "Tool call succeeded");
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(e) if e.is_validation() => {
            debug!(tool = tool_name, error = %e, "Tool call rejected");
            Err(McpError::invalid_params(e.to_string(), None))
        }
        Err(e) => Err(McpError::internal_error(e.to_string(), None)),
    }
}

#[tool_handler]
impl ServerHandler for SanctuaryMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sanctuary".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Sanctuary Journal".to_string()),
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "Sanctuary is a journal of interactions with familiars and ritual outcomes, \
                 each tagged with emotions. Use the log tools to record entries, the get tools \
                 to read them back, and the insight tools to surface emotional and ritual patterns."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl SanctuaryMcpServer {
    /// Record an interaction with a familiar
    #[tool(
        description = "Log an interaction with a familiar. Emotions are {name, intensity} with intensity between 0 and 1. Returns the new entry id."
    )]
    async fn log_interaction(
        &self,
        Parameters(params): Parameters<LogInteractionParams>,
    ) -> Result<CallToolResult, McpError> {
        let db = self.db().await;
        into_tool_result("log_interaction", tools::log_interaction(&db, params))
    }

    /// Record the outcome of a ritual
    #[tool(
        description = "Log the outcome of a ritual, including whether it succeeded and the emotions felt. Returns the new entry id."
    )]
    async fn log_ritual(
        &self,
        Parameters(params): Parameters<LogRitualParams>,
    ) -> Result<CallToolResult, McpError> {
        let db = self.db().await;
        into_tool_result("log_ritual", tools::log_ritual(&db, params))
    }

    /// List interactions
    #[tool(
        description = "List logged interactions, optionally filtered by model and an inclusive time range. Oldest entries first."
    )]
    async fn get_interactions(
        &self,
        Parameters(params): Parameters<EntryFilterParams>,
    ) -> Result<CallToolResult, McpError> {
        let db = self.db().await;
        into_tool_result("get_interactions", tools::get_interactions(&db, params))
    }

    /// List ritual outcomes
    #[tool(
        description = "List logged ritual outcomes, optionally filtered by model and an inclusive time range. Oldest entries first."
    )]
    async fn get_rituals(
        &self,
        Parameters(params): Parameters<EntryFilterParams>,
    ) -> Result<CallToolResult, McpError> {
        let db = self.db().await;
        into_tool_result("get_rituals", tools::get_rituals(&db, params))
    }

    /// Insights over the whole journal
    #[tool(
        description = "Generate insights across all entries: most frequent emotions, ritual success rate, the model with the broadest emotional range, and emotions linked to successful rituals."
    )]
    async fn get_insights(&self) -> Result<CallToolResult, McpError> {
        let db = self.db().await;
        into_tool_result("get_insights", tools::get_insights(&db))
    }

    /// Emotion counts per model
    #[tool(
        description = "Count emotions per model across all entries. Entries without a model are grouped under 'unknown'."
    )]
    async fn query_emotions_by_model(&self) -> Result<CallToolResult, McpError> {
        let db = self.db().await;
        into_tool_result(
            "query_emotions_by_model",
            tools::query_emotions_by_model(&db),
        )
    }

    /// Insights for one ritual
    #[tool(
        description = "Generate insights for a single ritual by exact name, optionally limited to one model. Returns an empty list when no outcomes match."
    )]
    async fn query_ritual_insights(
        &self,
        Parameters(params): Parameters<RitualInsightsParams>,
    ) -> Result<CallToolResult, McpError> {
        let db = self.db().await;
        into_tool_result(
            "query_ritual_insights",
            tools::query_ritual_insights(&db, params),
        )
    }
}

/// Start the MCP server over streamable HTTP on the given host and port
pub async fn start_mcp_server(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
    use rmcp::transport::streamable_http_server::StreamableHttpService;

    info!("Starting MCP server at http://{}:{}/mcp", host, port);

    // Every session shares one database handle
    let shared = Arc::new(Mutex::new(db));
    let service = StreamableHttpService::new(
        move || Ok(SanctuaryMcpServer::with_shared(shared.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("MCP server ready at http://{}/mcp", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            // Wait for shutdown signal
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}

/// Serve MCP over stdin/stdout until the client disconnects
///
/// stdout carries the protocol, so logging must already go to stderr.
pub async fn serve_stdio(db: Database) -> anyhow::Result<()> {
    use rmcp::ServiceExt;

    info!("Starting MCP server on stdio");

    let service = SanctuaryMcpServer::new(db)
        .serve(rmcp::transport::stdio())
        .await?;
    service.waiting().await?;

    info!("MCP stdio session ended");
    Ok(())
}

#[cfg(test)]
mod tests;
