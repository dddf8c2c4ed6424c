use rmcp::{ErrorData as McpError, ServerHandler, model::*};
use std::time::Instant;
use tracing::Instrument;

use crate::{
    app::dispatcher::Dispatcher,
    domain::{error::DispatchError, upstream::Upstream},
    infra::metrics,
};

const INSTRUCTIONS: &str = "Read-only access to the Moon Banking API: banks, bank votes, \
countries, stories and the world overview. Results are the API's JSON responses.";

/// MCP handler: `tools/list` returns the exposed catalog, `tools/call` goes
/// through the dispatcher. Every call failure is folded into an error-flagged
/// result so the host never sees a protocol fault for it.
pub struct BankingServer<U> {
    dispatcher: Dispatcher<U>,
}

impl<U> Clone for BankingServer<U> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<U: Upstream> BankingServer<U> {
    pub fn new(dispatcher: Dispatcher<U>) -> Self {
        Self { dispatcher }
    }

    pub fn list(&self) -> Vec<Tool> {
        self.dispatcher.registry().list()
    }

    /// Run one invocation to a tool result.
    pub async fn invoke(&self, request: CallToolRequestParam) -> CallToolResult {
        let call_id = uuid::Uuid::new_v4();
        let tool = request.name.to_string();
        let span = tracing::info_span!("call_tool", %call_id, tool = %tool);
        async move {
            tracing::info!("call_tool received");
            let _inflight = metrics::InflightGuard::new();
            let started = Instant::now();
            let outcome = self
                .dispatcher
                .dispatch(&tool, request.arguments.as_ref())
                .await;
            let elapsed = started.elapsed();
            match outcome {
                Ok(text) => {
                    metrics::record_call(&tool, "ok", elapsed);
                    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "call_tool success");
                    CallToolResult::success(vec![Content::text(text)])
                }
                Err(err) => {
                    // unknown names are not catalog entries; keep them out of labels
                    let label = match err {
                        DispatchError::UnknownTool(_) => "unknown",
                        _ => tool.as_str(),
                    };
                    metrics::record_call(label, err.kind(), elapsed);
                    tracing::warn!(kind = err.kind(), error = %err, "call_tool failed");
                    failure_result(&err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

pub fn failure_result(err: &DispatchError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error: {err}"))])
}

fn server_info(protocol_version: ProtocolVersion) -> ServerInfo {
    let capabilities = ServerCapabilities::builder().enable_tools().build();
    ServerInfo {
        protocol_version,
        capabilities,
        server_info: Implementation {
            name: "moon-banking-mcp".into(),
            title: Some("Moon Banking API".into()),
            version: env!("CARGO_PKG_VERSION").into(),
            icons: None,
            website_url: None,
        },
        instructions: Some(INSTRUCTIONS.into()),
    }
}

impl<U: Upstream> ServerHandler for BankingServer<U> {
    fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<InitializeResult, McpError>> + Send + '_ {
        tracing::info!(?request.client_info, %request.protocol_version, "initialize received");
        // echo the client's protocol version back
        let info = server_info(request.protocol_version);
        async move { Ok(info) }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.list();
        tracing::info!(count = tools.len(), "list_tools called");
        async move {
            Ok(ListToolsResult {
                tools,
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { Ok(self.invoke(request).await) }
    }

    fn get_info(&self) -> ServerInfo {
        server_info(ProtocolVersion::default())
    }
}
