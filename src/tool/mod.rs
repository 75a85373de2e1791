// src/tool/mod.rs

//! Line-delimited JSON-RPC 2.0 over stdio, speaking the tool subset of the
//! Model Context Protocol. Requests are handled one at a time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::{
    fetch::{run_query, AdminerClient},
    outcome::QueryOutcome,
};

pub const SERVER_NAME: &str = "padma-mssql";
pub const TOOL_NAME: &str = "run_raw_mssql_query_via_adminer";
const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Something that can execute a SQL query and report the outcome.
#[allow(async_fn_in_trait)]
pub trait QueryRunner {
    async fn run(&self, query: &str) -> QueryOutcome;
}

impl QueryRunner for AdminerClient {
    async fn run(&self, query: &str) -> QueryOutcome {
        run_query(self, query).await
    }
}

/// A runner that could not be set up reports its setup error on every call,
/// so the server still answers `initialize` and `tools/list`.
impl<R: QueryRunner> QueryRunner for Result<R> {
    async fn run(&self, query: &str) -> QueryOutcome {
        match self {
            Ok(runner) => runner.run(query).await,
            Err(e) => {
                warn!(error = %e, "query runner unavailable");
                QueryOutcome::from_error(e)
            }
        }
    }
}

#[derive(Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
}

impl RpcResponse {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

pub struct ToolServer<R> {
    runner: R,
}

impl<R: QueryRunner> ToolServer<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Serve requests from stdin until it closes.
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    pub async fn serve<I, O>(&self, input: I, mut output: O) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        info!(server = SERVER_NAME, "tool server ready");
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("reading request")? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(reply) = self.handle_line(&line).await {
                output
                    .write_all(reply.as_bytes())
                    .await
                    .context("writing response")?;
                output.write_all(b"\n").await.context("writing response")?;
                output.flush().await.context("flushing response")?;
            }
        }
        info!("input closed, shutting down");
        Ok(())
    }

    /// Handle one JSON-RPC message; notifications get no reply.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<RpcRequest>(line) {
            Ok(req) => self.dispatch(req).await?,
            Err(e) => {
                warn!(error = %e, "unparseable request");
                RpcResponse::err(Value::Null, PARSE_ERROR, format!("Parse error: {}", e))
            }
        };
        match serde_json::to_string(&response) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "failed to encode response");
                None
            }
        }
    }

    async fn dispatch(&self, req: RpcRequest) -> Option<RpcResponse> {
        let Some(id) = req.id else {
            debug!(method = %req.method, "notification");
            return None;
        };
        debug!(method = %req.method, "request");

        let response = match req.method.as_str() {
            "initialize" => RpcResponse::ok(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
                }),
            ),
            "ping" => RpcResponse::ok(id, json!({})),
            "tools/list" => RpcResponse::ok(id, json!({ "tools": [tool_descriptor()] })),
            "tools/call" => self.call_tool(id, req.params).await,
            other => RpcResponse::err(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
        };
        Some(response)
    }

    async fn call_tool(&self, id: Value, params: Value) -> RpcResponse {
        let call: CallParams = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return RpcResponse::err(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
        };
        if call.name != TOOL_NAME {
            return RpcResponse::err(id, INVALID_PARAMS, format!("Unknown tool: {}", call.name));
        }
        let args: QueryArgs = match serde_json::from_value(call.arguments) {
            Ok(a) => a,
            Err(e) => {
                return RpcResponse::err(id, INVALID_PARAMS, format!("Invalid arguments: {}", e))
            }
        };

        info!(query_len = args.query.len(), "running query");
        let outcome = self.runner.run(&args.query).await;
        RpcResponse::ok(
            id,
            json!({
                "content": [{ "type": "text", "text": outcome.render() }],
                "isError": outcome.is_failure(),
            }),
        )
    }
}

fn tool_descriptor() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Run MSSQL query on Padma MSSQL database via Adminer and extract results from HTML response.\n\nArgs:\n    query (str): Raw SQL query to execute\n\nReturns:\n    str: Extracted result content from div id \"content\"",
        "inputSchema": {
            "type": "object",
            "properties": { "query": { "type": "string", "title": "Query" } },
            "required": ["query"],
        },
    })
}
