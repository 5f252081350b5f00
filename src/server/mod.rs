//! Tool server
//!
//! Speaks newline-delimited JSON-RPC 2.0 so any MCP host can list and call
//! the gateway's tools and read the UI resource. Each request runs on its own
//! task; responses funnel through a single writer so lines never interleave.

pub mod protocol;

use crate::error::{Error, Result};
use crate::gateway::{Gateway, resource_descriptors, tool_descriptors};
use protocol::{
    INVALID_REQUEST, JSONRPC_VERSION, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    LATEST_PROTOCOL_VERSION, PARSE_ERROR,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Name reported in `initialize`
pub const SERVER_NAME: &str = "GitHub PR Server";

#[derive(Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct ReadResourceParams {
    uri: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    #[serde(default)]
    protocol_version: Option<String>,
}

fn parse_params<T: for<'de> Deserialize<'de>>(
    method: &str,
    params: Value,
) -> std::result::Result<T, JsonRpcError> {
    serde_json::from_value(params)
        .map_err(|e| Error::InvalidArgument(format!("{method}: {e}")).into())
}

/// Request tasks still running; finished ones are reaped on every spawn
#[derive(Default)]
struct RequestTasks {
    set: JoinSet<()>,
}

impl RequestTasks {
    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.set.spawn(task);
        while let Some(joined) = self.set.try_join_next() {
            reap(joined);
        }
    }

    fn len(&self) -> usize {
        self.set.len()
    }

    async fn drain(&mut self) {
        while let Some(joined) = self.set.join_next().await {
            reap(joined);
        }
    }
}

fn reap(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        warn!(error = %e, "request task failed");
    }
}

/// JSON-RPC front end over a [`Gateway`]
pub struct ToolServer {
    gateway: Gateway,
}

impl ToolServer {
    /// Create a server exposing `gateway`
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Handle one incoming line.
    ///
    /// Returns the serialized response, or `None` for notifications and for
    /// stray responses from the client.
    pub async fn handle_message(&self, line: &str) -> Option<String> {
        let response = self.handle_value(line).await?;
        match serde_json::to_string(&response) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "failed to serialize response");
                None
            }
        }
    }

    async fn handle_value(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(PARSE_ERROR, format!("parse error: {e}")),
                ));
            }
        };

        // Responses to requests we never send; nothing to answer
        if value.get("method").is_none()
            && (value.get("result").is_some() || value.get("error").is_some())
        {
            debug!("ignoring client response");
            return None;
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::new(INVALID_REQUEST, format!("invalid request: {e}")),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::new(
                    INVALID_REQUEST,
                    format!("unsupported jsonrpc version {}", request.jsonrpc),
                ),
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        Some(match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                debug!(method = %request.method, code = error.code, message = %error.message, "request failed");
                JsonRpcResponse::failure(id, error)
            }
        })
    }

    async fn dispatch(&self, method: &str, params: Value) -> std::result::Result<Value, JsonRpcError> {
        match method {
            "initialize" => {
                let params: InitializeParams = if params.is_null() {
                    InitializeParams {
                        protocol_version: None,
                    }
                } else {
                    parse_params(method, params)?
                };
                let version = params
                    .protocol_version
                    .unwrap_or_else(|| LATEST_PROTOCOL_VERSION.to_string());
                info!(protocol_version = %version, "client initialized");
                Ok(json!({
                    "protocolVersion": version,
                    "capabilities": {
                        "tools": { "listChanged": false },
                        "resources": { "listChanged": false },
                    },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_descriptors() })),
            "tools/call" => {
                let params: CallToolParams = parse_params(method, params)?;
                let result = self.gateway.call_tool(&params.name, params.arguments).await?;
                serde_json::to_value(result).map_err(|e| Error::from(e).into())
            }
            "resources/list" => Ok(json!({ "resources": resource_descriptors() })),
            "resources/read" => {
                let params: ReadResourceParams = parse_params(method, params)?;
                Ok(self.gateway.ui_resource().read_contents(&params.uri).await?)
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    /// Serve requests from `reader`, writing responses to `writer`.
    ///
    /// Returns once the reader hits EOF and every in-flight request has been
    /// answered.
    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let server = Arc::new(self);
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer_task = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let mut requests = RequestTasks::default();
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let server = Arc::clone(&server);
            let tx = tx.clone();
            requests.spawn(async move {
                if let Some(response) = server.handle_message(&line).await
                    && tx.send(response).is_err()
                {
                    warn!("response dropped: writer closed");
                }
            });
        }

        debug!(in_flight = requests.len(), "input closed, draining in-flight requests");
        requests.drain().await;
        drop(tx);

        writer_task
            .await
            .map_err(|e| Error::Internal(format!("writer task failed: {e}")))??;
        Ok(())
    }
}

/// Serve on the process's stdin and stdout
pub async fn serve_stdio(server: ToolServer) -> Result<()> {
    info!("serving on stdio");
    server.serve(tokio::io::stdin(), tokio::io::stdout()).await
}
