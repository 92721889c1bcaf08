use std::process::Stdio;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use super::{JsonRpcMessage, JsonRpcRequest, ToolCallResult, PROTOCOL_VERSION};
use crate::error::{McpError, McpResult};

/// How long a server may take to exit after its stdin is closed before it
/// is killed.
pub const DEFAULT_CLOSE_GRACE: Duration = Duration::from_secs(2);

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i32 = -32601;

/// How to launch an MCP server process.
#[derive(Debug, Clone, PartialEq)]
pub struct McpServerParams {
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the child, e.g. the fact-check credential.
    pub env: Vec<(String, String)>,
}

impl McpServerParams {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// A live connection to one MCP server child process.
///
/// The child is spawned with `kill_on_drop`, so dropping the session on any
/// path (error, timeout cancellation) terminates it. [`McpSession::close`]
/// shuts it down within a bounded grace period.
pub struct McpSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    timeout: Duration,
}

impl McpSession {
    /// Spawn the server and complete the initialize handshake.
    ///
    /// `timeout` bounds the handshake and every later request.
    pub async fn connect(params: &McpServerParams, timeout: Duration) -> McpResult<Self> {
        let mut child = Command::new(&params.command)
            .args(&params.args)
            .envs(params.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| McpError::Spawn {
                command: params.command.clone(),
                message: e.to_string(),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| McpError::Protocol {
            message: "child stdin unavailable".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| McpError::Protocol {
            message: "child stdout unavailable".to_string(),
        })?;

        let mut session = Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            timeout,
        };
        session.initialize().await?;

        info!(command = %params.command, "MCP tool server connected");
        Ok(session)
    }

    async fn initialize(&mut self) -> McpResult<()> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        self.request("initialize", params).await?;
        self.send(&JsonRpcRequest::notification("notifications/initialized", None))
            .await
    }

    /// Call a tool and return its text content.
    ///
    /// A result flagged `isError` is reported as [`McpError::Tool`].
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> McpResult<String> {
        let result = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        let result: ToolCallResult = serde_json::from_value(result)?;
        let text = result.text();

        if result.is_error {
            return Err(McpError::Tool {
                tool: name.to_string(),
                message: text,
            });
        }
        debug!(tool = %name, chars = text.len(), "MCP tool call returned");
        Ok(text)
    }

    /// Close stdin and wait up to `grace` for the server to exit, then kill
    /// it. Returns once the child has been reaped.
    pub async fn close(mut self, grace: Duration) -> McpResult<()> {
        drop(self.stdin.take());
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(status = %status, "MCP tool server exited");
            }
            Err(_) => {
                warn!(
                    grace_ms = grace.as_millis() as u64,
                    "MCP tool server did not exit, killing it"
                );
                self.child.kill().await?;
            }
        }
        Ok(())
    }

    async fn request(&mut self, method: &str, params: Value) -> McpResult<Value> {
        let id = self.next_id;
        self.next_id += 1;

        self.send(&JsonRpcRequest::new(id, method, params)).await?;

        let timeout_ms = self.timeout.as_millis() as u64;
        tokio::time::timeout(self.timeout, self.read_response(id))
            .await
            .map_err(|_| McpError::Timeout {
                operation: method.to_string(),
                timeout_ms,
            })?
    }

    async fn read_response(&mut self, id: u64) -> McpResult<Value> {
        loop {
            let line = self.stdout.next_line().await?.ok_or(McpError::Closed)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let message: JsonRpcMessage = match serde_json::from_str(trimmed) {
                Ok(m) => m,
                Err(e) => {
                    // Servers sometimes print banners on stdout
                    debug!(error = %e, line = %trimmed, "Skipping non JSON-RPC line");
                    continue;
                }
            };

            if message.is_response_to(id) {
                if let Some(error) = message.error {
                    return Err(McpError::Protocol {
                        message: format!("{} (code {})", error.message, error.code),
                    });
                }
                return Ok(message.result.unwrap_or(Value::Null));
            }

            // Server-initiated requests need a reply; notifications do not.
            if let (Some(method), Some(request_id)) = (message.method.as_deref(), message.id) {
                let reply = server_request_reply(method, request_id);
                self.write_line(&reply.to_string()).await?;
            }
        }
    }

    async fn send(&mut self, request: &JsonRpcRequest) -> McpResult<()> {
        let line = serde_json::to_string(request)?;
        self.write_line(&line).await
    }

    async fn write_line(&mut self, line: &str) -> McpResult<()> {
        let stdin = self.stdin.as_mut().ok_or(McpError::Closed)?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }
}

/// Reply to a request the server sent us while we wait for a response.
fn server_request_reply(method: &str, id: Value) -> Value {
    match method {
        "ping" => json!({ "jsonrpc": "2.0", "id": id, "result": {} }),
        "roots/list" => json!({ "jsonrpc": "2.0", "id": id, "result": { "roots": [] } }),
        other => {
            debug!(method = %other, "Rejecting unsupported server request");
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": METHOD_NOT_FOUND, "message": format!("Method not found: {}", other) }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_request_replies() {
        let ping = server_request_reply("ping", json!("srv-1"));
        assert_eq!(ping["id"], "srv-1");
        assert_eq!(ping["result"], json!({}));

        let roots = server_request_reply("roots/list", json!(7));
        assert_eq!(roots["result"]["roots"], json!([]));

        let unknown = server_request_reply("sampling/createMessage", json!(8));
        assert_eq!(unknown["id"], 8);
        assert_eq!(unknown["error"]["code"], METHOD_NOT_FOUND);
        assert!(unknown.get("result").is_none());
    }

    #[test]
    fn test_server_params_builder() {
        let params = McpServerParams::new("npx", vec!["-y".into(), "server-perplexity-ask".into()])
            .with_env("PERPLEXITY_API_KEY", "pplx-test");
        assert_eq!(params.command, "npx");
        assert_eq!(params.args.len(), 2);
        assert_eq!(
            params.env,
            vec![("PERPLEXITY_API_KEY".to_string(), "pplx-test".to_string())]
        );
    }

    #[tokio::test]
    async fn test_connect_missing_binary_is_spawn_error() {
        let params = McpServerParams::new("definitely-not-a-real-mcp-server-binary", vec![]);
        let result = McpSession::connect(&params, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(McpError::Spawn { .. })));
    }
}
