//! JSON-lines tool host: one request object per input line, one response
//! object per output line, answered in order.

use crate::error::AgentResult;
use crate::tools::{failure, ToolRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Reserved tool name returning the tool definitions
pub const LIST_TOOLS: &str = "list_tools";

/// A tool call as sent by the agent runtime
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Result of one tool call
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    pub id: Option<Value>,
    pub tool: Option<String>,
    pub result: Value,
}

/// Answer one request line
pub async fn handle_line(registry: &ToolRegistry, line: &str) -> ToolResponse {
    let request: ToolRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            return ToolResponse {
                id: None,
                tool: None,
                result: failure(&format!("Malformed request: {}", e)),
            }
        }
    };

    debug!("Tool call: {}", request.tool);
    let result = if request.tool == LIST_TOOLS {
        json!({ "success": true, "tools": registry.definitions() })
    } else {
        registry.dispatch(&request.tool, request.arguments).await
    };

    ToolResponse {
        id: request.id,
        tool: Some(request.tool),
        result,
    }
}

/// Serve requests until the reader is exhausted; returns the number answered
pub async fn serve<R, W>(registry: &ToolRegistry, reader: R, mut writer: W) -> AgentResult<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(registry, &line).await;
        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
        answered += 1;
    }

    info!("Input closed after {} requests", answered);
    Ok(answered)
}
