//! JSON-lines command boundary: one `GatewayRequest` per input line, one
//! `WireResponse` per output line.

use anyhow::Context;
use gateway::CommandInvoker;
use shared::protocol::{GatewayRequest, WireResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

pub async fn handle_line(invoker: &dyn CommandInvoker, line: &str) -> WireResponse {
    let request = match serde_json::from_str::<GatewayRequest>(line) {
        Ok(request) => request,
        Err(error) => return WireResponse::Error(format!("invalid request: {error}")),
    };
    debug!(command = request.command_name(), "serving request");
    invoker.invoke(request).await.into()
}

pub async fn serve_lines<R, W>(
    invoker: &dyn CommandInvoker,
    reader: R,
    mut writer: W,
) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut served = 0;
    while let Some(line) = lines.next_line().await.context("failed to read request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = handle_line(invoker, line).await;
        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        writer
            .write_all(encoded.as_bytes())
            .await
            .context("failed to write response")?;
        writer.flush().await?;
        served += 1;
    }
    info!(served, "request stream closed");
    Ok(served)
}

#[cfg(test)]
#[path = "tests/serve_tests.rs"]
mod tests;
