//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Stdout carries protocol messages only; all logging goes to stderr.

use super::handlers::dispatch;
use super::helpers::rpc_error;
use super::models::JsonRpcRequest;
use crate::state::AppState;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Serves requests read from `reader` until EOF, writing one response line
/// per request to `writer`. Notifications get no reply.
///
/// # Errors
///
/// Returns the underlying I/O error if reading or writing fails.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(req) if req.is_notification() => {
                dispatch(state, req).await;
                continue;
            }
            Ok(req) => dispatch(state, req).await,
            Err(e) => {
                tracing::warn!(error = %e, "JSON parse error");
                rpc_error(Value::Null, -32700, "Parse error")
            }
        };

        let mut out = response.to_string();
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
    }

    tracing::info!("stdin closed, stopping stdio transport");
    Ok(())
}

/// Runs the stdio transport on the process's stdin and stdout.
///
/// # Errors
///
/// Returns the underlying I/O error if stdin or stdout fails.
pub async fn serve_stdio(state: &AppState) -> std::io::Result<()> {
    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    serve(state, reader, tokio::io::stdout()).await
}
