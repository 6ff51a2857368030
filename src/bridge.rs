//! Newline-delimited JSON bridge between a host process and [`MarketSearch`].
//!
//! Each input line is a [`CommandEnvelope`]; each produces exactly one
//! [`ResponseEnvelope`] line on the output. Commands are handled in arrival
//! order. The bridge stops at end of input or after answering `host.stop`.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use cf1_search::{MarketSearch, OpportunityQuery};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{HostError, Result};

/// Current protocol version.
pub const PROTOCOL_VERSION: u32 = 1;

/// Commands understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "search")]
    Search,
    #[serde(rename = "cache.clear")]
    CacheClear,
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "host.stop")]
    HostStop,
}

impl CommandName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::CacheClear => "cache.clear",
            Self::HostPing => "host.ping",
            Self::HostStop => "host.stop",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "search" => Some(Self::Search),
            "cache.clear" => Some(Self::CacheClear),
            "host.ping" => Some(Self::HostPing),
            "host.stop" => Some(Self::HostStop),
            _ => None,
        }
    }
}

/// A command from the host.
///
/// `command` stays a string on the wire so an unknown command still gets
/// an error response carrying its request id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            request_id: request_id.into(),
            command: command.as_str().to_owned(),
            payload,
        }
    }

    /// Validate version and request id, and resolve the command name.
    pub fn validate(&self) -> Result<CommandName> {
        if self.v != PROTOCOL_VERSION {
            return Err(HostError::Protocol(format!(
                "unsupported protocol version {}; expected {PROTOCOL_VERSION}",
                self.v
            )));
        }
        if self.request_id.trim().is_empty() {
            return Err(HostError::Protocol("request_id cannot be empty".into()));
        }
        CommandName::parse(&self.command)
            .ok_or_else(|| HostError::Protocol(format!("unknown command: {}", self.command)))
    }
}

/// Reply to exactly one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            request_id: request_id.into(),
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            request_id: request_id.into(),
            ok: false,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Answer one command. The second value is `true` when the bridge should
/// stop after sending the response.
pub async fn handle(search: &MarketSearch, envelope: CommandEnvelope) -> (ResponseEnvelope, bool) {
    let command = match envelope.validate() {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(request_id = %envelope.request_id, error = %e, "rejected command");
            let id = if envelope.request_id.trim().is_empty() {
                "invalid-envelope"
            } else {
                envelope.request_id.as_str()
            };
            return (ResponseEnvelope::error(id, e.to_string()), false);
        }
    };
    tracing::debug!(request_id = %envelope.request_id, command = command.as_str(), "command");

    let id = envelope.request_id;
    match command {
        CommandName::Search => {
            let query: OpportunityQuery = match serde_json::from_value(envelope.payload) {
                Ok(query) => query,
                Err(e) => {
                    let err = HostError::Protocol(format!("invalid search payload: {e}"));
                    return (ResponseEnvelope::error(id, err.to_string()), false);
                }
            };
            let results = search.search(&query).await;
            let count = results.len();
            match serde_json::to_value(&results) {
                Ok(results) => (
                    ResponseEnvelope::ok(id, serde_json::json!({ "count": count, "results": results })),
                    false,
                ),
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize search results");
                    (ResponseEnvelope::error(id, format!("failed to serialize results: {e}")), false)
                }
            }
        }
        CommandName::CacheClear => {
            search.clear_cache();
            (ResponseEnvelope::ok(id, serde_json::json!({ "cleared": true })), false)
        }
        CommandName::HostPing => (ResponseEnvelope::ok(id, serde_json::json!({ "pong": true })), false),
        CommandName::HostStop => (ResponseEnvelope::ok(id, serde_json::json!({ "stopping": true })), true),
    }
}

/// Serve commands from `reader` until end of input or `host.stop`,
/// writing one response line per command to `writer`.
///
/// # Errors
///
/// Returns [`HostError::Io`] if reading input or writing a response fails.
pub async fn run_bridge<R, W>(search: &MarketSearch, reader: R, writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = reader;
    let mut writer = writer;
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        // EOF
        if bytes_read == 0 {
            tracing::info!("input closed (EOF); shutting down bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse command envelope");
                let response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(&mut writer, &response).await?;
                continue;
            }
        };

        let (response, stop) = handle(search, envelope).await;
        write_response(&mut writer, &response).await?;

        if stop {
            tracing::info!("host.stop received; shutting down bridge");
            break;
        }
    }

    Ok(())
}

/// Run the bridge over the process's stdin and stdout.
///
/// # Errors
///
/// Same as [`run_bridge`].
pub async fn run_stdio_bridge(search: &MarketSearch) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    run_bridge(search, reader, writer).await
}

async fn write_response<W>(writer: &mut W, response: &ResponseEnvelope) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)
        .map_err(|e| HostError::Protocol(format!("failed to serialize response envelope: {e}")))?;
    write_line(writer, &json).await
}

/// Write a single JSON line and flush.
async fn write_line<W>(writer: &mut W, json: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
