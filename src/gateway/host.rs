//! HTTP client for the local generation host.
//!
//! DESIGN
//! ======
//! Thin wrapper around the host's message envelope: a JSON object with an
//! `action` discriminator (`summarise` / `chat`) and named payload keys
//! (`content`, `conversation`, `newMessage`). The host answers with exactly
//! one of `summary` / `reply` (legacy hosts: `echo`) on success or `error`
//! on failure. Pure parsing in `parse_summarize_response` /
//! `parse_chat_response` for testability.

use tracing::info;

use super::config::GatewayConfig;
use super::types::{Gateway, GatewayError, Turn};
use std::time::Duration;

/// Placeholder when the host answers success with no summary text.
const NO_SUMMARY: &str = "No summary returned.";

/// Placeholder when the host answers success with no reply text.
const NO_REPLY: &str = "No reply.";

/// Fragments of the host's capability-availability diagnostics. An `error`
/// message containing one of these is an availability failure, not a
/// generation failure.
const UNAVAILABILITY_MARKERS: [&str; 6] =
    ["not available", "not enabled", "isn't ready", "isn\u{2019}t ready", "unavailable", "requires macos"];

// =============================================================================
// CLIENT
// =============================================================================

pub struct HostClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl HostClient {
    /// Build a client for the configured host endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HttpClientBuild`] if the HTTP client cannot
    /// be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    async fn send<T: serde::Serialize>(&self, body: &T) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(self.config.host_url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        if status != 200 {
            return Err(GatewayError::Http { status, body: text });
        }

        Ok(text)
    }
}

#[async_trait::async_trait]
impl Gateway for HostClient {
    async fn summarize(&self, content: &str) -> Result<String, GatewayError> {
        if content.trim().is_empty() {
            return Err(GatewayError::InputRejected { reason: "summarize content is empty" });
        }
        info!(content_len = content.len(), "gateway: summarise dispatched");
        let body = SummarizeEnvelope { action: "summarise", content };
        let text = self.send(&body).await?;
        parse_summarize_response(&text)
    }

    async fn chat(&self, content: &str, prior_turns: &[Turn], new_message: &str) -> Result<String, GatewayError> {
        if content.trim().is_empty() {
            return Err(GatewayError::InputRejected { reason: "chat content is empty" });
        }
        if new_message.trim().is_empty() {
            return Err(GatewayError::InputRejected { reason: "chat message is empty" });
        }
        info!(content_len = content.len(), prior_turns = prior_turns.len(), "gateway: chat dispatched");
        let body = ChatEnvelope { action: "chat", content, conversation: prior_turns, new_message };
        let text = self.send(&body).await?;
        parse_chat_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct SummarizeEnvelope<'a> {
    action: &'static str,
    content: &'a str,
}

#[derive(serde::Serialize)]
struct ChatEnvelope<'a> {
    action: &'static str,
    content: &'a str,
    /// Prior turns oldest-first — order on the wire must match accumulation
    /// order exactly; the host has no other conversational memory.
    conversation: &'a [Turn],
    #[serde(rename = "newMessage")]
    new_message: &'a str,
}

#[derive(serde::Deserialize)]
struct HostResponse {
    summary: Option<String>,
    reply: Option<String>,
    echo: Option<String>,
    error: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_host_response(json: &str) -> Result<HostResponse, GatewayError> {
    let response: HostResponse = serde_json::from_str(json).map_err(|e| GatewayError::Parse(e.to_string()))?;
    if let Some(message) = response.error {
        return Err(classify_backend_error(message));
    }
    Ok(response)
}

pub(crate) fn parse_summarize_response(json: &str) -> Result<String, GatewayError> {
    let response = parse_host_response(json)?;
    let text = response.summary.or(response.echo).unwrap_or_default();
    if text.is_empty() { Ok(NO_SUMMARY.to_string()) } else { Ok(text) }
}

pub(crate) fn parse_chat_response(json: &str) -> Result<String, GatewayError> {
    let response = parse_host_response(json)?;
    let text = response.reply.or(response.echo).unwrap_or_default();
    if text.is_empty() { Ok(NO_REPLY.to_string()) } else { Ok(text) }
}

/// Split host-reported errors into capability-unavailable vs. generic
/// failures. The message itself is preserved verbatim either way.
fn classify_backend_error(message: String) -> GatewayError {
    let lower = message.to_lowercase();
    if UNAVAILABILITY_MARKERS.iter().any(|marker| lower.contains(marker)) {
        GatewayError::Unavailable { message }
    } else {
        GatewayError::Backend { message }
    }
}

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
