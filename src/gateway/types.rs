//! Gateway types — transcript turns and errors shared across the inference
//! boundary.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by gateway operations.
///
/// Backend-reported messages ([`GatewayError::Unavailable`] and
/// [`GatewayError::Backend`]) are surfaced verbatim: the host app's wording
/// is the user-facing diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Empty content or message caught before dispatch. Never reaches the
    /// host.
    #[error("empty input: {reason}")]
    InputRejected { reason: &'static str },

    /// The HTTP request to the host failed (host unreachable, connection
    /// refused, transport error).
    #[error("host request failed: {0}")]
    Request(String),

    /// The host returned a non-success HTTP status.
    #[error("host response error: status {status}")]
    Http { status: u16, body: String },

    /// The host response body could not be deserialized.
    #[error("host response parse failed: {0}")]
    Parse(String),

    /// The generation capability is disabled, ineligible, or not ready.
    #[error("{message}")]
    Unavailable { message: String },

    /// Any other host-reported failure.
    #[error("{message}")]
    Backend { message: String },

    /// The caller-side timeout elapsed before the host answered.
    #[error("host did not answer within {secs}s")]
    Timeout { secs: u64 },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl GatewayError {
    /// Grepable error code for logs and structured surfaces.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputRejected { .. } => "E_INPUT_REJECTED",
            Self::Request(_) => "E_HOST_UNREACHABLE",
            Self::Http { .. } => "E_HOST_RESPONSE",
            Self::Parse(_) => "E_HOST_PARSE",
            Self::Unavailable { .. } => "E_CAPABILITY_UNAVAILABLE",
            Self::Backend { .. } => "E_HOST_ERROR",
            Self::Timeout { .. } => "E_HOST_TIMEOUT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Whether a retry can plausibly succeed without navigation. The user
    /// may fix an unavailable capability (enable it, wait for the model) and
    /// try again.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Request(_)
                | Self::Http { status: 429 | 500..=599, .. }
                | Self::Unavailable { .. }
                | Self::Backend { .. }
                | Self::Timeout { .. }
        )
    }
}

// =============================================================================
// TURNS
// =============================================================================

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the transcript. Serialized on the wire as a
/// `{"role": .., "content": ..}` pair — the host is stateless across calls,
/// so the serialized history is its only conversational context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(rename = "content")]
    pub text: String,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, text: text.into() }
    }
}

// =============================================================================
// GATEWAY TRAIT
// =============================================================================

/// The opaque text-generation capability. Enables mocking in tests.
///
/// Both operations treat every call as asynchronous with no built-in
/// timeout; callers bound the wait themselves (see
/// [`crate::session::Session::run_summarize`]).
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Summarize project content.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the input is empty, the host is
    /// unreachable, or the host reports a failure.
    async fn summarize(&self, content: &str) -> Result<String, GatewayError>;

    /// Answer a follow-up question about the content, given the prior turns
    /// oldest-first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the input is empty, the host is
    /// unreachable, or the host reports a failure.
    async fn chat(&self, content: &str, prior_turns: &[Turn], new_message: &str) -> Result<String, GatewayError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
