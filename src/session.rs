//! Session manager — the conversation state machine.
//!
//! ARCHITECTURE
//! ============
//! A [`Session`] owns everything that lives for one page visit: the
//! extracted bundle, the chat transcript, the latest summary and error
//! texts, and the current [`SessionState`]. State is a single enum value;
//! the UI layer projects it, never the other way around.
//!
//! Gateway calls are split into a ticket phase and a settle phase:
//! `begin_*` validates, transitions, and returns a generation-stamped
//! [`InferenceRequest`]; the embedder performs the call (usually through
//! [`Session::run_summarize`] / [`Session::run_chat`], which bound it with a
//! timeout); [`Session::settle`] applies the outcome only when the ticket's
//! generation still matches. A response superseded by `start_over` (or any
//! newer request) is discarded — or landed, under
//! [`SupersededPolicy::Land`].
//!
//! DESIGN
//! ======
//! - At most one request in flight: `begin_*` while one is pending fails
//!   with [`SessionError::RequestInFlight`] and changes nothing.
//! - Transcript alternation: strictly User/Assistant, every user message
//!   answered by exactly one reply turn. A chat failure degrades into an
//!   inline `Error: ..` assistant turn instead of a blocking error state — a
//!   summarize failure leaves nothing to show, so it escalates to
//!   [`SessionState::Error`] instead.
//! - Empty chat input is a no-op: no transition, no transcript mutation,
//!   nothing dispatched.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::extract::{ContentBundle, PageSource};
use crate::gateway::{Gateway, GatewayError, Turn};

// =============================================================================
// STATES AND ERRORS
// =============================================================================

/// Exclusive session states. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet probed (fresh session or after start-over).
    Idle,
    /// The page is not a repository page; only navigation can change this.
    NotApplicable,
    /// The page matched but yielded no usable text.
    NoContent,
    /// A bundle is held; a summary can be requested.
    Ready,
    /// A summarize request is in flight.
    Summarizing,
    /// A summary is on display; chat is available.
    Result,
    /// A chat request is in flight.
    ChatPending,
    /// Summarize failed; the error text is on display.
    Error,
}

/// What to do with a gateway response whose request was superseded by a
/// newer action before it settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SupersededPolicy {
    /// Drop the response silently.
    #[default]
    Discard,
    /// Apply the response anyway, as if it were current. Stale chat replies
    /// still require a pending user turn to answer; without one they are
    /// dropped to preserve transcript alternation.
    Land,
}

/// Errors from session operations. All leave the session untouched.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A gateway request is already in flight for this session.
    #[error("a gateway request is already in flight")]
    RequestInFlight,

    /// The chat message was empty or whitespace-only.
    #[error("chat message is empty")]
    EmptyMessage,

    /// The operation is not valid in the current state.
    #[error("operation not valid in state {state:?}")]
    NotReady { state: SessionState },
}

impl SessionError {
    /// Grepable error code for logs and structured surfaces.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RequestInFlight => "E_REQUEST_IN_FLIGHT",
            Self::EmptyMessage => "E_EMPTY_MESSAGE",
            Self::NotReady { .. } => "E_NOT_READY",
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::RequestInFlight)
    }
}

// =============================================================================
// REQUEST TICKETS
// =============================================================================

/// Payload of an issued gateway request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Summarize,
    Chat {
        /// Transcript snapshot taken before the new user turn was appended,
        /// oldest-first.
        prior_turns: Vec<Turn>,
        new_message: String,
    },
}

/// A generation-stamped ticket for one gateway round trip. Issued by
/// `begin_*`, consumed by [`Session::settle`].
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Correlation id for logs.
    pub id: Uuid,
    /// Session generation at issue time. A settle with a non-current
    /// generation is stale.
    generation: u64,
    pub kind: RequestKind,
    /// Project content block the request carries.
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Summarize,
    Chat,
}

// =============================================================================
// SESSION
// =============================================================================

/// One browsing-tab session: bundle, transcript, and state machine.
pub struct Session {
    source: Arc<dyn PageSource>,
    policy: SupersededPolicy,
    state: SessionState,
    bundle: Option<ContentBundle>,
    transcript: Vec<Turn>,
    summary: Option<String>,
    error: Option<String>,
    generation: u64,
    pending: Option<PendingKind>,
}

impl Session {
    #[must_use]
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self::with_policy(source, SupersededPolicy::default())
    }

    #[must_use]
    pub fn with_policy(source: Arc<dyn PageSource>, policy: SupersededPolicy) -> Self {
        Self {
            source,
            policy,
            state: SessionState::Idle,
            bundle: None,
            transcript: Vec::new(),
            summary: None,
            error: None,
            generation: 0,
            pending: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn bundle(&self) -> Option<&ContentBundle> {
        self.bundle.as_ref()
    }

    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Latest summary text, kept across chat round trips.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Latest summarize error text, verbatim from the gateway.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while any gateway request is outstanding.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// True while a chat request specifically is outstanding. Drives the
    /// UI's input-disable flag and chat spinner.
    #[must_use]
    pub fn chat_in_flight(&self) -> bool {
        self.pending == Some(PendingKind::Chat)
    }

    // =========================================================================
    // PROBE
    // =========================================================================

    /// Probe the page source and classify the outcome.
    ///
    /// `None` from extraction means "not a repository page"; an all-empty
    /// bundle means the page matched but had nothing readable.
    pub fn probe(&mut self) -> SessionState {
        match self.source.probe() {
            None => {
                self.bundle = None;
                self.state = SessionState::NotApplicable;
            }
            Some(bundle) if bundle.is_empty() => {
                self.bundle = None;
                self.state = SessionState::NoContent;
            }
            Some(bundle) => {
                info!(repo = %bundle.name(), "session: bundle extracted");
                self.bundle = Some(bundle);
                self.state = SessionState::Ready;
            }
        }
        self.state
    }

    // =========================================================================
    // TICKET PHASE
    // =========================================================================

    /// Request a fresh summary. Clears the transcript and any previous
    /// summary; the summary itself is never part of the chat transcript.
    ///
    /// Returns `None` (after re-probing) when no bundle is held — a request
    /// is never dispatched with null content.
    ///
    /// # Errors
    ///
    /// [`SessionError::RequestInFlight`] when a request is already pending.
    pub fn begin_summarize(&mut self) -> Result<Option<InferenceRequest>, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::RequestInFlight);
        }
        let Some(content) = self.bundle.as_ref().map(ContentBundle::prompt_content) else {
            self.probe();
            return Ok(None);
        };

        self.transcript.clear();
        self.summary = None;
        self.error = None;
        self.state = SessionState::Summarizing;
        self.generation += 1;
        self.pending = Some(PendingKind::Summarize);

        let request =
            InferenceRequest { id: Uuid::new_v4(), generation: self.generation, kind: RequestKind::Summarize, content };
        info!(id = %request.id, generation = request.generation, "session: summarize issued");
        Ok(Some(request))
    }

    /// Send a chat message about the summarized content. Appends the user
    /// turn and snapshots the turns before it for the gateway.
    ///
    /// Returns `None` (after re-probing) when no bundle is held.
    ///
    /// # Errors
    ///
    /// - [`SessionError::EmptyMessage`] for empty/whitespace input — a
    ///   no-op by contract.
    /// - [`SessionError::RequestInFlight`] when a request is already
    ///   pending.
    /// - [`SessionError::NotReady`] outside [`SessionState::Result`].
    pub fn begin_chat(&mut self, message: &str) -> Result<Option<InferenceRequest>, SessionError> {
        let text = message.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.pending.is_some() {
            return Err(SessionError::RequestInFlight);
        }
        let Some(content) = self.bundle.as_ref().map(ContentBundle::prompt_content) else {
            self.probe();
            return Ok(None);
        };
        if self.state != SessionState::Result {
            return Err(SessionError::NotReady { state: self.state });
        }

        let prior_turns = self.transcript.clone();
        self.transcript.push(Turn::user(text));
        self.state = SessionState::ChatPending;
        self.generation += 1;
        self.pending = Some(PendingKind::Chat);

        let request = InferenceRequest {
            id: Uuid::new_v4(),
            generation: self.generation,
            kind: RequestKind::Chat { prior_turns, new_message: text.to_string() },
            content,
        };
        info!(id = %request.id, generation = request.generation, turns = self.transcript.len(), "session: chat issued");
        Ok(Some(request))
    }

    /// Retry after a summarize failure: re-issue the summary when content is
    /// still held, otherwise re-probe the page.
    ///
    /// # Errors
    ///
    /// [`SessionError::RequestInFlight`] when a request is already pending.
    pub fn retry(&mut self) -> Result<Option<InferenceRequest>, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::RequestInFlight);
        }
        if self.bundle.is_some() {
            self.begin_summarize()
        } else {
            self.probe();
            Ok(None)
        }
    }

    /// Discard bundle, transcript, summary, and error; return to
    /// [`SessionState::Idle`]. Bumping the generation supersedes any request
    /// still in flight — its response will be handled per the session's
    /// [`SupersededPolicy`]. The embedder probes again next.
    pub fn start_over(&mut self) {
        self.bundle = None;
        self.transcript.clear();
        self.summary = None;
        self.error = None;
        self.pending = None;
        self.generation += 1;
        self.state = SessionState::Idle;
        info!(generation = self.generation, "session: start over");
    }

    // =========================================================================
    // SETTLE PHASE
    // =========================================================================

    /// Apply a gateway outcome for an issued request. Returns `true` when
    /// the outcome was applied, `false` when it was discarded as stale.
    ///
    /// Only the most recent request may mutate the session: a ticket whose
    /// generation no longer matches was superseded and is dropped under
    /// [`SupersededPolicy::Discard`].
    pub fn settle(&mut self, request: &InferenceRequest, outcome: Result<String, GatewayError>) -> bool {
        let stale = request.generation != self.generation || self.pending.is_none();
        if stale {
            match self.policy {
                SupersededPolicy::Discard => {
                    warn!(id = %request.id, generation = request.generation, "session: stale response discarded");
                    return false;
                }
                SupersededPolicy::Land => {
                    info!(id = %request.id, generation = request.generation, "session: stale response landed by policy");
                }
            }
        }
        self.pending = None;

        match (&request.kind, outcome) {
            (RequestKind::Summarize, Ok(text)) => {
                self.summary = Some(text);
                self.error = None;
                self.state = SessionState::Result;
            }
            (RequestKind::Summarize, Err(e)) => {
                warn!(id = %request.id, code = e.error_code(), "session: summarize failed");
                self.error = Some(e.to_string());
                self.state = SessionState::Error;
            }
            (RequestKind::Chat { .. }, Ok(text)) => {
                if !self.expects_reply() {
                    warn!(id = %request.id, "session: chat reply has no pending user turn, dropped");
                    return false;
                }
                self.transcript.push(Turn::assistant(text));
                self.state = SessionState::Result;
            }
            (RequestKind::Chat { .. }, Err(e)) => {
                if !self.expects_reply() {
                    warn!(id = %request.id, "session: chat error has no pending user turn, dropped");
                    return false;
                }
                // Chat failures degrade inline; the user keeps their context.
                warn!(id = %request.id, code = e.error_code(), "session: chat failed, absorbed into transcript");
                self.transcript.push(Turn::assistant(format!("Error: {e}")));
                self.state = SessionState::Result;
            }
        }
        true
    }

    /// The transcript can only accept an assistant turn while its last turn
    /// is an unanswered user turn.
    fn expects_reply(&self) -> bool {
        self.transcript.last().is_some_and(|turn| turn.role == crate::gateway::Role::User)
    }

    // =========================================================================
    // ROUND-TRIP DRIVERS
    // =========================================================================

    /// Perform one gateway call for an issued ticket, bounded by `timeout`.
    /// A host that never answers settles as [`GatewayError::Timeout`] instead
    /// of hanging the session.
    pub async fn dispatch(
        gateway: &dyn Gateway,
        request: &InferenceRequest,
        timeout: Duration,
    ) -> Result<String, GatewayError> {
        let call = async {
            match &request.kind {
                RequestKind::Summarize => gateway.summarize(&request.content).await,
                RequestKind::Chat { prior_turns, new_message } => {
                    gateway.chat(&request.content, prior_turns, new_message).await
                }
            }
        };
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout { secs: timeout.as_secs() }),
        }
    }

    /// Full summarize round trip: ticket, bounded gateway call, settle.
    ///
    /// # Errors
    ///
    /// Propagates ticket-phase [`SessionError`]s; gateway failures settle
    /// into [`SessionState::Error`] instead of erroring here.
    pub async fn run_summarize(
        &mut self,
        gateway: &dyn Gateway,
        timeout: Duration,
    ) -> Result<SessionState, SessionError> {
        let Some(request) = self.begin_summarize()? else {
            return Ok(self.state);
        };
        let outcome = Self::dispatch(gateway, &request, timeout).await;
        self.settle(&request, outcome);
        Ok(self.state)
    }

    /// Full chat round trip: ticket, bounded gateway call, settle.
    ///
    /// # Errors
    ///
    /// Propagates ticket-phase [`SessionError`]s; gateway failures settle
    /// inline into the transcript instead of erroring here.
    pub async fn run_chat(
        &mut self,
        gateway: &dyn Gateway,
        timeout: Duration,
        message: &str,
    ) -> Result<SessionState, SessionError> {
        let Some(request) = self.begin_chat(message)? else {
            return Ok(self.state);
        };
        let outcome = Self::dispatch(gateway, &request, timeout).await;
        self.settle(&request, outcome);
        Ok(self.state)
    }

    /// Full retry round trip after a summarize failure.
    ///
    /// # Errors
    ///
    /// Propagates ticket-phase [`SessionError`]s.
    pub async fn run_retry(&mut self, gateway: &dyn Gateway, timeout: Duration) -> Result<SessionState, SessionError> {
        let Some(request) = self.retry()? else {
            return Ok(self.state);
        };
        let outcome = Self::dispatch(gateway, &request, timeout).await;
        self.settle(&request, outcome);
        Ok(self.state)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
