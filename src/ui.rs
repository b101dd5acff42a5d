//! UI state machine — a pure projection of session state onto display
//! regions and triggerable actions.
//!
//! DESIGN
//! ======
//! [`render`] is the only writer of visibility. It iterates every known
//! [`Region`] and compares against the one active region for the current
//! [`SessionState`], so exclusivity is mechanical — no per-state ad-hoc
//! visibility logic anywhere. The chat round trip adds one transient
//! sub-state on top: while a chat request is in flight the input is
//! disabled and the chat spinner shows, re-enabling on settle.

use std::time::Duration;

use crate::gateway::{Gateway, Turn};
use crate::session::{Session, SessionError, SessionState};

// =============================================================================
// REGIONS
// =============================================================================

/// The display panes. Exactly one is visible at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// The page is not a GitHub repository page.
    NotGitHub,
    /// The page matched but had no readable text.
    NoContent,
    /// Repository found; the summarize action is offered.
    Ready,
    /// Probe or summarize in progress.
    Loading,
    /// Summary plus chat transcript.
    Result,
    /// Summarize failure with retry.
    Error,
}

impl Region {
    /// Every known region, iterated by [`render`] to toggle visibility.
    pub const ALL: [Region; 6] =
        [Region::NotGitHub, Region::NoContent, Region::Ready, Region::Loading, Region::Result, Region::Error];
}

/// Total mapping from session state to the one visible region.
///
/// `Idle` and `Summarizing` share the loading pane; `ChatPending` stays on
/// the result pane (the chat spinner is a sub-state, not a region).
#[must_use]
pub fn active_region(state: SessionState) -> Region {
    match state {
        SessionState::Idle | SessionState::Summarizing => Region::Loading,
        SessionState::NotApplicable => Region::NotGitHub,
        SessionState::NoContent => Region::NoContent,
        SessionState::Ready => Region::Ready,
        SessionState::Result | SessionState::ChatPending => Region::Result,
        SessionState::Error => Region::Error,
    }
}

// =============================================================================
// VIEW
// =============================================================================

/// Everything the display surface needs for one frame. Produced wholesale
/// by [`render`]; never mutated piecemeal.
#[derive(Debug, Clone)]
pub struct View {
    /// `(region, visible)` for every region in [`Region::ALL`].
    pub visibility: Vec<(Region, bool)>,
    /// `owner/repo` identifier, when a bundle is held.
    pub repo_name: Option<String>,
    /// Summary text for the result pane (and the copy action).
    pub summary_text: Option<String>,
    /// Error text for the error pane, verbatim from the gateway.
    pub error_text: Option<String>,
    /// Chat history, oldest-first.
    pub transcript: Vec<Turn>,
    /// Show the chat spinner.
    pub chat_loading: bool,
    /// Accept chat input. Always the inverse of an in-flight chat request.
    pub chat_input_enabled: bool,
}

impl View {
    #[must_use]
    pub fn is_visible(&self, region: Region) -> bool {
        self.visibility.iter().any(|(r, visible)| *r == region && *visible)
    }

    /// The single visible region.
    #[must_use]
    pub fn visible_region(&self) -> Region {
        // Exclusivity is guaranteed by construction in `render`.
        self.visibility
            .iter()
            .find(|(_, visible)| *visible)
            .map_or(Region::Loading, |(region, _)| *region)
    }
}

/// Project a session onto a [`View`]. Pure; the sole visibility writer.
#[must_use]
pub fn render(session: &Session) -> View {
    let active = active_region(session.state());
    let visibility = Region::ALL.iter().map(|region| (*region, *region == active)).collect();
    let chat_loading = session.chat_in_flight();

    View {
        visibility,
        repo_name: session.bundle().map(crate::extract::ContentBundle::name),
        summary_text: session.summary().map(str::to_string),
        error_text: session.error().map(str::to_string),
        transcript: session.transcript().to_vec(),
        chat_loading,
        chat_input_enabled: !chat_loading,
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// The named triggerable actions of the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Summarize,
    CopyResult,
    StartOver,
    Retry,
    SendChat(String),
}

/// Side effects an action asks the embedder to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CopyToClipboard(String),
}

/// Dispatch one surface action against the session.
///
/// Empty chat input is swallowed as a no-op per the session contract; the
/// copy action only produces an effect when a summary exists.
///
/// # Errors
///
/// Propagates [`SessionError`]s other than the empty-message no-op.
pub async fn apply(
    session: &mut Session,
    gateway: &dyn Gateway,
    timeout: Duration,
    action: Action,
) -> Result<Option<Effect>, SessionError> {
    match action {
        Action::Summarize => {
            session.run_summarize(gateway, timeout).await?;
            Ok(None)
        }
        Action::CopyResult => Ok(session.summary().map(|text| Effect::CopyToClipboard(text.to_string()))),
        Action::StartOver => {
            session.start_over();
            session.probe();
            Ok(None)
        }
        Action::Retry => {
            session.run_retry(gateway, timeout).await?;
            Ok(None)
        }
        Action::SendChat(message) => match session.run_chat(gateway, timeout, &message).await {
            Ok(_) => Ok(None),
            Err(SessionError::EmptyMessage) => Ok(None),
            Err(e) => Err(e),
        },
    }
}

#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;
