//! Gitsum — summarize and chat about GitHub repository pages with a local
//! generation host.
//!
//! ARCHITECTURE
//! ============
//! Four layers, leaf-first:
//!
//! - [`extract`] — pure content extraction: classifies a page location,
//!   pulls description and README text out of the document, and produces a
//!   normalized [`extract::ContentBundle`] (or nothing, when the page is not
//!   a repository page).
//! - [`gateway`] — the inference boundary: an async [`gateway::Gateway`]
//!   trait plus [`gateway::HostClient`], a thin HTTP wrapper around the
//!   locally running host app's message envelope. Opaque by design: given
//!   text, return generated text, or fail with a typed error.
//! - [`session`] — the conversation state machine. A [`session::Session`]
//!   owns the bundle and transcript, hands out generation-stamped request
//!   tickets, and applies settled results. Exactly one request may be in
//!   flight; stale responses are discarded (or landed, by policy).
//! - [`ui`] — a pure projection of session state onto named display regions
//!   and triggerable actions. `render` is the only writer of visibility.
//!
//! The crate is a library: embedders own the display surface and the event
//! loop, install their own `tracing` subscriber, and drive the session via
//! [`ui::apply`] or the session methods directly.

pub mod extract;
pub mod gateway;
pub mod session;
pub mod ui;

pub use extract::{ContentBundle, HtmlPage, PageSource, extract};
pub use gateway::{Gateway, GatewayError, HostClient, Role, Turn};
pub use session::{InferenceRequest, RequestKind, Session, SessionError, SessionState, SupersededPolicy};
pub use ui::{Action, Effect, Region, View, render};
