//! Gateway — opaque boundary to the local text-generation host.
//!
//! DESIGN
//! ======
//! Two logical operations, `summarize(content)` and
//! `chat(content, prior_turns, new_message)`, each returning generated text
//! or a typed error. The [`Gateway`] trait keeps the session testable with
//! scripted mocks; [`HostClient`] is the real transport over the host's
//! JSON message envelope. The host is treated as a black box: unreachable,
//! slow, or refusing (capability disabled, device ineligible, model not
//! ready) are all ordinary outcomes, surfaced as [`GatewayError`].

pub mod config;
pub mod host;
pub mod types;

pub use config::{GatewayConfig, GatewayTimeouts};
pub use host::HostClient;
pub use types::{Gateway, GatewayError, Role, Turn};
