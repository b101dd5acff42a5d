use super::*;
use crate::extract::{ContentBundle, PageSource};
use crate::gateway::GatewayError;
use crate::session::SupersededPolicy;
use std::sync::{Arc, Mutex};

const TIMEOUT: Duration = Duration::from_secs(5);

// =========================================================================
// fixtures
// =========================================================================

struct FixedPage(Option<ContentBundle>);

impl PageSource for FixedPage {
    fn probe(&self) -> Option<ContentBundle> {
        self.0.clone()
    }
}

fn sample_bundle() -> ContentBundle {
    ContentBundle {
        url: "https://github.com/octocat/Hello-World".into(),
        owner: "octocat".into(),
        repo: "Hello-World".into(),
        description: "A sample repo".into(),
        readme_text: "Hello World example".into(),
    }
}

fn ready_session() -> Session {
    let mut session = Session::new(Arc::new(FixedPage(Some(sample_bundle()))));
    session.probe();
    session
}

struct MockGateway {
    responses: Mutex<Vec<Result<String, GatewayError>>>,
}

impl MockGateway {
    fn new(responses: Vec<Result<String, GatewayError>>) -> Self {
        Self { responses: Mutex::new(responses) }
    }
}

#[async_trait::async_trait]
impl Gateway for MockGateway {
    async fn summarize(&self, _content: &str) -> Result<String, GatewayError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() { Ok("done".into()) } else { responses.remove(0) }
    }

    async fn chat(&self, _content: &str, _prior_turns: &[Turn], _new_message: &str) -> Result<String, GatewayError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() { Ok("done".into()) } else { responses.remove(0) }
    }
}

fn assert_only_visible(view: &View, expected: Region) {
    let visible: Vec<Region> =
        view.visibility.iter().filter(|(_, visible)| *visible).map(|(region, _)| *region).collect();
    assert_eq!(visible, vec![expected], "exactly one region must be visible");
    assert_eq!(view.visible_region(), expected);
}

// =========================================================================
// region mapping
// =========================================================================

#[test]
fn every_state_maps_to_one_region() {
    assert_eq!(active_region(SessionState::Idle), Region::Loading);
    assert_eq!(active_region(SessionState::NotApplicable), Region::NotGitHub);
    assert_eq!(active_region(SessionState::NoContent), Region::NoContent);
    assert_eq!(active_region(SessionState::Ready), Region::Ready);
    assert_eq!(active_region(SessionState::Summarizing), Region::Loading);
    assert_eq!(active_region(SessionState::Result), Region::Result);
    assert_eq!(active_region(SessionState::ChatPending), Region::Result);
    assert_eq!(active_region(SessionState::Error), Region::Error);
}

#[test]
fn render_covers_all_regions_exactly_once() {
    let view = render(&ready_session());
    assert_eq!(view.visibility.len(), Region::ALL.len());
    assert_only_visible(&view, Region::Ready);
}

// =========================================================================
// render — per-state projections
// =========================================================================

#[test]
fn idle_renders_loading() {
    let session = Session::new(Arc::new(FixedPage(None)));
    assert_only_visible(&render(&session), Region::Loading);
}

#[test]
fn non_repo_page_renders_not_github() {
    let mut session = Session::new(Arc::new(FixedPage(None)));
    session.probe();
    let view = render(&session);
    assert_only_visible(&view, Region::NotGitHub);
    assert!(view.repo_name.is_none());
}

#[test]
fn ready_renders_repo_name() {
    let view = render(&ready_session());
    assert_eq!(view.repo_name.as_deref(), Some("octocat/Hello-World"));
    assert!(view.summary_text.is_none());
}

#[tokio::test]
async fn result_renders_summary_and_transcript() {
    let gateway = MockGateway::new(vec![Ok("A tidy summary.".into()), Ok("MIT.".into())]);
    let mut session = ready_session();
    session.run_summarize(&gateway, TIMEOUT).await.unwrap();
    session.run_chat(&gateway, TIMEOUT, "license?").await.unwrap();

    let view = render(&session);
    assert_only_visible(&view, Region::Result);
    assert_eq!(view.summary_text.as_deref(), Some("A tidy summary."));
    assert_eq!(view.transcript.len(), 2);
    assert!(view.chat_input_enabled);
    assert!(!view.chat_loading);
}

#[tokio::test]
async fn summarize_failure_renders_error_text() {
    let gateway = MockGateway::new(vec![Err(GatewayError::Unavailable {
        message: "Apple Intelligence is not available on this device.".into(),
    })]);
    let mut session = ready_session();
    session.run_summarize(&gateway, TIMEOUT).await.unwrap();

    let view = render(&session);
    assert_only_visible(&view, Region::Error);
    assert_eq!(view.error_text.as_deref(), Some("Apple Intelligence is not available on this device."));
}

#[tokio::test]
async fn summarizing_renders_loading() {
    let mut session = ready_session();
    let _ticket = session.begin_summarize().unwrap().unwrap();
    assert_only_visible(&render(&session), Region::Loading);
}

// =========================================================================
// transient chat sub-state
// =========================================================================

#[tokio::test]
async fn chat_in_flight_disables_input_and_shows_spinner() {
    let gateway = MockGateway::new(vec![Ok("summary".into())]);
    let mut session = ready_session();
    session.run_summarize(&gateway, TIMEOUT).await.unwrap();

    let ticket = session.begin_chat("hello").unwrap().unwrap();
    let view = render(&session);
    // Chat pending keeps the result pane; only the sub-state changes.
    assert_only_visible(&view, Region::Result);
    assert!(view.chat_loading);
    assert!(!view.chat_input_enabled);

    session.settle(&ticket, Ok("hi".into()));
    let view = render(&session);
    assert!(!view.chat_loading);
    assert!(view.chat_input_enabled);
}

#[tokio::test]
async fn summarize_in_flight_is_not_chat_loading() {
    let mut session = ready_session();
    let _ticket = session.begin_summarize().unwrap().unwrap();
    let view = render(&session);
    assert!(!view.chat_loading);
    assert!(view.chat_input_enabled);
}

// =========================================================================
// actions
// =========================================================================

#[tokio::test]
async fn summarize_action_drives_to_result() {
    let gateway = MockGateway::new(vec![Ok("summary".into())]);
    let mut session = ready_session();

    let effect = apply(&mut session, &gateway, TIMEOUT, Action::Summarize).await.unwrap();
    assert!(effect.is_none());
    assert_eq!(session.state(), SessionState::Result);
}

#[tokio::test]
async fn copy_result_yields_clipboard_effect_only_with_summary() {
    let gateway = MockGateway::new(vec![Ok("summary".into())]);
    let mut session = ready_session();

    let effect = apply(&mut session, &gateway, TIMEOUT, Action::CopyResult).await.unwrap();
    assert!(effect.is_none(), "nothing to copy before a summary exists");

    apply(&mut session, &gateway, TIMEOUT, Action::Summarize).await.unwrap();
    let effect = apply(&mut session, &gateway, TIMEOUT, Action::CopyResult).await.unwrap();
    assert_eq!(effect, Some(Effect::CopyToClipboard("summary".into())));
}

#[tokio::test]
async fn start_over_action_resets_and_reprobes() {
    let gateway = MockGateway::new(vec![Ok("summary".into())]);
    let mut session = ready_session();
    apply(&mut session, &gateway, TIMEOUT, Action::Summarize).await.unwrap();

    apply(&mut session, &gateway, TIMEOUT, Action::StartOver).await.unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.summary().is_none());
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn retry_action_recovers_from_error() {
    let gateway =
        MockGateway::new(vec![Err(GatewayError::Request("connection refused".into())), Ok("recovered".into())]);
    let mut session = ready_session();
    apply(&mut session, &gateway, TIMEOUT, Action::Summarize).await.unwrap();
    assert_eq!(session.state(), SessionState::Error);

    apply(&mut session, &gateway, TIMEOUT, Action::Retry).await.unwrap();
    assert_eq!(session.state(), SessionState::Result);
}

#[tokio::test]
async fn empty_chat_action_is_swallowed() {
    let gateway = MockGateway::new(vec![Ok("summary".into())]);
    let mut session = ready_session();
    apply(&mut session, &gateway, TIMEOUT, Action::Summarize).await.unwrap();

    let effect = apply(&mut session, &gateway, TIMEOUT, Action::SendChat("   ".into())).await.unwrap();
    assert!(effect.is_none());
    assert!(session.transcript().is_empty());
    assert_eq!(session.state(), SessionState::Result);
}

#[tokio::test]
async fn send_chat_action_appends_turns() {
    let gateway = MockGateway::new(vec![Ok("summary".into()), Ok("MIT.".into())]);
    let mut session = ready_session();
    apply(&mut session, &gateway, TIMEOUT, Action::Summarize).await.unwrap();

    apply(&mut session, &gateway, TIMEOUT, Action::SendChat("license?".into())).await.unwrap();
    assert_eq!(session.transcript().len(), 2);
}

// =========================================================================
// land policy still renders consistently
// =========================================================================

#[tokio::test]
async fn landed_stale_summary_renders_result() {
    let mut session = Session::with_policy(Arc::new(FixedPage(Some(sample_bundle()))), SupersededPolicy::Land);
    session.probe();
    let ticket = session.begin_summarize().unwrap().unwrap();
    session.start_over();

    session.settle(&ticket, Ok("late summary".into()));
    let view = render(&session);
    assert_only_visible(&view, Region::Result);
    assert_eq!(view.summary_text.as_deref(), Some("late summary"));
}
