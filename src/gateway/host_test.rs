use super::*;

// =========================================================================
// response parsing — success shapes
// =========================================================================

#[test]
fn parse_summary_key() {
    let text = parse_summarize_response(r#"{"summary": "A tidy summary."}"#).unwrap();
    assert_eq!(text, "A tidy summary.");
}

#[test]
fn parse_reply_key() {
    let text = parse_chat_response(r#"{"reply": "MIT licensed."}"#).unwrap();
    assert_eq!(text, "MIT licensed.");
}

#[test]
fn parse_legacy_echo_fallback() {
    assert_eq!(parse_summarize_response(r#"{"echo": "echoed"}"#).unwrap(), "echoed");
    assert_eq!(parse_chat_response(r#"{"echo": "echoed"}"#).unwrap(), "echoed");
}

#[test]
fn empty_success_maps_to_placeholders() {
    assert_eq!(parse_summarize_response("{}").unwrap(), NO_SUMMARY);
    assert_eq!(parse_summarize_response(r#"{"summary": ""}"#).unwrap(), NO_SUMMARY);
    assert_eq!(parse_chat_response("{}").unwrap(), NO_REPLY);
}

// =========================================================================
// response parsing — failures
// =========================================================================

#[test]
fn error_key_wins_over_success_keys() {
    let err = parse_summarize_response(r#"{"summary": "x", "error": "generation failed"}"#).unwrap_err();
    assert!(matches!(err, GatewayError::Backend { .. }));
    assert_eq!(err.to_string(), "generation failed");
}

#[test]
fn availability_diagnostics_classify_as_unavailable() {
    let messages = [
        "Apple Intelligence is not available on this device.",
        "Apple Intelligence is available but not enabled. Turn it on in System Settings.",
        "The model isn\u{2019}t ready. Try again in a moment.",
        "Apple Intelligence is unavailable.",
        "Apple Intelligence requires macOS 26 or later.",
    ];
    for message in messages {
        let json = serde_json::json!({ "error": message }).to_string();
        let err = parse_summarize_response(&json).unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable { .. }), "{message} should classify as unavailable");
        assert_eq!(err.to_string(), message, "message must surface verbatim");
        assert!(err.retryable());
    }
}

#[test]
fn other_host_errors_stay_generic() {
    let err = parse_chat_response(r#"{"error": "Missing or invalid request."}"#).unwrap_err();
    assert!(matches!(err, GatewayError::Backend { .. }));
    assert!(err.retryable());
}

#[test]
fn malformed_body_is_a_parse_error() {
    let err = parse_summarize_response("not json").unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
    assert!(!err.retryable());
}

// =========================================================================
// request envelopes — wire field names
// =========================================================================

#[test]
fn summarize_envelope_wire_shape() {
    let body = SummarizeEnvelope { action: "summarise", content: "Repository: a/b" };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json, serde_json::json!({"action": "summarise", "content": "Repository: a/b"}));
}

#[test]
fn chat_envelope_wire_shape_preserves_turn_order() {
    let turns = vec![Turn::user("first"), Turn::assistant("second")];
    let body =
        ChatEnvelope { action: "chat", content: "Repository: a/b", conversation: &turns, new_message: "third" };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "action": "chat",
            "content": "Repository: a/b",
            "conversation": [
                {"role": "user", "content": "first"},
                {"role": "assistant", "content": "second"},
            ],
            "newMessage": "third",
        })
    );
}

// =========================================================================
// pre-dispatch validation — no network involved
// =========================================================================

#[tokio::test]
async fn empty_content_is_rejected_before_dispatch() {
    let client = HostClient::new(GatewayConfig::default()).unwrap();
    let err = client.summarize("   ").await.unwrap_err();
    assert!(matches!(err, GatewayError::InputRejected { .. }));
}

#[tokio::test]
async fn empty_chat_message_is_rejected_before_dispatch() {
    let client = HostClient::new(GatewayConfig::default()).unwrap();
    let err = client.chat("content", &[], " \n ").await.unwrap_err();
    assert!(matches!(err, GatewayError::InputRejected { .. }));
}
