use courier_core::{AgentAction, AgentOutcome, LlmRequest, Message};

#[test]
fn request_omits_empty_stop_and_temperature() {
    let request = LlmRequest::new(vec![Message::user("hi")]);
    let value = serde_json::to_value(request).unwrap();

    assert!(value.get("stop").is_none());
    assert!(value.get("temperature").is_none());
    assert_eq!(value["messages"][0]["role"], "user");
}

#[test]
fn outcome_reports_terminal_variant() {
    let action = AgentOutcome::Action(AgentAction {
        tool: "google_search".to_string(),
        tool_input: "rust".to_string(),
        log: "Action: google_search\nAction Input: rust".to_string(),
    });
    assert!(!action.is_finish());
}
