use courier_agent::{AgentEvent, AgentObserver};
use courier_cli::frontend::{clean_output, detect_tool, tool_status_message, StatusReporter};

#[test]
fn clean_output_strips_escapes_and_boilerplate() {
    let raw = format!(
        "\x1b[32m> Finished chain.\x1b[0m\n{}\nYou have 2 unread messages.\n",
        "=".repeat(50)
    );
    assert_eq!(clean_output(&raw), "You have 2 unread messages.");
}

#[test]
fn clean_output_keeps_short_rules_and_plain_text() {
    assert_eq!(clean_output("  a == b  "), "a == b");
    assert_eq!(clean_output("❌ Error: No message found in input"), "");
}

#[test]
fn detect_tool_reads_the_first_action() {
    let trace = "Thought: look it up\nAction: google_search\nAction Input: rust\n";
    assert_eq!(detect_tool(trace), Some("google_search"));
    assert_eq!(detect_tool("Action:   send_email\n"), Some("send_email"));
    assert_eq!(detect_tool("Final Answer: done"), None);
    assert_eq!(detect_tool("Action: \n"), None);
}

#[test]
fn status_messages_follow_the_tool() {
    assert_eq!(tool_status_message(Some("search_emails")), "🔍 Searching your inbox...");
    assert_eq!(tool_status_message(Some("web_scraping")), "🕸️ Analyzing webpage content...");
    assert_eq!(tool_status_message(Some("unknown")), "🤖 Processing your request...");
    assert_eq!(tool_status_message(None), "🤖 Processing your request...");
}

#[test]
fn reporter_prints_first_thought_and_tool_calls_only() {
    let reporter = StatusReporter::new(Vec::new());
    reporter.on_event(&AgentEvent::Thinking { step: 1 });
    reporter.on_event(&AgentEvent::ToolStarted {
        step: 1,
        tool: "google_search".to_string(),
        input: "rust".to_string(),
    });
    reporter.on_event(&AgentEvent::ToolFinished {
        step: 1,
        tool: "google_search".to_string(),
        observation: "Title: Rust".to_string(),
    });
    reporter.on_event(&AgentEvent::Thinking { step: 2 });
    reporter.on_event(&AgentEvent::Finished { steps: 1 });

    let printed = String::from_utf8(reporter.into_inner()).unwrap();
    assert_eq!(
        printed,
        "🤖 Processing your request...\n🌐 Searching the web...\n"
    );
}
