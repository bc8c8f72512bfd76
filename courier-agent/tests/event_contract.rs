mod common;

use std::sync::Arc;

use common::{action, answer, RecordingObserver, RecordingTool, ScriptedLlm};
use courier_agent::{
    validate_single_terminal, validate_tool_pairs, AgentEvent, AgentExecutor, ToolRegistry,
};
use courier_core::{Conversation, Tool};

async fn events_for(replies: Vec<String>) -> Vec<AgentEvent> {
    let observer = Arc::new(RecordingObserver::default());
    let echo: Arc<dyn Tool> = Arc::new(RecordingTool::new("echo"));
    let tools = ToolRegistry::from_tools([echo]).unwrap();
    let agent =
        AgentExecutor::new(ScriptedLlm::new(replies), tools).with_observer(observer.clone());
    let _ = agent.run("hi", &Conversation::new()).await;
    observer.events()
}

#[tokio::test]
async fn successful_run_emits_ordered_events() {
    let events = events_for(vec![action("echo", "x"), answer("done")]).await;

    assert_eq!(
        events,
        vec![
            AgentEvent::Thinking { step: 1 },
            AgentEvent::ToolStarted {
                step: 1,
                tool: "echo".to_string(),
                input: "x".to_string(),
            },
            AgentEvent::ToolFinished {
                step: 1,
                tool: "echo".to_string(),
                observation: "echo:x".to_string(),
            },
            AgentEvent::Thinking { step: 2 },
            AgentEvent::Finished { steps: 1 },
        ]
    );
    validate_tool_pairs(&events).unwrap();
    validate_single_terminal(&events).unwrap();
}

#[tokio::test]
async fn failed_run_ends_with_one_failure() {
    let events = events_for(vec!["junk".to_string(), "junk".to_string()]).await;

    validate_tool_pairs(&events).unwrap();
    validate_single_terminal(&events).unwrap();
    assert!(matches!(events.last(), Some(AgentEvent::Failed { .. })));
    assert_eq!(
        events.iter().filter(|e| matches!(e, AgentEvent::FormatRetry { .. })).count(),
        1
    );
}

#[test]
fn validators_catch_broken_sequences() {
    let unfinished = vec![
        AgentEvent::ToolStarted {
            step: 1,
            tool: "echo".to_string(),
            input: String::new(),
        },
        AgentEvent::Finished { steps: 1 },
    ];
    assert!(validate_tool_pairs(&unfinished).is_err());

    let orphan = vec![AgentEvent::ToolFinished {
        step: 3,
        tool: "echo".to_string(),
        observation: String::new(),
    }];
    assert!(validate_tool_pairs(&orphan).is_err());

    let twice = vec![
        AgentEvent::Finished { steps: 0 },
        AgentEvent::Failed {
            reason: "late".to_string(),
        },
    ];
    assert!(validate_single_terminal(&twice).is_err());
    assert!(validate_single_terminal(&[AgentEvent::Thinking { step: 1 }]).is_err());
}
