#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use courier_agent::{AgentEvent, AgentObserver};
use courier_core::{CourierError, LlmRequest, LlmResponse, Runnable, Tool, ToolError};

/// Replays canned model replies and records every request it receives.
#[derive(Clone, Default)]
pub struct ScriptedLlm {
    replies: Arc<Mutex<VecDeque<Result<String, CourierError>>>>,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
}

impl ScriptedLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let llm = Self::default();
        for reply in replies {
            llm.push(Ok(reply.into()));
        }
        llm
    }

    pub fn push(&self, reply: Result<String, CourierError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.messages[0].content.clone())
            .collect()
    }
}

#[async_trait]
impl Runnable<LlmRequest, LlmResponse> for ScriptedLlm {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, CourierError> {
        self.requests.lock().unwrap().push(input);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CourierError::LlmProvider("script exhausted".to_string())));
        reply.map(|content| LlmResponse { content })
    }
}

/// Answers `<name>:<input>` and remembers each input.
#[derive(Clone)]
pub struct RecordingTool {
    name: &'static str,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingTool {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "records its input"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(input.to_string());
        Ok(format!("{}:{}", self.name, input))
    }
}

pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "flaky"
    }

    fn description(&self) -> &str {
        "always fails"
    }

    async fn invoke(&self, _input: &str) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed("boom".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AgentEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AgentObserver for RecordingObserver {
    fn on_event(&self, event: &AgentEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn action(tool: &str, input: &str) -> String {
    format!("Thought: Do I need a tool? Yes\nAction: {tool}\nAction Input: {input}")
}

pub fn answer(text: &str) -> String {
    format!("Thought: Do I need a tool? No\nFinal Answer: {text}")
}
