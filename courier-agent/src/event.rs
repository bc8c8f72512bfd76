use std::collections::HashMap;

/// Progress of one agent run, in the order it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    Thinking { step: u32 },
    ToolStarted { step: u32, tool: String, input: String },
    ToolFinished { step: u32, tool: String, observation: String },
    FormatRetry { step: u32, reason: String },
    Finished { steps: u32 },
    Failed { reason: String },
}

impl AgentEvent {
    pub fn step(&self) -> Option<u32> {
        match self {
            AgentEvent::Thinking { step }
            | AgentEvent::ToolStarted { step, .. }
            | AgentEvent::ToolFinished { step, .. }
            | AgentEvent::FormatRetry { step, .. } => Some(*step),
            AgentEvent::Finished { .. } | AgentEvent::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentEvent::Finished { .. } | AgentEvent::Failed { .. })
    }
}

/// Receives every [`AgentEvent`] as the loop emits it.
pub trait AgentObserver: Send + Sync {
    fn on_event(&self, event: &AgentEvent);
}

pub fn validate_tool_pairs(events: &[AgentEvent]) -> Result<(), String> {
    let mut open: HashMap<u32, &str> = HashMap::new();

    for (index, event) in events.iter().enumerate() {
        match event {
            AgentEvent::ToolStarted { step, tool, .. } => {
                if let Some(previous) = open.insert(*step, tool.as_str()) {
                    return Err(format!(
                        "step {step} started {tool} while {previous} was still running (index {index})"
                    ));
                }
            }
            AgentEvent::ToolFinished { step, tool, .. } => match open.remove(step) {
                Some(started) if started == tool.as_str() => {}
                Some(started) => {
                    return Err(format!(
                        "step {step} finished {tool} but started {started} (index {index})"
                    ))
                }
                None => {
                    return Err(format!(
                        "ToolFinished without ToolStarted for step {step} at index {index}"
                    ))
                }
            },
            _ => {}
        }
    }

    match open.keys().min() {
        Some(step) => Err(format!("tool for step {step} never finished")),
        None => Ok(()),
    }
}

pub fn validate_single_terminal(events: &[AgentEvent]) -> Result<(), String> {
    let terminals: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.is_terminal())
        .map(|(index, _)| index)
        .collect();

    match terminals.as_slice() {
        [index] if *index + 1 == events.len() => Ok(()),
        [index] => Err(format!("events continue after terminal event at index {index}")),
        [] => Err("no terminal event".to_string()),
        [first, second, ..] => Err(format!(
            "terminal event emitted more than once (first at index {first}, again at index {second})"
        )),
    }
}
