use serde::{Deserialize, Serialize};

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: String,
    /// The raw model text that produced this action.
    pub log: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentFinish {
    pub output: String,
    pub log: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AgentOutcome {
    Action(AgentAction),
    Finish(AgentFinish),
}

impl AgentOutcome {
    pub fn is_finish(&self) -> bool {
        matches!(self, AgentOutcome::Finish(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntermediateStep {
    pub action: AgentAction,
    pub observation: String,
}

impl IntermediateStep {
    pub fn new(action: AgentAction, observation: impl Into<String>) -> Self {
        Self {
            action,
            observation: observation.into(),
        }
    }
}
