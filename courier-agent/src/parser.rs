//! Recognizer for the text protocol the model answers in:
//!
//! ```text
//! Thought: Do I need a tool? Yes
//! Action: google_search
//! Action Input: rust async runtimes
//! ```
//!
//! or `Final Answer: <text>`.

use courier_core::{AgentAction, AgentFinish, AgentOutcome};

const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const FINAL_ANSWER: &str = "Final Answer:";
const OBSERVATION: &str = "\nObservation:";

pub const MISSING_ACTION: &str = "Missing 'Action:' after 'Thought:'";
pub const MISSING_ACTION_INPUT: &str = "Missing 'Action Input:' after 'Action:'";
pub const ACTION_AND_ANSWER: &str =
    "Response contains both a final answer and an action; give exactly one";
pub const EMPTY_TOOL_NAME: &str = "'Action:' does not name a tool";
pub const EMPTY_FINAL_ANSWER: &str = "'Final Answer:' is empty; write the answer after it";

/// What one model response asks the loop to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Action(AgentAction),
    FinalAnswer(AgentFinish),
    Malformed { reason: String, log: String },
}

/// A response that fit neither directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedOutput {
    pub reason: String,
    pub log: String,
}

impl Directive {
    pub fn into_outcome(self) -> Result<AgentOutcome, MalformedOutput> {
        match self {
            Directive::Action(action) => Ok(AgentOutcome::Action(action)),
            Directive::FinalAnswer(finish) => Ok(AgentOutcome::Finish(finish)),
            Directive::Malformed { reason, log } => Err(MalformedOutput { reason, log }),
        }
    }
}

fn malformed(reason: &str, log: String) -> Directive {
    Directive::Malformed {
        reason: reason.to_string(),
        log,
    }
}

pub fn parse_directive(text: &str) -> Directive {
    let log = text.trim().to_string();

    let answer_at = text.find(FINAL_ANSWER);
    let action_at = text.find(ACTION);
    let input_at = action_at
        .and_then(|at| text[at..].find(ACTION_INPUT).map(|offset| at + offset));

    match (action_at, input_at, answer_at) {
        (Some(_), Some(_), Some(_)) => malformed(ACTION_AND_ANSWER, log),
        (Some(action_at), Some(input_at), None) => {
            let tool = text[action_at + ACTION.len()..input_at].trim();
            if tool.is_empty() {
                return malformed(EMPTY_TOOL_NAME, log);
            }
            let rest = &text[input_at + ACTION_INPUT.len()..];
            // The stop sequence normally prevents it, but a model can still
            // write its own observation after the input.
            let input = rest
                .find(OBSERVATION)
                .map_or(rest, |end| &rest[..end])
                .trim();
            Directive::Action(AgentAction {
                tool: tool.to_string(),
                tool_input: input.to_string(),
                log,
            })
        }
        (_, _, Some(answer_at)) => {
            let output = text[answer_at + FINAL_ANSWER.len()..].trim();
            if output.is_empty() {
                return malformed(EMPTY_FINAL_ANSWER, log);
            }
            Directive::FinalAnswer(AgentFinish {
                output: output.to_string(),
                log,
            })
        }
        (None, _, None) => malformed(MISSING_ACTION, log),
        (Some(_), None, None) => malformed(MISSING_ACTION_INPUT, log),
    }
}
