//! ReAct agent loop: the model thinks in text, names a tool with
//! `Action:`/`Action Input:`, reads the observation, and repeats until it
//! gives a `Final Answer:`.

mod error;
mod event;
mod executor;
mod parser;
mod policy;
mod registry;
mod session;

pub use error::AgentError;
pub use event::{validate_single_terminal, validate_tool_pairs, AgentEvent, AgentObserver};
pub use executor::{
    AgentExecutor, AgentRun, DEFAULT_MAX_ITERATIONS, DEFAULT_TEMPERATURE, OBSERVATION_STOP,
};
pub use parser::{parse_directive, Directive, MalformedOutput};
pub use policy::{FormatRetryPolicy, PolicyDecision};
pub use registry::{ToolRegistry, ToolRegistryError};
pub use session::ChatSession;
