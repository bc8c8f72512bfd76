mod conversation;
mod error;
mod llm;
mod react;
mod runnable;
mod tool;

pub use conversation::{Conversation, Turn};
pub use error::CourierError;
pub use llm::{LlmRequest, LlmResponse, Message, Role};
pub use react::{AgentAction, AgentFinish, AgentOutcome, IntermediateStep};
pub use runnable::Runnable;
pub use tool::{Tool, ToolError};
