use courier_core::Conversation;
use courier_llm::Llm;

use crate::executor::{AgentExecutor, AgentRun};
use crate::AgentError;

/// One chat: an executor plus the conversation it answers within.
///
/// A submission is recorded (user turn, then assistant turn) only when the
/// run succeeds, so a failed run leaves the history untouched.
pub struct ChatSession<L> {
    executor: AgentExecutor<L>,
    conversation: Conversation,
}

impl<L> ChatSession<L>
where
    L: Llm,
{
    pub fn new(executor: AgentExecutor<L>) -> Self {
        Self {
            executor,
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn executor(&self) -> &AgentExecutor<L> {
        &self.executor
    }

    pub async fn submit(&mut self, input: &str) -> Result<AgentRun, AgentError> {
        let run = self.executor.run(input, &self.conversation).await?;
        self.conversation.push_user(input);
        self.conversation.push_assistant(run.output.clone());
        Ok(run)
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }
}
