use courier_core::CourierError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid model output after {attempts} attempt(s): {reason}")]
    InvalidModelOutput {
        reason: String,
        raw_response: String,
        attempts: u32,
    },
    #[error("no final answer reached within {0} tool calls")]
    IterationLimit(u32),
    #[error("model call failed: {0}")]
    Llm(#[source] CourierError),
    #[error("prompt rendering failed: {0}")]
    Prompt(#[source] CourierError),
}
