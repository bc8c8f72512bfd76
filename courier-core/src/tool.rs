use thiserror::Error;

/// Failure at the tool boundary.
///
/// Messages are written for the model: the agent loop feeds them back as the
/// observation text, so they should read as complete sentences.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Config(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("{0}")]
    ExecutionFailed(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A named capability the model may ask to run.
///
/// Tools receive the raw `Action Input:` text and do their own parsing.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn invoke(&self, input: &str) -> Result<String, ToolError>;
}
