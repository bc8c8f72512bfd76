use std::sync::Arc;

use courier_core::Tool;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolRegistryError {
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),
    #[error("invalid tool name: {0:?}")]
    InvalidName(String),
}

/// Tools the agent may call, kept in registration order so the catalog the
/// model sees is stable.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tools<I>(tools: I) -> Result<Self, ToolRegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolRegistryError> {
        let name = tool.name();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ToolRegistryError::InvalidName(name.to_string()));
        }
        if self.contains(name) {
            return Err(ToolRegistryError::DuplicateName(name.to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// `name: description` lines for the prompt.
    pub fn catalog(&self) -> String {
        self.tools
            .iter()
            .map(|tool| format!("{}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Runs a tool and always yields observation text; failures come back as
    /// `Error: <message>`.
    pub async fn observe(&self, name: &str, input: &str) -> String {
        let Some(tool) = self.get(name) else {
            return format!("Error: unknown tool {name}");
        };
        match tool.invoke(input).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "tool failed");
                format!("Error: {err}")
            }
        }
    }
}
