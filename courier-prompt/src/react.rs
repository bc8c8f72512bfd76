use std::collections::HashMap;

use courier_core::CourierError;

use crate::PromptTemplate;

pub const DEFAULT_REACT_TEMPLATE: &str = r#"You are an AI assistant with access to various tools. Follow these rules:

FOR EMAIL COMPOSITION:
- When asked to write or send an email, extract carefully:
  1. The recipient email address (must be a valid email format)
  2. A clear subject line summarizing the purpose
  3. A detailed body with a professional greeting (use the recipient's name if known),
     a clear explanation of the situation, any necessary details or context,
     and a professional closing with your name
- Always keep a professional tone
- If the reason is not specified, ask for clarification

AVAILABLE TOOLS:
{{tools}}

TOOL NAMES:
{{tool_names}}

RESPONSE FORMAT:
For tool use:
Thought: Do I need a tool? Yes
Action: tool_name (must be one of {{tool_names}})
Action Input: properly_formatted_input
Observation: tool_result

For the final answer:
Thought: Do I need a tool? No
Final Answer: your_response

EMAIL FORMAT EXAMPLE:
Action: send_email
Action Input: to="manager@company.com", subject="Unable to attend team meeting", body="Dear [Name],\n\nI regret to inform you that I won't be able to attend tomorrow's team meeting due to [reason].\n\nI've prepared my updates and shared them with [colleague] who can present them on my behalf.\n\nPlease let me know if you need anything else from me.\n\nBest regards,\n[Your Name]"

CURRENT TASK: {{input}}
CHAT HISTORY: {{chat_history}}
PAST ACTIONS: {{agent_scratchpad}}"#;

/// Values substituted into the ReAct prompt for one model call.
#[derive(Debug, Clone, Default)]
pub struct ReActVariables {
    pub input: String,
    pub chat_history: String,
    /// `name: description` lines, one per tool.
    pub tools: String,
    /// Comma separated tool names.
    pub tool_names: String,
    pub agent_scratchpad: String,
}

#[derive(Debug, Clone)]
pub struct ReActPrompt {
    template: PromptTemplate,
}

impl Default for ReActPrompt {
    fn default() -> Self {
        Self::new(PromptTemplate::new(DEFAULT_REACT_TEMPLATE))
    }
}

impl ReActPrompt {
    pub fn new(template: PromptTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn render(&self, vars: &ReActVariables) -> Result<String, CourierError> {
        let values = HashMap::from([
            ("input", vars.input.clone()),
            ("chat_history", vars.chat_history.clone()),
            ("tools", vars.tools.clone()),
            ("tool_names", vars.tool_names.clone()),
            ("agent_scratchpad", vars.agent_scratchpad.clone()),
        ]);
        self.template.render(&values)
    }
}

/// One scratchpad entry: the model's own text, what came back, and the cue
/// for the next thought.
pub fn scratchpad_entry(log: &str, observation: &str) -> String {
    format!("{log}\nObservation: {observation}\nThought: ")
}
