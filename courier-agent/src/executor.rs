use std::sync::Arc;

use courier_core::{
    AgentAction, AgentOutcome, Conversation, IntermediateStep, LlmRequest, Message,
};
use courier_llm::Llm;
use courier_prompt::{scratchpad_entry, ReActPrompt, ReActVariables};
use uuid::Uuid;

use crate::event::{AgentEvent, AgentObserver};
use crate::parser::{parse_directive, MalformedOutput};
use crate::policy::{FormatRetryPolicy, PolicyDecision};
use crate::registry::ToolRegistry;
use crate::AgentError;

pub const DEFAULT_MAX_ITERATIONS: u32 = 15;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// Result of a run that reached a final answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRun {
    pub run_id: Uuid,
    pub output: String,
    pub intermediate_steps: Vec<IntermediateStep>,
}

/// Drives the think / act / observe loop for one user input at a time.
pub struct AgentExecutor<L> {
    llm: L,
    tools: ToolRegistry,
    prompt: ReActPrompt,
    model: String,
    temperature: Option<f32>,
    max_iterations: u32,
    retry_policy: FormatRetryPolicy,
    observer: Option<Arc<dyn AgentObserver>>,
}

impl<L> AgentExecutor<L>
where
    L: Llm,
{
    pub fn new(llm: L, tools: ToolRegistry) -> Self {
        Self {
            llm,
            tools,
            prompt: ReActPrompt::default(),
            model: String::new(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            retry_policy: FormatRetryPolicy::default(),
            observer: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_format_retries(mut self, max: u32) -> Self {
        self.retry_policy = FormatRetryPolicy::new(max);
        self
    }

    pub fn with_prompt(mut self, prompt: ReActPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn AgentObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn emit(&self, event: AgentEvent) {
        tracing::debug!(?event, "agent event");
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }

    fn fail(&self, run_id: Uuid, err: AgentError) -> AgentError {
        tracing::warn!(%run_id, error = %err, "agent run failed");
        self.emit(AgentEvent::Failed {
            reason: err.to_string(),
        });
        err
    }

    fn request(&self, prompt: String) -> LlmRequest {
        LlmRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            stop: vec![OBSERVATION_STOP.to_string()],
            temperature: self.temperature,
        }
    }

    /// Answers `input` given the prior turns in `history`. The history is
    /// only read; recording the exchange is up to the caller.
    pub async fn run(&self, input: &str, history: &Conversation) -> Result<AgentRun, AgentError> {
        let run_id = Uuid::new_v4();
        let tool_names = self.tools.names().join(", ");
        let mut variables = ReActVariables {
            input: input.to_string(),
            chat_history: history.transcript(),
            tools: self.tools.catalog(),
            tool_names: tool_names.clone(),
            agent_scratchpad: String::new(),
        };

        let mut steps: Vec<IntermediateStep> = Vec::new();
        let mut consecutive_errors = 0_u32;
        let mut step = 0_u32;

        loop {
            step += 1;
            self.emit(AgentEvent::Thinking { step });

            let prompt = self
                .prompt
                .render(&variables)
                .map_err(|err| self.fail(run_id, AgentError::Prompt(err)))?;
            tracing::debug!(%run_id, step, prompt = %prompt, "model prompt");

            let response = self
                .llm
                .invoke(self.request(prompt))
                .await
                .map_err(|err| self.fail(run_id, AgentError::Llm(err)))?;
            tracing::debug!(%run_id, step, text = %response.content, "model response");

            let malformed = match parse_directive(&response.content).into_outcome() {
                Ok(AgentOutcome::Finish(finish)) => {
                    tracing::info!(%run_id, tool_calls = steps.len(), "agent finished");
                    self.emit(AgentEvent::Finished {
                        steps: steps.len() as u32,
                    });
                    return Ok(AgentRun {
                        run_id,
                        output: finish.output,
                        intermediate_steps: steps,
                    });
                }
                Ok(AgentOutcome::Action(action)) if self.tools.contains(&action.tool) => {
                    consecutive_errors = 0;
                    if steps.len() as u32 >= self.max_iterations {
                        return Err(
                            self.fail(run_id, AgentError::IterationLimit(self.max_iterations))
                        );
                    }
                    let observation = self.act(step, &action).await;
                    variables
                        .agent_scratchpad
                        .push_str(&scratchpad_entry(&action.log, &observation));
                    steps.push(IntermediateStep::new(action, observation));
                    continue;
                }
                Ok(AgentOutcome::Action(action)) => MalformedOutput {
                    reason: format!(
                        "{} is not a valid tool, try one of [{}]",
                        action.tool, tool_names
                    ),
                    log: action.log,
                },
                Err(malformed) => malformed,
            };

            consecutive_errors += 1;
            match self.retry_policy.decide(consecutive_errors) {
                PolicyDecision::Fail => {
                    return Err(self.fail(
                        run_id,
                        AgentError::InvalidModelOutput {
                            reason: malformed.reason,
                            raw_response: response.content,
                            attempts: consecutive_errors,
                        },
                    ));
                }
                PolicyDecision::Reprompt => {
                    tracing::warn!(%run_id, step, reason = %malformed.reason, "re-prompting after invalid format");
                    self.emit(AgentEvent::FormatRetry {
                        step,
                        reason: malformed.reason.clone(),
                    });
                    let notice = format!("Invalid Format: {}", malformed.reason);
                    variables
                        .agent_scratchpad
                        .push_str(&scratchpad_entry(&malformed.log, &notice));
                }
            }
        }
    }

    async fn act(&self, step: u32, action: &AgentAction) -> String {
        tracing::info!(step, tool = %action.tool, input = %action.tool_input, "invoking tool");
        self.emit(AgentEvent::ToolStarted {
            step,
            tool: action.tool.clone(),
            input: action.tool_input.clone(),
        });
        let observation = self.tools.observe(&action.tool, &action.tool_input).await;
        tracing::info!(step, tool = %action.tool, "tool finished");
        self.emit(AgentEvent::ToolFinished {
            step,
            tool: action.tool.clone(),
            observation: observation.clone(),
        });
        observation
    }
}
