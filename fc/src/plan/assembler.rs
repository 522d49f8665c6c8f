//! Plan request assembler
//!
//! Renders a plan request into a single plain-text prompt, sends it to the
//! LLM backend, and hands back the generated text untouched.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{ConversationTurn, GenerationError, PlanGenerator, PlanRequest, PlanResponse, Sender};
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::PromptLoader;

/// Template rendered for every plan request
const TEMPLATE_NAME: &str = "workout-plan";

const SYSTEM_PROMPT: &str =
    "You are a friendly, knowledgeable personal trainer. Answer in plain text suitable for a chat window.";

#[derive(Debug, Serialize)]
struct HistoryLine<'a> {
    sender: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct PromptContext<'a> {
    fitness_goals: &'a str,
    current_fitness_level: &'static str,
    available_time: &'a str,
    has_history: bool,
    history: Vec<HistoryLine<'a>>,
}

/// Turns that are forwarded to the backend
///
/// System-error turns are diagnostics for the user and never reach the model.
pub fn forwarded_history(history: &[ConversationTurn]) -> impl Iterator<Item = &ConversationTurn> {
    history.iter().filter(|turn| turn.sender != Sender::SystemError)
}

/// Builds prompts and calls the LLM backend
pub struct PlanAssembler {
    client: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    max_tokens: u32,
}

impl PlanAssembler {
    pub fn new(client: Arc<dyn LlmClient>, prompts: PromptLoader, max_tokens: u32) -> Self {
        debug!(%max_tokens, "PlanAssembler::new: called");
        Self {
            client,
            prompts,
            max_tokens,
        }
    }

    /// Render the prompt for a request
    pub fn render_prompt(&self, request: &PlanRequest) -> eyre::Result<String> {
        debug!("PlanAssembler::render_prompt: called");
        let history: Vec<HistoryLine<'_>> = request
            .conversation_history
            .as_deref()
            .map(|turns| {
                forwarded_history(turns)
                    .map(|turn| HistoryLine {
                        sender: turn.sender.as_str(),
                        text: &turn.text,
                    })
                    .collect()
            })
            .unwrap_or_default();
        debug!(history_len = history.len(), "PlanAssembler::render_prompt: filtered history");

        let context = PromptContext {
            fitness_goals: &request.fitness_goals,
            current_fitness_level: request.current_fitness_level.as_str(),
            available_time: &request.available_time,
            has_history: !history.is_empty(),
            history,
        };

        self.prompts.render(TEMPLATE_NAME, &context)
    }

    async fn try_generate(&self, request: &PlanRequest) -> Result<PlanResponse, GenerationError> {
        let prompt = self
            .render_prompt(request)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;

        let completion = CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
        };

        let response = self.client.complete(completion).await?;
        debug!(
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "PlanAssembler::try_generate: backend responded"
        );

        match response.content {
            Some(plan_text) if !plan_text.trim().is_empty() => Ok(PlanResponse { plan_text }),
            _ => Err(GenerationError::EmptyResponse),
        }
    }
}

#[async_trait]
impl PlanGenerator for PlanAssembler {
    async fn generate(&self, request: PlanRequest) -> Result<PlanResponse, GenerationError> {
        debug!(
            follow_up = request.conversation_history.is_some(),
            "PlanAssembler::generate: called"
        );
        match self.try_generate(&request).await {
            Ok(response) => {
                info!(chars = response.plan_text.len(), "Plan generated");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, status = ?e.status(), "Plan generation failed");
                Err(e)
            }
        }
    }
}
