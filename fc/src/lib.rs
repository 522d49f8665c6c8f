//! FitCoach - AI personal trainer
//!
//! FitCoach turns a short fitness profile into a personalized workout plan
//! and lets the user refine it through a conversation with an LLM-backed
//! trainer.
//!
//! # Core Concepts
//!
//! - **Profile**: goals, fitness level and available time, fixed for a session
//! - **Transcript**: an append-only list of turns owned by one controller
//! - **One request in flight**: follow-ups are rejected while a reply is pending
//! - **Plain-text prompts**: the whole history is rendered into a single prompt
//!
//! # Modules
//!
//! - [`plan`] - Domain types, form validation, and the plan assembler
//! - [`conversation`] - Conversation state controller
//! - [`llm`] - LLM client trait with Anthropic and OpenAI implementations
//! - [`prompts`] - Prompt template loading and rendering
//! - [`repl`] - Interactive trainer chat
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod plan;
pub mod prompts;
pub mod repl;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use conversation::{ConversationController, ConversationState};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client};
pub use plan::{
    ConversationTurn, FitnessLevel, GenerationError, PlanAssembler, PlanForm, PlanGenerator, PlanRequest, PlanResponse,
    Profile, ProfileParams, Sender, TurnStatus,
};
pub use prompts::PromptLoader;
