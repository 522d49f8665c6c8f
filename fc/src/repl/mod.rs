//! Interactive trainer chat
//!
//! A terminal rendition of the conversation page: the transcript is printed
//! as turns settle, and each plain line is sent as a follow-up.

mod session;

pub use session::{ChatSession, SlashCommand, preview};

use std::sync::Arc;

use eyre::Result;

use crate::config::Config;
use crate::llm;
use crate::plan::{PlanAssembler, PlanGenerator, ProfileParams};
use crate::prompts::PromptLoader;

/// Build the plan generator described by the configuration
pub fn build_generator(config: &Config) -> Result<Arc<dyn PlanGenerator>> {
    let client = llm::create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let workdir = std::env::current_dir()?;
    let prompts = PromptLoader::new(workdir);
    Ok(Arc::new(PlanAssembler::new(client, prompts, config.llm.max_tokens)))
}

/// Run the interactive chat
///
/// This is the main entry point for `fc chat`.
pub async fn run_interactive(config: &Config, params: ProfileParams) -> Result<()> {
    let generator = build_generator(config)?;
    let mut session = ChatSession::new(generator);
    session.run(params).await
}
