//! Chat session management

use std::sync::Arc;

use colored::{ColoredString, Colorize};
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::conversation::ConversationController;
use crate::plan::{ConversationTurn, PlanGenerator, ProfileParams, Sender, TurnStatus};

const PREVIEW_CHARS: usize = 50;

/// Interactive trainer chat
pub struct ChatSession {
    generator: Arc<dyn PlanGenerator>,
    controller: ConversationController,
}

impl ChatSession {
    pub fn new(generator: Arc<dyn PlanGenerator>) -> Self {
        debug!("ChatSession::new: called");
        Self {
            generator,
            controller: ConversationController::new(),
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    /// Run the chat main loop
    pub async fn run(&mut self, params: ProfileParams) -> Result<()> {
        debug!("ChatSession::run: called");
        self.print_welcome();

        if let Some(request) = self.controller.mount(params) {
            if let Some(first) = self.controller.transcript().first() {
                self.print_turn(first);
            }
            print_thinking();
            self.controller.run(self.generator.as_ref(), request).await;
        }
        self.print_last_turn();

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => match LineAction::classify(&line) {
                    LineAction::Skip => continue,
                    LineAction::Slash(cmd) => {
                        let _ = rl.add_history_entry(cmd);
                        match self.handle_slash_command(cmd) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    }
                    LineAction::FollowUp(text) => {
                        let _ = rl.add_history_entry(text.trim());
                        self.process_follow_up(text).await;
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "FitCoach Trainer Chat".bright_cyan().bold());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn process_follow_up(&mut self, input: &str) {
        debug!("ChatSession::process_follow_up: called");
        let Some(request) = self.controller.submit_follow_up(input) else {
            if self.controller.profile().is_none() {
                println!(
                    "{}",
                    "No workout profile. Restart with --goals, --level and --time.".dimmed()
                );
            }
            return;
        };

        print_thinking();
        self.controller.run(self.generator.as_ref(), request).await;
        self.print_last_turn();
    }

    fn handle_slash_command(&self, input: &str) -> SlashResult {
        match SlashCommand::parse(input) {
            SlashCommand::Help => {
                self.print_help();
                SlashResult::Continue
            }
            SlashCommand::Quit => SlashResult::Quit,
            SlashCommand::History => {
                self.print_history();
                SlashResult::Continue
            }
            SlashCommand::Transcript => {
                self.print_transcript();
                SlashResult::Continue
            }
            SlashCommand::Unknown(cmd) => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the chat", "/quit".yellow());
        println!("  {:14} One line per turn", "/history".yellow());
        println!("  {:14} Show the full conversation", "/transcript".yellow());
        println!();
        println!("Anything else is sent to your trainer as a follow-up message.");
        println!();
    }

    fn print_history(&self) {
        let transcript = self.controller.transcript();
        if transcript.is_empty() {
            println!("{}", "No conversation history.".dimmed());
            return;
        }

        println!();
        println!("{}", "Conversation History:".bright_cyan());
        for (i, turn) in transcript.iter().enumerate() {
            println!("  {}. {}: {}", i + 1, sender_label(turn), preview(&turn.text));
        }
        println!();
    }

    fn print_transcript(&self) {
        for turn in self.controller.transcript() {
            self.print_turn(turn);
        }
    }

    fn print_last_turn(&self) {
        if let Some(turn) = self.controller.transcript().last() {
            self.print_turn(turn);
        }
    }

    fn print_turn(&self, turn: &ConversationTurn) {
        println!();
        println!("{}", sender_label(turn).bold());
        match turn.status {
            TurnStatus::Pending => println!("{}", "...".dimmed()),
            TurnStatus::Errored => println!("{}", turn.text.red()),
            TurnStatus::Resolved => println!("{}", turn.text),
        }
        println!();
    }
}

fn print_thinking() {
    println!("{}", "Thinking...".dimmed());
}

fn sender_label(turn: &ConversationTurn) -> ColoredString {
    match turn.sender {
        Sender::User => "You".bright_green(),
        Sender::Assistant => "Trainer".bright_blue(),
        Sender::SystemError => "System".red(),
    }
}

/// First line of a turn, cut to a short preview
pub fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if preview.len() < text.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// What to do with one line read from the prompt
///
/// Trimming only decides the kind of line. A follow-up keeps the text
/// exactly as typed.
#[derive(Debug, PartialEq, Eq)]
pub enum LineAction<'a> {
    Skip,
    Slash(&'a str),
    FollowUp(&'a str),
}

impl<'a> LineAction<'a> {
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Self::Skip
        } else if trimmed.starts_with('/') {
            Self::Slash(trimmed)
        } else {
            Self::FollowUp(line)
        }
    }
}

/// Slash commands understood by the chat
#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    History,
    Transcript,
    Unknown(String),
}

impl SlashCommand {
    pub fn parse(input: &str) -> Self {
        let cmd = input.split_whitespace().next().unwrap_or("");
        match cmd {
            "/help" | "/h" => Self::Help,
            "/quit" | "/q" | "/exit" => Self::Quit,
            "/history" => Self::History,
            "/transcript" | "/t" => Self::Transcript,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_command_parse() {
        assert_eq!(SlashCommand::parse("/help"), SlashCommand::Help);
        assert_eq!(SlashCommand::parse("/q"), SlashCommand::Quit);
        assert_eq!(SlashCommand::parse("/history extra"), SlashCommand::History);
        assert_eq!(SlashCommand::parse("/transcript"), SlashCommand::Transcript);
        assert_eq!(SlashCommand::parse("/dance"), SlashCommand::Unknown("/dance".to_string()));
    }

    #[test]
    fn test_line_action_classify() {
        assert_eq!(LineAction::classify(""), LineAction::Skip);
        assert_eq!(LineAction::classify("  \t "), LineAction::Skip);
        assert_eq!(LineAction::classify("  /help  "), LineAction::Slash("/help"));
        assert_eq!(
            LineAction::classify("  more cardio please  "),
            LineAction::FollowUp("  more cardio please  ")
        );
    }

    #[tokio::test]
    async fn test_follow_up_keeps_text_as_typed() {
        use crate::plan::generator::mock::MockPlanGenerator;

        let generator = Arc::new(MockPlanGenerator::replying("plan"));
        let mut session = ChatSession::new(generator.clone());
        let request = session
            .controller
            .mount(ProfileParams::new("lose weight", "beginner", "20 min"))
            .unwrap();
        session.controller.run(generator.as_ref(), request).await;

        let line = "  add stretching\tplease ";
        let LineAction::FollowUp(text) = LineAction::classify(line) else {
            panic!("expected a follow-up");
        };
        session.process_follow_up(text).await;

        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].fitness_goals, line);

        let transcript = session.controller().transcript();
        assert_eq!(transcript[transcript.len() - 2].text, line);
    }

    #[test]
    fn test_preview_short_text() {
        assert_eq!(preview("Day 1: walk"), "Day 1: walk");
    }

    #[test]
    fn test_preview_truncates_long_and_multiline_text() {
        let long = "x".repeat(80);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(50)));
        assert_eq!(preview("Goals: lose weight\nLevel: beginner"), "Goals: lose weight...");
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        use crate::plan::generator::mock::MockPlanGenerator;

        let session = ChatSession::new(Arc::new(MockPlanGenerator::replying("plan")));
        assert!(session.controller().transcript().is_empty());
        assert!(!session.controller().is_awaiting_response());
    }
}
