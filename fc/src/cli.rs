//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;
use crate::plan::{PlanForm, ProfileParams};

/// FitCoach - AI personal trainer in the terminal
#[derive(Parser)]
#[command(
    name = "fc",
    about = "Generate a personalized workout plan and refine it by chatting with an AI trainer",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a single workout plan
    Plan {
        /// What you want to achieve (at least 10 characters)
        #[arg(short, long)]
        goals: String,

        /// Current fitness level (beginner, intermediate, advanced)
        #[arg(short = 'L', long)]
        level: Option<String>,

        /// Time you can spend, e.g. "30 mins, 3x a week"
        #[arg(short, long)]
        time: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Start an interactive conversation with the trainer
    Chat {
        /// What you want to achieve (at least 10 characters)
        #[arg(short, long)]
        goals: Option<String>,

        /// Current fitness level (beginner, intermediate, advanced)
        #[arg(short = 'L', long)]
        level: Option<String>,

        /// Time you can spend, e.g. "30 mins, 3x a week"
        #[arg(short, long)]
        time: Option<String>,
    },

    /// Show logs
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

/// Profile arguments as given on the command line
///
/// The form is only validated when every field was supplied. Anything
/// missing is passed through so the conversation can report it.
#[derive(Debug, Clone, Default)]
pub struct ProfileArgs {
    pub goals: Option<String>,
    pub level: Option<String>,
    pub time: Option<String>,
}

impl ProfileArgs {
    pub fn is_complete(&self) -> bool {
        self.goals.is_some() && self.level.is_some() && self.time.is_some()
    }

    pub fn to_form(&self) -> PlanForm {
        PlanForm {
            fitness_goals: self.goals.clone().unwrap_or_default(),
            current_fitness_level: self.level.clone(),
            available_time: self.time.clone().unwrap_or_default(),
        }
    }

    /// Validate when complete and produce the initiating parameters
    pub fn into_params(self) -> Result<ProfileParams, crate::plan::FormErrors> {
        debug!(?self, "ProfileArgs::into_params: called");
        if self.is_complete() {
            let profile = self.to_form().validate()?;
            return Ok(ProfileParams::new(
                profile.fitness_goals,
                profile.current_fitness_level.as_str(),
                profile.available_time,
            ));
        }

        debug!("ProfileArgs::into_params: incomplete, skipping form validation");
        Ok(ProfileParams {
            fitness_goals: self.goals,
            current_fitness_level: self.level,
            available_time: self.time,
        })
    }
}

/// Result of checking the configured backend
pub struct BackendCheck {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub key_present: bool,
}

impl BackendCheck {
    pub fn from_config(config: &Config) -> Self {
        debug!("BackendCheck::from_config: called");
        Self {
            provider: config.llm.provider.clone(),
            model: config.llm.model.clone(),
            api_key_env: config.llm.api_key_env.clone(),
            key_present: config.llm.get_api_key().is_ok(),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fitcoach")
        .join("logs")
        .join("fitcoach.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with the backend status and log location
pub fn generate_after_help(config: &Config) -> String {
    debug!("generate_after_help: called");
    let backend = BackendCheck::from_config(config);
    let log_path = get_log_path();

    let mut help = String::new();

    help.push_str("Backend:\n");
    help.push_str(&format!("  {:<10} {}\n", backend.provider, backend.model));
    let icon = if backend.key_present {
        debug!("generate_after_help: api key present");
        "\u{2705}"
    } else {
        debug!("generate_after_help: api key missing");
        "\u{274C}"
    };
    help.push_str(&format!("  {} {}\n", icon, backend.api_key_env));

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", log_path.display()));

    debug!("generate_after_help: returning help text");
    help
}

/// Output format for the plan command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
