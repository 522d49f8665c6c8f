//! FitCoach - AI personal trainer
//!
//! CLI entry point for generating and refining workout plans.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use fitcoach::cli::{Cli, Command, OutputFormat, ProfileArgs, generate_after_help, get_log_path};
use fitcoach::config::Config;
use fitcoach::conversation::ConversationController;
use fitcoach::plan::{PlanForm, PlanResponse, ProfileParams, Sender, TurnStatus};
use fitcoach::repl;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fitcoach")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = match level_str.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("fitcoach.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Build command with dynamic after_help that shows backend status
    let help_config = Config::load(None).unwrap_or_default();
    let cmd = Cli::command().after_help(generate_after_help(&help_config));

    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    info!(provider = %config.llm.provider, model = %config.llm.model, "FitCoach loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan {
            goals,
            level,
            time,
            format,
        } => {
            debug!(?format, "main: matched Plan command");
            let form = PlanForm {
                fitness_goals: goals,
                current_fitness_level: level,
                available_time: time,
            };
            cmd_plan(&config, form, format).await
        }
        Command::Chat { goals, level, time } => {
            debug!("main: matched Chat command");
            cmd_chat(&config, ProfileArgs { goals, level, time }).await
        }
        Command::Logs { lines } => {
            debug!(lines, "main: matched Logs command");
            cmd_logs(lines)
        }
    }
}

/// Generate one plan and print it
async fn cmd_plan(config: &Config, form: PlanForm, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_plan: called");
    let profile = match form.validate() {
        Ok(profile) => profile,
        Err(errors) => {
            eprintln!("{}", "Please fix the following:".red());
            for (field, message) in &errors.errors {
                eprintln!("  {}: {}", field.label(), message);
            }
            std::process::exit(2);
        }
    };

    let generator = repl::build_generator(config)?;
    let mut controller = ConversationController::new();
    let params = ProfileParams::new(
        profile.fitness_goals,
        profile.current_fitness_level.as_str(),
        profile.available_time,
    );
    controller.start(generator.as_ref(), params).await;

    let failed = controller.ended_in_error();
    match format {
        OutputFormat::Json => {
            if let Some(turn) = controller.transcript().last()
                && turn.sender == Sender::Assistant
            {
                let response = PlanResponse {
                    plan_text: turn.text.clone(),
                };
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
        }
        OutputFormat::Text => {
            for turn in controller.transcript() {
                let label = match turn.sender {
                    Sender::User => "You".bright_green(),
                    Sender::Assistant => "Trainer".bright_blue(),
                    Sender::SystemError => "System".red(),
                };
                println!("{}", label.bold());
                if turn.status == TurnStatus::Errored {
                    println!("{}", turn.text.red());
                } else {
                    println!("{}", turn.text);
                }
                println!();
            }
        }
    }

    if failed {
        if format == OutputFormat::Json
            && let Some(turn) = controller.transcript().last()
        {
            eprintln!("{}", turn.text);
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Run the interactive trainer chat
async fn cmd_chat(config: &Config, args: ProfileArgs) -> Result<()> {
    debug!(?args, "cmd_chat: called");
    let params = match args.into_params() {
        Ok(params) => params,
        Err(errors) => {
            eprintln!("{}", "Please fix the following:".red());
            for (field, message) in &errors.errors {
                eprintln!("  {}: {}", field.label(), message);
            }
            std::process::exit(2);
        }
    };

    repl::run_interactive(config, params).await
}

/// Print the tail of the log file
fn cmd_logs(lines: usize) -> Result<()> {
    debug!(lines, "cmd_logs: called");
    let log_path = get_log_path();

    if !log_path.exists() {
        debug!(?log_path, "cmd_logs: log file does not exist");
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    let file = fs::File::open(&log_path).context("Failed to open log file")?;
    let reader = BufReader::new(file);
    let all_lines: Vec<String> = reader.lines().map_while(Result::ok).collect();

    let start = all_lines.len().saturating_sub(lines);
    for line in &all_lines[start..] {
        println!("{}", line);
    }

    Ok(())
}
