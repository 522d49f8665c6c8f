//! Plan form validation
//!
//! Checks the profile fields at the input boundary, before a conversation
//! is started. Every failing field is reported, not just the first.

use thiserror::Error;
use tracing::debug;

use super::types::{FitnessLevel, Profile};

const MIN_GOALS_CHARS: usize = 10;
const MIN_TIME_CHARS: usize = 5;

pub const GOALS_MESSAGE: &str = "Please describe your fitness goals in at least 10 characters.";
pub const LEVEL_MESSAGE: &str = "Please select your current fitness level.";
pub const TIME_MESSAGE: &str = "Please specify your available time, e.g., '30 mins, 3x a week'.";

/// Form field names, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FitnessGoals,
    CurrentFitnessLevel,
    AvailableTime,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FitnessGoals => "Fitness Goals",
            Self::CurrentFitnessLevel => "Current Fitness Level",
            Self::AvailableTime => "Available Time",
        }
    }
}

/// Validation failures, one entry per bad field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_errors(.errors))]
pub struct FormErrors {
    pub errors: Vec<(FormField, &'static str)>,
}

impl FormErrors {
    pub fn message_for(&self, field: FormField) -> Option<&'static str> {
        self.errors.iter().find(|(f, _)| *f == field).map(|(_, m)| *m)
    }
}

fn format_errors(errors: &[(FormField, &'static str)]) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field.label(), message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Unvalidated form input
#[derive(Debug, Clone, Default)]
pub struct PlanForm {
    pub fitness_goals: String,
    pub current_fitness_level: Option<String>,
    pub available_time: String,
}

impl PlanForm {
    /// Validate the form and produce a profile
    pub fn validate(&self) -> Result<Profile, FormErrors> {
        debug!(?self, "PlanForm::validate: called");
        let mut errors = Vec::new();

        let goals = self.fitness_goals.trim();
        if goals.chars().count() < MIN_GOALS_CHARS {
            errors.push((FormField::FitnessGoals, GOALS_MESSAGE));
        }

        let level = self
            .current_fitness_level
            .as_deref()
            .and_then(|l| l.parse::<FitnessLevel>().ok());
        if level.is_none() {
            errors.push((FormField::CurrentFitnessLevel, LEVEL_MESSAGE));
        }

        let time = self.available_time.trim();
        if time.chars().count() < MIN_TIME_CHARS {
            errors.push((FormField::AvailableTime, TIME_MESSAGE));
        }

        match level {
            Some(current_fitness_level) if errors.is_empty() => Ok(Profile {
                fitness_goals: goals.to_string(),
                current_fitness_level,
                available_time: time.to_string(),
            }),
            _ => {
                debug!(error_count = errors.len(), "PlanForm::validate: rejected");
                Err(FormErrors { errors })
            }
        }
    }
}
