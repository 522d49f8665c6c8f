//! Plan domain types
//!
//! The fitness profile, conversation turns, and the request/response pair
//! exchanged with the plan assembler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Self-reported fitness level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for FitnessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(format!(
                "Unknown fitness level: {}. Use: beginner, intermediate, or advanced",
                s
            )),
        }
    }
}

impl fmt::Display for FitnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three initiating parameters, established once per session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub fitness_goals: String,
    pub current_fitness_level: FitnessLevel,
    pub available_time: String,
}

impl Profile {
    /// Text of the user turn that opens a conversation
    pub fn summary(&self) -> String {
        format!(
            "Goals: {}\nLevel: {}\nTime: {}",
            self.fitness_goals, self.current_fitness_level, self.available_time
        )
    }
}

/// Raw initiating parameters as they arrive from the outside
///
/// Any of them may be absent. A conversation can only start once all three
/// are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileParams {
    pub fitness_goals: Option<String>,
    pub current_fitness_level: Option<String>,
    pub available_time: Option<String>,
}

impl ProfileParams {
    pub fn new(
        fitness_goals: impl Into<String>,
        current_fitness_level: impl Into<String>,
        available_time: impl Into<String>,
    ) -> Self {
        Self {
            fitness_goals: Some(fitness_goals.into()),
            current_fitness_level: Some(current_fitness_level.into()),
            available_time: Some(available_time.into()),
        }
    }

    /// Build a profile if every parameter is present and usable
    ///
    /// Blank strings count as missing, and so does a level outside the
    /// three known values.
    pub fn into_profile(self) -> Option<Profile> {
        debug!(?self, "ProfileParams::into_profile: called");
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let fitness_goals = present(self.fitness_goals)?;
        let current_fitness_level = present(self.current_fitness_level)?.parse::<FitnessLevel>().ok()?;
        let available_time = present(self.available_time)?;

        Some(Profile {
            fitness_goals,
            current_fitness_level,
            available_time,
        })
    }
}

/// Who a turn is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sender {
    User,
    Assistant,
    SystemError,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::SystemError => "system-error",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of a single turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    /// Placeholder waiting on the backend
    Pending,
    /// Final content
    Resolved,
    /// Diagnostic shown in place of content
    Errored,
}

/// One entry in the conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub text: String,
    pub status: TurnStatus,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            status: TurnStatus::Resolved,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            status: TurnStatus::Resolved,
        }
    }

    /// Assistant placeholder inserted while a request is in flight
    pub fn pending() -> Self {
        Self {
            sender: Sender::Assistant,
            text: String::new(),
            status: TurnStatus::Pending,
        }
    }

    pub fn system_error(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::SystemError,
            text: text.into(),
            status: TurnStatus::Errored,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TurnStatus::Pending
    }
}

/// Everything the assembler needs for one backend call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Initial goal statement, or the latest user message on follow-ups
    pub fitness_goals: String,
    pub current_fitness_level: FitnessLevel,
    pub available_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<ConversationTurn>>,
}

impl PlanRequest {
    /// First request of a conversation
    pub fn initial(profile: &Profile) -> Self {
        Self {
            fitness_goals: profile.fitness_goals.clone(),
            current_fitness_level: profile.current_fitness_level,
            available_time: profile.available_time.clone(),
            conversation_history: None,
        }
    }

    /// Follow-up request carrying the new message in `fitness_goals`
    pub fn follow_up(profile: &Profile, message: impl Into<String>, history: Vec<ConversationTurn>) -> Self {
        Self {
            fitness_goals: message.into(),
            current_fitness_level: profile.current_fitness_level,
            available_time: profile.available_time.clone(),
            conversation_history: Some(history),
        }
    }
}

/// Generated text returned by the assembler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub plan_text: String,
}
