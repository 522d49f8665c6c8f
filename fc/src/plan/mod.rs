//! Workout plan generation
//!
//! Domain types, form validation at the input boundary, and the assembler
//! that turns a request into backend output.

mod assembler;
mod error;
mod form;
pub mod generator;
mod types;

pub use assembler::{PlanAssembler, forwarded_history};
pub use error::GenerationError;
pub use form::{FormErrors, FormField, PlanForm};
pub use generator::PlanGenerator;
pub use types::{
    ConversationTurn, FitnessLevel, PlanRequest, PlanResponse, Profile, ProfileParams, Sender, TurnStatus,
};
