//! Conversation state
//!
//! A single owned controller holds the transcript. The backend is reached
//! through the `PlanGenerator` trait.

mod controller;

pub use controller::{ConversationController, ConversationState, GENERATION_FAILED_MESSAGE, MISSING_PROFILE_MESSAGE};
