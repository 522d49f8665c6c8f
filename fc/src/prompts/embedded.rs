//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Workout plan / trainer conversation prompt
pub const WORKOUT_PLAN: &str = include_str!("../../prompts/workout-plan.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "workout-plan" => Some(WORKOUT_PLAN),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_workout_plan() {
        let prompt = get_embedded("workout-plan").unwrap();
        assert!(prompt.contains("AI Personal Trainer"));
        assert!(prompt.contains("{{#if has_history}}"));
        assert!(prompt.contains("Your AI Response:"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
