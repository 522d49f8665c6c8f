//! Plan generation error types

use thiserror::Error;

use crate::llm::LlmError;

/// A failed plan generation
///
/// Callers treat every variant the same way. The variants exist so the
/// cause can be logged.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Backend call failed: {0}")]
    Backend(#[from] LlmError),

    #[error("Backend returned no text")]
    EmptyResponse,

    #[error("Failed to build prompt: {0}")]
    Prompt(String),
}

impl GenerationError {
    /// HTTP status from the backend, when the failure came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::Backend(e) => e.status(),
            GenerationError::EmptyResponse | GenerationError::Prompt(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_wraps_llm_error() {
        let err: GenerationError = LlmError::ApiError {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_status_only_for_backend_failures() {
        let err: GenerationError = LlmError::RateLimited {
            retry_after: std::time::Duration::from_secs(30),
        }
        .into();
        assert_eq!(err.status(), Some(429));

        assert_eq!(GenerationError::EmptyResponse.status(), None);
        assert_eq!(GenerationError::Prompt("bad template".to_string()).status(), None);
        assert_eq!(GenerationError::from(LlmError::Config("no key".to_string())).status(), None);
    }
}
