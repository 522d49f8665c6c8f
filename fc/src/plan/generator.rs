//! PlanGenerator trait definition

use async_trait::async_trait;

use super::{GenerationError, PlanRequest, PlanResponse};

/// Turns a plan request into plan text
///
/// The conversation controller depends on this trait rather than on a
/// concrete backend.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: PlanRequest) -> Result<PlanResponse, GenerationError>;
}
