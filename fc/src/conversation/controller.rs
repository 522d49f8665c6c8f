//! Conversation state controller
//!
//! Owns the transcript and the profile for one session and gates backend
//! calls so only one is ever in flight.

use tracing::{debug, info, warn};

use crate::plan::{
    ConversationTurn, GenerationError, PlanGenerator, PlanRequest, PlanResponse, Profile, ProfileParams, Sender,
};

pub const MISSING_PROFILE_MESSAGE: &str =
    "Missing workout parameters. Please go back and fill out the form to generate a plan.";

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate workout plan. The AI might be busy or an unexpected error occurred. Please try again later or go back and adjust your inputs.";

/// Whether a backend call is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingResponse,
}

/// Drives one conversation from the initial profile through follow-ups
///
/// Turns are only ever appended, or settled in place. Nothing is persisted.
#[derive(Debug)]
pub struct ConversationController {
    state: ConversationState,
    profile: Option<Profile>,
    transcript: Vec<ConversationTurn>,
    mounted: bool,
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationController {
    pub fn new() -> Self {
        debug!("ConversationController::new: called");
        Self {
            state: ConversationState::Idle,
            profile: None,
            transcript: Vec::new(),
            mounted: false,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.state == ConversationState::AwaitingResponse
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// Start the conversation from the initiating parameters
    ///
    /// Returns the request to send, or `None` when the parameters are
    /// incomplete or the controller was already mounted.
    pub fn mount(&mut self, params: ProfileParams) -> Option<PlanRequest> {
        debug!(?params, "ConversationController::mount: called");
        if self.mounted {
            debug!("ConversationController::mount: already mounted, ignoring");
            return None;
        }
        self.mounted = true;

        let Some(profile) = params.into_profile() else {
            info!("Conversation not started: missing workout parameters");
            self.transcript.push(ConversationTurn::system_error(MISSING_PROFILE_MESSAGE));
            return None;
        };

        info!(level = %profile.current_fitness_level, "Conversation started");
        self.transcript.push(ConversationTurn::user(profile.summary()));
        self.transcript.push(ConversationTurn::pending());
        self.state = ConversationState::AwaitingResponse;

        let request = PlanRequest::initial(&profile);
        self.profile = Some(profile);
        Some(request)
    }

    /// Queue a follow-up message
    ///
    /// Blank input, a pending request, or a missing profile leave the
    /// controller untouched and return `None`.
    pub fn submit_follow_up(&mut self, input: &str) -> Option<PlanRequest> {
        debug!(input_len = input.len(), state = ?self.state, "ConversationController::submit_follow_up: called");
        if input.trim().is_empty() {
            debug!("ConversationController::submit_follow_up: empty input, ignoring");
            return None;
        }
        if self.state != ConversationState::Idle {
            debug!("ConversationController::submit_follow_up: request in flight, ignoring");
            return None;
        }
        let Some(profile) = self.profile.as_ref() else {
            debug!("ConversationController::submit_follow_up: no profile, ignoring");
            return None;
        };

        let history = self.transcript.clone();
        let request = PlanRequest::follow_up(profile, input, history);

        self.transcript.push(ConversationTurn::user(input));
        self.transcript.push(ConversationTurn::pending());
        self.state = ConversationState::AwaitingResponse;
        Some(request)
    }

    /// Resolve the pending placeholder with the backend outcome
    pub fn settle(&mut self, outcome: Result<PlanResponse, GenerationError>) {
        debug!(ok = outcome.is_ok(), "ConversationController::settle: called");
        let Some(slot) = self.transcript.iter_mut().rev().find(|turn| turn.is_pending()) else {
            debug!("ConversationController::settle: no pending turn, ignoring");
            return;
        };

        *slot = match outcome {
            Ok(response) => ConversationTurn::assistant(response.plan_text),
            Err(e) => {
                warn!(error = %e, "Turn failed");
                ConversationTurn::system_error(GENERATION_FAILED_MESSAGE)
            }
        };
        self.state = ConversationState::Idle;
    }

    /// Await the generator once and settle the result
    pub async fn run(&mut self, generator: &dyn PlanGenerator, request: PlanRequest) {
        debug!("ConversationController::run: called");
        let outcome = generator.generate(request).await;
        self.settle(outcome);
    }

    /// Mount and, if a request was produced, run it to completion
    pub async fn start(&mut self, generator: &dyn PlanGenerator, params: ProfileParams) {
        debug!("ConversationController::start: called");
        if let Some(request) = self.mount(params) {
            self.run(generator, request).await;
        }
    }

    /// Submit a follow-up and, if accepted, run it to completion
    ///
    /// Returns whether the input was accepted.
    pub async fn follow_up(&mut self, generator: &dyn PlanGenerator, input: &str) -> bool {
        debug!("ConversationController::follow_up: called");
        match self.submit_follow_up(input) {
            Some(request) => {
                self.run(generator, request).await;
                true
            }
            None => false,
        }
    }

    /// Whether the most recent turn is a system error
    pub fn ended_in_error(&self) -> bool {
        self.transcript
            .last()
            .is_some_and(|turn| turn.sender == Sender::SystemError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::generator::mock::MockPlanGenerator;
    use crate::plan::TurnStatus;
    use proptest::prelude::*;

    fn params() -> ProfileParams {
        ProfileParams::new("lose weight", "beginner", "20 min 2x/week")
    }

    fn pending_count(controller: &ConversationController) -> usize {
        controller.transcript().iter().filter(|t| t.is_pending()).count()
    }

    #[test]
    fn test_mount_complete_profile() {
        let mut controller = ConversationController::new();
        let request = controller.mount(params()).unwrap();

        assert!(request.conversation_history.is_none());
        assert_eq!(request.fitness_goals, "lose weight");
        assert!(controller.is_awaiting_response());

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].sender, Sender::User);
        assert_eq!(transcript[0].text, "Goals: lose weight\nLevel: beginner\nTime: 20 min 2x/week");
        assert!(transcript[1].is_pending());
        assert_eq!(transcript[1].sender, Sender::Assistant);
    }

    #[test]
    fn test_mount_missing_profile() {
        let mut controller = ConversationController::new();
        let mut params = params();
        params.available_time = None;

        assert!(controller.mount(params).is_none());
        assert_eq!(controller.state(), ConversationState::Idle);
        assert_eq!(controller.transcript().len(), 1);
        assert_eq!(controller.transcript()[0].sender, Sender::SystemError);
        assert_eq!(controller.transcript()[0].text, MISSING_PROFILE_MESSAGE);
        assert!(controller.profile().is_none());
    }

    #[test]
    fn test_mount_twice_is_ignored() {
        let mut controller = ConversationController::new();
        controller.mount(params()).unwrap();
        assert!(controller.mount(params()).is_none());
        assert_eq!(controller.transcript().len(), 2);
    }

    #[test]
    fn test_settle_success() {
        let mut controller = ConversationController::new();
        controller.mount(params()).unwrap();
        controller.settle(Ok(PlanResponse {
            plan_text: "Day 1: walk".to_string(),
        }));

        assert_eq!(controller.state(), ConversationState::Idle);
        let last = controller.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::Assistant);
        assert_eq!(last.status, TurnStatus::Resolved);
        assert_eq!(last.text, "Day 1: walk");
        assert!(!controller.ended_in_error());
    }

    #[test]
    fn test_settle_failure() {
        let mut controller = ConversationController::new();
        controller.mount(params()).unwrap();
        controller.settle(Err(GenerationError::EmptyResponse));

        assert_eq!(controller.state(), ConversationState::Idle);
        assert_eq!(controller.transcript().len(), 2);
        let last = controller.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::SystemError);
        assert_eq!(last.status, TurnStatus::Errored);
        assert_eq!(last.text, GENERATION_FAILED_MESSAGE);
        assert!(controller.ended_in_error());
    }

    #[test]
    fn test_settle_without_pending_is_ignored() {
        let mut controller = ConversationController::new();
        controller.settle(Ok(PlanResponse {
            plan_text: "late".to_string(),
        }));
        assert!(controller.transcript().is_empty());
        assert_eq!(controller.state(), ConversationState::Idle);
    }

    #[test]
    fn test_follow_up_rejected_while_pending() {
        let mut controller = ConversationController::new();
        controller.mount(params()).unwrap();
        assert!(controller.submit_follow_up("harder please").is_none());
        assert_eq!(controller.transcript().len(), 2);
        assert_eq!(pending_count(&controller), 1);
    }

    #[test]
    fn test_follow_up_rejected_without_profile() {
        let mut controller = ConversationController::new();
        controller.mount(ProfileParams::default());
        assert!(controller.submit_follow_up("hello there").is_none());
        assert_eq!(controller.transcript().len(), 1);
    }

    #[test]
    fn test_follow_up_request_shape() {
        let mut controller = ConversationController::new();
        controller.mount(params()).unwrap();
        controller.settle(Ok(PlanResponse {
            plan_text: "Day 1: walk".to_string(),
        }));

        let request = controller.submit_follow_up("can you make it harder?").unwrap();
        assert_eq!(request.fitness_goals, "can you make it harder?");
        assert_eq!(request.available_time, "20 min 2x/week");
        let history = request.conversation_history.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "Day 1: walk");

        assert_eq!(controller.transcript().len(), 4);
        assert_eq!(controller.transcript()[2].text, "can you make it harder?");
        assert!(controller.transcript()[3].is_pending());
    }

    #[tokio::test]
    async fn test_start_and_follow_up_with_generator() {
        let generator = MockPlanGenerator::replying("Plan text");
        let mut controller = ConversationController::new();

        controller.start(&generator, params()).await;
        assert_eq!(controller.state(), ConversationState::Idle);
        assert!(controller.follow_up(&generator, "more cardio?").await);
        assert!(!controller.follow_up(&generator, "   ").await);

        assert_eq!(generator.call_count(), 2);
        assert_eq!(controller.transcript().len(), 4);
        assert!(controller.transcript().iter().all(|t| t.status == TurnStatus::Resolved));
    }

    #[tokio::test]
    async fn test_retry_after_failure_via_follow_up() {
        let failing = MockPlanGenerator::failing();
        let mut controller = ConversationController::new();
        controller.start(&failing, params()).await;
        assert!(controller.ended_in_error());

        let working = MockPlanGenerator::replying("Recovered plan");
        assert!(controller.follow_up(&working, "try again please").await);
        assert!(!controller.ended_in_error());

        // The failed turn stays in the transcript and in the forwarded request
        let history = working.requests()[0].conversation_history.clone().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].sender, Sender::SystemError);
    }

    #[derive(Debug, Clone)]
    enum Action {
        FollowUp(String),
        Settle(bool),
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            "[ a-z?]{0,12}".prop_map(Action::FollowUp),
            any::<bool>().prop_map(Action::Settle),
        ]
    }

    fn apply(controller: &mut ConversationController, action: &Action) {
        match action {
            Action::FollowUp(input) => {
                controller.submit_follow_up(input);
            }
            Action::Settle(true) => controller.settle(Ok(PlanResponse {
                plan_text: "plan".to_string(),
            })),
            Action::Settle(false) => controller.settle(Err(GenerationError::EmptyResponse)),
        }
    }

    proptest! {
        #[test]
        fn prop_whitespace_follow_up_changes_nothing(
            actions in proptest::collection::vec(action(), 0..12),
            blank in "[ \t\n]{0,8}",
        ) {
            let mut controller = ConversationController::new();
            controller.mount(params());
            for a in &actions {
                apply(&mut controller, a);
            }

            let before = controller.transcript().to_vec();
            let state = controller.state();
            prop_assert!(controller.submit_follow_up(&blank).is_none());
            prop_assert_eq!(controller.transcript(), before.as_slice());
            prop_assert_eq!(controller.state(), state);
        }

        #[test]
        fn prop_at_most_one_pending_turn(actions in proptest::collection::vec(action(), 0..24)) {
            let mut controller = ConversationController::new();
            controller.mount(params());
            prop_assert!(pending_count(&controller) <= 1);
            for a in &actions {
                apply(&mut controller, a);
                prop_assert!(pending_count(&controller) <= 1);
                prop_assert_eq!(pending_count(&controller) == 1, controller.is_awaiting_response());
            }
        }

        #[test]
        fn prop_turns_are_never_removed(actions in proptest::collection::vec(action(), 0..24)) {
            let mut controller = ConversationController::new();
            controller.mount(params());
            let mut len = controller.transcript().len();
            for a in &actions {
                apply(&mut controller, a);
                prop_assert!(controller.transcript().len() >= len);
                len = controller.transcript().len();
            }
        }
    }
}
