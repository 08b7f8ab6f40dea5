//! Conversation state: transcript, phase, and last error.

use pagebot_ai::ChatMessage;
use serde::{Deserialize, Serialize};

/// Where the state machine currently sits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Idle; the next transition is a user submission or a transcript edit
    #[default]
    AwaitingUserInput,
    /// A model call is outstanding
    ModelCallInFlight,
    /// A parsed action is being executed against a boundary
    ActionExecuting,
}

/// Conversation state owned by the dispatcher
#[derive(Default)]
pub struct Conversation {
    /// The ordered transcript
    pub messages: Vec<ChatMessage>,
    /// Current state-machine phase
    pub phase: Phase,
    /// Last round-level error, if any
    pub error: Option<String>,
}
