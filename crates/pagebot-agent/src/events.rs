//! Dispatcher event types

use serde::{Deserialize, Serialize};

use crate::turn::Action;

/// Events emitted while a user turn runs. Hosts subscribe to render the
/// conversation; nothing in the loop depends on anyone listening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A user turn started
    TurnStart,

    /// An action round started (1-based)
    RoundStart { round: u32 },

    /// The model's reply parsed; this action is about to execute
    ActionStart { action: Action, plan: Vec<String> },

    /// The action executed; its observation was appended
    ActionEnd {
        action: String,
        observation: serde_json::Value,
    },

    /// The model replied to the user; the turn is over
    Responded { text: String },

    /// A round-level error ended the turn (provider failure, malformed
    /// reply, timeout, round cap, abort)
    Error { message: String },

    /// The turn finished, successfully or not
    TurnEnd { rounds: u32 },
}

impl AgentEvent {
    /// Check if this event ends a turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentEvent::TurnEnd { .. })
    }
}
