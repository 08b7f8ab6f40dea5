//! pagebot-agent: the turn-taking action loop
//!
//! This crate owns the core of the agent: a bounded conversation transcript,
//! a token-budgeted context window, and a state machine that asks the model
//! to plan, executes exactly one declared action per round against the page
//! (or the sandboxed evaluator), folds the observation back into the
//! transcript, and repeats until the model replies to the user.
//!
//! Collaborators the loop does not own (the model provider, the page
//! execution context, the sandbox, the transcript store) are reached through
//! the traits in [`boundary`] and [`store`].

pub mod boundary;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handle;
pub mod observation;
pub mod store;
pub mod tokenizer;
pub mod turn;
pub mod window;

pub use boundary::{
    ChatTransport, Evaluator, PageAction, PageBoundary, PageParams, PageRequest, PageResponse,
    ProviderTransport,
};
pub use conversation::{Conversation, Phase};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::{Error, Result};
pub use events::AgentEvent;
pub use handle::AgentHandle;
pub use observation::Observation;
pub use store::{MemoryTranscriptStore, TranscriptStore};
pub use turn::{Action, AssistantTurn, THINKING_PLACEHOLDER, TurnError};
pub use window::ContextWindowBuilder;
