//! pagebot-ai: chat model provider boundary
//!
//! This crate provides the transcript message types shared across the
//! workspace and a minimal OpenAI-compatible chat-completions client.
//! The agent loop sends a bounded message window and receives back a single
//! assistant content string; streaming is deliberately not part of the
//! contract.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{Error, Result};
pub use provider::OpenAiProvider;
pub use types::{ChatMessage, Model, Role};
