//! Core types for chat model interactions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message roles in a chat transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Get the role as the wire-format string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One transcript entry: a role and its text content.
///
/// This is also the exact wire shape the chat-completions API expects,
/// so the same type is serialized into provider requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Model definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Model identifier (e.g., "gpt-4o")
    pub id: String,
    /// Base URL for API calls
    pub base_url: String,
    /// Context window size in tokens
    pub context_window: u32,
    /// Additional headers for API calls
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Model {
    /// Construct a model served by the OpenAI API
    pub fn openai(id: impl Into<String>, context_window: u32) -> Self {
        Self {
            id: id.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            context_window,
            headers: HashMap::new(),
        }
    }

    /// Construct a model for an arbitrary OpenAI-compatible endpoint
    pub fn custom(
        id: impl Into<String>,
        base_url: impl Into<String>,
        context_window: u32,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            context_window,
            headers: HashMap::new(),
        }
    }
}
