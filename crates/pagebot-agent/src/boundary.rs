//! Boundary contracts for the loop's collaborators
//!
//! The dispatcher talks to three things it does not own: the model provider,
//! the page execution context, and the sandboxed evaluator. Each is a trait
//! here; hosts wire in real implementations, tests wire in scripted ones.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pagebot_ai::{ChatMessage, Model, OpenAiProvider};

/// Model provider boundary: the built window goes in, a single assistant
/// content string comes out. No retry policy lives here; a failure surfaces
/// as a terminal observation for the round.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> pagebot_ai::Result<String>;
}

/// Direct provider transport over an OpenAI-compatible endpoint
pub struct ProviderTransport {
    provider: Arc<OpenAiProvider>,
    model: Model,
}

impl ProviderTransport {
    pub fn new(provider: Arc<OpenAiProvider>, model: Model) -> Self {
        Self { provider, model }
    }

    /// The model this transport calls
    pub fn model(&self) -> &Model {
        &self.model
    }
}

#[async_trait]
impl ChatTransport for ProviderTransport {
    async fn complete(&self, messages: Vec<ChatMessage>) -> pagebot_ai::Result<String> {
        self.provider.complete(&self.model, &messages).await
    }
}

/// Actions understood by the page execution context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageAction {
    #[serde(rename = "getSelection")]
    GetSelection,
    #[serde(rename = "getText")]
    GetText,
    #[serde(rename = "getDOM")]
    GetDom,
    #[serde(rename = "fill")]
    Fill,
}

/// Parameters accompanying a page request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One request across the page-execution boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub action: PageAction,
    pub params: PageParams,
}

impl PageRequest {
    pub fn get_selection() -> Self {
        Self {
            action: PageAction::GetSelection,
            params: PageParams::default(),
        }
    }

    pub fn get_text(css_selector: impl Into<String>) -> Self {
        Self {
            action: PageAction::GetText,
            params: PageParams {
                css_selector: Some(css_selector.into()),
                text: None,
            },
        }
    }

    pub fn get_dom(css_selector: impl Into<String>) -> Self {
        Self {
            action: PageAction::GetDom,
            params: PageParams {
                css_selector: Some(css_selector.into()),
                text: None,
            },
        }
    }

    pub fn fill(css_selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            action: PageAction::Fill,
            params: PageParams {
                css_selector: Some(css_selector.into()),
                text: Some(text.into()),
            },
        }
    }
}

/// The page side's answer: exactly one of `result` / `error` is set.
/// For `getDOM`, `result` is the JSON-serialized descriptor list; for
/// `fill` it is the literal success marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResponse {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Page execution boundary. Implementations never panic on bad selectors;
/// failures come back in [`PageResponse::error`] so the model can re-plan.
#[async_trait]
pub trait PageBoundary: Send + Sync {
    async fn handle(&self, request: PageRequest) -> PageResponse;
}

/// Sandboxed expression evaluator boundary.
///
/// Returns the single message payload the sandbox posts back. The dispatcher
/// validates the payload shape; a payload without the expected result key is
/// a protocol violation and is surfaced, not dropped.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, source: &str) -> serde_json::Value;
}
