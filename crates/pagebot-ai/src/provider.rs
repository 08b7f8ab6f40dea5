//! OpenAI-compatible Chat Completions client (non-streaming)

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{ChatMessage, Model},
};

/// Chat-completions API client
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiProvider {
    /// Create a new provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Request one completion and return the assistant's content, trimmed.
    ///
    /// The caller is expected to pass the already-bounded context window;
    /// no truncation happens here.
    pub async fn complete(&self, model: &Model, messages: &[ChatMessage]) -> Result<String> {
        let request = build_request(model, messages);
        let url = format!("{}/chat/completions", model.base_url);

        tracing::debug!(model = %model.id, messages = messages.len(), "chat completion request");

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request);

        // Add model-specific headers
        for (key, value) in &model.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error_body(status, &text));
        }

        let body: CompletionResponse = response.json().await?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnexpectedResponse("response contained no choices".into()))?;
        let content = choice.message.content.ok_or_else(|| {
            Error::UnexpectedResponse("choice contained no message content".into())
        })?;

        Ok(content.trim().to_string())
    }
}

fn build_request<'a>(model: &'a Model, messages: &'a [ChatMessage]) -> CompletionRequest<'a> {
    CompletionRequest {
        model: &model.id,
        messages,
    }
}

/// Map a non-2xx response body to an [`Error`], preferring the structured
/// OpenAI error envelope when present.
fn parse_error_body(status: reqwest::StatusCode, text: &str) -> Error {
    if let Ok(body) = serde_json::from_str::<ErrorResponse>(text) {
        return Error::Api {
            error_type: body.error.error_type,
            message: body.error.message,
        };
    }
    Error::api(status.as_str(), text)
}

// Request/Response types

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default, rename = "type")]
    error_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_wire_shape() {
        let model = Model::openai("gpt-4o", 128000);
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let request = build_request(&model, &messages);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ]
            })
        );
    }

    #[test]
    fn test_parse_structured_error_body() {
        let text = r#"{"error": {"message": "bad key", "type": "invalid_request_error"}}"#;
        let err = parse_error_body(reqwest::StatusCode::UNAUTHORIZED, text);
        match err {
            Error::Api {
                error_type,
                message,
            } => {
                assert_eq!(error_type, "invalid_request_error");
                assert_eq!(message, "bad key");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unstructured_error_body() {
        let err = parse_error_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            Error::Api {
                error_type,
                message,
            } => {
                assert_eq!(error_type, "502");
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_completion_response() {
        let text = r#"{"choices": [{"message": {"role": "assistant", "content": "  hello  "}}]}"#;
        let body: CompletionResponse = serde_json::from_str(text).unwrap();
        assert_eq!(body.choices.len(), 1);
        assert_eq!(body.choices[0].message.content.as_deref(), Some("  hello  "));
    }
}
