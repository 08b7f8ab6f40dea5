//! Observations: the JSON bodies of system-role transcript entries
//!
//! Every executed action round ends with exactly one observation appended to
//! the transcript, carrying either the action's result or a descriptive
//! error for the model to re-plan around. The key vocabulary matches the
//! page-boundary wire format (`cssSelector`, `fillResult`, `userSelection`,
//! ...), so observations render identically in any client of that protocol.

use pagebot_ai::ChatMessage;
use serde::Serialize;

/// The payload of one system transcript entry
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Observation {
    /// Summarized DOM for a selector
    Dom {
        #[serde(rename = "cssSelector")]
        css_selector: String,
        dom: serde_json::Value,
    },
    /// Visible text of a region
    Text {
        #[serde(rename = "cssSelector")]
        css_selector: String,
        text: String,
    },
    /// The user's current selection
    Selection {
        #[serde(rename = "userSelection")]
        user_selection: String,
    },
    /// A successful fill
    FillResult {
        #[serde(rename = "cssSelector")]
        css_selector: String,
        #[serde(rename = "fillResult")]
        fill_result: String,
    },
    /// A failed fill
    FillError {
        #[serde(rename = "cssSelector")]
        css_selector: String,
        #[serde(rename = "fillError")]
        fill_error: String,
    },
    /// A selector-addressed request that failed page-side
    SelectorError {
        #[serde(rename = "cssSelector")]
        css_selector: String,
        error: String,
    },
    /// A selection request that failed page-side. The error travels under
    /// the `fillError` key; a long-standing quirk of the wire format that
    /// clients already render.
    SelectionError {
        #[serde(rename = "fillError")]
        fill_error: String,
    },
    /// The sandbox's computed value
    Calculation { result: serde_json::Value },
    /// A round-level error: provider failure, malformed reply, timeout,
    /// protocol violation, round cap
    Error { error: String },
}

impl Observation {
    /// Convenience constructor for round-level errors
    pub fn error(message: impl Into<String>) -> Self {
        Observation::Error {
            error: message.into(),
        }
    }

    /// Encode as the system-role transcript entry
    pub fn into_message(self) -> ChatMessage {
        ChatMessage::system(serde_json::to_string(&self).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_observation_keys() {
        let obs = Observation::Dom {
            css_selector: "body".into(),
            dom: serde_json::json!([{"elementType": "title", "content": "Hi"}]),
        };
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["cssSelector"], "body");
        assert!(json["dom"].is_array());
    }

    #[test]
    fn test_fill_observation_keys() {
        let ok = serde_json::to_value(Observation::FillResult {
            css_selector: "#q".into(),
            fill_result: "success".into(),
        })
        .unwrap();
        assert_eq!(ok["fillResult"], "success");

        let err = serde_json::to_value(Observation::FillError {
            css_selector: "#q".into(),
            fill_error: "Element not found".into(),
        })
        .unwrap();
        assert_eq!(err["fillError"], "Element not found");
    }

    #[test]
    fn test_error_observation_round_trips_as_system_entry() {
        let msg = Observation::error("model provider error: boom").into_message();
        assert_eq!(msg.role, pagebot_ai::Role::System);
        let parsed: serde_json::Value = serde_json::from_str(&msg.content).unwrap();
        assert_eq!(parsed["error"], "model provider error: boom");
    }

    #[test]
    fn test_selection_observation_key() {
        let json = serde_json::to_value(Observation::Selection {
            user_selection: "picked text".into(),
        })
        .unwrap();
        assert_eq!(json["userSelection"], "picked text");
    }
}
