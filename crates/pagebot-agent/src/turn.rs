//! Parsing of the model's structured replies
//!
//! Every completed assistant turn is a single JSON object carrying a
//! display-only plan and exactly one next action. The action set is closed:
//! a tag outside it is a malformed turn, never a fall-through.
//!
//! Parsing is hand-rolled over a [`serde_json::Value`] rather than derived,
//! because the model controls these bytes: `plan` may be absent, params may
//! carry stray keys, and the original client accepted `GetSelection` with
//! string params. A derive would be stricter than the observed wire format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Literal content of the transient "thinking" placeholder entry appended
/// while a model call is in flight.
pub const THINKING_PLACEHOLDER: &str = "🤔";

/// Ways assistant content can fail to be a structured turn
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("content is not a JSON object")]
    NotJson,
    #[error("content has no nextAction.type")]
    MissingAction,
    #[error("unrecognized action type: {0}")]
    UnknownAction(String),
    #[error("{action} is missing required parameter {param}")]
    MissingParam {
        action: &'static str,
        param: &'static str,
    },
}

/// One action the model may request per round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum Action {
    /// Summarize the DOM subtree under a selector
    #[serde(rename = "RequestDOM")]
    RequestDom {
        #[serde(rename = "cssSelector")]
        css_selector: String,
    },
    /// Read the visible text inside a page region
    RequestText {
        #[serde(rename = "cssSelector")]
        css_selector: String,
    },
    /// Read the user's current selection
    GetSelection,
    /// Write a value into a form control
    Fill {
        #[serde(rename = "cssSelector")]
        css_selector: String,
        text: String,
    },
    /// Evaluate an expression in the sandbox
    Calculate {
        #[serde(rename = "jsFormula")]
        js_formula: String,
    },
    /// Reply to the user; ends the turn
    Respond {
        #[serde(rename = "textToDisplay")]
        text_to_display: String,
    },
}

impl Action {
    /// The wire tag for this action
    pub fn kind(&self) -> &'static str {
        match self {
            Action::RequestDom { .. } => "RequestDOM",
            Action::RequestText { .. } => "RequestText",
            Action::GetSelection => "GetSelection",
            Action::Fill { .. } => "Fill",
            Action::Calculate { .. } => "Calculate",
            Action::Respond { .. } => "Respond",
        }
    }
}

/// The model's structured output for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantTurn {
    /// Human-readable step labels, for display only
    pub plan: Vec<String>,
    /// The single action to dispatch
    pub next_action: Action,
}

impl AssistantTurn {
    /// Parse raw assistant content into a structured turn.
    ///
    /// Content that does not open with `{` is plain prose and fails fast.
    /// `plan` is optional (display-only); `nextAction` is not.
    pub fn parse(content: &str) -> Result<Self, TurnError> {
        if !content.starts_with('{') {
            return Err(TurnError::NotJson);
        }
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|_| TurnError::NotJson)?;
        let object = value.as_object().ok_or(TurnError::NotJson)?;

        let plan = object
            .get("plan")
            .and_then(|p| p.as_array())
            .map(|steps| {
                steps
                    .iter()
                    .filter_map(|s| s.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let next = object
            .get("nextAction")
            .and_then(|n| n.as_object())
            .ok_or(TurnError::MissingAction)?;
        let tag = next
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(TurnError::MissingAction)?;
        let params = next.get("params");

        let next_action = match tag {
            "RequestDOM" => Action::RequestDom {
                css_selector: required_str(params, "RequestDOM", "cssSelector")?,
            },
            "RequestText" => Action::RequestText {
                css_selector: required_str(params, "RequestText", "cssSelector")?,
            },
            "GetSelection" => Action::GetSelection,
            "Fill" => Action::Fill {
                css_selector: required_str(params, "Fill", "cssSelector")?,
                text: required_str(params, "Fill", "text")?,
            },
            "Calculate" => Action::Calculate {
                js_formula: required_str(params, "Calculate", "jsFormula")?,
            },
            "Respond" => Action::Respond {
                text_to_display: required_str(params, "Respond", "textToDisplay")?,
            },
            other => return Err(TurnError::UnknownAction(other.to_string())),
        };

        Ok(Self { plan, next_action })
    }
}

fn required_str(
    params: Option<&serde_json::Value>,
    action: &'static str,
    param: &'static str,
) -> Result<String, TurnError> {
    params
        .and_then(|p| p.get(param))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(TurnError::MissingParam { action, param })
}
