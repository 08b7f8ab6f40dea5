//! Structured element descriptors produced by page analysis

use serde::{Deserialize, Serialize};

/// One analyzed element: a selector that re-resolves to it, its
/// classification, and whatever identifying attributes it carries.
/// Optional fields are omitted from the wire format when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    pub css_selector: String,
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Closed classification of page controls. Fill strategies and descriptor
/// element types both dispatch on this, never on raw tag strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// A plain text input (explicit `type="text"` or no type attribute,
    /// which the DOM defaults to text)
    Text,
    TextArea,
    Select,
    Checkbox,
    Radio,
    /// Anything else: other input subtypes and non-control elements.
    /// Writes to these are best-effort.
    Other,
}

impl ControlKind {
    /// Classify an element by tag name and `type` attribute. The attribute
    /// is compared case-insensitively, as the DOM's reflected property is.
    pub fn classify(tag: &str, type_attr: Option<&str>) -> Self {
        match tag {
            "textarea" => ControlKind::TextArea,
            "select" => ControlKind::Select,
            "input" => match type_attr.map(|t| t.to_ascii_lowercase()).as_deref() {
                None | Some("text") => ControlKind::Text,
                Some("checkbox") => ControlKind::Checkbox,
                Some("radio") => ControlKind::Radio,
                Some(_) => ControlKind::Other,
            },
            _ => ControlKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_inputs() {
        assert_eq!(ControlKind::classify("input", Some("text")), ControlKind::Text);
        assert_eq!(ControlKind::classify("input", None), ControlKind::Text);
        assert_eq!(
            ControlKind::classify("input", Some("checkbox")),
            ControlKind::Checkbox
        );
        assert_eq!(
            ControlKind::classify("input", Some("RADIO")),
            ControlKind::Radio
        );
        assert_eq!(
            ControlKind::classify("input", Some("email")),
            ControlKind::Other
        );
    }

    #[test]
    fn test_classify_non_inputs() {
        assert_eq!(ControlKind::classify("textarea", None), ControlKind::TextArea);
        assert_eq!(ControlKind::classify("select", None), ControlKind::Select);
        assert_eq!(ControlKind::classify("div", None), ControlKind::Other);
    }

    #[test]
    fn test_descriptor_omits_absent_fields() {
        let descriptor = ElementDescriptor {
            css_selector: "#q".into(),
            element_type: "input".into(),
            name: Some("q".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cssSelector": "#q",
                "elementType": "input",
                "name": "q"
            })
        );
    }
}
