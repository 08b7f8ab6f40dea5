//! Page analysis: a DOM subtree in, ordered element descriptors out
//!
//! Traversal order is fixed and deterministic: the document title first,
//! then heading-like elements, then form controls in document order. The
//! same DOM always yields the same descriptor list.

use kuchikiki::{ElementData, NodeDataRef, NodeRef};

use crate::{
    descriptor::{ControlKind, ElementDescriptor},
    selector,
};

/// Heading-like elements are collected by four queries run in sequence:
/// true heading tags, heading accessibility roles, and class/id substring
/// matches. The results are concatenated without dedup, so an element
/// matching several queries is emitted once per match; the substring match
/// is case-sensitive. Both mirror how browsers' querySelectorAll treats
/// these selectors.
const HEADING_QUERIES: &[&str] = &[
    "h1, h2, h3, h4, h5, h6",
    r#"[role="heading"], [role="header"]"#,
    r#"[class*="header"], [class*="heading"], [class*="title"]"#,
    r#"[id*="header"], [id*="heading"], [id*="title"]"#,
];

/// Headings with trimmed text at or below this length are noise (icons,
/// glyphs); at or above the upper bound they are body copy.
const MIN_HEADING_CHARS: usize = 3;
const MAX_HEADING_CHARS: usize = 300;

/// Produce the ordered descriptor list for the subtree under `root`.
///
/// Never fails: a subtree with nothing recognizable yields an empty list.
pub fn analyze(root: &NodeRef) -> Vec<ElementDescriptor> {
    let mut elements = Vec::new();

    // 1. The page title
    if let Ok(title) = root.select_first("title") {
        elements.push(ElementDescriptor {
            css_selector: "title".to_string(),
            element_type: "title".to_string(),
            content: Some(title.text_contents()),
            ..Default::default()
        });
    }

    // 2. Heading-like elements
    for query in HEADING_QUERIES {
        let Ok(matches) = root.select(query) else {
            continue;
        };
        for heading in matches {
            let text = heading.text_contents().trim().to_string();
            let length = text.chars().count();
            if length > MIN_HEADING_CHARS && length < MAX_HEADING_CHARS {
                elements.push(ElementDescriptor {
                    css_selector: selector::css_selector_for(heading.as_node()),
                    element_type: "header".to_string(),
                    content: Some(text),
                    ..Default::default()
                });
            }
        }
    }

    // 3. Form controls in document order
    if let Ok(controls) = root.select("input, textarea, select") {
        for control in controls {
            elements.push(describe_control(&control));
        }
    }

    elements
}

fn describe_control(control: &NodeDataRef<ElementData>) -> ElementDescriptor {
    let tag = control.name.local.to_string();
    let attributes = control.attributes.borrow();
    let kind = ControlKind::classify(&tag, attributes.get("type"));
    let element_type = match kind {
        ControlKind::Checkbox => "checkbox".to_string(),
        ControlKind::Radio => "radio".to_string(),
        _ => tag,
    };
    let label = attributes
        .get("id")
        .and_then(|id| find_label_for(control.as_node(), id));

    ElementDescriptor {
        css_selector: selector::css_selector_for(control.as_node()),
        element_type,
        content: None,
        name: non_empty(attributes.get("name")),
        label,
        placeholder: non_empty(attributes.get("placeholder")),
        title: non_empty(attributes.get("title")),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Resolve a control's label: a `label[for=<id>]` anywhere in the same
/// document. Controls without an id have no label.
fn find_label_for(control: &NodeRef, id: &str) -> Option<String> {
    if id.is_empty() {
        return None;
    }
    let document = selector::document_root(control);
    let labels = document.select("label").ok()?;
    for label in labels {
        if label.attributes.borrow().get("for") == Some(id) {
            let text = label.text_contents();
            return if text.is_empty() { None } else { Some(text) };
        }
    }
    None
}
