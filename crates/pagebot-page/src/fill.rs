//! Form-control writes addressed by CSS selector
//!
//! `fill` locates the single element matching a selector and writes a value
//! into it with control-kind-specific semantics. The result is boolean
//! success only; there is no partial-success signal.

use kuchikiki::{ElementData, NodeDataRef, NodeRef};
use thiserror::Error;

use crate::descriptor::ControlKind;

/// Values a checkbox write treats as true, compared case-insensitively.
const TRUTHY: &[&str] = &["true", "1", "t", "on"];

/// Ways a fill can fail. Everything else is a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FillError {
    #[error("Invalid selector")]
    InvalidSelector,
    #[error("Element not found")]
    ElementNotFound,
    #[error("No enclosing form")]
    NoEnclosingForm,
}

/// Write `value` into the control matching `selector`.
///
/// Write semantics per control kind:
/// - text input, select, and anything else: assign `value` verbatim. A
///   select accepts values that match none of its options; the write is
///   still reported as a success.
/// - textarea: replace its text content.
/// - radio: resolve the group through the nearest ancestor form and check
///   exactly the radios whose `value` equals the supplied value, leaving
///   the rest untouched. A group where nothing matches still reports
///   success; only a missing form is a failure.
/// - checkbox: checked iff `value` is one of true/1/t/on, case-insensitive.
pub fn fill(document: &NodeRef, selector: &str, value: &str) -> Result<(), FillError> {
    let mut matches = document
        .select(selector)
        .map_err(|()| FillError::InvalidSelector)?;
    let Some(element) = matches.next() else {
        return Err(FillError::ElementNotFound);
    };

    let tag = element.name.local.to_string();
    let type_attr = element.attributes.borrow().get("type").map(str::to_string);

    match ControlKind::classify(&tag, type_attr.as_deref()) {
        ControlKind::Text | ControlKind::Select | ControlKind::Other => {
            set_value(&element, value);
        }
        ControlKind::TextArea => set_text_content(element.as_node(), value),
        ControlKind::Radio => fill_radio(&element, value)?,
        ControlKind::Checkbox => set_checked(&element, is_truthy(value)),
    }
    Ok(())
}

fn is_truthy(value: &str) -> bool {
    TRUTHY.contains(&value.to_ascii_lowercase().as_str())
}

fn set_value(element: &NodeDataRef<ElementData>, value: &str) {
    element
        .attributes
        .borrow_mut()
        .insert("value", value.to_string());
}

fn set_text_content(node: &NodeRef, value: &str) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
    node.append(NodeRef::new_text(value));
}

fn set_checked(element: &NodeDataRef<ElementData>, checked: bool) {
    let mut attributes = element.attributes.borrow_mut();
    if checked {
        attributes.insert("checked", String::new());
    } else {
        attributes.remove("checked");
    }
}

/// Check the radios in the enclosing form's group whose value matches the
/// requested one. Radios that don't match keep their current state.
fn fill_radio(element: &NodeDataRef<ElementData>, value: &str) -> Result<(), FillError> {
    let form = enclosing_form(element.as_node()).ok_or(FillError::NoEnclosingForm)?;
    let group = element
        .attributes
        .borrow()
        .get("name")
        .unwrap_or("")
        .to_string();

    let Ok(inputs) = form.select("input") else {
        return Ok(());
    };
    for input in inputs {
        let selected = {
            let attributes = input.attributes.borrow();
            attributes
                .get("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
                && attributes.get("name").unwrap_or("") == group
                && attributes.get("value") == Some(value)
        };
        if selected {
            input
                .attributes
                .borrow_mut()
                .insert("checked", String::new());
        }
    }
    Ok(())
}

/// The nearest form in the ancestor chain, the element itself included.
fn enclosing_form(node: &NodeRef) -> Option<NodeRef> {
    node.inclusive_ancestors()
        .find(|n| n.as_element().is_some_and(|e| &*e.name.local == "form"))
}
