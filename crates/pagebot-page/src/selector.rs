//! Stable CSS selector generation
//!
//! Every descriptor carries a selector that re-resolves to the element it
//! was generated from when queried against the same document. Elements with
//! a uniquely-resolving simple id get `#id`; everything else gets a
//! root-anchored `tag:nth-child(n)` path, which is unique by construction.

use kuchikiki::NodeRef;

/// Compute a selector that uniquely resolves to `node` within its document.
pub fn css_selector_for(node: &NodeRef) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut current = Some(node.clone());

    while let Some(n) = current {
        let Some(element) = n.as_element() else { break };
        let tag = element.name.local.to_string();
        let id = element.attributes.borrow().get("id").map(str::to_string);

        if let Some(id) = id {
            if is_simple_ident(&id) && resolves_uniquely_to(&n, &format!("#{id}")) {
                segments.push(format!("#{id}"));
                break;
            }
        }

        let parent = n.parent().filter(|p| p.as_element().is_some());
        if parent.is_some() {
            segments.push(format!("{tag}:nth-child({})", child_position(&n)));
        } else {
            segments.push(tag);
        }
        current = parent;
    }

    segments.reverse();
    segments.join(" > ")
}

/// The document node at the top of this node's tree.
pub fn document_root(node: &NodeRef) -> NodeRef {
    node.ancestors().last().unwrap_or_else(|| node.clone())
}

/// 1-based position among the parent's element children, as `:nth-child`
/// counts them.
fn child_position(node: &NodeRef) -> usize {
    1 + node
        .preceding_siblings()
        .filter(|sibling| sibling.as_element().is_some())
        .count()
}

/// Whether `selector` matches exactly `node` and nothing else in its
/// document.
fn resolves_uniquely_to(node: &NodeRef, selector: &str) -> bool {
    let document = document_root(node);
    let Ok(mut matches) = document.select(selector) else {
        return false;
    };
    match (matches.next(), matches.next()) {
        (Some(only), None) => same_node(only.as_node(), node),
        _ => false,
    }
}

/// Node identity (two handles onto the same DOM node)
pub(crate) fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    std::rc::Rc::ptr_eq(&a.0, &b.0)
}

/// Ids safe to embed in a selector without escaping
fn is_simple_ident(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
