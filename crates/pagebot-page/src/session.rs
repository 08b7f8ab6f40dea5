//! In-process page model implementing the page-execution boundary
//!
//! Holds the page as serialized HTML and re-parses it per request. The DOM
//! tree is `Rc`-based and never crosses an await point, so the session
//! itself stays `Send + Sync` and can sit behind the boundary trait on any
//! runtime. Writes serialize the mutated tree back into the session.

use async_trait::async_trait;
use kuchikiki::{ElementData, NodeDataRef, NodeRef};
use kuchikiki::traits::TendrilSink;
use parking_lot::Mutex;

use pagebot_agent::{PageAction, PageBoundary, PageRequest, PageResponse};

use crate::{analyze, fill};

/// One attached page plus the user's current selection
pub struct PageSession {
    html: Mutex<String>,
    selection: Mutex<Option<String>>,
}

impl PageSession {
    /// Attach to a page given as HTML
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: Mutex::new(html.into()),
            selection: Mutex::new(None),
        }
    }

    /// Record the user's current selection (the host tracks this; a page
    /// has no selection until told otherwise)
    pub fn set_selection(&self, selection: Option<String>) {
        *self.selection.lock() = selection;
    }

    /// The page's current HTML, including any writes applied so far
    pub fn html(&self) -> String {
        self.html.lock().clone()
    }

    fn parse(&self) -> NodeRef {
        let html = self.html.lock().clone();
        kuchikiki::parse_html().one(html.as_str())
    }
}

fn select_one(document: &NodeRef, selector: &str) -> Option<NodeDataRef<ElementData>> {
    document.select(selector).ok()?.next()
}

fn serialize(document: &NodeRef) -> Option<String> {
    let mut bytes = Vec::new();
    document.serialize(&mut bytes).ok()?;
    String::from_utf8(bytes).ok()
}

#[async_trait]
impl PageBoundary for PageSession {
    async fn handle(&self, request: PageRequest) -> PageResponse {
        tracing::debug!(action = ?request.action, "page request");
        match request.action {
            PageAction::GetSelection => match self.selection.lock().clone() {
                Some(selection) => PageResponse::ok(selection),
                None => PageResponse::err("Selection not found"),
            },

            PageAction::GetText => {
                let Some(selector) = request.params.css_selector else {
                    return PageResponse::err("Missing cssSelector parameter");
                };
                let document = self.parse();
                match select_one(&document, &selector) {
                    Some(element) => PageResponse::ok(element.text_contents()),
                    None => PageResponse::err("Element not found"),
                }
            }

            PageAction::GetDom => {
                let Some(selector) = request.params.css_selector else {
                    return PageResponse::err("Missing cssSelector parameter");
                };
                let document = self.parse();
                match select_one(&document, &selector) {
                    Some(element) => {
                        let descriptors = analyze::analyze(element.as_node());
                        match serde_json::to_string(&descriptors) {
                            Ok(json) => PageResponse::ok(json),
                            Err(e) => PageResponse::err(format!("Serialization failed: {e}")),
                        }
                    }
                    None => PageResponse::err("Element not found"),
                }
            }

            PageAction::Fill => {
                let (Some(selector), Some(text)) =
                    (request.params.css_selector, request.params.text)
                else {
                    return PageResponse::err("Missing fill parameters");
                };
                let document = self.parse();
                match fill::fill(&document, &selector, &text) {
                    Ok(()) => {
                        if let Some(html) = serialize(&document) {
                            *self.html.lock() = html;
                        }
                        PageResponse::ok("success")
                    }
                    Err(e) => PageResponse::err(e.to_string()),
                }
            }
        }
    }
}
