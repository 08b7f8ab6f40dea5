//! pagebot-page: the content side of the page-execution boundary
//!
//! Turns a DOM subtree into an ordered list of structured element
//! descriptors the model can reason about, and writes values back into
//! heterogeneous form controls addressed by CSS selector. [`PageSession`]
//! packages both behind the [`pagebot_agent::PageBoundary`] wire contract.

pub mod analyze;
pub mod descriptor;
pub mod fill;
pub mod selector;
pub mod session;

pub use analyze::analyze;
pub use descriptor::{ControlKind, ElementDescriptor};
pub use fill::{FillError, fill};
pub use session::PageSession;
