//! Debugging target descriptors, as listed by the discovery endpoint.
//!
//! A browser exposes many simultaneous targets: tabs (`"page"`), service
//! workers, extension background pages, and so on.  The discovery endpoint
//! (`GET /json`) returns one descriptor per target:
//!
//! ```json
//! {
//!   "id": "4C9A…",
//!   "type": "page",
//!   "title": "Example Domain",
//!   "url": "https://example.com/",
//!   "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/4C9A…"
//! }
//! ```
//!
//! Only `type`, `title`, and `webSocketDebuggerUrl` carry meaning for the
//! client; every other field is preserved in [`Target::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `type` of a browser tab.
pub const PAGE_TARGET_TYPE: &str = "page";

/// One addressable debugging target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Absent when another debugger is already attached to the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_socket_debugger_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Target {
    /// `true` for browser tabs.
    pub fn is_page(&self) -> bool {
        self.kind == PAGE_TARGET_TYPE
    }

    /// `true` if this is a page whose title contains `query`.
    pub fn matches_focus(&self, query: &str) -> bool {
        self.is_page() && self.title.contains(query)
    }
}

/// Index of the first page target whose title contains `query`, in list
/// order.
pub fn find_focus_target(targets: &[Target], query: &str) -> Option<usize> {
    targets.iter().position(|t| t.matches_focus(query))
}
