//! Browser-session abstraction.
//!
//! [`PageSession`] is the seam between the resilience layer and whatever
//! drives the real page. A session answers single, non-waiting questions
//! ("is there an element for this selector right now?") and performs raw
//! actions; every retry, fallback and timeout decision lives above it.
//!
//! Two implementations ship: [`cdp::CdpSession`] (feature `browser`) talks
//! Chrome DevTools Protocol through chromiumoxide, and [`fake::FakeSession`]
//! is a scriptable in-memory double for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use crate::locator::Selector;
use crate::result::PaseoResult;

#[cfg(feature = "browser")]
pub mod cdp;
pub mod fake;

/// Opaque reference to an element in the live page.
///
/// Owned by the session and valid only until the page re-renders; never
/// cache one across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    /// Create a handle from a registry id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Registry id of this handle
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Snapshot of one element lookup: what was found and in what state.
///
/// The resolver turns these into accept/reject decisions; keeping the raw
/// flags here makes "which candidate matched and why" inspectable data.
#[derive(Debug, Clone, Default)]
pub struct ProbeSnapshot {
    /// An element matched the selector
    pub found: bool,
    /// Element is rendered with a non-empty box
    pub visible: bool,
    /// Element is visible and not disabled
    pub clickable: bool,
    /// Handle to the element, when found
    pub handle: Option<ElementHandle>,
}

impl ProbeSnapshot {
    /// Snapshot for "no element matched"
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    /// Snapshot for a found element
    #[must_use]
    pub fn found(handle: ElementHandle, visible: bool, clickable: bool) -> Self {
        Self {
            found: true,
            visible,
            clickable,
            handle: Some(handle),
        }
    }
}

/// The browser-session collaborator.
///
/// All methods are single shots: no method waits, polls or retries. Errors
/// mean the underlying query/action failed, not that an element is absent —
/// absence is a normal [`ProbeSnapshot`] answer.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> PaseoResult<()>;

    /// Current location of the page
    async fn current_url(&self) -> PaseoResult<String>;

    /// Look up the first element matching `selector` and report its state
    async fn probe(&self, selector: &Selector) -> PaseoResult<ProbeSnapshot>;

    /// Evaluate a page script and return its JSON result
    async fn eval(&self, script: &str) -> PaseoResult<Value>;

    /// Whether the element is currently displayed
    async fn is_displayed(&self, handle: &ElementHandle) -> PaseoResult<bool>;

    /// Scroll the element into the center of the viewport
    async fn scroll_into_view(&self, handle: &ElementHandle) -> PaseoResult<()>;

    /// Click via direct event dispatch, bypassing overlays that intercept
    /// pointer events
    async fn dispatch_click(&self, handle: &ElementHandle) -> PaseoResult<()>;

    /// Clear a text input
    async fn clear(&self, handle: &ElementHandle) -> PaseoResult<()>;

    /// Type text into the focused element
    async fn type_text(&self, handle: &ElementHandle, text: &str) -> PaseoResult<()>;

    /// Press Enter in the element
    async fn press_enter(&self, handle: &ElementHandle) -> PaseoResult<()>;

    /// Capture a screenshot to `path`; returns whether a file was written
    async fn screenshot(&self, path: &Path) -> PaseoResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        let handle = ElementHandle::new("7");
        assert_eq!(handle.to_string(), "#7");
        assert_eq!(handle.id(), "7");
    }

    #[test]
    fn test_missing_snapshot() {
        let snap = ProbeSnapshot::missing();
        assert!(!snap.found);
        assert!(snap.handle.is_none());
    }

    #[test]
    fn test_found_snapshot() {
        let snap = ProbeSnapshot::found(ElementHandle::new("1"), true, false);
        assert!(snap.found);
        assert!(snap.visible);
        assert!(!snap.clickable);
    }
}
