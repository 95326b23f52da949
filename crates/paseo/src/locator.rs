//! Locator abstraction for element selection.
//!
//! A [`Selector`] is one way of finding an element; a [`LocatorChain`] is an
//! ordered list of alternative selectors for a single logical role (search
//! input, video result, dismiss button, ...). Order encodes preference, not
//! redundancy: evaluation is left-to-right and stops at the first candidate
//! whose predicate succeeds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-candidate timeout (2 seconds)
pub const DEFAULT_CANDIDATE_TIMEOUT_MS: u64 = 2000;

/// Default polling interval while a candidate is probed (200ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "input[type='search']")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Element containing the given text
    Text(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }

    /// Create a text-content selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The raw selector expression
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) | Self::Text(s) => s,
        }
    }

    /// Convert to a JavaScript expression that evaluates to the first
    /// matching element or `null`.
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue")
            }
            Self::Text(t) => {
                format!("Array.from(document.querySelectorAll('*')).find(el => el.textContent.includes({t:?}))")
            }
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(s) => write!(f, "text={s}"),
        }
    }
}

/// Predicate an element must satisfy before a candidate is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Element is rendered with a non-empty box
    Visible,
    /// Element is visible and not disabled
    Clickable,
}

impl Predicate {
    /// Name used in error messages
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordered sequence of selectors for one logical role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorChain {
    role: String,
    candidates: Vec<Selector>,
}

impl LocatorChain {
    /// Create a chain from an ordered candidate list
    #[must_use]
    pub fn new(role: impl Into<String>, candidates: impl IntoIterator<Item = Selector>) -> Self {
        Self {
            role: role.into(),
            candidates: candidates.into_iter().collect(),
        }
    }

    /// Logical role this chain resolves (e.g. "search input")
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Candidates in preference order
    #[must_use]
    pub fn candidates(&self) -> &[Selector] {
        &self.candidates
    }

    /// Whether the chain has no candidates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Options controlling how a chain is resolved
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Independent timeout budget per candidate
    pub candidate_timeout: Duration,
    /// Polling interval while a candidate is probed
    pub poll_interval: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            candidate_timeout: Duration::from_millis(DEFAULT_CANDIDATE_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ResolveOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-candidate timeout
    #[must_use]
    pub const fn with_candidate_timeout(mut self, timeout: Duration) -> Self {
        self.candidate_timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let query = Selector::css("input[type='search']").to_query();
            assert!(query.contains("querySelector"));
            assert!(query.contains("input[type='search']"));
        }

        #[test]
        fn test_xpath_query() {
            let query = Selector::xpath("//a[contains(@href,'/videos/')]").to_query();
            assert!(query.contains("document.evaluate"));
            assert!(query.contains("FIRST_ORDERED_NODE_TYPE"));
        }

        #[test]
        fn test_text_query() {
            let query = Selector::text("Start Watching").to_query();
            assert!(query.contains("textContent"));
            assert!(query.contains("Start Watching"));
        }

        #[test]
        fn test_expression_roundtrip() {
            let sel = Selector::css("main a[href]");
            assert_eq!(sel.expression(), "main a[href]");
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("video").to_string(), "css=video");
            assert_eq!(Selector::xpath("//a").to_string(), "xpath=//a");
        }
    }

    mod predicate_tests {
        use super::*;

        #[test]
        fn test_predicate_names() {
            assert_eq!(Predicate::Visible.name(), "visible");
            assert_eq!(Predicate::Clickable.name(), "clickable");
        }
    }

    mod chain_tests {
        use super::*;

        #[test]
        fn test_chain_preserves_order() {
            let chain = LocatorChain::new(
                "search input",
                [
                    Selector::css("input[type='search']"),
                    Selector::css("input[aria-label='Search']"),
                ],
            );
            assert_eq!(chain.role(), "search input");
            assert_eq!(chain.candidates().len(), 2);
            assert_eq!(chain.candidates()[0].expression(), "input[type='search']");
        }

        #[test]
        fn test_empty_chain() {
            let chain = LocatorChain::new("nothing", []);
            assert!(chain.is_empty());
        }
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = ResolveOptions::default();
            assert_eq!(opts.candidate_timeout, Duration::from_millis(2000));
            assert_eq!(opts.poll_interval, Duration::from_millis(200));
        }

        #[test]
        fn test_builders() {
            let opts = ResolveOptions::new()
                .with_candidate_timeout(Duration::from_secs(8))
                .with_poll_interval(Duration::from_millis(100));
            assert_eq!(opts.candidate_timeout, Duration::from_secs(8));
            assert_eq!(opts.poll_interval, Duration::from_millis(100));
        }
    }
}
