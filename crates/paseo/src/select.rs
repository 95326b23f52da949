//! Priority-based result selection and activation.
//!
//! Result chains are tried in strict priority order (video first: the
//! cheapest destination page to confirm, then channel, then any link). The
//! first chain that yields a clickable, displayed element wins: the element
//! is centered in the viewport and activated with a dispatched click so an
//! overlay intercepting pointer events cannot block it. Failure to select
//! anything is an answer, not an error; the orchestration layer decides how
//! fatal it is.

use tracing::{debug, info, warn};

use crate::locator::{LocatorChain, Predicate, ResolveOptions};
use crate::probe;
use crate::session::PageSession;

/// Which chain produced the activated element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedResult {
    /// Role of the winning chain (e.g. "video result")
    pub role: String,
    /// Selector expression of the winning candidate
    pub selector: String,
}

/// Try each chain in order and activate the first acceptable element.
///
/// Returns the winner, or `None` when no chain in the whole priority list
/// yielded an activatable element. Later chains are never evaluated once a
/// chain wins. All per-chain failures are swallowed; a failed click moves on
/// to the next chain and is never re-issued against the same element.
pub async fn select_and_activate<S: PageSession + ?Sized>(
    session: &S,
    chains: &[LocatorChain],
    opts: &ResolveOptions,
) -> Option<ActivatedResult> {
    for chain in chains {
        let handle = match probe::resolve(session, chain, Predicate::Clickable, opts).await {
            Ok(handle) => handle,
            Err(err) => {
                debug!(role = chain.role(), error = %err, "result chain yielded nothing");
                continue;
            }
        };

        // the page may have re-rendered between probe and activation
        match session.is_displayed(&handle).await {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                debug!(role = chain.role(), "resolved element no longer displayed");
                continue;
            }
        }

        if let Err(err) = session.scroll_into_view(&handle).await {
            debug!(role = chain.role(), error = %err, "scroll into view failed");
        }

        match session.dispatch_click(&handle).await {
            Ok(()) => {
                info!(role = chain.role(), element = %handle, "activated search result");
                return Some(ActivatedResult {
                    role: chain.role().to_string(),
                    selector: handle.id().to_string(),
                });
            }
            Err(err) => {
                warn!(role = chain.role(), error = %err, "activation click failed");
            }
        }
    }

    warn!("no result chain yielded an activatable element");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains;
    use crate::session::fake::{FakeElement, FakeSession};
    use std::time::Duration;

    fn quick_opts() -> ResolveOptions {
        ResolveOptions::new()
            .with_candidate_timeout(Duration::from_millis(400))
            .with_poll_interval(Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_beats_channel() {
        let session = FakeSession::new("https://m.example.tv/search");
        session.add_element(FakeElement::new("a[href*='/videos/']"));
        session.add_element(FakeElement::new("a[href*='/channel/']"));

        let result = select_and_activate(&session, &chains::result_priority(), &quick_opts())
            .await
            .unwrap();

        assert_eq!(result.role, "video result");
        assert_eq!(session.clicks(), vec!["a[href*='/videos/']"]);
        // the channel chain was never evaluated
        assert_eq!(session.probe_count("a[href*='/channel/']"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generic_fallback() {
        // no video or channel anywhere; a displayed generic link must win
        let session = FakeSession::new("https://m.example.tv/search");
        session.add_element(FakeElement::new("main a[href]"));

        let result = select_and_activate(&session, &chains::result_priority(), &quick_opts())
            .await
            .unwrap();

        assert_eq!(result.role, "generic result");
        assert_eq!(session.clicks(), vec!["main a[href]"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_when_no_video() {
        let session = FakeSession::new("https://m.example.tv/search");
        session.add_element(FakeElement::new("a[href*='/channel/']"));
        session.add_element(FakeElement::new("main a[href]"));

        let result = select_and_activate(&session, &chains::result_priority(), &quick_opts())
            .await
            .unwrap();

        assert_eq!(result.role, "channel result");
        assert_eq!(session.probe_count("main a[href]"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_activatable() {
        let session = FakeSession::new("https://m.example.tv/search");
        session.add_element(FakeElement::new("main a[href]").hidden());

        let result =
            select_and_activate(&session, &chains::result_priority(), &quick_opts()).await;
        assert!(result.is_none());
        assert!(session.clicks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrolls_before_clicking() {
        let session = FakeSession::new("https://m.example.tv/search");
        session.add_element(FakeElement::new("a[href*='/videos/']"));

        select_and_activate(&session, &chains::result_priority(), &quick_opts())
            .await
            .unwrap();

        assert_eq!(session.scrolled(), vec!["a[href*='/videos/']"]);
    }
}
