//! Search screen: query entry, scroll gestures, result selection.

use std::time::Duration;
use tracing::{debug, info, trace};

use crate::chains;
use crate::locator::{Predicate, ResolveOptions};
use crate::navigation::{self, NavigationOptions, UrlPattern};
use crate::probe;
use crate::result::PaseoResult;
use crate::select;
use crate::session::PageSession;
use crate::stability::{self, StabilityOptions};

/// Budget for finding the search input; generous because this is the one
/// required interaction on the page
const INPUT_TIMEOUT: Duration = Duration::from_secs(8);

/// Settle budget after submitting a query
const QUERY_SETTLE_TIMEOUT: Duration = Duration::from_secs(4);

/// Budget for confirming results exist before scrolling
const RESULTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after the upward nudge
const NUDGE_SETTLE: Duration = Duration::from_millis(250);

/// Pause after each scroll gesture
const SCROLL_SETTLE: Duration = Duration::from_millis(400);

const AT_BOTTOM_SCRIPT: &str =
    "(window.pageYOffset + window.innerHeight) >= (document.body.scrollHeight - 2)";
const NUDGE_UP_SCRIPT: &str = "window.scrollBy(0, -Math.round(window.innerHeight * 0.3))";
const SCROLL_DOWN_SCRIPT: &str = "window.scrollBy(0, Math.round(window.innerHeight * 0.9))";

/// The search page of the site under test.
pub struct SearchScreen<'a, S: PageSession + ?Sized> {
    session: &'a S,
    still_on_marker: UrlPattern,
}

impl<S: PageSession + ?Sized> std::fmt::Debug for SearchScreen<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchScreen")
            .field("still_on_marker", &self.still_on_marker)
            .finish_non_exhaustive()
    }
}

impl<'a, S: PageSession + ?Sized> SearchScreen<'a, S> {
    /// Create a search screen; the still-on marker defaults to the
    /// `/search` route
    pub fn new(session: &'a S) -> Self {
        Self {
            session,
            still_on_marker: UrlPattern::Contains("/search".into()),
        }
    }

    /// Override the marker that identifies "still on the search page"
    #[must_use]
    pub fn with_still_on_marker(mut self, marker: UrlPattern) -> Self {
        self.still_on_marker = marker;
        self
    }

    /// Type a query and submit it. Fails hard when no input candidate
    /// matches; ends with a short DOM settle so results have a chance to
    /// render before the caller proceeds.
    pub async fn enter_query(&self, text: &str) -> PaseoResult<()> {
        let opts = ResolveOptions::new().with_candidate_timeout(INPUT_TIMEOUT);
        let input =
            probe::resolve(self.session, &chains::search_input(), Predicate::Visible, &opts)
                .await?;

        self.session.clear(&input).await?;
        self.session.type_text(&input, text).await?;
        self.session.press_enter(&input).await?;
        info!(query = text, "submitted search query");

        let settle = StabilityOptions::new().with_total_timeout(QUERY_SETTLE_TIMEOUT);
        stability::wait_dom_quiet(self.session, &settle).await;
        Ok(())
    }

    /// Exactly two scroll gestures over the result list. Advisory: a short
    /// list, an anchored viewport or a failed script never fails the
    /// journey, and no offset progression is asserted. When the viewport is
    /// already at the bottom, an upward nudge creates room so the gesture
    /// still happens.
    pub async fn perform_scroll_gestures(&self) {
        let opts = ResolveOptions::new().with_candidate_timeout(RESULTS_TIMEOUT);
        if let Err(err) =
            probe::resolve(self.session, &chains::generic_result(), Predicate::Visible, &opts)
                .await
        {
            debug!(error = %err, "no results rendered, skipping scroll gestures");
            return;
        }

        self.scroll_once().await;
        self.scroll_once().await;
    }

    async fn scroll_once(&self) {
        if self.at_bottom().await {
            if let Err(err) = self.session.eval(NUDGE_UP_SCRIPT).await {
                trace!(error = %err, "nudge up failed");
            }
            tokio::time::sleep(NUDGE_SETTLE).await;
        }
        match self.session.eval(SCROLL_DOWN_SCRIPT).await {
            Ok(_) => trace!("scroll gesture dispatched"),
            Err(err) => trace!(error = %err, "scroll gesture failed"),
        }
        tokio::time::sleep(SCROLL_SETTLE).await;
    }

    async fn at_bottom(&self) -> bool {
        self.session
            .eval(AT_BOTTOM_SCRIPT)
            .await
            .map(|v| v.as_bool() == Some(true))
            .unwrap_or(false)
    }

    /// Activate the best search result: video first, then channel, then any
    /// link. After activation, waits (advisory, bounded) for the location
    /// to leave the search page. Returns whether anything was activated;
    /// the caller decides that `false` sinks the scenario.
    pub async fn select_and_activate_result(&self) -> bool {
        let start_url = match self.session.current_url().await {
            Ok(url) => url,
            Err(err) => {
                debug!(error = %err, "could not capture baseline url");
                String::new()
            }
        };

        let activated = select::select_and_activate(
            self.session,
            &chains::result_priority(),
            &ResolveOptions::default(),
        )
        .await;

        let Some(result) = activated else {
            return false;
        };

        let outcome = navigation::wait_for_navigation_away(
            self.session,
            &start_url,
            &self.still_on_marker,
            &NavigationOptions::default(),
        )
        .await;
        debug!(
            role = %result.role,
            departed = outcome.departed,
            url = %outcome.final_url,
            "result activation settled"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::PaseoError;
    use crate::session::fake::{FakeElement, FakeSession};
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_enter_query_uses_fourth_candidate() {
        // the first three input locators never match; the fourth is visible
        let session = FakeSession::new("https://m.example.tv/search");
        session.add_element(FakeElement::new("input[placeholder*='Search']"));
        session.stub_eval("scrollHeight || 0", [json!(1200)]);

        let screen = SearchScreen::new(&session);
        screen.enter_query("lofi beats").await.unwrap();

        assert_eq!(
            session.typed(),
            vec![("input[placeholder*='Search']".to_string(), "lofi beats".to_string())]
        );
        assert_eq!(session.cleared(), vec!["input[placeholder*='Search']"]);
        assert_eq!(session.enters(), vec!["input[placeholder*='Search']"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_query_fails_hard_without_input() {
        let session = FakeSession::new("https://m.example.tv/search");
        let screen = SearchScreen::new(&session);

        let err = screen.enter_query("anything").await.unwrap_err();
        assert!(matches!(err, PaseoError::ElementNotFound { .. }));
        assert!(session.typed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_scroll_gestures() {
        let session = FakeSession::new("https://m.example.tv/search?q=x");
        session.add_element(FakeElement::new("main a[href]"));
        session.stub_eval("pageYOffset", [json!(false)]);
        session.stub_eval("scrollBy", [json!(null)]);

        let screen = SearchScreen::new(&session);
        screen.perform_scroll_gestures().await;

        let scrolls = session
            .evals()
            .iter()
            .filter(|s| s.contains("innerHeight * 0.9"))
            .count();
        assert_eq!(scrolls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nudge_up_when_at_bottom() {
        let session = FakeSession::new("https://m.example.tv/search?q=x");
        session.add_element(FakeElement::new("main a[href]"));
        // at bottom on the first gesture, not on the second
        session.stub_eval("pageYOffset", [json!(true), json!(false)]);

        let screen = SearchScreen::new(&session);
        screen.perform_scroll_gestures().await;

        let nudges = session
            .evals()
            .iter()
            .filter(|s| s.contains("-Math.round"))
            .count();
        assert_eq!(nudges, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_results_skips_gestures_quietly() {
        let session = FakeSession::new("https://m.example.tv/search?q=x");
        let screen = SearchScreen::new(&session);
        screen.perform_scroll_gestures().await;
        assert!(session.evals().iter().all(|s| !s.contains("scrollBy")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_and_activate_result_departs() {
        let session = FakeSession::new("https://m.example.tv/search?q=x");
        session.add_element(
            FakeElement::new("a[href*='/videos/']")
                .navigates_to("https://m.example.tv/videos/42"),
        );

        let screen = SearchScreen::new(&session);
        assert!(screen.select_and_activate_result().await);
        assert_eq!(
            session.current_url().await.unwrap(),
            "https://m.example.tv/videos/42"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_returns_false_when_nothing_matches() {
        let session = FakeSession::new("https://m.example.tv/search?q=x");
        let screen = SearchScreen::new(&session);
        assert!(!screen.select_and_activate_result().await);
    }
}
