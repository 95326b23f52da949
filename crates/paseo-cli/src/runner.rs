//! Journey orchestration: the sequence of screen steps, the hard-failure
//! decisions, and evidence capture.
//!
//! The runner is generic over the session so the whole journey can be
//! exercised against a scripted page in tests.

use std::path::PathBuf;
use tracing::{info, warn};

use paseo::prelude::*;

use crate::error::{CliError, CliResult};

/// What one journey run produced.
#[derive(Debug, Clone)]
pub struct JourneyReport {
    /// Location after the result activation
    pub final_url: String,
    /// Popups dismissed on the player page
    pub dismissed: u32,
    /// Whether playback was verified
    pub playback_verified: bool,
    /// Path of the evidence screenshot
    pub screenshot: PathBuf,
}

/// Drive the full journey; on a required-step failure, capture a
/// best-effort failure screenshot before propagating.
pub async fn run_with_evidence<S: PageSession + ?Sized>(
    session: &S,
    config: &JourneyConfig,
) -> CliResult<JourneyReport> {
    match run_journey(session, config).await {
        Ok(report) => Ok(report),
        Err(err) => {
            capture_failure_shot(session, config).await;
            Err(err)
        }
    }
}

/// The scripted walk: open, search, scroll, activate, clear popups, wait
/// for the player, try playback, capture evidence.
pub async fn run_journey<S: PageSession + ?Sized>(
    session: &S,
    config: &JourneyConfig,
) -> CliResult<JourneyReport> {
    let home = HomeScreen::new(session, &config.base_url, &config.search_path);
    home.open().await?;
    home.navigate_to_search().await?;

    let search = SearchScreen::new(session)
        .with_still_on_marker(UrlPattern::Contains(config.search_path.clone()));
    search.enter_query(&config.search_term).await?;
    search.perform_scroll_gestures().await;

    let start_url = session.current_url().await?;
    if !search.select_and_activate_result().await {
        return Err(CliError::journey("no clickable search result found"));
    }

    let final_url = session.current_url().await?;
    if final_url == start_url || final_url.contains(&config.search_path) {
        return Err(CliError::journey(format!(
            "expected to leave the search page, still at: {final_url}"
        )));
    }
    info!(url = %final_url, "left search page");

    let player = PlayerScreen::new(session);
    let dismissed = player.dismiss_popups().await;
    player.wait_until_loaded().await?;
    let playback_verified = player.try_start_playback().await;
    if !playback_verified {
        warn!("playback could not be verified, capturing evidence anyway");
    }

    let screenshot = config.screenshot_path.clone();
    let written = session.screenshot(&screenshot).await?;
    let non_empty = written
        && std::fs::metadata(&screenshot)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
    if !non_empty {
        return Err(CliError::journey(format!(
            "evidence screenshot missing or empty at {}",
            screenshot.display()
        )));
    }
    info!(path = %screenshot.display(), "evidence captured");

    Ok(JourneyReport {
        final_url,
        dismissed,
        playback_verified,
        screenshot,
    })
}

/// Best-effort failure evidence; never masks the original error.
async fn capture_failure_shot<S: PageSession + ?Sized>(session: &S, config: &JourneyConfig) {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = config
        .output_dir
        .join("failures")
        .join(format!("journey_{timestamp}.png"));
    match session.screenshot(&path).await {
        Ok(true) => info!(path = %path.display(), "failure screenshot saved"),
        Ok(false) => warn!("failure screenshot not written"),
        Err(err) => warn!(error = %err, "failure screenshot errored"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PLAYER_SELECTOR: &str = "video, div[data-a-target='player-overlay-click-handler'], div[data-test-selector='stream-video-player__video']";

    fn test_config(dir: &std::path::Path) -> JourneyConfig {
        JourneyConfig::new()
            .with_base_url("https://m.example.tv")
            .with_search_term("chess")
            .with_output_dir(dir)
            .with_screenshot_path(dir.join("final_screen.png"))
    }

    fn scripted_session(playing: bool) -> FakeSession {
        let session = FakeSession::new("about:blank");
        session.add_element(FakeElement::new("input[type='search']"));
        session.add_element(
            FakeElement::new("a[href*='/videos/']").navigates_to("https://m.example.tv/videos/7"),
        );
        session.add_element(FakeElement::new(PLAYER_SELECTOR));
        session.stub_eval("scrollHeight || 0", [json!(2400)]);
        session.stub_eval("pageYOffset", [json!(false)]);
        session.stub_eval("readyState", [json!(playing)]);
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_journey() {
        let dir = tempfile::tempdir().unwrap();
        let session = scripted_session(true);

        let report = run_journey(&session, &test_config(dir.path())).await.unwrap();

        assert_eq!(report.final_url, "https://m.example.tv/videos/7");
        assert!(report.playback_verified);
        assert!(report.screenshot.exists());
        assert_eq!(
            session.navigations(),
            vec!["https://m.example.tv", "https://m.example.tv/search"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_result_is_fatal_with_failure_shot() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new("about:blank");
        session.add_element(FakeElement::new("input[type='search']"));
        session.stub_eval("scrollHeight || 0", [json!(2400)]);

        let err = run_with_evidence(&session, &test_config(dir.path()))
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Journey { .. }));
        // a failure screenshot landed under output/failures
        let shots = session.screenshots();
        assert_eq!(shots.len(), 1);
        assert!(shots[0].starts_with(dir.path().join("failures")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_input_propagates_element_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new("about:blank");

        let err = run_journey(&session, &test_config(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Paseo(PaseoError::ElementNotFound { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_staying_on_search_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new("about:blank");
        session.add_element(FakeElement::new("input[type='search']"));
        // a result exists but clicking it never leaves the search page
        session.add_element(FakeElement::new("main a[href]"));
        session.stub_eval("scrollHeight || 0", [json!(2400)]);
        session.stub_eval("pageYOffset", [json!(false)]);

        let err = run_journey(&session, &test_config(dir.path()))
            .await
            .unwrap_err();
        let CliError::Journey { message } = err else {
            panic!("expected journey error");
        };
        assert!(message.contains("leave the search page"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unverified_playback_still_captures_evidence() {
        let dir = tempfile::tempdir().unwrap();
        let session = scripted_session(false);

        let report = run_journey(&session, &test_config(dir.path()))
            .await
            .unwrap();
        assert!(!report.playback_verified);
        assert!(report.screenshot.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_screenshot_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let session = scripted_session(true);
        session.fail_screenshots();

        let err = run_journey(&session, &test_config(dir.path()))
            .await
            .unwrap_err();
        let CliError::Journey { message } = err else {
            panic!("expected journey error");
        };
        assert!(message.contains("screenshot"));
    }
}
