//! Scriptable in-memory session for tests.
//!
//! `FakeSession` answers probes from a scripted element table, serves
//! `eval` results from per-script queues, and records every interaction so
//! tests can assert on what the resilience layer actually did — all without
//! a browser. Time-based behavior is expressed in poll counts
//! ("appears after N probes", "URL changes after N reads"), which pairs
//! with tokio's paused clock for instant, deterministic wait tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::locator::Selector;
use crate::result::{PaseoError, PaseoResult};
use crate::session::{ElementHandle, PageSession, ProbeSnapshot};

/// One scripted element keyed by its selector expression.
#[derive(Debug, Clone)]
pub struct FakeElement {
    selector: String,
    visible: bool,
    clickable: bool,
    /// Probes to swallow before the element "renders"
    appears_after: u32,
    /// URL the page moves to when this element is clicked
    nav_target: Option<String>,
}

impl FakeElement {
    /// Element matching the given selector expression, visible and clickable
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            visible: true,
            clickable: true,
            appears_after: 0,
            nav_target: None,
        }
    }

    /// Make the element present but hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self.clickable = false;
        self
    }

    /// Make the element visible but not clickable (e.g. disabled)
    #[must_use]
    pub fn not_clickable(mut self) -> Self {
        self.clickable = false;
        self
    }

    /// Element only appears after `n` probes (late SPA render)
    #[must_use]
    pub fn appears_after(mut self, n: u32) -> Self {
        self.appears_after = n;
        self
    }

    /// Clicking the element navigates the page to `url`
    #[must_use]
    pub fn navigates_to(mut self, url: impl Into<String>) -> Self {
        self.nav_target = Some(url.into());
        self
    }
}

/// A scripted eval answer: a value or an injected failure.
type EvalAnswer = Result<Value, String>;

#[derive(Debug, Default)]
struct FakeState {
    url: String,
    elements: Vec<FakeElement>,
    /// Probe count per selector expression
    probe_counts: HashMap<String, u32>,
    /// current_url() call count, for scripted URL changes
    url_reads: u32,
    /// URL switched in after the given number of reads
    url_changes: Vec<(u32, String)>,
    /// Scripted eval answers keyed by script substring, served in order;
    /// the last answer repeats once the queue drains
    eval_stubs: Vec<(String, Vec<EvalAnswer>, usize)>,
    /// Recorded interactions
    navigations: Vec<String>,
    clicks: Vec<String>,
    cleared: Vec<String>,
    typed: Vec<(String, String)>,
    enters: Vec<String>,
    scrolled: Vec<String>,
    screenshots: Vec<PathBuf>,
    evals: Vec<String>,
    screenshot_fails: bool,
}

/// Scriptable page-session double.
#[derive(Debug, Default)]
pub struct FakeSession {
    state: Mutex<FakeState>,
}

impl FakeSession {
    /// Session whose page starts at `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let session = Self::default();
        session.lock().url = url.into();
        session
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Add a scripted element
    pub fn add_element(&self, element: FakeElement) {
        self.lock().elements.push(element);
    }

    /// Script `eval` answers for any script containing `key`
    pub fn stub_eval(&self, key: impl Into<String>, values: impl IntoIterator<Item = Value>) {
        self.lock()
            .eval_stubs
            .push((key.into(), values.into_iter().map(Ok).collect(), 0));
    }

    /// Script a single eval failure for any script containing `key`,
    /// followed by the given values
    pub fn stub_eval_error_then(
        &self,
        key: impl Into<String>,
        message: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
    ) {
        let mut answers: Vec<EvalAnswer> = vec![Err(message.into())];
        answers.extend(values.into_iter().map(Ok));
        self.lock().eval_stubs.push((key.into(), answers, 0));
    }

    /// Make the current URL change to `url` after `reads` calls to
    /// `current_url`
    pub fn change_url_after_reads(&self, reads: u32, url: impl Into<String>) {
        self.lock().url_changes.push((reads, url.into()));
    }

    /// Make `screenshot` report failure
    pub fn fail_screenshots(&self) {
        self.lock().screenshot_fails = true;
    }

    /// How many times `selector` was probed
    #[must_use]
    pub fn probe_count(&self, selector: &str) -> u32 {
        self.lock()
            .probe_counts
            .get(selector)
            .copied()
            .unwrap_or(0)
    }

    /// Selectors clicked, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    /// Text typed, as (selector, text) pairs
    #[must_use]
    pub fn typed(&self) -> Vec<(String, String)> {
        self.lock().typed.clone()
    }

    /// Selectors that received Enter
    #[must_use]
    pub fn enters(&self) -> Vec<String> {
        self.lock().enters.clone()
    }

    /// Selectors that were cleared
    #[must_use]
    pub fn cleared(&self) -> Vec<String> {
        self.lock().cleared.clone()
    }

    /// Selectors scrolled into view
    #[must_use]
    pub fn scrolled(&self) -> Vec<String> {
        self.lock().scrolled.clone()
    }

    /// URLs navigated to via `navigate`
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    /// Screenshot paths requested
    #[must_use]
    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.lock().screenshots.clone()
    }

    /// Scripts evaluated, in order
    #[must_use]
    pub fn evals(&self) -> Vec<String> {
        self.lock().evals.clone()
    }

    fn element_index(state: &FakeState, id: &str) -> PaseoResult<usize> {
        state
            .elements
            .iter()
            .position(|e| e.selector == id)
            .ok_or_else(|| PaseoError::StaleHandle {
                handle: id.to_string(),
            })
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &str) -> PaseoResult<()> {
        let mut state = self.lock();
        state.url = url.to_string();
        state.url_reads = 0;
        state.navigations.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> PaseoResult<String> {
        let mut state = self.lock();
        state.url_reads += 1;
        let reads = state.url_reads;
        let change = state
            .url_changes
            .iter()
            .filter(|(after, _)| reads > *after)
            .max_by_key(|(after, _)| *after)
            .map(|(_, url)| url.clone());
        if let Some(url) = change {
            state.url = url;
        }
        Ok(state.url.clone())
    }

    async fn probe(&self, selector: &Selector) -> PaseoResult<ProbeSnapshot> {
        let mut state = self.lock();
        let expr = selector.expression().to_string();
        let seen = state.probe_counts.entry(expr.clone()).or_insert(0);
        *seen += 1;
        let seen = *seen;

        let snapshot = state
            .elements
            .iter()
            .find(|e| e.selector == expr && seen > e.appears_after)
            .map_or_else(ProbeSnapshot::missing, |e| {
                ProbeSnapshot::found(ElementHandle::new(&e.selector), e.visible, e.clickable)
            });
        Ok(snapshot)
    }

    async fn eval(&self, script: &str) -> PaseoResult<Value> {
        let mut state = self.lock();
        state.evals.push(script.to_string());
        for (key, answers, cursor) in &mut state.eval_stubs {
            if !script.contains(key.as_str()) {
                continue;
            }
            let index = (*cursor).min(answers.len().saturating_sub(1));
            if *cursor < answers.len() {
                *cursor += 1;
            }
            return match &answers[index] {
                Ok(value) => Ok(value.clone()),
                Err(message) => Err(PaseoError::script(message.clone())),
            };
        }
        Ok(Value::Null)
    }

    async fn is_displayed(&self, handle: &ElementHandle) -> PaseoResult<bool> {
        let state = self.lock();
        let index = Self::element_index(&state, handle.id())?;
        Ok(state.elements[index].visible)
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> PaseoResult<()> {
        let mut state = self.lock();
        Self::element_index(&state, handle.id())?;
        let id = handle.id().to_string();
        state.scrolled.push(id);
        Ok(())
    }

    async fn dispatch_click(&self, handle: &ElementHandle) -> PaseoResult<()> {
        let mut state = self.lock();
        let index = Self::element_index(&state, handle.id())?;
        let nav = state.elements[index].nav_target.clone();
        let id = handle.id().to_string();
        state.clicks.push(id);
        if let Some(url) = nav {
            state.url = url;
        }
        Ok(())
    }

    async fn clear(&self, handle: &ElementHandle) -> PaseoResult<()> {
        let mut state = self.lock();
        Self::element_index(&state, handle.id())?;
        let id = handle.id().to_string();
        state.cleared.push(id);
        Ok(())
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> PaseoResult<()> {
        let mut state = self.lock();
        Self::element_index(&state, handle.id())?;
        let id = handle.id().to_string();
        state.typed.push((id, text.to_string()));
        Ok(())
    }

    async fn press_enter(&self, handle: &ElementHandle) -> PaseoResult<()> {
        let mut state = self.lock();
        Self::element_index(&state, handle.id())?;
        let id = handle.id().to_string();
        state.enters.push(id);
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> PaseoResult<bool> {
        let fails = {
            let mut state = self.lock();
            state.screenshots.push(path.to_path_buf());
            state.screenshot_fails
        };
        if fails {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // minimal PNG header so "file exists and is non-empty" checks pass
        tokio::fs::write(path, b"\x89PNG\r\n\x1a\n").await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Selector;
    use serde_json::json;

    #[tokio::test]
    async fn test_probe_absent_then_present() {
        let session = FakeSession::new("https://example.test/");
        session.add_element(FakeElement::new("video").appears_after(2));

        let sel = Selector::css("video");
        assert!(!session.probe(&sel).await.unwrap().found);
        assert!(!session.probe(&sel).await.unwrap().found);
        assert!(session.probe(&sel).await.unwrap().found);
        assert_eq!(session.probe_count("video"), 3);
    }

    #[tokio::test]
    async fn test_click_navigates() {
        let session = FakeSession::new("https://example.test/search");
        session.add_element(
            FakeElement::new("a[href*='/videos/']").navigates_to("https://example.test/videos/1"),
        );
        let snap = session.probe(&Selector::css("a[href*='/videos/']")).await.unwrap();
        let handle = snap.handle.unwrap();
        session.dispatch_click(&handle).await.unwrap();
        assert_eq!(
            session.current_url().await.unwrap(),
            "https://example.test/videos/1"
        );
        assert_eq!(session.clicks(), vec!["a[href*='/videos/']"]);
    }

    #[tokio::test]
    async fn test_eval_queue_serves_in_order_then_repeats() {
        let session = FakeSession::new("https://example.test/");
        session.stub_eval("scrollHeight", [json!(4200), json!(4300)]);

        let script = "return document.body.scrollHeight||0";
        assert_eq!(session.eval(script).await.unwrap(), json!(4200));
        assert_eq!(session.eval(script).await.unwrap(), json!(4300));
        assert_eq!(session.eval(script).await.unwrap(), json!(4300));
    }

    #[tokio::test]
    async fn test_eval_error_injection() {
        let session = FakeSession::new("https://example.test/");
        session.stub_eval_error_then("scrollHeight", "detached frame", [json!(100)]);

        let script = "document.body.scrollHeight";
        assert!(session.eval(script).await.is_err());
        assert_eq!(session.eval(script).await.unwrap(), json!(100));
    }

    #[tokio::test]
    async fn test_url_change_after_reads() {
        let session = FakeSession::new("https://example.test/search");
        session.change_url_after_reads(2, "https://example.test/videos/9");

        assert_eq!(session.current_url().await.unwrap(), "https://example.test/search");
        assert_eq!(session.current_url().await.unwrap(), "https://example.test/search");
        assert_eq!(session.current_url().await.unwrap(), "https://example.test/videos/9");
    }

    #[tokio::test]
    async fn test_screenshot_writes_file() {
        let session = FakeSession::new("https://example.test/");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shots/final.png");
        assert!(session.screenshot(&path).await.unwrap());
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_screenshot_failure_mode() {
        let session = FakeSession::new("https://example.test/");
        session.fail_screenshots();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final.png");
        assert!(!session.screenshot(&path).await.unwrap());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stale_handle() {
        let session = FakeSession::new("https://example.test/");
        let handle = ElementHandle::new("gone");
        assert!(matches!(
            session.is_displayed(&handle).await,
            Err(PaseoError::StaleHandle { .. })
        ));
    }
}
