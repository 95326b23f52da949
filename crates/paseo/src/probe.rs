//! Ordered locator-chain resolution.
//!
//! A chain is evaluated left-to-right. Each candidate gets its own timeout
//! budget and is polled until it produces an element satisfying the
//! predicate; the first success wins and later candidates are never
//! evaluated. Candidate failures are values ([`ProbeOutcome`]), not control
//! flow, so "which candidate matched and why the others didn't" stays
//! inspectable.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::locator::{LocatorChain, Predicate, ResolveOptions, Selector};
use crate::result::{PaseoError, PaseoResult};
use crate::session::{ElementHandle, PageSession};

/// Result of a single candidate probe.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Element found and predicate satisfied
    Matched(ElementHandle),
    /// No acceptable element right now; the flags say how close it came
    Rejected {
        /// An element matched the selector at all
        found: bool,
        /// It was rendered
        visible: bool,
        /// It was clickable
        clickable: bool,
    },
    /// The page query itself failed
    Failed(PaseoError),
}

impl ProbeOutcome {
    /// Whether this outcome ends the chain
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Probe one selector once, with no waiting.
pub async fn probe_once<S: PageSession + ?Sized>(
    session: &S,
    selector: &Selector,
    predicate: Predicate,
) -> ProbeOutcome {
    match session.probe(selector).await {
        Ok(snapshot) => {
            let accepted = match predicate {
                Predicate::Visible => snapshot.visible,
                Predicate::Clickable => snapshot.clickable,
            };
            match (accepted, snapshot.handle) {
                (true, Some(handle)) => ProbeOutcome::Matched(handle),
                _ => ProbeOutcome::Rejected {
                    found: snapshot.found,
                    visible: snapshot.visible,
                    clickable: snapshot.clickable,
                },
            }
        }
        Err(err) => ProbeOutcome::Failed(err),
    }
}

/// Resolve a chain to the first element satisfying `predicate`.
///
/// Every candidate polls within its own `candidate_timeout`; a candidate
/// failing never aborts the chain. When the whole chain fails, the returned
/// [`PaseoError::ElementNotFound`] carries the last candidate's error as its
/// cause (or a synthetic chain-exhausted error for an empty chain).
pub async fn resolve<S: PageSession + ?Sized>(
    session: &S,
    chain: &LocatorChain,
    predicate: Predicate,
    opts: &ResolveOptions,
) -> PaseoResult<ElementHandle> {
    let mut last_error: Option<PaseoError> = None;

    for selector in chain.candidates() {
        match resolve_candidate(session, selector, predicate, opts).await {
            Ok(handle) => {
                debug!(role = chain.role(), %selector, "locator candidate matched");
                return Ok(handle);
            }
            Err(err) => {
                trace!(role = chain.role(), %selector, error = %err, "locator candidate failed");
                last_error = Some(err);
            }
        }
    }

    let source = last_error.unwrap_or(PaseoError::ChainExhausted {
        role: chain.role().to_string(),
    });
    Err(PaseoError::ElementNotFound {
        role: chain.role().to_string(),
        source: Box::new(source),
    })
}

/// Poll a single candidate until it matches or its budget runs out.
async fn resolve_candidate<S: PageSession + ?Sized>(
    session: &S,
    selector: &Selector,
    predicate: Predicate,
    opts: &ResolveOptions,
) -> PaseoResult<ElementHandle> {
    let started = Instant::now();
    let mut last_failure: Option<PaseoError> = None;

    loop {
        match probe_once(session, selector, predicate).await {
            ProbeOutcome::Matched(handle) => return Ok(handle),
            ProbeOutcome::Rejected { .. } => last_failure = None,
            ProbeOutcome::Failed(err) => last_failure = Some(err),
        }

        if started.elapsed() >= opts.candidate_timeout {
            break;
        }
        tokio::time::sleep(poll_step(opts.poll_interval, opts.candidate_timeout)).await;
    }

    // A concrete query failure is a better cause than the generic timeout.
    Err(last_failure.unwrap_or_else(|| PaseoError::CandidateTimeout {
        selector: selector.expression().to_string(),
        predicate: predicate.name().to_string(),
        ms: opts.candidate_timeout.as_millis() as u64,
    }))
}

/// Keep the poll step sane when a caller passes a tiny timeout.
fn poll_step(interval: Duration, timeout: Duration) -> Duration {
    interval.min(timeout).max(Duration::from_millis(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains;
    use crate::locator::Selector;
    use crate::session::fake::{FakeElement, FakeSession};
    use std::error::Error;

    fn quick_opts() -> ResolveOptions {
        ResolveOptions::new()
            .with_candidate_timeout(Duration::from_millis(400))
            .with_poll_interval(Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_candidate_wins() {
        let session = FakeSession::new("https://example.test/");
        session.add_element(FakeElement::new("input[type='search']"));
        session.add_element(FakeElement::new("input[aria-label='Search']"));

        let handle = resolve(
            &session,
            &chains::search_input(),
            Predicate::Visible,
            &quick_opts(),
        )
        .await
        .unwrap();

        assert_eq!(handle.id(), "input[type='search']");
        // later candidates were never evaluated
        assert_eq!(session.probe_count("input[aria-label='Search']"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_to_last_candidate() {
        let session = FakeSession::new("https://example.test/");
        session.add_element(FakeElement::new("input[placeholder*='Search']"));

        let handle = resolve(
            &session,
            &chains::search_input(),
            Predicate::Visible,
            &quick_opts(),
        )
        .await
        .unwrap();

        assert_eq!(handle.id(), "input[placeholder*='Search']");
        assert!(session.probe_count("input[type='search']") > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_render_within_budget() {
        let session = FakeSession::new("https://example.test/");
        session.add_element(FakeElement::new("video").appears_after(2));

        let chain = LocatorChain::new("player", [Selector::css("video")]);
        let handle = resolve(&session, &chain, Predicate::Visible, &quick_opts())
            .await
            .unwrap();
        assert_eq!(handle.id(), "video");
        assert_eq!(session.probe_count("video"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_chain_carries_last_error() {
        let session = FakeSession::new("https://example.test/");
        let chain = LocatorChain::new(
            "generic result",
            [Selector::css("nav a[href]"), Selector::css("main a[href]")],
        );

        let err = resolve(&session, &chain, Predicate::Clickable, &quick_opts())
            .await
            .unwrap_err();

        let PaseoError::ElementNotFound { role, source } = &err else {
            panic!("expected ElementNotFound, got {err}");
        };
        assert_eq!(role, "generic result");
        // the cause is the LAST candidate's error
        assert!(source.to_string().contains("main a[href]"));
        assert!(err.source().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_chain_synthesizes_cause() {
        let session = FakeSession::new("https://example.test/");
        let chain = LocatorChain::new("empty", []);

        let err = resolve(&session, &chain, Predicate::Visible, &quick_opts())
            .await
            .unwrap_err();

        let PaseoError::ElementNotFound { source, .. } = &err else {
            panic!("expected ElementNotFound");
        };
        assert!(matches!(**source, PaseoError::ChainExhausted { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_rejects_hidden_element() {
        let session = FakeSession::new("https://example.test/");
        session.add_element(FakeElement::new("main a[href]").hidden());

        let chain = LocatorChain::new("generic result", [Selector::css("main a[href]")]);
        let err = resolve(&session, &chain, Predicate::Clickable, &quick_opts())
            .await
            .unwrap_err();
        assert!(matches!(err, PaseoError::ElementNotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_candidate_budget_is_independent() {
        let session = FakeSession::new("https://example.test/");
        // second candidate appears only after the first candidate's budget
        // has already been spent; its own budget must still cover it
        session.add_element(FakeElement::new("input[aria-label='Search']").appears_after(1));

        let chain = LocatorChain::new(
            "search input",
            [
                Selector::css("input[type='search']"),
                Selector::css("input[aria-label='Search']"),
            ],
        );
        let handle = resolve(&session, &chain, Predicate::Visible, &quick_opts())
            .await
            .unwrap();
        assert_eq!(handle.id(), "input[aria-label='Search']");
    }

    #[tokio::test]
    async fn test_probe_once_reports_rejection_detail() {
        let session = FakeSession::new("https://example.test/");
        session.add_element(FakeElement::new("button[aria-label='Play']").not_clickable());

        let outcome = probe_once(
            &session,
            &Selector::css("button[aria-label='Play']"),
            Predicate::Clickable,
        )
        .await;

        let ProbeOutcome::Rejected {
            found,
            visible,
            clickable,
        } = outcome
        else {
            panic!("expected rejection");
        };
        assert!(found);
        assert!(visible);
        assert!(!clickable);
    }
}
