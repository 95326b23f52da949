//! Bounded dismissal of popups and interstitials.
//!
//! Consent dialogs, nags and maturity gates appear in unpredictable
//! combinations, and closing one sometimes reveals the next. Dismissal runs
//! in rounds: each round tries every dismiss chain once with a very short
//! budget; a round that closed nothing means the page is clear and the loop
//! stops. Absence of popups is the common, successful case — this never
//! fails the caller.

use std::time::Duration;
use tracing::{debug, trace};

use crate::locator::{LocatorChain, Predicate, ResolveOptions};
use crate::probe;
use crate::session::PageSession;

/// Default number of dismissal rounds
pub const DEFAULT_DISMISS_ROUNDS: u32 = 2;

/// Default per-candidate budget inside a round (1 second)
pub const DEFAULT_DISMISS_TIMEOUT_MS: u64 = 1000;

/// Pause after a successful dismissal, letting the dialog animate out
const DISMISS_SETTLE: Duration = Duration::from_millis(200);

/// Options for popup dismissal
#[derive(Debug, Clone)]
pub struct DismissOptions {
    /// Upper bound on rounds
    pub max_rounds: u32,
    /// Per-candidate resolution options within a round
    pub resolve: ResolveOptions,
}

impl Default for DismissOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_DISMISS_ROUNDS,
            resolve: ResolveOptions::new()
                .with_candidate_timeout(Duration::from_millis(DEFAULT_DISMISS_TIMEOUT_MS)),
        }
    }
}

impl DismissOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the round bound
    #[must_use]
    pub const fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set per-candidate resolution options
    #[must_use]
    pub fn with_resolve(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }
}

/// Scan the dismiss chains for up to `max_rounds` rounds, clicking whatever
/// resolves. Returns the number of dismissals performed.
pub async fn dismiss_if_any<S: PageSession + ?Sized>(
    session: &S,
    chains: &[LocatorChain],
    opts: &DismissOptions,
) -> u32 {
    let mut dismissed = 0;

    for round in 0..opts.max_rounds {
        let mut productive = false;

        for chain in chains {
            let handle =
                match probe::resolve(session, chain, Predicate::Clickable, &opts.resolve).await {
                    Ok(handle) => handle,
                    Err(_) => {
                        trace!(role = chain.role(), round, "no popup for chain");
                        continue;
                    }
                };

            match session.dispatch_click(&handle).await {
                Ok(()) => {
                    debug!(role = chain.role(), round, "dismissed popup");
                    dismissed += 1;
                    productive = true;
                    tokio::time::sleep(DISMISS_SETTLE).await;
                }
                Err(err) => {
                    trace!(role = chain.role(), round, error = %err, "dismiss click failed");
                }
            }
        }

        if !productive {
            break;
        }
    }

    debug!(dismissed, "popup dismissal finished");
    dismissed
}
