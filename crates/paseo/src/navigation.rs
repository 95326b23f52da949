//! Bounded navigation-change detection.
//!
//! After a result is activated, the SPA may take an arbitrary moment to
//! actually leave the current logical page. The watcher captures a baseline
//! URL, then polls the location until it both differs from the baseline and
//! no longer matches the still-on-same-page marker. Advisory: it reports an
//! outcome and never raises, and it never re-issues the triggering action.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::session::PageSession;

/// Default bound for a navigation wait (10 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 10_000;

/// Default location polling interval (200ms)
pub const DEFAULT_LOCATION_POLL_MS: u64 = 200;

/// URL pattern for "still on the same logical page" markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// URL contains substring
    Contains(String),
    /// URL starts with prefix
    Prefix(String),
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(s) => url == s,
            Self::Contains(s) => url.contains(s.as_str()),
            Self::Prefix(s) => url.starts_with(s.as_str()),
        }
    }
}

/// Options for a navigation-away wait
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Total bound; expiry is a normal return
    pub timeout: Duration,
    /// Location polling interval
    pub poll_interval: Duration,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_LOCATION_POLL_MS),
        }
    }
}

impl NavigationOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total bound
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// What a navigation wait observed.
#[derive(Debug, Clone)]
pub struct NavigationOutcome {
    /// The location left the baseline page before the bound expired
    pub departed: bool,
    /// Location at return time (baseline when every read failed)
    pub final_url: String,
    /// Wall-clock time spent
    pub elapsed: Duration,
}

/// Block until the location differs from `from_url` and stops matching
/// `still_on`, or until the bound expires.
///
/// Location-read errors are per-tick no-ops.
pub async fn wait_for_navigation_away<S: PageSession + ?Sized>(
    session: &S,
    from_url: &str,
    still_on: &UrlPattern,
    opts: &NavigationOptions,
) -> NavigationOutcome {
    let started = Instant::now();
    let mut last_seen = from_url.to_string();

    loop {
        match session.current_url().await {
            Ok(url) => {
                let departed = url != from_url && !still_on.matches(&url);
                last_seen = url;
                if departed {
                    debug!(url = %last_seen, "navigation departed baseline");
                    return NavigationOutcome {
                        departed: true,
                        final_url: last_seen,
                        elapsed: started.elapsed(),
                    };
                }
            }
            Err(err) => {
                trace!(error = %err, "location read failed, skipping tick");
            }
        }

        if started.elapsed() >= opts.timeout {
            debug!(url = %last_seen, "navigation wait expired");
            return NavigationOutcome {
                departed: false,
                final_url: last_seen,
                elapsed: started.elapsed(),
            };
        }
        tokio::time::sleep(opts.poll_interval).await;
    }
}
