//! DOM-stability polling.
//!
//! SPAs keep mutating the page after navigation; the cheapest settle signal
//! is a numeric page metric (document height) holding still across
//! consecutive samples. This wait is advisory: it reports what it saw and
//! never fails the caller, even when the metric refuses to settle or the
//! sampler errors on a tick.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::result::PaseoResult;
use crate::session::PageSession;

/// Default total budget for a stability wait (5 seconds)
pub const DEFAULT_STABILITY_TIMEOUT_MS: u64 = 5000;

/// Default sampling interval (200ms)
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 200;

/// Default number of consecutive identical samples that counts as settled
pub const DEFAULT_REQUIRED_STABLE_SAMPLES: u32 = 3;

/// Page metric sampled for DOM-quiet detection
const DOM_HEIGHT_METRIC: &str = "document.body.scrollHeight || 0";

/// Options for a stability wait
#[derive(Debug, Clone)]
pub struct StabilityOptions {
    /// Total budget; expiry is a normal return, not an error
    pub total_timeout: Duration,
    /// Sampling interval
    pub poll_interval: Duration,
    /// Consecutive identical samples required (the first sample counts as 1)
    pub required_stable_samples: u32,
}

impl Default for StabilityOptions {
    fn default() -> Self {
        Self {
            total_timeout: Duration::from_millis(DEFAULT_STABILITY_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
            required_stable_samples: DEFAULT_REQUIRED_STABLE_SAMPLES,
        }
    }
}

impl StabilityOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total budget
    #[must_use]
    pub const fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self
    }

    /// Set the sampling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the required consecutive identical samples
    #[must_use]
    pub const fn with_required_stable_samples(mut self, samples: u32) -> Self {
        self.required_stable_samples = samples;
        self
    }
}

/// What a stability wait observed.
#[derive(Debug, Clone)]
pub struct StabilityReport {
    /// The metric held still for the required consecutive samples
    pub stabilized: bool,
    /// Last value sampled, if any sample succeeded
    pub last_value: Option<i64>,
    /// Consecutive identical samples at return time
    pub stable_count: u32,
    /// Successful samples taken
    pub samples: u32,
    /// Wall-clock time spent
    pub elapsed: Duration,
}

/// Poll `sample` until it yields the same value
/// `required_stable_samples` times in a row, or the budget expires.
///
/// A sampling error is a no-op for that tick: the counter neither advances
/// nor resets. Always returns normally.
pub async fn wait_stable_with<F, Fut>(mut sample: F, opts: &StabilityOptions) -> StabilityReport
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PaseoResult<i64>>,
{
    let started = Instant::now();
    let mut last_value: Option<i64> = None;
    let mut stable_count: u32 = 0;
    let mut samples: u32 = 0;

    loop {
        match sample().await {
            Ok(value) => {
                samples += 1;
                if last_value == Some(value) {
                    stable_count += 1;
                } else {
                    stable_count = 1;
                }
                last_value = Some(value);

                if stable_count >= opts.required_stable_samples {
                    return StabilityReport {
                        stabilized: true,
                        last_value,
                        stable_count,
                        samples,
                        elapsed: started.elapsed(),
                    };
                }
            }
            Err(err) => {
                trace!(error = %err, "stability sample failed, skipping tick");
            }
        }

        if started.elapsed() >= opts.total_timeout {
            return StabilityReport {
                stabilized: false,
                last_value,
                stable_count,
                samples,
                elapsed: started.elapsed(),
            };
        }
        tokio::time::sleep(opts.poll_interval).await;
    }
}

/// Wait until the document height stops changing (SPA settle).
pub async fn wait_dom_quiet<S: PageSession + ?Sized>(
    session: &S,
    opts: &StabilityOptions,
) -> StabilityReport {
    let report = wait_stable_with(
        || async move {
            let value = session.eval(DOM_HEIGHT_METRIC).await?;
            Ok(value.as_i64().unwrap_or(0))
        },
        opts,
    )
    .await;
    trace!(
        stabilized = report.stabilized,
        height = report.last_value,
        "dom quiet wait finished"
    );
    report
}
