//! Best-effort media playback coercion and verification.
//!
//! Autoplay policies, overlay play buttons, muted-start rules and DRM gates
//! mean no single action reliably starts a mobile player. The machine walks
//! a fixed forward-only sequence — synthetic gesture, overlay button,
//! unmute, programmatic play — then polls a "really playing" heuristic.
//! Every step swallows its own errors and executes at most once per call;
//! only the final verification polls.

use std::time::Duration;
use tracing::{debug, info, trace};

use crate::chains;
use crate::locator::{Predicate, ResolveOptions};
use crate::probe;
use crate::result::{PaseoError, PaseoResult};
use crate::session::PageSession;

/// Default number of verification attempts
pub const DEFAULT_VERIFY_ATTEMPTS: u32 = 8;

/// Default pause between verification attempts (400ms)
pub const DEFAULT_VERIFY_INTERVAL_MS: u64 = 400;

/// Default budget for the load-readiness check (12 seconds per chain)
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 12_000;

/// Pause after each activation action, letting the player react
const ACTION_SETTLE: Duration = Duration::from_millis(300);

/// Synthetic centered click on the player region; counts as a user gesture
/// for autoplay purposes
const GESTURE_SCRIPT: &str = r"(() => {
    const el = document.querySelector('video, div[data-a-target=player-overlay-click-handler]');
    if (!el) return false;
    const r = el.getBoundingClientRect();
    const x = r.left + r.width / 2, y = r.top + r.height / 2;
    const target = document.elementFromPoint(x, y);
    if (target) target.dispatchEvent(new MouseEvent('click', { bubbles: true, cancelable: true }));
    return !!target;
})()";

/// Invoke the media element's play operation directly
const PLAY_SCRIPT: &str = r"(() => {
    const v = document.querySelector('video');
    if (!v) return false;
    if (v.play) v.play();
    return true;
})()";

/// The playing heuristic: not paused and sufficiently buffered
const VERIFY_SCRIPT: &str = r"(() => {
    const v = document.querySelector('video');
    if (!v) return false;
    return !v.paused && v.readyState >= 2;
})()";

/// States of one playback attempt, strictly forward-progressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// Nothing attempted yet
    Idle,
    /// Synthetic centered click dispatched on the player region
    GestureSent,
    /// Overlay play controls attempted
    ButtonPressed,
    /// Unmute control attempted
    Unmuted,
    /// Media element play invoked
    PlayInvoked,
    /// The playing heuristic held
    VerifiedPlaying,
    /// Verification attempts exhausted
    VerificationFailed,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::GestureSent => "gesture-sent",
            Self::ButtonPressed => "button-pressed",
            Self::Unmuted => "unmuted",
            Self::PlayInvoked => "play-invoked",
            Self::VerifiedPlaying => "verified-playing",
            Self::VerificationFailed => "verification-failed",
        };
        write!(f, "{name}")
    }
}

/// Options for a playback attempt
#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// Verification attempts before giving up
    pub max_verify_attempts: u32,
    /// Pause between verification attempts
    pub verify_interval: Duration,
    /// Resolution options for overlay and unmute lookups
    pub resolve: ResolveOptions,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            max_verify_attempts: DEFAULT_VERIFY_ATTEMPTS,
            verify_interval: Duration::from_millis(DEFAULT_VERIFY_INTERVAL_MS),
            resolve: ResolveOptions::default(),
        }
    }
}

impl PlaybackOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verification attempt bound
    #[must_use]
    pub const fn with_max_verify_attempts(mut self, attempts: u32) -> Self {
        self.max_verify_attempts = attempts;
        self
    }

    /// Set the verification interval
    #[must_use]
    pub const fn with_verify_interval(mut self, interval: Duration) -> Self {
        self.verify_interval = interval;
        self
    }

    /// Set resolution options for control lookups
    #[must_use]
    pub fn with_resolve(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }
}

/// One forward-only pass through the playback activation sequence.
pub struct PlaybackMachine<'a, S: PageSession + ?Sized> {
    session: &'a S,
    opts: PlaybackOptions,
    state: PlaybackState,
    visited: Vec<PlaybackState>,
}

impl<S: PageSession + ?Sized> std::fmt::Debug for PlaybackMachine<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackMachine")
            .field("state", &self.state)
            .field("visited", &self.visited)
            .finish_non_exhaustive()
    }
}

impl<'a, S: PageSession + ?Sized> PlaybackMachine<'a, S> {
    /// Create a machine in the idle state
    pub fn new(session: &'a S, opts: PlaybackOptions) -> Self {
        Self {
            session,
            opts,
            state: PlaybackState::Idle,
            visited: vec![PlaybackState::Idle],
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// States visited so far, in order
    #[must_use]
    pub fn visited(&self) -> &[PlaybackState] {
        &self.visited
    }

    fn advance(&mut self, next: PlaybackState) {
        trace!(from = %self.state, to = %next, "playback state advance");
        self.state = next;
        self.visited.push(next);
    }

    /// Run the whole sequence once. Returns whether playback was verified.
    ///
    /// A machine runs once; calling again after a pass just reports the
    /// prior verdict.
    pub async fn run(&mut self) -> bool {
        if self.state != PlaybackState::Idle {
            debug!(state = %self.state, "playback machine already ran");
            return self.state == PlaybackState::VerifiedPlaying;
        }

        self.send_gesture().await;
        self.advance(PlaybackState::GestureSent);

        self.press_overlay().await;
        self.advance(PlaybackState::ButtonPressed);

        self.unmute_if_present().await;
        self.advance(PlaybackState::Unmuted);

        self.invoke_play().await;
        self.advance(PlaybackState::PlayInvoked);

        let playing = self.verify().await;
        if playing {
            self.advance(PlaybackState::VerifiedPlaying);
            info!("playback verified");
        } else {
            self.advance(PlaybackState::VerificationFailed);
            debug!("playback verification exhausted");
        }
        playing
    }

    /// Centered click on the player region to satisfy gesture requirements.
    async fn send_gesture(&self) {
        if let Ok(handle) =
            probe::resolve(self.session, &chains::player(), Predicate::Visible, &self.opts.resolve)
                .await
        {
            if let Err(err) = self.session.scroll_into_view(&handle).await {
                trace!(error = %err, "player scroll failed");
            }
        }
        match self.session.eval(GESTURE_SCRIPT).await {
            Ok(_) => tokio::time::sleep(ACTION_SETTLE).await,
            Err(err) => trace!(error = %err, "gesture dispatch failed"),
        }
    }

    /// First overlay play control that resolves gets one click.
    async fn press_overlay(&self) {
        match probe::resolve(
            self.session,
            &chains::play_overlay(),
            Predicate::Clickable,
            &self.opts.resolve,
        )
        .await
        {
            Ok(handle) => {
                if self.session.dispatch_click(&handle).await.is_ok() {
                    tokio::time::sleep(ACTION_SETTLE).await;
                }
            }
            Err(err) => trace!(error = %err, "no overlay play control"),
        }
    }

    /// Unmute when a control exists; absence is not an error.
    async fn unmute_if_present(&self) {
        let resolve = self
            .opts
            .resolve
            .clone()
            .with_candidate_timeout(Duration::from_millis(1000));
        match probe::resolve(self.session, &chains::unmute(), Predicate::Clickable, &resolve).await
        {
            Ok(handle) => {
                if let Err(err) = self.session.dispatch_click(&handle).await {
                    trace!(error = %err, "unmute click failed");
                }
            }
            Err(err) => trace!(error = %err, "no unmute control"),
        }
    }

    /// Programmatic play on the media element, if one exists.
    async fn invoke_play(&self) {
        match self.session.eval(PLAY_SCRIPT).await {
            Ok(_) => tokio::time::sleep(ACTION_SETTLE).await,
            Err(err) => trace!(error = %err, "programmatic play failed"),
        }
    }

    /// Poll the playing heuristic up to the attempt bound.
    async fn verify(&self) -> bool {
        for attempt in 0..self.opts.max_verify_attempts {
            match self.session.eval(VERIFY_SCRIPT).await {
                Ok(value) if value.as_bool() == Some(true) => {
                    debug!(attempt, "playing heuristic held");
                    return true;
                }
                Ok(_) => {}
                Err(err) => trace!(attempt, error = %err, "verify sample failed"),
            }
            tokio::time::sleep(self.opts.verify_interval).await;
        }
        false
    }
}

/// One-shot convenience over [`PlaybackMachine`].
pub async fn try_start_playback<S: PageSession + ?Sized>(
    session: &S,
    opts: &PlaybackOptions,
) -> bool {
    PlaybackMachine::new(session, opts.clone()).run().await
}

/// Required load-readiness check: the player chain visible, falling back to
/// the header chain. Both timing out is the one hard failure of the
/// playback phase.
pub async fn wait_until_loaded<S: PageSession + ?Sized>(
    session: &S,
    timeout: Duration,
) -> PaseoResult<()> {
    let opts = ResolveOptions::new().with_candidate_timeout(timeout);

    if probe::resolve(session, &chains::player(), Predicate::Visible, &opts)
        .await
        .is_ok()
    {
        return Ok(());
    }
    debug!("player chain timed out, falling back to header");

    match probe::resolve(session, &chains::header(), Predicate::Visible, &opts).await {
        Ok(_) => Ok(()),
        Err(_) => Err(PaseoError::LoadTimeout {
            ms: timeout.as_millis() as u64,
        }),
    }
}
