//! Player screen: interstitials, load readiness, playback.

use std::time::Duration;
use tracing::info;

use crate::chains;
use crate::playback::{self, PlaybackOptions};
use crate::popups::{self, DismissOptions};
use crate::result::PaseoResult;
use crate::session::PageSession;

/// The destination page reached from a search result: a channel or video
/// page carrying the media player.
pub struct PlayerScreen<'a, S: PageSession + ?Sized> {
    session: &'a S,
    dismiss: DismissOptions,
    playback: PlaybackOptions,
    load_timeout: Duration,
}

impl<S: PageSession + ?Sized> std::fmt::Debug for PlayerScreen<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerScreen")
            .field("load_timeout", &self.load_timeout)
            .finish_non_exhaustive()
    }
}

impl<'a, S: PageSession + ?Sized> PlayerScreen<'a, S> {
    /// Create a player screen with default budgets
    pub fn new(session: &'a S) -> Self {
        Self {
            session,
            dismiss: DismissOptions::default(),
            playback: PlaybackOptions::default(),
            load_timeout: Duration::from_millis(playback::DEFAULT_LOAD_TIMEOUT_MS),
        }
    }

    /// Override dismissal options
    #[must_use]
    pub fn with_dismiss_options(mut self, dismiss: DismissOptions) -> Self {
        self.dismiss = dismiss;
        self
    }

    /// Override playback options
    #[must_use]
    pub fn with_playback_options(mut self, playback: PlaybackOptions) -> Self {
        self.playback = playback;
        self
    }

    /// Override the load-readiness budget
    #[must_use]
    pub const fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Clear any popups; absence is the normal case. Returns the number of
    /// dismissals.
    pub async fn dismiss_popups(&self) -> u32 {
        popups::dismiss_if_any(self.session, &chains::popup_dismiss(), &self.dismiss).await
    }

    /// Required wait: the player visible, or failing that the page header.
    pub async fn wait_until_loaded(&self) -> PaseoResult<()> {
        playback::wait_until_loaded(self.session, self.load_timeout).await?;
        info!("player page loaded");
        Ok(())
    }

    /// Best-effort playback start; `false` means verification never held.
    pub async fn try_start_playback(&self) -> bool {
        playback::try_start_playback(self.session, &self.playback).await
    }
}
