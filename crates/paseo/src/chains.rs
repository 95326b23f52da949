//! Declarative locator tables for every logical role the journey touches.
//!
//! These are data, not control flow: adding a selector variant for a UI
//! change means appending a candidate here, never editing a resolver.
//! First candidate that satisfies its predicate wins.

use crate::locator::{LocatorChain, Selector};

/// Search input field. Aria-label variants cover localized capitalization.
#[must_use]
pub fn search_input() -> LocatorChain {
    LocatorChain::new(
        "search input",
        [
            Selector::css("input[type='search']"),
            Selector::css("input[aria-label='Search']"),
            Selector::css("input[aria-label*='earch']"),
            Selector::css("input[placeholder*='Search']"),
        ],
    )
}

/// Video results load the cheapest destination page, so they rank first.
#[must_use]
pub fn video_result() -> LocatorChain {
    LocatorChain::new(
        "video result",
        [
            Selector::css("a[href*='/videos/']"),
            Selector::xpath("//a[contains(@href,'/videos/')]"),
            // some UIs mark video cards differently; keep a broad fallback
            Selector::css("main a[href*='/video']"),
        ],
    )
}

/// Channel results, second preference.
#[must_use]
pub fn channel_result() -> LocatorChain {
    LocatorChain::new(
        "channel result",
        [
            Selector::css("a[href*='/channel/']"),
            Selector::xpath("//a[contains(@href,'/channel/')]"),
        ],
    )
}

/// Catch-all: any link inside the results area.
#[must_use]
pub fn generic_result() -> LocatorChain {
    LocatorChain::new("generic result", [Selector::css("main a[href]")])
}

/// The three result chains in strict priority order.
#[must_use]
pub fn result_priority() -> Vec<LocatorChain> {
    vec![video_result(), channel_result(), generic_result()]
}

/// Dismiss controls for consent dialogs, nags and interstitials.
/// Each chain is one family of buttons; a dismissal round tries all of them.
#[must_use]
pub fn popup_dismiss() -> Vec<LocatorChain> {
    vec![
        LocatorChain::new(
            "dismiss button",
            [Selector::xpath(
                "//button[contains(.,'Dismiss') or contains(.,'Not now') or contains(.,'Close')]",
            )],
        ),
        LocatorChain::new(
            "gate button",
            [Selector::xpath(
                "//button[contains(.,'Start Watching') or contains(.,'I Understand') or contains(.,'Allow')]",
            )],
        ),
        LocatorChain::new(
            "consent button",
            [Selector::xpath(
                "//button[contains(.,'Accept') or contains(.,'Agree') or contains(.,'Only necessary')]",
            )],
        ),
        LocatorChain::new(
            "close control",
            [Selector::css(
                "button[aria-label='Close'], button[aria-label*='close']",
            )],
        ),
        LocatorChain::new("dialog button", [Selector::css("div[role='dialog'] button")]),
    ]
}

/// Player region: the media element or its overlay click handler.
#[must_use]
pub fn player() -> LocatorChain {
    LocatorChain::new(
        "player",
        [Selector::css(
            "video, div[data-a-target='player-overlay-click-handler'], div[data-test-selector='stream-video-player__video']",
        )],
    )
}

/// Header fallback used when the player never renders (offline channel,
/// about page).
#[must_use]
pub fn header() -> LocatorChain {
    LocatorChain::new(
        "header",
        [Selector::css("header, h1, h2, a[href*='/about']")],
    )
}

/// Overlay play controls, most specific first.
#[must_use]
pub fn play_overlay() -> LocatorChain {
    LocatorChain::new(
        "play overlay",
        [
            Selector::css("button[aria-label='Play']"),
            Selector::css("button[data-a-target='player-play-pause-button']"),
            Selector::css("div[data-a-target='player-overlay-click-handler']"),
        ],
    )
}

/// Unmute control; absence is normal.
#[must_use]
pub fn unmute() -> LocatorChain {
    LocatorChain::new(
        "unmute control",
        [Selector::css(
            "button[aria-label*='mute'], button[aria-label*='Unmute']",
        )],
    )
}
