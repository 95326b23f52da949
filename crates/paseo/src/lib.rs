//! Paseo: resilient mobile-web journey automation.
//!
//! Paseo (Spanish: "a stroll") walks a scripted user journey — search,
//! pick a result, clear interstitials, start playback, capture evidence —
//! across a single-page application that renders asynchronously and never
//! quite the same way twice. The interesting part is the resilience layer
//! that makes such a page deterministic enough to drive:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       PASEO Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐    ┌─────────────────────────┐    ┌─────────────┐  │
//! │  │ Screens  │───►│ Resilience layer        │───►│ PageSession │  │
//! │  │ (journey │    │ chains · probe · waits  │    │ (CDP or     │  │
//! │  │ steps)   │    │ select · popups · play  │    │  scripted)  │  │
//! │  └──────────┘    └─────────────────────────┘    └─────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every wait is a cooperative sleep-and-recheck loop with a wall-clock
//! deadline; retries apply only to observation, never to re-issuing an
//! action. Required interactions (finding the search input, load
//! readiness) fail hard; everything else degrades to an advisory outcome.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Declarative locator tables per logical UI role
pub mod chains;
/// Journey configuration and device profiles
pub mod config;
/// Locator primitives: selectors, predicates, chains
pub mod locator;
/// Bounded navigation-change detection
pub mod navigation;
/// Playback state machine and load readiness
pub mod playback;
/// Bounded popup dismissal rounds
pub mod popups;
/// Ordered locator-chain resolution
pub mod probe;
/// Result and error types
pub mod result;
/// Screen objects for the journey steps
pub mod screens;
/// Priority-based result selection
pub mod select;
/// Browser-session abstraction and implementations
pub mod session;
/// DOM-stability polling
pub mod stability;

pub use config::{DeviceProfile, JourneyConfig};
pub use locator::{LocatorChain, Predicate, ResolveOptions, Selector};
pub use navigation::{NavigationOptions, NavigationOutcome, UrlPattern};
pub use playback::{PlaybackMachine, PlaybackOptions, PlaybackState};
pub use popups::DismissOptions;
pub use probe::ProbeOutcome;
pub use result::{PaseoError, PaseoResult};
pub use screens::{HomeScreen, PlayerScreen, SearchScreen};
pub use select::ActivatedResult;
pub use session::{ElementHandle, PageSession, ProbeSnapshot};
pub use stability::{StabilityOptions, StabilityReport};

/// Convenience imports for journey authors
pub mod prelude {
    pub use crate::chains;
    pub use crate::config::{DeviceProfile, JourneyConfig};
    pub use crate::locator::{LocatorChain, Predicate, ResolveOptions, Selector};
    pub use crate::navigation::UrlPattern;
    pub use crate::playback::{PlaybackOptions, PlaybackState};
    pub use crate::popups::DismissOptions;
    pub use crate::result::{PaseoError, PaseoResult};
    pub use crate::screens::{HomeScreen, PlayerScreen, SearchScreen};
    pub use crate::session::{ElementHandle, PageSession};
    pub use crate::stability::StabilityOptions;

    #[cfg(feature = "browser")]
    pub use crate::session::cdp::{Browser, BrowserConfig, CdpSession};
    pub use crate::session::fake::{FakeElement, FakeSession};
}
