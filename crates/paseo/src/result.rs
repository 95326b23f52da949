//! Result and error types for Paseo.

use thiserror::Error;

/// Result type for Paseo operations
pub type PaseoResult<T> = Result<T, PaseoError>;

/// Errors that can occur in Paseo
#[derive(Debug, Error)]
pub enum PaseoError {
    /// No candidate in a locator chain produced an element
    #[error("No element found for role '{role}'")]
    ElementNotFound {
        /// Logical role of the chain (e.g. "search input")
        role: String,
        /// Last candidate's captured error, or [`PaseoError::ChainExhausted`]
        /// when the chain had no candidates
        #[source]
        source: Box<PaseoError>,
    },

    /// Synthetic cause for an empty locator chain
    #[error("Locator chain for role '{role}' has no candidates")]
    ChainExhausted {
        /// Logical role of the chain
        role: String,
    },

    /// A candidate's element never satisfied its predicate in time
    #[error("Candidate '{selector}' did not become {predicate} within {ms}ms")]
    CandidateTimeout {
        /// Selector expression of the candidate
        selector: String,
        /// Predicate that was required
        predicate: String,
        /// Per-candidate timeout in milliseconds
        ms: u64,
    },

    /// Neither the player chain nor the header fallback became visible
    #[error("Page did not finish loading within {ms}ms")]
    LoadTimeout {
        /// Total timeout in milliseconds
        ms: u64,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Page script evaluation error
    #[error("Page script failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// The page re-rendered and a held element handle went stale
    #[error("Element handle {handle} is stale")]
    StaleHandle {
        /// Registry id of the handle
        handle: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Session-level error (browser connection, protocol)
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PaseoError {
    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a page-script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }
}
