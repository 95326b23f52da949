//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// The journey failed a required step
    #[error("Journey failed: {message}")]
    Journey {
        /// Error message
        message: String,
    },

    /// Paseo library error
    #[error("Paseo error: {0}")]
    Paseo(#[from] paseo::PaseoError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging setup error
    #[error("Logging setup failed: {message}")]
    Logging {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a journey failure
    #[must_use]
    pub fn journey(message: impl Into<String>) -> Self {
        Self::Journey {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journey_message() {
        let err = CliError::journey("no clickable search result found");
        assert!(err.to_string().contains("no clickable search result"));
    }

    #[test]
    fn test_paseo_conversion() {
        let err: CliError = paseo::PaseoError::LoadTimeout { ms: 12_000 }.into();
        assert!(matches!(err, CliError::Paseo(_)));
    }
}
