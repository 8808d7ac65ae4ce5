//! # Error taxonomy
//!
//! Every fallible operation in the crate returns [`Result<T>`], whose error is
//! the [`Error`] enum below. Three variants carry the generation semantics:
//!
//! - [`Error::Authentication`]: the provider key is missing, blank or rejected.
//!   Fatal; the CLI prints remediation text.
//! - [`Error::Provider`]: network, quota or API failure. Surfaced as-is, never retried.
//! - [`Error::PartialParse`]: the model reply could not be fully parsed. Callers
//!   normally recover with [`PartialParseError::into_recovered`] and log a warning;
//!   the generator returns it only when nothing at all was recovered.
//!
//! The remaining variants cover configuration and filesystem plumbing.

use crate::idea::VideoIdea;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for TrendMine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// API key missing, blank, or rejected by the provider.
    #[error("authentication failed for {provider}: {message}")]
    Authentication { provider: String, message: String },

    /// The provider call failed (transport, rate limit, API error, empty reply).
    #[error("{provider} request failed: {message}")]
    Provider { provider: String, message: String },

    /// The model reply was only partly understood.
    #[error(transparent)]
    PartialParse(#[from] PartialParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// True for errors that should stop the program rather than skip one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Authentication { .. } | Error::Config(_))
    }
}

/// A model reply that was only partly parsed.
///
/// Carries every record that could be recovered (possibly none) and the
/// required fields that were missing from them.
#[derive(Debug, Clone, Error)]
#[error("partially parsed model response ({reason}): recovered {} record(s)", .recovered.len())]
pub struct PartialParseError {
    pub reason: String,
    pub recovered: Vec<VideoIdea>,
    pub missing_fields: Vec<String>,
    /// First few hundred characters of the raw reply, for logging.
    pub preview: String,
}

impl PartialParseError {
    pub fn into_recovered(self) -> Vec<VideoIdea> {
        self.recovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_is_fatal() {
        let err = Error::authentication("mistral", "MISTRAL_API_KEY is not set");
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "authentication failed for mistral: MISTRAL_API_KEY is not set"
        );
    }

    #[test]
    fn test_provider_is_not_fatal() {
        let err = Error::provider("gemini", "HTTP 429");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_partial_parse_message_counts_records() {
        let err = PartialParseError {
            reason: "invalid JSON".to_string(),
            recovered: vec![],
            missing_fields: vec!["title".to_string()],
            preview: String::new(),
        };
        assert!(err.to_string().contains("recovered 0 record(s)"));
        assert!(err.into_recovered().is_empty());
    }
}
