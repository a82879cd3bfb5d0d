//! Error types for the DDNS updater
//!
//! Every fallible operation in the workspace returns [`Result`]. Provider
//! failures keep their HTTP meaning (authentication, not found, rate limit)
//! so the reconciler and tests can tell them apart without reading logs.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IP resolution failed for a family
    #[error("IP source error: {0}")]
    IpSource(String),

    /// No address family produced an address for a zone
    #[error("No IP addresses available for {0}")]
    NoAddress(String),

    /// Transport-level failure talking to a remote endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider rejected the API key (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Zone or record does not exist at the provider (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limiting errors (429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other provider-side failure
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors (config file, log file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a "no address" error for a domain
    pub fn no_address(domain: impl Into<String>) -> Self {
        Self::NoAddress(domain.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the provider refused the credentials
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Whether the zone or record was missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(Error::auth("bad key").is_auth());
        assert!(Error::not_found("zone 1").is_not_found());
        assert!(!Error::http("timeout").is_auth());
    }

    #[test]
    fn test_display() {
        let err = Error::provider("bunny", "boom");
        assert_eq!(err.to_string(), "Provider error (bunny): boom");
        assert_eq!(
            Error::no_address("example.com").to_string(),
            "No IP addresses available for example.com"
        );
    }
}
