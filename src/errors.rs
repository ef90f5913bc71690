//! Error types for discheck.

use thiserror::Error;

/// Errors that can occur while loading the IP list or checking a domain.
#[derive(Debug, Error)]
pub enum Error {
    /// The IP list could not be fetched or read.
    #[error("failed to load the IP list from {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    /// No IP list has been loaded, so no check can run.
    #[error("the IP list is not loaded, reload it and try again")]
    IpListUnavailable,

    /// Blank input.
    #[error("please enter a link or a domain")]
    InvalidInput,

    /// Nothing usable was left after extracting the domain.
    #[error("the link or domain is not valid")]
    InvalidDomain,

    /// No provider returned an address for the domain.
    #[error("could not resolve {0}, please try again")]
    Resolution(String),

    /// A single DoH query failed. Recovered by the resolver.
    #[error("query to {provider} failed: {reason}")]
    Query { provider: String, reason: String },

    /// A provider answered with a body that is not DoH JSON. The whole
    /// provider is skipped.
    #[error("{provider} sent an unreadable answer: {reason}")]
    Decode { provider: String, reason: String },

    /// The history file could not be read or written.
    #[error("history store error: {0}")]
    History(String),

    /// IO error (files, stdin)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::Load {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn query(provider: impl Into<String>, reason: impl ToString) -> Self {
        Error::Query {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode(provider: impl Into<String>, reason: impl ToString) -> Self {
        Error::Decode {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
