// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for Kehys
//!
//! Only the I/O edges of the pipeline produce errors: header retrieval,
//! configuration and report sinks. The analyzer, the frame probe and the
//! verdict synthesizer are total and never return `Err`.

use thiserror::Error;

/// Result type alias for Kehys operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Kehys
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Header retrieval for a target failed
    #[error("Failed to fetch headers for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Remote header service answered with an error
    #[error("Header service error: {message}")]
    HeaderService {
        status: Option<u16>,
        message: String,
    },

    /// Report generation error
    #[error("Report generation failed: {0}")]
    ReportGeneration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a header fetch error
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a header service error
    pub fn header_service(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::HeaderService {
            status,
            message: message.into(),
        }
    }

    /// Short message suitable for showing to the person running the test.
    ///
    /// The remote header service's own `error` text is shown verbatim.
    pub fn display_message(&self) -> String {
        match self {
            Error::HeaderService { message, .. } => message.clone(),
            Error::Fetch { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add URL context to error
    fn with_url(self, url: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Http(err) if err.is_timeout() => Error::fetch(url, "Request timed out"),
            Error::Http(err) => Error::fetch(url, err.to_string()),
            other => other,
        })
    }
}
