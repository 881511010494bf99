//! Error type definitions.
//!
//! Collaborator-layer failures are typed with `thiserror`; the run level
//! wraps them with `anyhow` context (the failing cell's coordinate) rather
//! than inventing a wider domain taxonomy.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The API credential environment variable is unset or empty.
    #[error("Missing API key: set the {0} environment variable (a .env file works too)")]
    MissingApiKey(&'static str),
}

/// Error types for a nearby search request. All of these are fatal to the
/// traversal; there is no retry policy beyond the fixed inter-page delay.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS) or a body that did
    /// not decode as the expected JSON envelope.
    #[error("Request failed: {0}")]
    Transport(#[from] ReqwestError),

    /// The API answered but reported a non-success envelope status
    /// (REQUEST_DENIED, OVER_QUERY_LIMIT, INVALID_REQUEST, ...).
    /// `detail` carries the server's error message, prefixed with `": "`,
    /// or is empty when the envelope had none.
    #[error("API returned {status}{detail}")]
    Api { status: String, detail: String },
}
