//! Errors raised while talking to the listings endpoint.

use std::fmt;

use crate::error::HomesError;

use super::AsHttpError;

/// A failed request to the listings endpoint.
///
/// Keeps the HTTP status (when there was a response) so the retry loop can
/// tell transient failures from permanent ones.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if a response was received
    pub status: Option<reqwest::StatusCode>,
    /// Retry-After header value in seconds, if present
    pub retry_after: Option<u64>,
    /// Human-readable error message
    pub message: String,
    /// Whether the failure happened before a response arrived
    pub connection_failure: bool,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            retry_after: None,
            message: message.into(),
            connection_failure: false,
        }
    }

    pub fn with_status(message: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            status: Some(status),
            ..Self::new(message)
        }
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Convert into the crate error, mapping rate limits to their own variant.
    pub fn to_homes_error(&self) -> HomesError {
        if let Some(wait) = self.get_retry_after() {
            return HomesError::RateLimited(wait.as_secs());
        }
        HomesError::Api(format!("listings API error: {}", self.message))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl AsHttpError for ApiError {
    fn as_http_error(&self) -> Option<(reqwest::StatusCode, Option<u64>)> {
        self.status.map(|s| (s, self.retry_after))
    }

    fn is_transient(&self) -> bool {
        match self.status {
            Some(status) => status.is_server_error(),
            None => self.connection_failure,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status(),
            retry_after: None,
            connection_failure: err.is_timeout() || err.is_connect() || err.is_request(),
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for HomesError {
    fn from(error: ApiError) -> Self {
        error.to_homes_error()
    }
}
