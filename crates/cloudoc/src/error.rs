//! Error taxonomy for the client
//!
//! Callers need to tell "could not reach the service" apart from "the service
//! said no", so every failure lands in exactly one of these kinds and is never
//! re-wrapped into another on the way out.

use std::time::Duration;

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Service codes meaning the presented access token is missing, invalid or expired
const TOKEN_INVALID_CODES: [i64; 5] = [99_991_661, 99_991_663, 99_991_664, 99_991_668, 99_991_677];

/// The request never produced a response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Classifies a reqwest failure; `timeout` is the budget that was in force
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Failure reported by the service in its response envelope
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API error {code}: {msg}")]
pub struct ApiError {
    pub code: i64,
    pub msg: String,
    /// HTTP status the envelope arrived with
    pub http_status: u16,
}

impl ApiError {
    /// Returns true if the service rejected the access token itself
    pub fn is_token_invalid(&self) -> bool {
        TOKEN_INVALID_CODES.contains(&self.code)
    }
}

/// Failure to obtain an access token
///
/// Cloned out to every caller that was waiting on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Token request failed: {0}")]
    Transport(TransportError),
    #[error("Token request rejected ({code}): {msg}")]
    Rejected { code: i64, msg: String },
    #[error("Malformed token response: {0}")]
    Decode(String),
}

/// Errors returned by client operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Discriminant of [`Error`], for matching on the kind alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Credential,
    Api,
    Decode,
    InvalidRequest,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Credential(_) => ErrorKind::Credential,
            Self::Api(_) => ErrorKind::Api,
            Self::Decode(_) => ErrorKind::Decode,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Returns true if the service reported the access token as invalid or expired
    ///
    /// Callers that know their operation is safe to resend can invalidate the
    /// token and retry once when this is set.
    pub fn is_token_expired(&self) -> bool {
        matches!(self, Self::Api(api) if api.is_token_invalid())
    }

    /// Returns the API error code, if the service produced one
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api(api) => Some(api.code),
            _ => None,
        }
    }
}
