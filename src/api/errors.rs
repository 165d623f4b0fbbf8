//! Error types for the remote articles API

use thiserror::Error;

/// Failure of a single remote API call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401; the access token needs refreshing
    #[error("Access token expired or was revoked")]
    CredentialExpired,

    /// Login was refused
    #[error("Login rejected with HTTP {status}")]
    Rejected { status: u16 },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl ApiError {
    /// True when a token refresh could make the call succeed
    #[must_use]
    pub fn is_credential_expired(&self) -> bool {
        matches!(self, Self::CredentialExpired)
    }
}
