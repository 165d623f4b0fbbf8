//! Error types for credentials and authenticated calls

use thiserror::Error;

use crate::api::ApiError;

/// Credential backend failure
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is malformed: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Failed to persist credentials: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Outcome of an authenticated call that did not succeed
#[derive(Debug, Error)]
pub enum CallError {
    /// No usable session: no token stored, refresh failed, or the call failed
    /// again right after a refresh. The user has to log in.
    #[error("Session expired, log in again")]
    MustReauthenticate,

    #[error(transparent)]
    Api(#[from] ApiError),
}
