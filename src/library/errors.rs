//! Error types for library operations

use thiserror::Error;
use uuid::Uuid;

use crate::api::ApiError;
use crate::auth::CredentialError;
use crate::snapshot::CaptureError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("No saved page with id {0}")]
    NotFound(Uuid),

    #[error("No saved page matches {0:?}")]
    UnknownKey(String),

    #[error("{key:?} matches {count} saved pages, use a longer prefix")]
    AmbiguousKey { key: String, count: usize },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
