//! Credentials, the session built on them, and authenticated remote calls

pub mod caller;
pub mod credential_store;
mod errors;
pub mod session;

pub use caller::AuthenticatedCaller;
pub use credential_store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use errors::{CallError, CredentialError};
pub use session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, Session};
