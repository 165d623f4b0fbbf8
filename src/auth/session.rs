//! The two-token session kept in a credential store

use std::sync::Arc;

use super::credential_store::CredentialStore;
use super::errors::CredentialError;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Access + refresh token pair
///
/// Read failures of the backing store are logged and treated as "no token",
/// which sends the caller down the re-authentication path.
#[derive(Debug)]
pub struct Session<S> {
    store: Arc<S>,
}

impl<S> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CredentialStore> Session<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn is_signed_in(&self) -> bool {
        self.access_token().is_some()
    }

    /// Store a fresh login; a missing refresh token clears any old one
    pub fn store_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), CredentialError> {
        self.store.save(ACCESS_TOKEN_KEY, access)?;
        match refresh {
            Some(refresh) => self.store.save(REFRESH_TOKEN_KEY, refresh),
            None => self.store.delete(REFRESH_TOKEN_KEY),
        }
    }

    pub fn set_access_token(&self, access: &str) -> Result<(), CredentialError> {
        self.store.save(ACCESS_TOKEN_KEY, access)
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        self.store.delete(ACCESS_TOKEN_KEY)?;
        self.store.delete(REFRESH_TOKEN_KEY)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.read(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                log::warn!("Failed to read {key} from credential store: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;

    #[test]
    fn login_without_refresh_token_drops_stale_one() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(Arc::clone(&store));

        session.store_tokens("a1", Some("r1")).expect("store");
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));

        session.store_tokens("a2", None).expect("store");
        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token(), None);

        session.clear().expect("clear");
        assert!(!session.is_signed_in());
    }
}
