//! Bearer-authenticated calls with a single transparent token refresh

use std::future::Future;
use std::sync::Arc;

use super::credential_store::CredentialStore;
use super::errors::CallError;
use super::session::Session;
use crate::api::{ApiError, AuthApi};

/// How much refreshing this call has done so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryBudget {
    Fresh,
    Refreshed,
}

/// Runs remote operations with the session's access token
///
/// When an operation reports an expired credential, the caller refreshes the
/// access token once and retries the operation once. The budget lives in each
/// `call`, so concurrent calls never consume each other's retry.
#[derive(Debug)]
pub struct AuthenticatedCaller<A, S> {
    api: Arc<A>,
    session: Session<S>,
}

impl<A, S> Clone for AuthenticatedCaller<A, S> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: self.session.clone(),
        }
    }
}

impl<A: AuthApi, S: CredentialStore> AuthenticatedCaller<A, S> {
    pub fn new(api: Arc<A>, session: Session<S>) -> Self {
        Self { api, session }
    }

    /// The API the operations run against
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Run `op` with the current access token, refreshing at most once
    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T, CallError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let Some(mut token) = self.session.access_token() else {
            log::debug!("No access token stored");
            return Err(CallError::MustReauthenticate);
        };
        let mut budget = RetryBudget::Fresh;

        loop {
            match (op(token).await, budget) {
                (Ok(value), _) => return Ok(value),
                (Err(ApiError::CredentialExpired), RetryBudget::Fresh) => {
                    token = self.refresh_access_token().await?;
                    budget = RetryBudget::Refreshed;
                }
                (Err(e), RetryBudget::Refreshed) => {
                    log::warn!("Call failed after token refresh: {e}");
                    return Err(CallError::MustReauthenticate);
                }
                (Err(e), RetryBudget::Fresh) => return Err(CallError::Api(e)),
            }
        }
    }

    async fn refresh_access_token(&self) -> Result<String, CallError> {
        let Some(refresh_token) = self.session.refresh_token() else {
            log::info!("Access token expired and no refresh token is stored");
            return Err(CallError::MustReauthenticate);
        };

        match self.api.refresh(&refresh_token).await {
            Ok(token) => {
                if let Err(e) = self.session.set_access_token(&token) {
                    log::warn!("Failed to store refreshed access token: {e}");
                }
                Ok(token)
            }
            Err(e) => {
                log::warn!("Token refresh failed: {e}");
                Err(CallError::MustReauthenticate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LoginResponse;
    use crate::auth::MemoryCredentialStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Refresh endpoint that hands out `fresh-N` tokens, or always fails
    #[derive(Default)]
    struct FakeAuth {
        refreshes: AtomicUsize,
        fail: bool,
    }

    impl AuthApi for FakeAuth {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
            Ok(LoginResponse {
                token: "login".to_string(),
                refresh_token: None,
            })
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<String, ApiError> {
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                Err(ApiError::Status {
                    endpoint: "auth/refresh".to_string(),
                    status: 500,
                })
            } else {
                Ok(format!("fresh-{n}"))
            }
        }
    }

    fn caller(
        auth: FakeAuth,
        access: Option<&str>,
        refresh: Option<&str>,
    ) -> AuthenticatedCaller<FakeAuth, MemoryCredentialStore> {
        let session = Session::new(Arc::new(MemoryCredentialStore::new()));
        if let Some(access) = access {
            session.store_tokens(access, refresh).expect("store tokens");
        }
        AuthenticatedCaller::new(Arc::new(auth), session)
    }

    #[tokio::test]
    async fn no_token_means_reauthenticate_without_calling() {
        let caller = caller(FakeAuth::default(), None, None);
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = caller
            .call(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert!(matches!(result, Err(CallError::MustReauthenticate)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_retried_once() {
        let caller = caller(FakeAuth::default(), Some("stale"), Some("r"));
        let seen = parking_lot::Mutex::new(Vec::new());
        let result = caller
            .call(|token| {
                seen.lock().push(token.clone());
                async move {
                    if token == "stale" {
                        Err(ApiError::CredentialExpired)
                    } else {
                        Ok(token)
                    }
                }
            })
            .await;
        assert_eq!(result.expect("retry succeeds"), "fresh-1");
        assert_eq!(*seen.lock(), vec!["stale".to_string(), "fresh-1".to_string()]);
        assert_eq!(caller.session().access_token().as_deref(), Some("fresh-1"));
    }

    #[tokio::test]
    async fn at_most_one_refresh_per_call() {
        let caller = caller(FakeAuth::default(), Some("stale"), Some("r"));
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = caller
            .call(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::CredentialExpired) }
            })
            .await;
        assert!(matches!(result, Err(CallError::MustReauthenticate)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(caller.api().refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_means_reauthenticate() {
        let auth = FakeAuth {
            fail: true,
            ..FakeAuth::default()
        };
        let caller = caller(auth, Some("stale"), Some("r"));
        let result: Result<(), _> = caller
            .call(|_| async { Err(ApiError::CredentialExpired) })
            .await;
        assert!(matches!(result, Err(CallError::MustReauthenticate)));
        assert_eq!(caller.session().access_token().as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn missing_refresh_token_means_reauthenticate() {
        let caller = caller(FakeAuth::default(), Some("stale"), None);
        let result: Result<(), _> = caller
            .call(|_| async { Err(ApiError::CredentialExpired) })
            .await;
        assert!(matches!(result, Err(CallError::MustReauthenticate)));
        assert_eq!(caller.api().refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn other_errors_pass_through_without_refresh() {
        let caller = caller(FakeAuth::default(), Some("ok"), Some("r"));
        let result: Result<(), _> = caller
            .call(|_| async {
                Err(ApiError::Status {
                    endpoint: "articles".to_string(),
                    status: 503,
                })
            })
            .await;
        assert!(matches!(
            result,
            Err(CallError::Api(ApiError::Status { status: 503, .. }))
        ));
        assert_eq!(caller.api().refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_calls_each_get_their_own_budget() {
        let caller = caller(FakeAuth::default(), Some("stale"), Some("r"));
        let op = |token: String| async move {
            if token == "stale" {
                Err(ApiError::CredentialExpired)
            } else {
                Ok(())
            }
        };
        let (a, b) = tokio::join!(caller.call(op), caller.call(op));
        assert!(a.is_ok());
        assert!(b.is_ok());
    }
}
