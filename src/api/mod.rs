//! Remote saved-articles API
//!
//! Two seams: [`AuthApi`] issues and refreshes tokens, [`ArticlesApi`] is the
//! bearer-authenticated article collection. [`HttpApiClient`] implements both
//! over reqwest; tests substitute in-memory fakes.

mod client;
mod errors;
pub mod types;

use std::future::Future;

pub use client::{HttpApiClient, build_http_client};
pub use errors::ApiError;
pub use types::{LoginResponse, RemoteArticle, parse_server_date};

/// Token issuance
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for an access token (and usually a refresh token)
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// Exchange a refresh token for a new access token
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<String, ApiError>> + Send;
}

/// The authenticated article collection
pub trait ArticlesApi: Send + Sync {
    fn list_articles(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Vec<RemoteArticle>, ApiError>> + Send;

    fn create_article(
        &self,
        access_token: &str,
        url: &str,
        favorited: bool,
    ) -> impl Future<Output = Result<RemoteArticle, ApiError>> + Send;

    fn set_archived(
        &self,
        access_token: &str,
        id: i64,
        archived: bool,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_article(
        &self,
        access_token: &str,
        id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
