//! reqwest implementation of the articles API

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::errors::ApiError;
use super::types::{
    ArchivePayload, ArticlesEnvelope, CreateArticlePayload, LoginRequest, LoginResponse,
    RefreshRequest, RefreshResponse, RemoteArticle,
};
use super::{ArticlesApi, AuthApi};
use crate::config::StashConfig;

/// Shared HTTP client; timeouts are applied per request
pub fn build_http_client(config: &StashConfig) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(config.user_agent())
        .connect_timeout(config.request_timeout())
        .build()
}

/// HTTP client for the saved-articles service
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
    timeout: std::time::Duration,
}

impl HttpApiClient {
    #[must_use]
    pub fn new(client: Client, config: &StashConfig) -> Self {
        Self {
            client,
            base_url: config.api_base_url().clone(),
            timeout: config.request_timeout(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url.join(endpoint)?;
        Ok(self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .header("Accept", "application/json"))
    }

    fn authorized(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self.request(method, endpoint)?.bearer_auth(access_token))
    }
}

/// Map 401 and other non-2xx statuses to `ApiError`
fn check_status(response: Response, endpoint: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::CredentialExpired);
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

impl AuthApi for HttpApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .request(Method::POST, "auth/login")?
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Login rejected with HTTP {status}");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
            });
        }
        decode_json(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response = self
            .request(Method::POST, "auth/refresh")?
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let response = check_status(response, "auth/refresh")?;
        let refreshed: RefreshResponse = decode_json(response).await?;
        log::debug!("Access token refreshed");
        Ok(refreshed.token)
    }
}

impl ArticlesApi for HttpApiClient {
    async fn list_articles(&self, access_token: &str) -> Result<Vec<RemoteArticle>, ApiError> {
        let response = self
            .authorized(Method::GET, "articles", access_token)?
            .send()
            .await?;
        let response = check_status(response, "articles")?;
        let envelope: ArticlesEnvelope = decode_json(response).await?;
        Ok(envelope.items)
    }

    async fn create_article(
        &self,
        access_token: &str,
        url: &str,
        favorited: bool,
    ) -> Result<RemoteArticle, ApiError> {
        let response = self
            .authorized(Method::POST, "articles", access_token)?
            .json(&CreateArticlePayload { url, favorited })
            .send()
            .await?;
        let response = check_status(response, "articles")?;
        decode_json(response).await
    }

    async fn set_archived(&self, access_token: &str, id: i64, archived: bool) -> Result<(), ApiError> {
        let endpoint = format!("articles/{id}");
        let response = self
            .authorized(Method::PATCH, &endpoint, access_token)?
            .json(&ArchivePayload { archived })
            .send()
            .await?;
        check_status(response, &endpoint)?;
        Ok(())
    }

    async fn delete_article(&self, access_token: &str, id: i64) -> Result<(), ApiError> {
        let endpoint = format!("articles/{id}");
        let response = self
            .authorized(Method::DELETE, &endpoint, access_token)?
            .send()
            .await?;
        check_status(response, &endpoint)?;
        Ok(())
    }
}
