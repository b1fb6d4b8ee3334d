//! HTTP transport for the pantry backend
//!
//! Thin reqwest wrapper: bearer auth, JSON bodies, and unwrapping of the
//! `ApiResponse` envelope every endpoint replies with.

use crate::{ClientError, ClientResult};
use http::{Method, StatusCode};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::response::ApiResponse;

/// HTTP client for the pantry REST API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Build a client from configuration
    pub fn new(config: &crate::ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the bearer token (session layer rotates it)
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut req = self.client.request(method, url);
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        req
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.request(Method::POST, path).send().await?;
        Self::handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::PUT, path)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// DELETE returning no payload
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::handle_unit_response(response).await
    }

    /// POST returning no payload
    pub async fn post_unit<B: Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<()> {
        let response = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await?;
        Self::handle_unit_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, text));
        }
        let envelope: ApiResponse<T> = response.json().await?;
        envelope.into_data().map_err(ClientError::Api)
    }

    async fn handle_unit_response(response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, text));
        }
        // Void endpoints still carry the envelope; only `success` matters
        let envelope: ApiResponse<serde_json::Value> = response.json().await?;
        if envelope.success {
            Ok(())
        } else {
            Err(ClientError::Api(
                envelope.error.unwrap_or_else(|| "unknown server error".to_string()),
            ))
        }
    }

    fn map_status(status: StatusCode, body: String) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(body),
            StatusCode::NOT_FOUND => ClientError::NotFound(body),
            StatusCode::BAD_REQUEST => ClientError::Validation(body),
            _ => ClientError::Internal(body),
        }
    }
}
