//! HTTP implementation of the backend gateway

use crate::api::gateway::ApiGateway;
use crate::api::models::{
    AdminStats, ErrorBody, MessageResponse, ProfileResponse, ProfileUpdate, RecordPatch,
    StudentDraft, StudentRecord,
};
use crate::auth::models::{Identity, LoginRequest, LoginResponse, RegisterRequest};
use crate::auth::session::TokenStore;
use crate::core::config::ApiConfig;
use crate::core::error::{PortalError, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Header carrying the per-request trace id
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Gateway backed by a reqwest client against a fixed origin
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| PortalError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(client, &config.base_url, tokens)
    }

    pub fn with_client(client: Client, base_url: &str, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PortalError::ConfigError(format!("Invalid base_url {}: {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PortalError::ConfigError(format!("Invalid request path {}: {}", path, e)))
    }

    /// `/api/admin/users/{id}` with the id escaped as a single path segment
    fn record_url(&self, id: &str) -> Result<Url> {
        let mut url = self.url("/api/admin/users")?;
        url.path_segments_mut()
            .map_err(|_| PortalError::ConfigError(format!("base_url {} cannot hold a path", self.base_url)))?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, path: &str, authenticated: bool) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        self.request_to(method, url, authenticated)
    }

    /// Build a request, attaching the bearer token when `authenticated`
    fn request_to(&self, method: Method, url: Url, authenticated: bool) -> Result<RequestBuilder> {
        let path = url.path().to_string();
        let mut builder = self.client.request(method, url);

        if authenticated {
            match self.tokens.load()? {
                Some(token) => {
                    builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
                }
                None => {
                    tracing::debug!(path = %path, "No token stored, sending request without credentials");
                }
            }
        }

        Ok(builder)
    }

    /// Send a request and turn non-success statuses into rejections
    async fn send(&self, builder: RequestBuilder, method: &Method, path: &str) -> Result<Response> {
        let trace_id = Uuid::new_v4().to_string();
        let started = std::time::Instant::now();

        let response = builder
            .header(TRACE_ID_HEADER, trace_id.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(trace_id = %trace_id, method = %method, path = %path, error = %e, "Request failed");
                PortalError::from(e)
            })?;

        let status = response.status();
        tracing::debug!(
            trace_id = %trace_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        tracing::warn!(
            trace_id = %trace_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "Request rejected"
        );

        Err(PortalError::rejected(status, message))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(PortalError::from)?;
        serde_json::from_slice(&bytes).map_err(PortalError::from)
    }

    /// Read an optional acknowledgement message; bodies that are empty or
    /// not JSON are fine
    async fn acknowledge(response: Response) -> Option<String> {
        let bytes = response.bytes().await.ok()?;
        serde_json::from_slice::<MessageResponse>(&bytes)
            .ok()
            .and_then(|m| m.message)
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let path = "/api/auth/login";
        let builder = self.request(Method::POST, path, false)?.json(request);
        let response = self.send(builder, &Method::POST, path).await?;
        Self::json(response).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let path = "/api/auth/register";
        let builder = self.request(Method::POST, path, false)?.json(request);
        let response = self.send(builder, &Method::POST, path).await?;
        if let Some(message) = Self::acknowledge(response).await {
            tracing::info!(message = %message, "Registration acknowledged");
        }
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<AdminStats> {
        let path = "/api/admin/stats";
        let builder = self.request(Method::GET, path, true)?;
        let response = self.send(builder, &Method::GET, path).await?;
        Self::json(response).await
    }

    async fn list_records(&self) -> Result<Vec<StudentRecord>> {
        let path = "/api/admin/users";
        let builder = self.request(Method::GET, path, true)?;
        let response = self.send(builder, &Method::GET, path).await?;
        Self::json(response).await
    }

    async fn create_record(&self, draft: &StudentDraft) -> Result<()> {
        let path = "/api/admin/users";
        let builder = self.request(Method::POST, path, true)?.json(draft);
        let response = self.send(builder, &Method::POST, path).await?;
        Self::acknowledge(response).await;
        Ok(())
    }

    async fn update_record(&self, id: &str, patch: &RecordPatch) -> Result<()> {
        let url = self.record_url(id)?;
        let path = url.path().to_string();
        let builder = self.request_to(Method::PUT, url, true)?.json(patch);
        let response = self.send(builder, &Method::PUT, &path).await?;
        Self::acknowledge(response).await;
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        let url = self.record_url(id)?;
        let path = url.path().to_string();
        let builder = self.request_to(Method::DELETE, url, true)?;
        let response = self.send(builder, &Method::DELETE, &path).await?;
        Self::acknowledge(response).await;
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Identity> {
        let path = "/api/users/profile";
        let builder = self.request(Method::PUT, path, true)?.json(update);
        let response = self.send(builder, &Method::PUT, path).await?;
        let body: ProfileResponse = Self::json(response).await?;
        Ok(body.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::MemoryTokenStore;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::with_client(Client::new(), base, Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[test]
    fn test_urls_join_against_origin() {
        let gw = gateway("http://localhost:5000");
        assert_eq!(
            gw.url("/api/admin/users").unwrap().as_str(),
            "http://localhost:5000/api/admin/users"
        );
    }

    #[test]
    fn test_record_ids_are_escaped() {
        let gw = gateway("http://localhost:5000");
        assert_eq!(gw.record_url("abc123").unwrap().path(), "/api/admin/users/abc123");
        assert_eq!(gw.record_url("a/b c").unwrap().path(), "/api/admin/users/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let result = HttpGateway::with_client(
            Client::new(),
            "not a url",
            Arc::new(MemoryTokenStore::new()),
        );
        assert!(matches!(result, Err(PortalError::ConfigError(_))));
    }

    #[test]
    fn test_bearer_header_attached() {
        let tokens = Arc::new(MemoryTokenStore::with_token("T"));
        let gw = HttpGateway::with_client(Client::new(), "http://localhost:5000", tokens).unwrap();

        let request = gw
            .request(Method::GET, "/api/admin/users", true)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer T");

        let request = gw
            .request(Method::POST, "/api/auth/login", false)
            .unwrap()
            .build()
            .unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }
}
