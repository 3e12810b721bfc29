//! API client for communicating with the records REST API.
//!
//! This module provides the `ApiClient` struct for obtaining tokens and for
//! making authenticated CRUD requests on behalf of the current session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{SessionManager, TokenValidator};

use super::resource::{FormBody, ImageUpload, Resource};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Token endpoint: POST obtains a token pair, GET validates a bearer token
const TOKEN_PATH: &str = "/api/token/";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Access and refresh token issued by the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// What to do with the session when a protected request comes back 401/403.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionPolicy {
    /// Demote the session to unauthenticated on a rejected request.
    pub demote_on_auth_rejected: bool,
}

/// API client for the records service.
/// Clone is cheap - reqwest::Client and the session are both shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionManager>,
    policy: RejectionPolicy,
}

impl ApiClient {
    /// Create a new API client for `base_url` acting on behalf of `session`
    pub fn new(base_url: &str, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, session, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        session: Arc<SessionManager>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            policy: RejectionPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RejectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Tokens =====

    /// Exchange a username and password for a token pair.
    ///
    /// This does not touch the session; pass the result to
    /// `SessionManager::login` to persist it.
    pub async fn obtain_tokens(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        debug!(username, "Requesting token pair");

        let response = self
            .client
            .post(self.url(TOKEN_PATH))
            .json(&TokenRequest { username, password })
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Self::parse_json(response).await
    }

    // ===== Authenticated requests =====

    /// Build a request carrying the current access token.
    ///
    /// Fails with `Unauthenticated` when no token is stored; nothing is sent.
    pub fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self
            .session
            .current_token()?
            .ok_or(ApiError::Unauthenticated)?;

        debug!(%method, path, "Building authenticated request");
        Ok(self.client.request(method, self.url(path)).bearer_auth(token))
    }

    /// Send an authenticated request and apply the rejection policy.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        match Self::check_status(response).await {
            Ok(response) => Ok(response),
            Err(e) => {
                if e.is_auth_rejected() {
                    warn!(error = %e, "Protected request rejected");
                    if self.policy.demote_on_auth_rejected {
                        self.session.demote();
                    }
                }
                Err(e)
            }
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().clone();
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{url}: {e}")))
    }

    async fn attach_body(request: RequestBuilder, body: FormBody) -> Result<RequestBuilder, ApiError> {
        match body {
            FormBody::Json(value) => Ok(request.json(&value)),
            FormBody::Multipart { fields, image } => {
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                if let Some(image) = image {
                    form = form.part("image", Self::image_part(&image).await?);
                }
                Ok(request.multipart(form))
            }
        }
    }

    async fn image_part(image: &ImageUpload) -> Result<multipart::Part, ApiError> {
        let upload_err = |source| ApiError::Upload {
            path: image.path().display().to_string(),
            source,
        };

        let bytes = tokio::fs::read(image.path()).await.map_err(upload_err)?;

        multipart::Part::bytes(bytes)
            .file_name(image.file_name())
            .mime_str(image.mime())
            .map_err(|_| {
                upload_err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid mime type '{}'", image.mime()),
                ))
            })
    }

    // ===== Resource CRUD =====

    /// Fetch every record of a collection
    pub async fn list<R: Resource>(&self) -> Result<Vec<R::Record>, ApiError> {
        let request = self.authorized(Method::GET, R::COLLECTION)?;
        let response = self.send(request).await?;
        Self::parse_json(response).await
    }

    /// Create a record, returning it as stored by the server
    pub async fn create<R: Resource>(&self, form: &R::Form) -> Result<R::Record, ApiError> {
        let request = self.authorized(Method::POST, R::COLLECTION)?;
        let request = Self::attach_body(request, R::encode(form)).await?;
        let response = self.send(request).await?;
        Self::parse_json(response).await
    }

    /// Replace a record, returning it as stored by the server
    pub async fn update<R: Resource>(&self, id: i64, form: &R::Form) -> Result<R::Record, ApiError> {
        let request = self.authorized(Method::PUT, &R::update_path(id))?;
        let request = Self::attach_body(request, R::encode(form)).await?;
        let response = self.send(request).await?;
        Self::parse_json(response).await
    }

    /// Delete a record. Any response body is ignored.
    pub async fn delete<R: Resource>(&self, id: i64) -> Result<(), ApiError> {
        let request = self.authorized(Method::DELETE, &R::delete_path(id))?;
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenValidator for ApiClient {
    async fn validate_token(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .get(self.url(TOKEN_PATH))
            .bearer_auth(token)
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
