//! The API client wrapper.
//!
//! Every call goes through [`ApiClient::request`]:
//! 1. Attach `Authorization: Bearer <access>` when a token is stored.
//! 2. On 401 with a token attached (and the endpoint is not the refresh
//!    endpoint itself), run the refresh sub-protocol once and retry the
//!    original request exactly once.
//! 3. A second 401 clears the pair and surfaces `AuthRequired`.
//!
//! The refresh endpoint exemption means a 401 from `/auth/refresh` can
//! never trigger another refresh, so there is no loop to break.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiError, ApiResult};
use crate::config::ClientConfig;
use crate::session::{SessionStore, TokenPair};

/// The one endpoint exempt from refresh-and-retry.
const REFRESH_PATH: &str = "/auth/refresh";

/// Fallback when the server body carries no `error`/`message` field.
const GENERIC_FAILURE: &str = "API request failed";

/// HTTP client bound to a base URL and a session store.
///
/// Cheap to clone; clones share the connection pool and the store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, store: Arc<SessionStore>) -> ApiResult<Self> {
        let base = url::Url::parse(&config.api_base_url)
            .map_err(|e| ApiError::Network(format!("invalid base URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            store,
        })
    }

    /// The session store this client mutates on refresh and auth failure.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// POST with no body (e.g. logout).
    pub async fn post_empty(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::POST, path, None).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::DELETE, path, None).await
    }

    /// Issue one logical API call with the full retry discipline.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let token = self.store.access_token();
        let response = self
            .send(method.clone(), path, body, token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && token.is_some()
            && path != REFRESH_PATH
        {
            if self.try_refresh().await {
                let retried = self
                    .send(method, path, body, self.store.access_token().as_deref())
                    .await?;
                if retried.status() == StatusCode::UNAUTHORIZED {
                    self.store.clear()?;
                    return Err(ApiError::AuthRequired);
                }
                return unwrap_response(retried).await;
            }
            // Refresh failed: the pair is dead, remove it whole.
            self.store.clear()?;
            return Err(ApiError::AuthRequired);
        }

        unwrap_response(response).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(json) = body {
            req = req.json(json);
        }
        req.send().await.map_err(|e| ApiError::Network(e.to_string()))
    }

    /// Refresh sub-protocol: `POST /auth/refresh` with the refresh token
    /// as the bearer credential. On success the new access token is
    /// stored alongside the existing refresh token (the backend does not
    /// rotate it). Reports failure without an error return; the caller
    /// owns the decision to clear the pair.
    async fn try_refresh(&self) -> bool {
        let Some(pair) = self.store.load() else {
            return false;
        };
        let Some(refresh) = pair.refresh.clone() else {
            return false;
        };

        let response = match self.send(Method::POST, REFRESH_PATH, None, Some(&refresh)).await {
            Ok(r) => r,
            Err(e) => {
                warn!("token refresh failed: {e}");
                return false;
            }
        };
        if !response.status().is_success() {
            warn!(status = %response.status(), "token refresh rejected");
            return false;
        }

        let json: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("token refresh returned unreadable body: {e}");
                return false;
            }
        };
        let Some(access) = json.get("access_token").and_then(Value::as_str) else {
            warn!("token refresh response missing access_token");
            return false;
        };

        let renewed = TokenPair {
            access: access.to_string(),
            refresh: pair.refresh,
        };
        if let Err(e) = self.store.save(&renewed) {
            warn!("failed to persist refreshed token: {e}");
            return false;
        }
        debug!("access token refreshed");
        true
    }
}

/// Unwrap a response into its JSON body, mapping non-2xx statuses to
/// `RequestFailed` with the server-supplied message when present.
async fn unwrap_response(response: reqwest::Response) -> ApiResult<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let body: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::Null)
    };

    if status.is_success() {
        return Ok(body);
    }

    let message = body
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .unwrap_or(GENERIC_FAILURE)
        .to_string();
    Err(ApiError::RequestFailed {
        status: status.as_u16(),
        message,
    })
}
