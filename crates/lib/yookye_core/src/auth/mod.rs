//! Auth session manager.
//!
//! Login/register/logout/profile flows on top of the resilient client.
//! Token persistence happens before control returns to the caller, so
//! any subsequent call is already authenticated. "Authenticated" is
//! derived from token presence; the server profile endpoint is the
//! authority on whether the session is actually alive.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiResult};
use crate::models::auth::{NewUser, ProfileUpdate, TokenResponse, User};
use crate::session::claims::{self, TokenClaims};
use crate::session::{SessionStore, TokenPair};

/// Envelope around profile responses (`{"user": {...}}`).
#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

pub struct AuthManager {
    api: ApiClient,
}

impl AuthManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn store(&self) -> &Arc<SessionStore> {
        self.api.store()
    }

    /// Authenticate with email + password. Both tokens are persisted
    /// before this returns.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let body = json!({ "email": email, "password": password });
        let value = self.api.post("/auth/login", &body).await?;
        self.adopt_tokens(value)
    }

    /// Create an account. The backend logs the new user straight in, so
    /// the token pair is persisted exactly as for login.
    pub async fn register(&self, new_user: &NewUser) -> ApiResult<User> {
        let body = serde_json::to_value(new_user)?;
        let value = self.api.post("/auth/register", &body).await?;
        self.adopt_tokens(value)
    }

    /// Best-effort server notification; the local session is cleared no
    /// matter what the server said.
    pub async fn logout(&self) -> ApiResult<()> {
        if let Err(e) = self.api.post_empty("/auth/logout").await {
            warn!("server logout failed, clearing local session anyway: {e}");
        }
        self.store().clear()?;
        info!("logged out");
        Ok(())
    }

    /// Fetch the current user. Doubles as a token-validity probe: any
    /// failure clears the pair, exactly like an explicit logout, so a
    /// dead token can never linger.
    pub async fn profile(&self) -> ApiResult<User> {
        match self.api.get("/auth/profile").await {
            Ok(value) => Ok(serde_json::from_value::<UserEnvelope>(value)?.user),
            Err(e) => {
                self.store().clear()?;
                Err(e)
            }
        }
    }

    /// Update mutable profile fields; returns the server's view of the
    /// user afterwards.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        let body = serde_json::to_value(update)?;
        let value = self.api.put("/auth/profile", &body).await?;
        Ok(serde_json::from_value::<UserEnvelope>(value)?.user)
    }

    /// Startup reconciliation: a persisted access token is only trusted
    /// after one successful profile fetch. On failure the pair is
    /// cleared and the logged-out state is reported — never a
    /// token-present/profile-unknown limbo.
    pub async fn restore_session(&self) -> Option<User> {
        if !self.store().is_authenticated() {
            return None;
        }
        match self.profile().await {
            Ok(user) => {
                debug!(user_id = %user.id, "session restored");
                Some(user)
            }
            Err(e) => {
                // profile() already cleared the pair.
                info!("persisted session rejected, starting logged out: {e}");
                None
            }
        }
    }

    /// Token presence only — see [`AuthManager::restore_session`] for the
    /// server-verified answer.
    pub fn is_authenticated(&self) -> bool {
        self.store().is_authenticated()
    }

    /// Unverified claims from the stored access token, for display only.
    pub fn current_claims(&self) -> Option<TokenClaims> {
        let token = self.store().access_token()?;
        claims::decode_unverified(&token)
    }

    fn adopt_tokens(&self, value: serde_json::Value) -> ApiResult<User> {
        let response: TokenResponse = serde_json::from_value(value)?;
        let pair = TokenPair {
            access: response.access_token,
            refresh: response.refresh_token,
        };
        self.store().save(&pair)?;
        Ok(response.user)
    }
}
