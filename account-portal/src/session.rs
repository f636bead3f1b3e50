//! In-memory sign-in state, kept in step with the browser extension.
//!
//! The extension handoff is best-effort: a login succeeds whether or not the
//! extension took the tokens, and a logout always clears local state.

use crate::models::{Credentials, OAuthCallback, RegisterData, User};
use crate::services::AccountClient;
use extension_bridge::{ExtensionBridge, LoginResponse};
use secrecy::{ExposeSecret, Secret};
use service_core::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Default)]
struct SessionState {
    user: Option<User>,
    access_token: Option<Secret<String>>,
    refresh_token: Option<Secret<String>>,
    /// Bumped whenever the session is replaced or cleared.
    generation: u64,
}

impl SessionState {
    fn replace(
        &mut self,
        access_token: Option<Secret<String>>,
        refresh_token: Option<Secret<String>>,
        user: Option<User>,
    ) {
        self.access_token = access_token;
        self.refresh_token = refresh_token;
        self.user = user;
        self.generation += 1;
    }

    /// Empty the session, returning what it held.
    fn clear(&mut self) -> SessionState {
        let generation = self.generation + 1;
        let previous = std::mem::take(self);
        self.generation = generation;
        previous
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// `None` only after an OAuth callback whose profile lookup failed.
    pub user: Option<User>,
    /// Whether the extension accepted the session.
    pub extension_synced: bool,
}

pub struct AuthSession {
    client: Arc<AccountClient>,
    bridge: ExtensionBridge,
    state: RwLock<SessionState>,
}

impl AuthSession {
    pub fn new(client: Arc<AccountClient>, bridge: ExtensionBridge) -> Self {
        Self {
            client,
            bridge,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Adopt tokens obtained elsewhere, e.g. from a previous run.
    pub async fn restore(
        &self,
        access_token: Option<Secret<String>>,
        refresh_token: Option<Secret<String>>,
        user: Option<User>,
    ) {
        self.state
            .write()
            .await
            .replace(access_token, refresh_token, user);
    }

    pub fn google_sign_in_url(&self) -> String {
        self.client.google_sign_in_url()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.access_token.is_some()
    }

    pub async fn access_token(&self) -> Option<Secret<String>> {
        self.state.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<Secret<String>> {
        self.state.read().await.refresh_token.clone()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AppError> {
        let auth = self.client.login(credentials).await?;
        info!(user_id = %auth.user.id, "User logged in successfully");

        self.establish(auth.access_token, auth.refresh_token, Some(auth.user))
            .await
    }

    pub async fn register(&self, data: &RegisterData) -> Result<LoginOutcome, AppError> {
        let auth = self.client.register(data).await?;
        info!(user_id = %auth.user.id, "User registered successfully");

        self.establish(auth.access_token, auth.refresh_token, Some(auth.user))
            .await
    }

    /// Finish a Google sign-in. The callback carries an access token only.
    pub async fn complete_oauth(&self, callback: OAuthCallback) -> Result<LoginOutcome, AppError> {
        if callback.error.is_some() {
            return Err(AppError::Unauthorized(
                "Google authentication failed. Please try again.".to_string(),
            ));
        }

        let token = match callback.token.filter(|t| !t.is_empty()) {
            Some(token) => Secret::new(token),
            None => {
                return Err(AppError::BadRequest(
                    "No access token received from authentication.".to_string(),
                ));
            }
        };

        let user = match self.client.oauth_profile(&token).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Could not fetch user profile");
                None
            }
        };

        self.establish(token, None, user).await
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// The pair is discarded if the session was replaced or logged out while
    /// the request was in flight.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let (refresh_token, generation) = {
            let state = self.state.read().await;
            let token = state
                .refresh_token
                .clone()
                .ok_or_else(|| AppError::Unauthorized("No refresh token".to_string()))?;
            (token, state.generation)
        };

        let pair = self.client.refresh(&refresh_token).await?;

        let mut state = self.state.write().await;
        if state.generation != generation {
            warn!("Session changed during token refresh; discarding new tokens");
            return Err(AppError::Unauthorized(
                "Session ended during token refresh".to_string(),
            ));
        }
        state.access_token = Some(pair.access_token);
        if pair.refresh_token.is_some() {
            state.refresh_token = pair.refresh_token;
        }
        info!("Access token refreshed");
        Ok(())
    }

    /// Clear local state, revoke server-side and tell the extension.
    ///
    /// Returns whether the extension acknowledged the logout.
    pub async fn logout(&self) -> bool {
        let state = self.state.write().await.clear();

        if let Some(access_token) = &state.access_token {
            match self
                .client
                .logout(access_token, state.refresh_token.as_ref())
                .await
            {
                Ok(()) => info!("Token revoked successfully"),
                Err(e) => tracing::error!("Failed to revoke token during logout: {}", e),
            }
        }

        self.bridge.handle_logout().await
    }

    async fn establish(
        &self,
        access_token: Secret<String>,
        refresh_token: Option<Secret<String>>,
        user: Option<User>,
    ) -> Result<LoginOutcome, AppError> {
        self.state.write().await.replace(
            Some(access_token.clone()),
            refresh_token.clone(),
            user.clone(),
        );

        let handoff = LoginResponse {
            access_token: Some(access_token.expose_secret().clone()),
            refresh_token: refresh_token.as_ref().map(|t| t.expose_secret().clone()),
            user: user.as_ref().map(serde_json::to_value).transpose()?,
        };
        let extension_synced = self.bridge.handle_successful_login(&handoff).await;

        Ok(LoginOutcome {
            user,
            extension_synced,
        })
    }
}
