use crate::config::{BridgeSettings, RefreshTokenMode};
use crate::error::BridgeError;
use crate::messages::{BridgeMessage, BridgeResponse, ExtensionId};
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const AUTH_SUCCESS_NOTICE: &str = "Quiz Solver extension authenticated successfully!";
const LOGOUT_SUCCESS_NOTICE: &str = "Logged out from Quiz Solver extension";

/// Body of a successful login as returned by the account API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<Value>,
}

/// Relays sign-in and sign-out to the companion extension.
///
/// Stateless between calls: reachability is probed with a `ping` before every
/// delivery, and every failure collapses to `false`.
#[derive(Clone)]
pub struct ExtensionBridge {
    extension_id: ExtensionId,
    refresh_mode: RefreshTokenMode,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl ExtensionBridge {
    pub fn new(settings: &BridgeSettings, transport: Arc<dyn Transport>) -> Self {
        if !settings.extension_id.looks_like_chrome_id() {
            warn!(
                extension_id = %settings.extension_id,
                "Configured extension id does not look like a Chrome extension id"
            );
        }

        Self {
            extension_id: settings.extension_id.clone(),
            refresh_mode: settings.refresh_token,
            timeout: settings.timeout(),
            transport,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn extension_id(&self) -> &ExtensionId {
        &self.extension_id
    }

    pub fn refresh_mode(&self) -> RefreshTokenMode {
        self.refresh_mode
    }

    /// Whether the extension is installed and answering. Never fails.
    pub async fn is_installed(&self) -> bool {
        match self.probe().await {
            Ok(()) => true,
            Err(e) => {
                debug!(
                    extension_id = %self.extension_id,
                    error = %e,
                    "Extension not installed or not responding"
                );
                false
            }
        }
    }

    /// Hand the session tokens to the extension. `true` only if it accepted them.
    ///
    /// Nothing is sent when the access token is empty, when the user record
    /// serialises to `null`, or, in required mode, when the refresh token is missing.
    pub async fn send_auth<U>(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        user: &U,
    ) -> bool
    where
        U: Serialize + ?Sized,
    {
        let message = match self.auth_message(access_token, refresh_token, user) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, "SendAuthToExtension: refusing to send");
                return false;
            }
        };

        match self.deliver(&message).await {
            Ok(()) => {
                info!("Authentication sent to extension successfully");
                self.notify(NotificationKind::Success, AUTH_SUCCESS_NOTICE);
                true
            }
            Err(e) => {
                self.report_failure(&message, &e);
                false
            }
        }
    }

    /// Tell the extension to drop its copy of the session.
    pub async fn send_logout(&self) -> bool {
        let message = BridgeMessage::Logout;

        match self.deliver(&message).await {
            Ok(()) => {
                info!("Logout sent to extension successfully");
                self.notify(NotificationKind::Info, LOGOUT_SUCCESS_NOTICE);
                true
            }
            Err(e) => {
                self.report_failure(&message, &e);
                false
            }
        }
    }

    /// Forward a fresh login to the extension, if it carries everything required.
    pub async fn handle_successful_login(&self, response: &LoginResponse) -> bool {
        let access_token = response.access_token.as_deref().unwrap_or_default();
        let refresh_token = response.refresh_token.as_deref().filter(|t| !t.is_empty());

        let complete = !access_token.is_empty()
            && response.user.is_some()
            && (self.refresh_mode == RefreshTokenMode::Optional || refresh_token.is_some());
        if !complete {
            debug!("Login response incomplete; skipping extension handoff");
            return false;
        }

        let user = response.user.as_ref().unwrap_or(&Value::Null);
        let success = self.send_auth(access_token, refresh_token, user).await;
        if success {
            info!("Extension authentication successful");
        } else {
            info!("Extension authentication failed or extension not installed");
        }
        success
    }

    pub async fn handle_logout(&self) -> bool {
        let success = self.send_logout().await;
        if success {
            info!("Extension logout successful");
        } else {
            info!("Extension logout failed or extension not installed");
        }
        success
    }

    fn auth_message<U>(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        user: &U,
    ) -> Result<BridgeMessage, BridgeError>
    where
        U: Serialize + ?Sized,
    {
        if access_token.is_empty() {
            return Err(BridgeError::Precondition("missing access token"));
        }

        let refresh_token = refresh_token.filter(|t| !t.is_empty());
        if self.refresh_mode == RefreshTokenMode::Required && refresh_token.is_none() {
            return Err(BridgeError::Precondition("missing refresh token"));
        }

        let user = serde_json::to_value(user)
            .map_err(|_| BridgeError::Precondition("user is not serialisable"))?;
        if user.is_null() {
            return Err(BridgeError::Precondition("missing user"));
        }

        Ok(BridgeMessage::Auth {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            user,
        })
    }

    async fn probe(&self) -> Result<(), BridgeError> {
        if !self.transport.is_available() {
            return Err(BridgeError::Unavailable);
        }
        self.round_trip(&BridgeMessage::Ping).await.map(|_| ())
    }

    async fn deliver(&self, message: &BridgeMessage) -> Result<(), BridgeError> {
        self.probe().await?;

        let raw = self
            .round_trip(message)
            .await?
            .ok_or_else(|| BridgeError::Protocol("no response".to_string()))?;
        let response: BridgeResponse =
            serde_json::from_value(raw).map_err(|e| BridgeError::Protocol(e.to_string()))?;

        if response.success {
            Ok(())
        } else {
            Err(BridgeError::Rejected {
                kind: message.kind(),
                reason: response.error.unwrap_or_else(|| "Unknown error".to_string()),
            })
        }
    }

    async fn round_trip(&self, message: &BridgeMessage) -> Result<Option<Value>, BridgeError> {
        debug!(
            extension_id = %self.extension_id,
            kind = message.kind(),
            "Sending message to extension"
        );

        match tokio::time::timeout(
            self.timeout,
            self.transport.send(&self.extension_id, message),
        )
        .await
        {
            Ok(result) => Ok(result?),
            Err(_) => Err(BridgeError::Timeout(self.timeout)),
        }
    }

    fn report_failure(&self, message: &BridgeMessage, e: &BridgeError) {
        match e {
            e if e.is_not_installed() => info!("Quiz Solver extension is not installed"),
            BridgeError::Rejected { reason, .. } => {
                error!(kind = message.kind(), reason = %reason, "Extension rejected message");
                self.notify(NotificationKind::Error, reason.clone());
            }
            e => error!(kind = message.kind(), error = %e, "Failed to send message to extension"),
        }
    }

    fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(&Notification::new(kind, message));
        }
    }
}
