//! Wire types of the page ⇄ extension channel.
//!
//! Requests are JSON objects discriminated by `type`:
//!
//! ```text
//! { "type": "ping" }
//! { "type": "auth", "accessToken": "...", "refreshToken": "...", "user": { ... } }
//! { "type": "logout" }
//! ```
//!
//! and every reply is `{ "success": bool, "error"?: string }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Published id of the Quiz Solver extension in the Chrome Web Store.
pub const DEFAULT_EXTENSION_ID: &str = "ajdgfcjkghfponpmbikgecgdelokekae";

/// Address of the companion extension. Known in advance; there is no discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(String);

impl ExtensionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Chrome ids are 32 characters drawn from `a`..=`p`.
    pub fn looks_like_chrome_id(&self) -> bool {
        self.0.len() == 32 && self.0.bytes().all(|b| (b'a'..=b'p').contains(&b))
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BridgeMessage {
    Ping,
    #[serde(rename_all = "camelCase")]
    Auth {
        access_token: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        refresh_token: Option<String>,
        user: Value,
    },
    Logout,
}

impl BridgeMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeMessage::Ping => "ping",
            BridgeMessage::Auth { .. } => "auth",
            BridgeMessage::Logout => "logout",
        }
    }
}

// Tokens stay out of logs.
impl fmt::Debug for BridgeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeMessage::Ping => f.write_str("Ping"),
            BridgeMessage::Auth {
                refresh_token,
                user,
                ..
            } => f
                .debug_struct("Auth")
                .field("access_token", &"[REDACTED]")
                .field("refresh_token", &refresh_token.as_ref().map(|_| "[REDACTED]"))
                .field("user", user)
                .finish(),
            BridgeMessage::Logout => f.write_str("Logout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
