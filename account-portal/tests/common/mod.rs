#![allow(dead_code)]

use account_portal::config::ApiSettings;
use account_portal::services::AccountClient;
use account_portal::AuthSession;
use async_trait::async_trait;
use extension_bridge::{
    BridgeMessage, BridgeSettings, ExtensionBridge, ExtensionId, Transport, TransportError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// Stand-in for the extension: answers every message with `reply`.
pub struct FakeExtension {
    reply: Option<Value>,
    sent: Mutex<Vec<BridgeMessage>>,
}

impl FakeExtension {
    pub fn accepting() -> Self {
        Self {
            reply: Some(json!({"success": true})),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// No extension installed: every send fails on the channel.
    pub fn absent() -> Self {
        Self {
            reply: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<BridgeMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_kinds(&self) -> Vec<&'static str> {
        self.sent().iter().map(BridgeMessage::kind).collect()
    }
}

#[async_trait]
impl Transport for FakeExtension {
    fn is_available(&self) -> bool {
        true
    }

    async fn send(
        &self,
        _target: &ExtensionId,
        message: &BridgeMessage,
    ) -> Result<Option<Value>, TransportError> {
        self.sent.lock().unwrap().push(message.clone());
        match &self.reply {
            Some(reply) => Ok(Some(reply.clone())),
            None => Err(TransportError::NoReceiver(
                "Receiving end does not exist.".to_string(),
            )),
        }
    }
}

pub fn api_settings(server: &MockServer) -> ApiSettings {
    ApiSettings {
        base_url: server.uri(),
        timeout_secs: 5,
    }
}

pub fn account_client(server: &MockServer) -> Arc<AccountClient> {
    Arc::new(AccountClient::new(api_settings(server)).expect("Failed to build account client"))
}

pub fn session(server: &MockServer, extension: &Arc<FakeExtension>) -> AuthSession {
    session_with_settings(server, extension, BridgeSettings::default())
}

pub fn session_with_settings(
    server: &MockServer,
    extension: &Arc<FakeExtension>,
    settings: BridgeSettings,
) -> AuthSession {
    let bridge = ExtensionBridge::new(&settings, extension.clone());
    AuthSession::new(account_client(server), bridge)
}

pub fn user_json() -> Value {
    json!({
        "id": "u1",
        "firstName": "Jane",
        "lastName": "Doe",
        "email": "jane@example.com",
        "role": "user"
    })
}

pub fn auth_body() -> Value {
    json!({
        "accessToken": "access-1",
        "refreshToken": "refresh-1",
        "user": user_json()
    })
}
