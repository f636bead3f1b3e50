#![allow(dead_code)]

use async_trait::async_trait;
use extension_bridge::{
    BridgeMessage, BridgeSettings, ExtensionBridge, ExtensionId, RefreshTokenMode, Transport,
    TransportError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const TEST_EXTENSION_ID: &str = "fake-extension";

type Responder = dyn Fn(&BridgeMessage) -> Result<Option<Value>, TransportError> + Send + Sync;

/// Spy transport: records every message and answers through `responder`.
pub struct MockTransport {
    available: bool,
    silent: bool,
    responder: Box<Responder>,
    sent: Mutex<Vec<(ExtensionId, BridgeMessage)>>,
}

impl MockTransport {
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&BridgeMessage) -> Result<Option<Value>, TransportError> + Send + Sync + 'static,
    {
        Self {
            available: true,
            silent: false,
            responder: Box::new(responder),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Answers every message with the same reply.
    pub fn replying(reply: Value) -> Self {
        Self::with_responder(move |_| Ok(Some(reply.clone())))
    }

    /// Messaging works but nobody is listening.
    pub fn no_receiver() -> Self {
        Self::with_responder(|_| {
            Err(TransportError::NoReceiver(
                "Receiving end does not exist.".to_string(),
            ))
        })
    }

    /// No messaging facility at all.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::replying(json!({"success": true}))
        }
    }

    /// Accepts messages but never replies.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::replying(json!({"success": true}))
        }
    }

    pub fn sent(&self) -> Vec<BridgeMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn sent_kinds(&self) -> Vec<&'static str> {
        self.sent().iter().map(BridgeMessage::kind).collect()
    }

    pub fn targets(&self) -> Vec<ExtensionId> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn send(
        &self,
        target: &ExtensionId,
        message: &BridgeMessage,
    ) -> Result<Option<Value>, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), message.clone()));

        if self.silent {
            std::future::pending::<()>().await;
        }

        (self.responder)(message)
    }
}

pub fn settings(mode: RefreshTokenMode) -> BridgeSettings {
    BridgeSettings {
        extension_id: ExtensionId::new(TEST_EXTENSION_ID),
        refresh_token: mode,
        timeout_ms: 3_000,
        ..Default::default()
    }
}

pub fn bridge(transport: &Arc<MockTransport>) -> ExtensionBridge {
    bridge_with_mode(transport, RefreshTokenMode::Optional)
}

pub fn bridge_with_mode(transport: &Arc<MockTransport>, mode: RefreshTokenMode) -> ExtensionBridge {
    ExtensionBridge::new(&settings(mode), transport.clone())
}
