//! The host's cross-context messaging facility.
pub mod framing;
pub mod native;

use crate::error::TransportError;
use crate::messages::{BridgeMessage, ExtensionId};
use async_trait::async_trait;
use serde_json::Value;

/// One-shot request/response channel to an extension.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether the messaging facility exists in this environment at all.
    fn is_available(&self) -> bool;

    /// Deliver `message` to `target` and wait for its single reply.
    ///
    /// `Ok(None)` means the message was delivered but the receiver sent nothing back.
    async fn send(
        &self,
        target: &ExtensionId,
        message: &BridgeMessage,
    ) -> Result<Option<Value>, TransportError>;
}
