//! Transport through a native-messaging relay process.
//!
//! The relay is spawned once per message. It receives a single envelope frame
//! on stdin:
//!
//! ```text
//! { "extensionId": "<id>", "message": { "type": "ping" } }
//! ```
//!
//! and answers with a single frame on stdout, either
//! `{ "response": <extension reply or null> }` or `{ "lastError": "<reason>" }`
//! when the extension could not be reached.

use super::framing::{read_frame, write_frame, MAX_INBOUND_FRAME};
use super::Transport;
use crate::config::NativeHostSettings;
use crate::error::TransportError;
use crate::messages::{BridgeMessage, ExtensionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    extension_id: &'a str,
    message: &'a BridgeMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayReply {
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    last_error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NativeMessagingTransport {
    command: Option<PathBuf>,
    args: Vec<String>,
}

impl NativeMessagingTransport {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: Some(command.into()),
            args: Vec::new(),
        }
    }

    pub fn from_settings(settings: &NativeHostSettings) -> Self {
        Self {
            command: settings.command.clone(),
            args: settings.args.clone(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The relay executable, if configured and present on disk or on `PATH`.
    pub fn resolve_command(&self) -> Option<PathBuf> {
        let command = self.command.as_deref()?;

        if command.as_os_str().is_empty() {
            return None;
        }

        if command.components().count() > 1 || command.is_absolute() {
            return command.is_file().then(|| command.to_path_buf());
        }

        search_path(command)
    }
}

fn search_path(program: &Path) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Write one envelope, close the write side, read one reply.
async fn exchange<W, R>(
    mut writer: W,
    mut reader: R,
    envelope: &Envelope<'_>,
) -> Result<Option<RelayReply>, TransportError>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    write_frame(&mut writer, envelope).await?;
    drop(writer);

    match read_frame(&mut reader, MAX_INBOUND_FRAME).await? {
        Some(frame) => Ok(Some(serde_json::from_value(frame)?)),
        None => Ok(None),
    }
}

fn into_response(reply: RelayReply) -> Result<Option<Value>, TransportError> {
    match reply.last_error {
        Some(reason) => Err(TransportError::NoReceiver(reason)),
        None => Ok(reply.response.filter(|v| !v.is_null())),
    }
}

#[async_trait]
impl Transport for NativeMessagingTransport {
    fn is_available(&self) -> bool {
        self.resolve_command().is_some()
    }

    async fn send(
        &self,
        target: &ExtensionId,
        message: &BridgeMessage,
    ) -> Result<Option<Value>, TransportError> {
        let program = self.resolve_command().ok_or(TransportError::Unavailable)?;

        let mut child = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::NoReceiver("relay stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::NoReceiver("relay stdout not captured".to_string()))?;

        let envelope = Envelope {
            extension_id: target.as_str(),
            message,
        };
        let reply = exchange(stdin, stdout, &envelope).await;
        let status = child.wait().await?;

        tracing::debug!(
            relay = %program.display(),
            kind = message.kind(),
            exit_status = %status,
            "Native messaging relay finished"
        );

        match reply? {
            Some(reply) => into_response(reply),
            None if !status.success() => Err(TransportError::NoReceiver(format!(
                "relay exited with {}",
                status
            ))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn relay_roundtrip(reply: Value) -> (Value, Result<Option<Value>, TransportError>) {
        let (host_out, mut relay_in) = tokio::io::duplex(1024);
        let (mut relay_out, host_in) = tokio::io::duplex(1024);

        let relay = tokio::spawn(async move {
            let received = read_frame(&mut relay_in, MAX_INBOUND_FRAME)
                .await
                .unwrap()
                .unwrap();
            write_frame(&mut relay_out, &reply).await.unwrap();
            received
        });

        let message = BridgeMessage::Logout;
        let envelope = Envelope {
            extension_id: "fake-extension",
            message: &message,
        };
        let result = exchange(host_out, host_in, &envelope)
            .await
            .and_then(|reply| match reply {
                Some(reply) => into_response(reply),
                None => Ok(None),
            });

        (relay.await.unwrap(), result)
    }

    #[tokio::test]
    async fn test_envelope_and_response() {
        let (received, result) = relay_roundtrip(json!({"response": {"success": true}})).await;

        assert_eq!(
            received,
            json!({"extensionId": "fake-extension", "message": {"type": "logout"}})
        );
        assert_eq!(result.unwrap(), Some(json!({"success": true})));
    }

    #[tokio::test]
    async fn test_last_error_is_no_receiver() {
        let (_, result) = relay_roundtrip(json!({
            "lastError": "Could not establish connection. Receiving end does not exist."
        }))
        .await;

        assert!(matches!(result, Err(TransportError::NoReceiver(_))));
    }

    #[tokio::test]
    async fn test_null_response_is_none() {
        let (_, result) = relay_roundtrip(json!({"response": null})).await;
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_unconfigured_is_unavailable() {
        assert!(!NativeMessagingTransport::default().is_available());
        assert!(!NativeMessagingTransport::new("").is_available());
    }

    #[test]
    fn test_missing_relay_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let transport = NativeMessagingTransport::new(dir.path().join("quiz-relay"));
        assert!(!transport.is_available());
    }

    #[test]
    fn test_existing_relay_is_available() {
        let dir = tempfile::tempdir().unwrap();
        let relay = dir.path().join("quiz-relay");
        std::fs::write(&relay, "#!/bin/sh\n").unwrap();

        let transport = NativeMessagingTransport::new(&relay).with_args(["--quiet"]);
        assert_eq!(transport.resolve_command(), Some(relay));
    }

    #[tokio::test]
    async fn test_send_without_relay_fails_fast() {
        let transport = NativeMessagingTransport::default();
        let result = transport
            .send(&ExtensionId::new("fake-extension"), &BridgeMessage::Ping)
            .await;
        assert!(matches!(result, Err(TransportError::Unavailable)));
    }
}
