use crate::messages::{ExtensionId, DEFAULT_EXTENSION_ID};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Whether an auth handoff must carry a refresh token.
///
/// Password logins always have one; token-only OAuth callbacks don't.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTokenMode {
    #[default]
    Optional,
    Required,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeSettings {
    #[serde(default = "default_extension_id")]
    pub extension_id: ExtensionId,
    #[serde(default)]
    pub refresh_token: RefreshTokenMode,
    /// Upper bound on each round trip (ping, auth, logout).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub native_host: NativeHostSettings,
}

/// Relay process that forwards native-messaging frames to the extension.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeHostSettings {
    pub command: Option<PathBuf>,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_extension_id() -> ExtensionId {
    ExtensionId::new(DEFAULT_EXTENSION_ID)
}

fn default_timeout_ms() -> u64 {
    4_000
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            extension_id: default_extension_id(),
            refresh_token: RefreshTokenMode::default(),
            timeout_ms: default_timeout_ms(),
            native_host: NativeHostSettings::default(),
        }
    }
}

impl BridgeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
