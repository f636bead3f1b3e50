//! Handoff of website sessions to the Quiz Solver browser extension.
//!
//! Every operation is best-effort: an absent, disabled or misbehaving
//! extension shows up as `false`, never as an error, so the host's own
//! login and logout flows are never blocked by it.
pub mod bridge;
pub mod config;
pub mod error;
pub mod messages;
pub mod notify;
pub mod transport;

pub use bridge::{ExtensionBridge, LoginResponse};
pub use config::{BridgeSettings, NativeHostSettings, RefreshTokenMode};
pub use error::{BridgeError, TransportError};
pub use messages::{BridgeMessage, BridgeResponse, ExtensionId, DEFAULT_EXTENSION_ID};
pub use notify::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use transport::{native::NativeMessagingTransport, Transport};
