use crate::config::Settings;
use crate::services::AccountClient;
use crate::session::AuthSession;
use extension_bridge::{ExtensionBridge, NativeMessagingTransport, TracingNotifier, Transport};
use service_core::error::AppError;
use std::sync::Arc;

/// Bridge over the configured native-messaging relay, reporting to the log.
pub fn build_bridge(settings: &Settings) -> ExtensionBridge {
    let transport = Arc::new(NativeMessagingTransport::from_settings(
        &settings.bridge.native_host,
    ));

    if !transport.is_available() {
        tracing::debug!(
            command = ?settings.bridge.native_host.command,
            "Native messaging relay not found; extension handoff disabled"
        );
    }

    ExtensionBridge::new(&settings.bridge, transport).with_notifier(Arc::new(TracingNotifier))
}

pub fn build_account_client(settings: &Settings) -> Result<Arc<AccountClient>, AppError> {
    Ok(Arc::new(AccountClient::new(settings.api.clone())?))
}

pub fn build_session(settings: &Settings) -> Result<AuthSession, AppError> {
    Ok(AuthSession::new(
        build_account_client(settings)?,
        build_bridge(settings),
    ))
}
