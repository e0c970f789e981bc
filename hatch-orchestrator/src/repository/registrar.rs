//! Bot registration repository
//!
//! Session-based access to the messaging platform's bot registration flow.

use async_trait::async_trait;
use hatch_core::domain::progress::ProgressSink;
use hatch_core::dto::bot::{CreateBot, RegisteredBot};
use hatch_core::error::RegistrationError;

/// Repository trait for registering bots with the messaging platform
#[async_trait]
pub trait BotRegistrar: Send + Sync {
    /// Opens a session with the platform
    ///
    /// Fails with `NotConfigured` when no account is available.
    async fn init(&self) -> Result<(), RegistrationError>;

    /// Registers a new bot
    ///
    /// # Arguments
    /// * `request` - Display name and optional description
    /// * `progress` - Sink for local `0..=100` progress
    async fn create_bot(
        &self,
        request: &CreateBot,
        progress: &dyn ProgressSink,
    ) -> Result<RegisteredBot, RegistrationError>;

    /// Closes the session opened by `init`
    async fn disconnect(&self) -> Result<(), RegistrationError>;
}

/// Registrar used when no messaging-platform account is set up
///
/// Every run that reaches registration without a pre-supplied token fails
/// with a "not configured" error pointing at `--bot-token`.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredRegistrar;

impl UnconfiguredRegistrar {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BotRegistrar for UnconfiguredRegistrar {
    async fn init(&self) -> Result<(), RegistrationError> {
        Err(RegistrationError::NotConfigured(
            "no account session available, pass an existing bot token or skip registration"
                .to_string(),
        ))
    }

    async fn create_bot(
        &self,
        _request: &CreateBot,
        _progress: &dyn ProgressSink,
    ) -> Result<RegisteredBot, RegistrationError> {
        Err(RegistrationError::Session("session not initialized".to_string()))
    }

    async fn disconnect(&self) -> Result<(), RegistrationError> {
        Ok(())
    }
}
