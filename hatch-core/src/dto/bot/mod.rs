//! Bot registration DTOs

use serde::{Deserialize, Serialize};

/// Request to register a new bot with the messaging platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBot {
    pub name: String,
    pub description: Option<String>,
}

/// A freshly registered bot
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisteredBot {
    /// Bot API credential
    pub token: String,
    /// Bot handle, without the leading `@`
    pub username: String,
}

impl std::fmt::Debug for RegisteredBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredBot")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}
