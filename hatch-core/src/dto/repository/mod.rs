//! Repository host DTOs

use serde::{Deserialize, Serialize};

/// Request to create a remote repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepo {
    pub name: String,
    pub description: Option<String>,
    pub private: bool,
    /// Owning organization; `None` creates it under the authenticated user
    pub owner: Option<String>,
}

/// A created remote repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatedRepo {
    pub full_name: Option<String>,
    pub clone_url: Option<String>,
    pub html_url: Option<String>,
}
