//! Hatch HTTP Clients
//!
//! Small, type-safe HTTP clients for the two REST services the provisioning
//! pipeline talks to:
//! - GitHub: authenticated user lookup and repository creation
//! - Coolify: application creation, environment variables and deployments
//!
//! # Example
//!
//! ```no_run
//! use hatch_client::{GitHubClient, github::NewRepository};
//!
//! #[tokio::main]
//! async fn main() -> hatch_client::Result<()> {
//!     let client = GitHubClient::new("ghp_example");
//!     let user = client.current_user().await?;
//!
//!     let repo = client
//!         .create_repo(None, &NewRepository {
//!             name: "demo-bot".to_string(),
//!             description: None,
//!             private: true,
//!             auto_init: false,
//!         })
//!         .await?;
//!
//!     println!("{} created {:?}", user.login, repo.clone_url);
//!     Ok(())
//! }
//! ```

pub mod coolify;
pub mod error;
pub mod github;

// Re-export commonly used types
pub use coolify::CoolifyClient;
pub use error::{ClientError, Result};
pub use github::GitHubClient;

use serde::de::DeserializeOwned;

// =============================================================================
// Response Handlers
// =============================================================================

/// Handle an API response and deserialize JSON
///
/// Checks the status code and returns an appropriate error if the request
/// failed, or deserializes the response body if successful.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(
            status.as_u16(),
            extract_error_message(&error_text),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Handle an API response whose body is not needed
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(
            status.as_u16(),
            extract_error_message(&error_text),
        ));
    }

    Ok(())
}

/// Pull the `message` field out of a JSON error body, falling back to the raw text
///
/// Both GitHub and Coolify report failures as `{"message": "..."}`.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Strip a trailing slash so paths can be appended with `format!`
pub(crate) fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}
