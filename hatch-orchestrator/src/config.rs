//! Runtime configuration
//!
//! Service endpoints, credentials and scaffolding settings, loaded from the
//! environment. Persisted per-user defaults (organization, Coolify identifiers)
//! live in the settings file read by [`FileSettingsProvider`] instead.

use std::path::PathBuf;
use std::time::Duration;

use crate::repository::FileSettingsProvider;

/// Default template generator invocation
///
/// `{template}` and `{name}` are substituted before the command runs.
pub const DEFAULT_SCAFFOLD_COMMAND: &str =
    "cargo generate {template} --name {name} --force --silent";

/// Runtime configuration
#[derive(Clone)]
pub struct Config {
    /// GitHub token used for repository creation and pushes
    pub github_token: Option<String>,

    /// GitHub API base URL
    pub github_api_url: String,

    /// Coolify instance URL (e.g., "https://coolify.example.com")
    pub coolify_url: Option<String>,

    /// Coolify API token
    pub coolify_token: Option<String>,

    /// Template identifier passed to the generator
    pub template: String,

    /// Generator command line, whitespace separated, with placeholders
    pub scaffold_command: String,

    /// Branch pushed to and deployed from
    pub branch: String,

    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,

    /// Coolify build pack for new applications
    pub build_pack: String,

    /// Ports exposed by new applications
    pub ports_exposes: String,

    /// Settings file location (default: `<config dir>/hatch/config.json`)
    pub settings_path: Option<PathBuf>,
}

impl Config {
    /// Creates a configuration with defaults and no credentials
    pub fn new() -> Self {
        Self {
            github_token: None,
            github_api_url: hatch_client::github::DEFAULT_API_URL.to_string(),
            coolify_url: None,
            coolify_token: None,
            template: "telegram-bot".to_string(),
            scaffold_command: DEFAULT_SCAFFOLD_COMMAND.to_string(),
            branch: "main".to_string(),
            http_timeout: Duration::from_secs(30),
            build_pack: "nixpacks".to_string(),
            ports_exposes: "3000".to_string(),
            settings_path: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - GITHUB_TOKEN
    /// - GITHUB_API_URL (default: https://api.github.com)
    /// - COOLIFY_URL
    /// - COOLIFY_TOKEN
    /// - HATCH_TEMPLATE (default: telegram-bot)
    /// - HATCH_SCAFFOLD_COMMAND (default: cargo generate)
    /// - HATCH_BRANCH (default: main)
    /// - HTTP_TIMEOUT (seconds, default: 30)
    /// - COOLIFY_BUILD_PACK (default: nixpacks)
    /// - COOLIFY_PORTS (default: 3000)
    /// - HATCH_CONFIG (settings file path)
    pub fn from_env() -> Self {
        let defaults = Self::new();

        let http_timeout = std::env::var("HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            github_token: non_empty_var("GITHUB_TOKEN"),
            github_api_url: non_empty_var("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            coolify_url: non_empty_var("COOLIFY_URL"),
            coolify_token: non_empty_var("COOLIFY_TOKEN"),
            template: non_empty_var("HATCH_TEMPLATE").unwrap_or(defaults.template),
            scaffold_command: non_empty_var("HATCH_SCAFFOLD_COMMAND")
                .unwrap_or(defaults.scaffold_command),
            branch: non_empty_var("HATCH_BRANCH").unwrap_or(defaults.branch),
            http_timeout,
            build_pack: non_empty_var("COOLIFY_BUILD_PACK").unwrap_or(defaults.build_pack),
            ports_exposes: non_empty_var("COOLIFY_PORTS").unwrap_or(defaults.ports_exposes),
            settings_path: non_empty_var("HATCH_CONFIG").map(PathBuf::from),
        }
    }

    /// Validates the configuration
    ///
    /// Missing credentials are not an error here: the step that needs them
    /// reports "not configured" when it runs.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_http_url(&self.github_api_url) {
            anyhow::bail!("github_api_url must start with http:// or https://");
        }

        if let Some(url) = &self.coolify_url
            && !is_http_url(url)
        {
            anyhow::bail!("coolify_url must start with http:// or https://");
        }

        if self.template.trim().is_empty() {
            anyhow::bail!("template cannot be empty");
        }

        if self.scaffold_command.split_whitespace().next().is_none() {
            anyhow::bail!("scaffold_command cannot be empty");
        }

        if self.branch.trim().is_empty() {
            anyhow::bail!("branch cannot be empty");
        }

        if self.http_timeout.as_secs() == 0 {
            anyhow::bail!("http_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Settings file provider for the configured or default location
    pub fn settings_provider(&self) -> anyhow::Result<FileSettingsProvider> {
        match &self.settings_path {
            Some(path) => Ok(FileSettingsProvider::new(path)),
            None => Ok(FileSettingsProvider::new(FileSettingsProvider::default_path()?)),
        }
    }

    /// Builds the shared HTTP client with the configured timeout
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "<set>"))
            .field("github_api_url", &self.github_api_url)
            .field("coolify_url", &self.coolify_url)
            .field("coolify_token", &self.coolify_token.as_ref().map(|_| "<set>"))
            .field("template", &self.template)
            .field("scaffold_command", &self.scaffold_command)
            .field("branch", &self.branch)
            .field("http_timeout", &self.http_timeout)
            .field("build_pack", &self.build_pack)
            .field("ports_exposes", &self.ports_exposes)
            .field("settings_path", &self.settings_path)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.branch, "main");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert!(config.github_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.coolify_url = Some("coolify.local".to_string());
        assert!(config.validate().is_err());

        config.coolify_url = Some("https://coolify.local".to_string());
        assert!(config.validate().is_ok());

        config.scaffold_command = "   ".to_string();
        assert!(config.validate().is_err());

        config.scaffold_command = DEFAULT_SCAFFOLD_COMMAND.to_string();
        config.http_timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_settings_path() {
        let mut config = Config::default();
        config.settings_path = Some(PathBuf::from("/tmp/hatch-test/config.json"));

        let provider = config.settings_provider().unwrap();
        assert_eq!(provider.path(), std::path::Path::new("/tmp/hatch-test/config.json"));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let mut config = Config::default();
        config.github_token = Some("ghp_secret".to_string());
        config.coolify_token = Some("coolify_secret".to_string());

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("ghp_secret"));
        assert!(!rendered.contains("coolify_secret"));
    }
}
