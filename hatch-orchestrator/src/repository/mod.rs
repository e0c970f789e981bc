//! Repository layer
//!
//! Ports to the external services the pipeline consumes. Each trait is the
//! request/response contract of one collaborator; the implementations next to
//! them talk to the real service through `hatch-client` or the local toolchain.
//!
//! All repositories are trait-based so the orchestrator can run against
//! substitutes in tests.

mod coolify;
mod github;
mod registrar;
mod settings;

// Re-export traits
pub use coolify::DeploymentPlatform;
pub use github::RepositoryHost;
pub use registrar::BotRegistrar;
pub use settings::SettingsProvider;

// Re-export implementations
pub use coolify::CoolifyPlatform;
pub use github::GitHubHost;
pub use registrar::UnconfiguredRegistrar;
pub use settings::{FileSettingsProvider, StaticSettings};
