//! Hatch Orchestrator
//!
//! Provisions a Telegram bot end to end: registration, project scaffolding,
//! GitHub repository creation and Coolify deployment.
//!
//! Architecture:
//! - Configuration: runtime settings from the environment
//! - Repositories: ports to the external services (registration, GitHub, Coolify, settings)
//! - Services: local work (template generation, progress normalization)
//! - Pipeline: the orchestrator owning step order and failure policy
//! - Tools: tool-call adapter for AI agents

pub mod config;
pub mod git;
pub mod pipeline;
pub mod repository;
pub mod service;
pub mod tools;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{Collaborators, Orchestrator};
pub use service::{ProgressPlan, Slice};
