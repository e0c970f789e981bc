//! Service layer
//!
//! Local work the pipeline performs itself rather than delegating to a remote
//! service: project generation and progress normalization.

mod progress;
mod scaffold;

// Re-export traits
pub use scaffold::Scaffolder;

// Re-export implementations
pub use progress::{Phase, ProgressPlan, ProgressTracker, Slice, StepProgress};
pub use scaffold::{CommandScaffolder, ScaffoldRequest};
