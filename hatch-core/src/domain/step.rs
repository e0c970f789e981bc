//! Step domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four ordered phases of a provisioning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    Registration,
    Scaffolding,
    Repository,
    Deployment,
}

impl Step {
    /// All steps in execution order
    pub const ALL: [Step; 4] = [
        Step::Registration,
        Step::Scaffolding,
        Step::Repository,
        Step::Deployment,
    ];

    /// Tag used to prefix progress messages emitted by this step
    pub fn tag(self) -> StepTag {
        match self {
            Step::Registration => StepTag::Telegram,
            Step::Scaffolding => StepTag::Scaffold,
            Step::Repository => StepTag::GitHub,
            Step::Deployment => StepTag::Coolify,
        }
    }

    /// State the pipeline is in while this step executes
    pub fn state(self) -> PipelineState {
        match self {
            Step::Registration => PipelineState::Registering,
            Step::Scaffolding => PipelineState::Scaffolding,
            Step::Repository => PipelineState::Publishing,
            Step::Deployment => PipelineState::Deploying,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Registration => write!(f, "registration"),
            Step::Scaffolding => write!(f, "scaffolding"),
            Step::Repository => write!(f, "repository"),
            Step::Deployment => write!(f, "deployment"),
        }
    }
}

/// Service tag attached to progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepTag {
    Telegram,
    Scaffold,
    GitHub,
    Coolify,
}

impl fmt::Display for StepTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepTag::Telegram => write!(f, "[Telegram]"),
            StepTag::Scaffold => write!(f, "[Scaffold]"),
            StepTag::GitHub => write!(f, "[GitHub]"),
            StepTag::Coolify => write!(f, "[Coolify]"),
        }
    }
}

/// Pipeline lifecycle
///
/// `Idle → Registering → Scaffolding → Publishing → Deploying → {Completed | Failed}`.
/// There is no backward edge and no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Registering,
    Scaffolding,
    Publishing,
    Deploying,
    Completed,
    Failed,
}

impl PipelineState {
    /// Whether this state ends the run
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Failed)
    }

    /// Checks whether moving from `self` to `next` is a forward transition
    ///
    /// Skipped steps are allowed (e.g. `Scaffolding → Completed`), but a terminal
    /// state never advances and no state moves backwards.
    pub fn can_advance_to(self, next: PipelineState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            PipelineState::Idle => false,
            PipelineState::Completed | PipelineState::Failed => true,
            _ => next > self,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Registering => "registering",
            PipelineState::Scaffolding => "scaffolding",
            PipelineState::Publishing => "publishing",
            PipelineState::Deploying => "deploying",
            PipelineState::Completed => "completed",
            PipelineState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(PipelineState::Idle.can_advance_to(PipelineState::Registering));
        assert!(PipelineState::Idle.can_advance_to(PipelineState::Scaffolding));
        assert!(PipelineState::Scaffolding.can_advance_to(PipelineState::Deploying));
        assert!(PipelineState::Publishing.can_advance_to(PipelineState::Failed));
        assert!(PipelineState::Deploying.can_advance_to(PipelineState::Completed));
    }

    #[test]
    fn test_no_backward_or_terminal_transitions() {
        assert!(!PipelineState::Deploying.can_advance_to(PipelineState::Scaffolding));
        assert!(!PipelineState::Scaffolding.can_advance_to(PipelineState::Scaffolding));
        assert!(!PipelineState::Failed.can_advance_to(PipelineState::Deploying));
        assert!(!PipelineState::Completed.can_advance_to(PipelineState::Failed));
        assert!(!PipelineState::Registering.can_advance_to(PipelineState::Idle));
    }

    #[test]
    fn test_step_tags() {
        assert_eq!(Step::Repository.tag().to_string(), "[GitHub]");
        assert_eq!(Step::Registration.tag().to_string(), "[Telegram]");
        assert_eq!(Step::Deployment.state(), PipelineState::Deploying);
    }
}
