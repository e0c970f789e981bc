//! Progress domain types

use serde::{Deserialize, Serialize};

use super::step::StepTag;

/// A single progress update
///
/// Transient: pushed to a sink while a run executes, never persisted and never
/// part of the returned result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Completion percentage in `0..=100`
    pub percent: u8,
    pub message: String,
    pub step: Option<StepTag>,
}

impl ProgressEvent {
    /// Creates an event, clamping `percent` to 100
    pub fn new(percent: u8, message: impl Into<String>, step: Option<StepTag>) -> Self {
        Self {
            percent: percent.min(100),
            message: message.into(),
            step,
        }
    }
}

/// Receiver for progress events
///
/// Collaborators report their own local `0..=100` progress through this trait;
/// the orchestrator hands them a sink that rescales into the caller's sink.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}
