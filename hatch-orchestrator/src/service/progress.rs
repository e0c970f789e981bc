//! Progress normalization
//!
//! Each collaborator reports its own `0..=100` progress and restarts from zero
//! at the start of its step. The tracker owns a partition of the overall range
//! across the four steps, rescales local percentages into the active step's
//! slice and forwards them to the caller's sink with the step tag prefixed.
//!
//! Forwarded percentages never decrease within one run.

use anyhow::Result;
use hatch_core::domain::progress::{ProgressEvent, ProgressSink};
use hatch_core::domain::step::{Step, StepTag};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Sub-range of the overall scale assigned to one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: u8,
    pub end: u8,
}

impl Slice {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Linearly maps a local percentage into this slice
    pub fn scale(&self, local: u8) -> u8 {
        let local = u16::from(local.min(100));
        let span = u16::from(self.end - self.start);
        (u16::from(self.start) + span * local / 100) as u8
    }
}

/// Partition of `0..=100` across the pipeline steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPlan {
    slices: [Slice; 4],
}

impl ProgressPlan {
    /// Builds a plan from slices in step order
    ///
    /// Slices must be non-empty-or-point ranges, ordered without overlap, and
    /// the last one must end at 100 so a successful run can finish at 100.
    pub fn new(slices: [Slice; 4]) -> Result<Self> {
        let mut previous_end: Option<u8> = None;
        for (step, slice) in Step::ALL.iter().zip(slices.iter()) {
            if slice.start > slice.end {
                anyhow::bail!("{} slice starts after it ends", step);
            }
            if slice.end > 100 {
                anyhow::bail!("{} slice ends past 100", step);
            }
            if let Some(end) = previous_end
                && slice.start < end
            {
                anyhow::bail!("{} slice overlaps the previous step", step);
            }
            previous_end = Some(slice.end);
        }

        if slices[3].end != 100 {
            anyhow::bail!("the last slice must end at 100");
        }

        Ok(Self { slices })
    }

    /// Slice assigned to a step
    pub fn slice(&self, step: Step) -> Slice {
        match step {
            Step::Registration => self.slices[0],
            Step::Scaffolding => self.slices[1],
            Step::Repository => self.slices[2],
            Step::Deployment => self.slices[3],
        }
    }
}

impl Default for ProgressPlan {
    /// registration 0–25, scaffolding 26–50, repository 51–75, deployment 76–100
    fn default() -> Self {
        Self {
            slices: [
                Slice::new(0, 25),
                Slice::new(26, 50),
                Slice::new(51, 75),
                Slice::new(76, 100),
            ],
        }
    }
}

/// Forwards normalized progress for one run to the caller's sink
pub struct ProgressTracker {
    sink: Option<Arc<dyn ProgressSink>>,
    plan: ProgressPlan,
    high_water: AtomicU8,
}

impl ProgressTracker {
    pub fn new(sink: Option<Arc<dyn ProgressSink>>, plan: ProgressPlan) -> Self {
        Self {
            sink,
            plan,
            high_water: AtomicU8::new(0),
        }
    }

    /// Sink handed to a collaborator for the duration of one step
    pub fn step(&self, step: Step) -> StepProgress<'_> {
        StepProgress {
            tracker: self,
            step,
        }
    }

    /// Emits the final event of a successful run
    pub fn complete(&self, message: &str) {
        self.emit(100, message.to_string(), None);
    }

    fn emit(&self, percent: u8, message: String, step: Option<StepTag>) {
        let previous = self.high_water.fetch_max(percent, Ordering::SeqCst);
        let percent = previous.max(percent);

        if let Some(sink) = &self.sink {
            sink.report(ProgressEvent::new(percent, message, step));
        }
    }
}

/// Rescaling sink bound to one step
pub struct StepProgress<'a> {
    tracker: &'a ProgressTracker,
    step: Step,
}

impl StepProgress<'_> {
    /// Reports local progress from the orchestrator itself
    pub fn update(&self, local: u8, message: &str) {
        self.report(ProgressEvent::new(local, message, None));
    }

    /// Sink for one of several collaborator calls within the step
    ///
    /// The call's `0..=100` maps onto `start..=end` of the step's local scale.
    pub fn phase(&self, start: u8, end: u8) -> Phase<'_> {
        Phase {
            parent: self,
            slice: Slice::new(start.min(end), end.min(100)),
        }
    }
}

/// Sub-range of a step handed to a single collaborator call
pub struct Phase<'a> {
    parent: &'a StepProgress<'a>,
    slice: Slice,
}

impl ProgressSink for Phase<'_> {
    fn report(&self, event: ProgressEvent) {
        self.parent.report(ProgressEvent {
            percent: self.slice.scale(event.percent),
            ..event
        });
    }
}

impl ProgressSink for StepProgress<'_> {
    fn report(&self, event: ProgressEvent) {
        let tag = self.step.tag();
        let percent = self.tracker.plan.slice(self.step).scale(event.percent);
        let message = format!("{} {}", tag, event.message);
        self.tracker.emit(percent, message, Some(tag));
    }
}
