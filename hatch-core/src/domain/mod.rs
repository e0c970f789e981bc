//! Core domain types
//!
//! These types describe a single provisioning run: what the caller asked for,
//! what happened, and how progress is reported while it happens. None of them
//! outlive one `run` invocation.

pub mod options;
pub mod progress;
pub mod result;
pub mod step;
