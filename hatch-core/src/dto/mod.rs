//! Data Transfer Objects for collaborator communication
//!
//! Requests the orchestrator sends to each collaborator service and the
//! success payloads those services return. Response fields the orchestrator
//! must check for are optional so that a missing value surfaces as a distinct
//! failure instead of a parse error.

pub mod application;
pub mod bot;
pub mod repository;
