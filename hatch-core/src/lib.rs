//! Hatch Core
//!
//! Core types and abstractions for the Hatch bot provisioning pipeline.
//!
//! This crate contains:
//! - Domain types: pipeline options, the result accumulator, progress events, steps
//! - DTOs: payloads exchanged with the collaborator services
//! - Errors: typed per-step failures
//! - Settings: the persisted defaults schema

pub mod domain;
pub mod dto;
pub mod error;
pub mod settings;
