//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs: schedule
//!   resolution, guarded attendance recording, CSV reporting.
//! - Keep HTTP/CLI layers decoupled from storage details.

pub mod attendance;
pub mod report;
pub mod schedule;
