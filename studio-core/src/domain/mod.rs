//! Core domain types
//!
//! These types are shared between the orchestrator (which validates, records
//! and serves them) and every generation engine (which consumes stage inputs
//! and produces stage outputs). Nothing in here performs I/O.

pub mod asset;
pub mod compose;
pub mod envelope;
pub mod feedback;
pub mod job;
pub mod lyrics;
pub mod project;
pub mod prompt;
pub mod reintegrate;
pub mod separate;
