//! Service Module
//!
//! Business logic layer for the orchestrator: the pipeline coordinator,
//! the detached-job dispatcher and the retention sweeper.

pub mod coordinator;
pub mod dispatch;
pub mod retention;

pub use coordinator::{Coordinator, CoordinatorError};
