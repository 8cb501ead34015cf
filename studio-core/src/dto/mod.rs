//! Data Transfer Objects
//!
//! Request bodies accepted by the orchestrator and the response shapes it
//! returns. The same types are used by the HTTP client so both sides agree on
//! field names.

pub mod feedback;
pub mod response;
pub mod stage;
