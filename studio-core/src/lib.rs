//! Studio Core
//!
//! Core types and contracts for the music studio pipeline.
//!
//! This crate contains:
//! - Domain types: jobs, the four stage contracts, audio assets, the response envelope
//! - Validation: structural and range checks shared by every stage
//! - DTOs: request bodies and response shapes exchanged over HTTP

pub mod domain;
pub mod dto;
pub mod validation;
