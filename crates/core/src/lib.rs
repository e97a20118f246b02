//! Domain core for the PM program builder.
//!
//! This crate has zero internal deps so the recurrence model and the export
//! pipeline can be used by both the API layer and any future CLI tooling.

pub mod error;
pub mod export;
pub mod recurrence;
pub mod types;
