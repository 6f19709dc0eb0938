//! Foundational data structures, error types, and language definitions.

pub mod error;
pub mod language;
pub mod models;
