//! Shared building blocks for the issue tracker crates: response types and
//! tracing initialisation.

pub mod types;
pub mod utils;
