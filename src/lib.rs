//! patchwright library crate
//!
//! Exposes the fix pipeline so the CLI, benchmarks and editor front ends
//! share one implementation.

pub mod agentic;
pub mod config;
pub mod replay;
