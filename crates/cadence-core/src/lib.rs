//! Shared building blocks for the cadence scheduling engine.
//!
//! Holds the pieces every other crate leans on: the core error type,
//! configuration loading, logging bootstrap and the opaque owner id.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod types;
