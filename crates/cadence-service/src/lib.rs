//! Schedule aggregate for the cadence scheduling engine.
//!
//! Keeps a schedule's computed fields (first occurrence, next run, final
//! occurrence) in step with its rule text.

pub mod error;
pub mod schedule;
