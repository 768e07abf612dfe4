//! Recurrence rules for the cadence scheduling engine: parsing, boundary
//! coercion and occurrence generation.

pub mod error;
pub mod rfc;
