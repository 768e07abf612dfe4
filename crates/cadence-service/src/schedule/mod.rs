//! Schedule aggregate: rule text plus the occurrence fields cached from it.
//!
//! - `model`: the `Schedule` record and its labels
//! - `compute`: computed-field derivation and the density guard
//! - `preview`: upcoming occurrences rendered in the schedule's zone

mod compute;
mod model;
mod preview;

pub use compute::{compute_fields, final_occurrence, upcoming};
pub use model::{ComputedFields, Schedule};
pub use preview::PreviewOccurrence;
