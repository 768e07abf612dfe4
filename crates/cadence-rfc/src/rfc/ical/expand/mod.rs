//! Recurrence expansion for schedule rules.
//!
//! This module turns a parsed rule into absolute occurrence instants:
//! - `coerce`: boundary normalization and the canonical rule text
//! - `candidates`: RFC 5545 period expansion on wall-clock time
//! - `occurrences`: timezone resolution, bounds and skip-ahead
//! - `timezone`: TZID resolution and local/UTC conversion

mod candidates;
mod coerce;
mod occurrences;
mod timezone;

pub use candidates::{CandidateIter, Expansion};
pub use coerce::{Bound, NormalizedRule, coerce};
pub use occurrences::{GeneratorLimits, Occurrences};
pub use timezone::{
    ConversionError, RuleZone, TimeZoneResolver, convert_to_utc, convert_to_utc_lenient,
};
