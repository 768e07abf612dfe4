//! iCalendar recurrence support (RFC 5545).
//!
//! - `core`: Rule value types that render back to RFC 5545 text
//! - `parse`: Parsers for schedule rule text
//! - `expand`: Boundary coercion and occurrence generation
//!
//! ## Example
//!
//! ```rust
//! use cadence_rfc::rfc::ical::expand::{GeneratorLimits, NormalizedRule};
//!
//! let rule = NormalizedRule::parse(
//!     "DTSTART;TZID=America/New_York:20300112T210000 RRULE:FREQ=DAILY;UNTIL=20300115T210000",
//! )
//! .unwrap();
//! assert!(rule.canonical_text().ends_with("UNTIL=20300116T020000Z"));
//!
//! let occurrences: Vec<_> = rule.occurrences(GeneratorLimits::default()).collect();
//! assert_eq!(occurrences.len(), 4);
//! ```

pub mod core;
pub mod expand;
pub mod parse;


pub use expand::{NormalizedRule, coerce};
pub use parse::{ParseError, ParseResult, parse_rule_text};
