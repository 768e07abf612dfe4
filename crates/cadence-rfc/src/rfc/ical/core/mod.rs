//! Recurrence-rule value types (RFC 5545).
//!
//! These types carry what the parser read, field by field, so a rule can be
//! rendered back to text. Interpretation (timezones, implicit BY-values)
//! happens in `expand`.

mod datetime;
mod rrule;

pub use datetime::{Date, DateTime, DateTimeForm};
pub use rrule::{Frequency, RRule, RRuleUntil, Weekday, WeekdayNum};
