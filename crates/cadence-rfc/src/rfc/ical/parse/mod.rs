//! Rule text parsing primitives (RFC 5545).
//!
//! - Values: DATE, DATE-TIME and RECUR value parsing
//! - Rule text: the `DTSTART` + `RRULE` content lines of a schedule

mod error;
mod rule_text;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use rule_text::{RuleText, parse_rule_text, parse_rule_text_with_resolver};
pub use values::{parse_date, parse_datetime, parse_rrule};
