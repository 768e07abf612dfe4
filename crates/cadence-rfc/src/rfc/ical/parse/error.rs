//! Recurrence-rule parse error types.

use std::fmt;

/// Result type for rule parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred while parsing rule text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Byte offset into the rule text where the offending token starts.
    pub offset: usize,
    /// The offending token or additional context.
    pub context: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, offset: usize, context: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            context: context.into(),
        }
    }

    /// Creates a value-out-of-range error for a named rule part.
    #[must_use]
    pub fn out_of_range(offset: usize, part: &str, value: impl fmt::Display) -> Self {
        Self::new(
            ParseErrorKind::ValueOutOfRange,
            offset,
            format!("{part}={value}"),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}: {}", self.offset, self.kind)?;
        if !self.context.is_empty() {
            write!(f, ": {}", self.context)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Empty rule text.
    Empty,
    /// Token that is neither a DTSTART nor an RRULE line.
    UnexpectedToken,
    /// No DTSTART line.
    MissingDtstart,
    /// More than one DTSTART line.
    DuplicateDtstart,
    /// No RRULE line.
    MissingRRule,
    /// More than one RRULE line.
    DuplicateRRule,
    /// DTSTART without `Z` and without TZID.
    FloatingDtstart,
    /// DTSTART with both a TZID parameter and a `Z` value.
    ZonedUtcDtstart,
    /// Unsupported or malformed DTSTART parameter.
    InvalidParameter,
    /// TZID not known to the timezone database.
    UnknownTimezone,
    /// Invalid DATE value.
    InvalidDate,
    /// Invalid TIME value.
    InvalidTime,
    /// Invalid DATE-TIME value.
    InvalidDateTime,
    /// Malformed RRULE rule part.
    InvalidRRule,
    /// RRULE without FREQ.
    MissingFrequency,
    /// Unknown FREQ value.
    InvalidFrequency,
    /// Invalid weekday abbreviation.
    InvalidWeekday,
    /// Numeric rule part outside its allowed range.
    ValueOutOfRange,
    /// Both COUNT and UNTIL were given.
    UntilCountConflict,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty rule"),
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::MissingDtstart => write!(f, "DTSTART required in rule"),
            Self::DuplicateDtstart => write!(f, "multiple DTSTART is not supported"),
            Self::MissingRRule => write!(f, "RRULE required in rule"),
            Self::DuplicateRRule => write!(f, "multiple RRULE is not supported"),
            Self::FloatingDtstart => {
                write!(f, "a valid TZID must be provided (e.g., America/New_York)")
            }
            Self::ZonedUtcDtstart => write!(f, "DTSTART cannot carry both TZID and a UTC value"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::UnknownTimezone => write!(f, "unknown timezone"),
            Self::InvalidDate => write!(f, "invalid date"),
            Self::InvalidTime => write!(f, "invalid time"),
            Self::InvalidDateTime => write!(f, "invalid date/time"),
            Self::InvalidRRule => write!(f, "invalid recurrence rule"),
            Self::MissingFrequency => write!(f, "FREQ required in RRULE"),
            Self::InvalidFrequency => write!(f, "invalid frequency"),
            Self::InvalidWeekday => write!(f, "invalid weekday"),
            Self::ValueOutOfRange => write!(f, "value out of range"),
            Self::UntilCountConflict => write!(f, "RRULE may not contain both COUNT and UNTIL"),
        }
    }
}
