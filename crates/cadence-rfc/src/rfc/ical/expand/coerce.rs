//! Boundary normalization: turns parsed rule text into a rule whose start and
//! end are absolute instants, rewriting a naive UNTIL into its UTC form.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};

use cadence_core::constants::{ICAL_UTC_DATETIME_FORMAT, LOCAL_LABEL_FORMAT};

use super::candidates::Expansion;
use super::timezone::{ConversionError, RuleZone, convert_to_utc_lenient};
use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::core::{self as ical, RRule, RRuleUntil};
use crate::rfc::ical::parse::{RuleText, parse_rule_text};

const MAX_ICAL_YEAR: u16 = 9999;

/// How a rule's sequence ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Infinite recurrence.
    Unbounded,
    /// Stops after this many occurrences.
    Count(u32),
    /// Stops after this instant (inclusive).
    Until(DateTime<Utc>),
}

/// A rule with absolute boundaries, ready for occurrence generation.
///
/// Immutable once built: every call to `occurrences` starts a fresh sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRule {
    canonical_text: String,
    zone: RuleZone,
    rrule: RRule,
    start_local: NaiveDateTime,
    start: DateTime<Utc>,
    bound: Bound,
    expansion: Expansion,
}

impl NormalizedRule {
    /// ## Summary
    /// Parses and coerces rule text in one step.
    ///
    /// ## Errors
    /// Returns `RfcError::ParseError` for malformed text and
    /// `RfcError::ConversionError` when a boundary cannot be placed in time.
    pub fn parse(text: &str) -> RfcResult<Self> {
        coerce(&parse_rule_text(text)?)
    }

    /// Rule text with any naive UNTIL replaced by its UTC form.
    #[must_use]
    pub fn canonical_text(&self) -> &str {
        &self.canonical_text
    }

    #[must_use]
    pub const fn zone(&self) -> &RuleZone {
        &self.zone
    }

    /// The rule as parsed, with UNTIL in UTC form.
    #[must_use]
    pub const fn rrule(&self) -> &RRule {
        &self.rrule
    }

    /// Wall-clock start in the rule's zone.
    #[must_use]
    pub const fn start_local(&self) -> NaiveDateTime {
        self.start_local
    }

    /// Absolute start instant. A start inside a DST gap is anchored one hour
    /// later; the gap candidate itself never becomes an occurrence.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn bound(&self) -> Bound {
        self.bound
    }

    pub(crate) const fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    /// Start TZID as written, or `UTC`.
    #[must_use]
    pub fn timezone_label(&self) -> &str {
        self.zone.label()
    }

    /// End boundary as wall-clock time in the rule's zone, or `""` when the
    /// rule has no UNTIL.
    #[must_use]
    pub fn until_label(&self) -> String {
        match self.bound {
            Bound::Until(until) => self.zone.to_local(until).format(LOCAL_LABEL_FORMAT).to_string(),
            Bound::Unbounded | Bound::Count(_) => String::new(),
        }
    }
}

/// ## Summary
/// Places a parsed rule's boundaries in absolute time.
///
/// A zoned DTSTART is read in its zone; a repeated wall-clock time resolves
/// to the earlier instant and one inside a DST gap anchors an hour later. A
/// naive UNTIL is read as UTC for UTC rules and as
/// wall-clock time in the start zone otherwise, then written back into the
/// canonical text as `UNTIL=YYYYMMDDTHHMMSSZ`. Already canonical text comes
/// back unchanged.
///
/// ## Errors
/// Returns `RfcError::ConversionError` if a boundary cannot be placed in time
/// (including a naive UNTIL that lands past year 9999 in UTC) and
/// `RfcError::ValidationError` if the rule lacks FREQ or carries both COUNT
/// and UNTIL.
pub fn coerce(rule: &RuleText) -> RfcResult<NormalizedRule> {
    let zone = rule.zone().clone();
    let start_local = rule
        .dtstart()
        .to_naive()
        .ok_or_else(|| ConversionError::InvalidDateTime(rule.dtstart().to_string()))?;
    let start = convert_to_utc_lenient(start_local, &zone)?;

    let mut rrule = rule.rrule().clone();
    let freq = rrule
        .freq
        .ok_or_else(|| RfcError::ValidationError("FREQ required in RRULE".to_string()))?;
    let mut canonical_text = rule.text().to_string();

    let bound = match (rrule.count, rrule.until.clone()) {
        (Some(_), Some(_)) => {
            return Err(RfcError::ValidationError(
                "RRULE may not contain both COUNT and UNTIL".to_string(),
            ));
        }
        (Some(count), None) => Bound::Count(count),
        (None, Some(until)) => {
            let instant = until_instant(&until, &zone)?;
            if !until.is_utc() {
                let value = ical_utc(instant)?;
                let rendered = instant.format(ICAL_UTC_DATETIME_FORMAT).to_string();
                if let Some(span) = rule.until_span() {
                    canonical_text.replace_range(span, &rendered);
                }
                rrule.until = Some(RRuleUntil::DateTime(value));
                tracing::debug!(until = %rendered, zone = zone.label(), "Coerced naive UNTIL to UTC");
            }
            Bound::Until(instant)
        }
        (None, None) => Bound::Unbounded,
    };

    let expansion = Expansion::new(freq, &rrule, start_local);

    Ok(NormalizedRule {
        canonical_text,
        zone,
        rrule,
        start_local,
        start,
        bound,
        expansion,
    })
}

fn until_instant(until: &RRuleUntil, zone: &RuleZone) -> Result<DateTime<Utc>, ConversionError> {
    let local = until
        .to_naive()
        .ok_or_else(|| ConversionError::InvalidDateTime(until.to_string()))?;
    if until.is_utc() || *zone == RuleZone::Utc {
        Ok(Utc.from_utc_datetime(&local))
    } else {
        convert_to_utc_lenient(local, zone)
    }
}

fn ical_utc(instant: DateTime<Utc>) -> Result<ical::DateTime, ConversionError> {
    let invalid = || ConversionError::InvalidDateTime(instant.to_string());
    let narrow = |value: u32| u8::try_from(value).map_err(|_e| invalid());
    let year = u16::try_from(instant.year())
        .ok()
        .filter(|year| *year <= MAX_ICAL_YEAR)
        .ok_or_else(|| {
            ConversionError::InvalidDateTime(format!("{instant} is outside years 0000-9999"))
        })?;
    Ok(ical::DateTime::utc(
        year,
        narrow(instant.month())?,
        narrow(instant.day())?,
        narrow(instant.hour())?,
        narrow(instant.minute())?,
        narrow(instant.second())?,
    ))
}
