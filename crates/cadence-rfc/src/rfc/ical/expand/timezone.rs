//! Timezone resolution and local/UTC conversion for rule boundaries and candidates.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and alias canonicalization,
//! then `chrono-tz` for the actual offsets.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

use cadence_core::constants::UTC_TIMEZONE_LABEL;

/// Error during timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Non-existent time during DST gap.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),

    /// Wall-clock fields that do not form a date-time.
    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),
}

/// The timezone a rule's wall-clock times are read in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleZone {
    /// Start boundary given as a bare UTC instant.
    Utc,
    /// Start boundary qualified with a TZID.
    Named {
        /// Identifier exactly as written in the rule.
        tzid: String,
        tz: Tz,
    },
}

impl RuleZone {
    /// Label reported to callers: the TZID as written, or `UTC`.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Utc => UTC_TIMEZONE_LABEL,
            Self::Named { tzid, .. } => tzid,
        }
    }

    /// Maps a wall-clock time to every instant it names in this zone.
    #[must_use]
    pub fn resolve_local(&self, local: NaiveDateTime) -> LocalResult<DateTime<Utc>> {
        match self {
            Self::Utc => LocalResult::Single(Utc.from_utc_datetime(&local)),
            Self::Named { tz, .. } => tz
                .from_local_datetime(&local)
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// Wall-clock reading of `instant` in this zone.
    #[must_use]
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Utc => instant.naive_utc(),
            Self::Named { tz, .. } => instant.with_timezone(tz).naive_local(),
        }
    }
}

/// Resolver for timezone identifiers.
///
/// Maintains a cache of resolved timezones keyed by the TZID as written.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// Vendor-prefixed, Windows and aliased identifiers are normalized to
    /// canonical IANA names first.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid);
        let tz = Tz::from_str(&normalized)
            .or_else(|_e| Tz::from_str(tzid))
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        tracing::trace!(tzid, normalized = %normalized, "Resolved timezone");
        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }

    /// ## Summary
    /// Resolves a TZID into the zone a rule is evaluated in.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    pub fn rule_zone(&mut self, tzid: &str) -> Result<RuleZone, ConversionError> {
        Ok(RuleZone::Named {
            tzid: tzid.to_string(),
            tz: self.resolve(tzid)?,
        })
    }
}

/// Normalizes common calendar-client timezone identifiers to IANA names.
///
/// Strips vendor prefixes, maps Windows zone names and canonicalizes IANA
/// aliases (`US/Eastern` -> `America/New_York`).
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    let iana_parser = IanaParserExtended::new();

    if let Some(tz) = WindowsParser::new().parse(stripped, None) {
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// ## Summary
/// Converts a local wall-clock time to UTC in `zone`.
///
/// A time that occurs twice (DST fold) resolves to the earlier instant.
///
/// ## Errors
///
/// Returns `ConversionError::NonExistentTime` if the time falls in a DST gap.
pub fn convert_to_utc(
    local_time: NaiveDateTime,
    zone: &RuleZone,
) -> Result<DateTime<Utc>, ConversionError> {
    match zone.resolve_local(local_time) {
        LocalResult::None => Err(ConversionError::NonExistentTime(format!(
            "{local_time} in timezone {}",
            zone.label()
        ))),
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, latest) => {
            tracing::trace!(%local_time, %earliest, %latest, "Ambiguous local time, using earliest");
            Ok(earliest)
        }
    }
}

/// ## Summary
/// Converts a local datetime to UTC, shifting times inside a DST gap forward
/// by one hour instead of failing.
///
/// Used for rule boundaries, which must always map to an instant.
///
/// ## Errors
///
/// Returns `ConversionError::NonExistentTime` if even the shifted time does
/// not exist.
pub fn convert_to_utc_lenient(
    local_time: NaiveDateTime,
    zone: &RuleZone,
) -> Result<DateTime<Utc>, ConversionError> {
    match convert_to_utc(local_time, zone) {
        Err(ConversionError::NonExistentTime(_)) => {
            let shifted = local_time + chrono::Duration::hours(1);
            tracing::debug!(%local_time, %shifted, zone = zone.label(), "Shifted boundary out of DST gap");
            convert_to_utc(shifted, zone)
        }
        other => other,
    }
}
