//! Text formats shared by the parser, the coercion layer and the schedule surface.

/// Basic-format local date-time used by `DTSTART` and `UNTIL` values.
pub const ICAL_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";
/// Basic-format UTC date-time (`Z` suffixed).
pub const ICAL_UTC_DATETIME_FORMAT: &str = const_str::concat!(ICAL_DATETIME_FORMAT, "Z");

/// Extended-format wall-clock rendering used for the `until` label.
pub const LOCAL_LABEL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Timezone label reported for rules anchored on a bare UTC start.
pub const UTC_TIMEZONE_LABEL: &str = "UTC";

pub const DTSTART_PROPERTY: &str = "DTSTART";
pub const RRULE_PROPERTY: &str = "RRULE";
pub const UNTIL_RULE_PART: &str = "UNTIL";
