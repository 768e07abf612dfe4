//! RRULE (Recurrence Rule) value type (RFC 5545 §3.3.10).

use std::fmt;

use super::{Date, DateTime};

/// Recurrence frequency (RFC 5545 §3.3.10).
///
/// Ordered from finest to coarsest, so `Frequency::Daily > Frequency::Hourly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Self::Secondly,
            "MINUTELY" => Self::Minutely,
            "HOURLY" => Self::Hourly,
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }

    /// Length of one period in seconds for the sub-daily frequencies.
    #[must_use]
    pub const fn fixed_seconds(self) -> Option<i64> {
        match self {
            Self::Secondly => Some(1),
            Self::Minutely => Some(60),
            Self::Hourly => Some(3600),
            Self::Daily | Self::Weekly | Self::Monthly | Self::Yearly => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }

    #[must_use]
    pub const fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekday with optional occurrence number, as used in BYDAY.
///
/// - `MO` - every Monday
/// - `1MO` - first Monday of the month/year
/// - `-1FR` - last Friday of the month/year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayNum {
    /// Optional occurrence number (-53 to 53, excluding 0).
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Creates a weekday occurrence with an ordinal.
    ///
    /// Returns `None` if ordinal is 0 or outside -53..=53.
    #[must_use]
    pub fn nth(ordinal: i8, weekday: Weekday) -> Option<Self> {
        (ordinal != 0 && (-53..=53).contains(&ordinal)).then_some(Self {
            ordinal: Some(ordinal),
            weekday,
        })
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// UNTIL value for RRULE - either DATE or DATE-TIME.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RRuleUntil {
    /// Date-only boundary, read as local midnight.
    Date(Date),
    /// Date-time boundary, UTC (`Z`) or naive.
    DateTime(DateTime),
}

impl RRuleUntil {
    /// Whether the boundary already carries an explicit UTC marker.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        match self {
            Self::Date(_) => false,
            Self::DateTime(dt) => dt.is_utc(),
        }
    }

    /// Wall-clock value of the boundary; DATE values become midnight.
    #[must_use]
    pub fn to_naive(&self) -> Option<chrono::NaiveDateTime> {
        match self {
            Self::Date(d) => d.to_naive().map(|date| date.and_time(chrono::NaiveTime::MIN)),
            Self::DateTime(dt) => dt.to_naive(),
        }
    }
}

impl fmt::Display for RRuleUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// Recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RRule {
    /// Recurrence frequency (required).
    pub freq: Option<Frequency>,

    /// Recurrence interval (default: 1).
    pub interval: Option<u32>,

    /// End date/time of the recurrence (mutually exclusive with count).
    pub until: Option<RRuleUntil>,

    /// Number of occurrences (mutually exclusive with until).
    pub count: Option<u32>,

    /// Week start day (default: Monday).
    pub wkst: Option<Weekday>,

    /// By-second list (0-59).
    pub by_second: Vec<u8>,

    /// By-minute list (0-59).
    pub by_minute: Vec<u8>,

    /// By-hour list (0-23).
    pub by_hour: Vec<u8>,

    /// By-day list with optional occurrence numbers.
    pub by_day: Vec<WeekdayNum>,

    /// By-monthday list (-31 to 31, excluding 0).
    pub by_monthday: Vec<i8>,

    /// By-yearday list (-366 to 366, excluding 0).
    pub by_yearday: Vec<i16>,

    /// By-weekno list (-53 to 53, excluding 0, ISO 8601).
    pub by_weekno: Vec<i8>,

    /// By-month list (1-12).
    pub by_month: Vec<u8>,

    /// By-setpos list (-366 to 366, excluding 0).
    pub by_setpos: Vec<i16>,
}

impl RRule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule with the given frequency.
    #[must_use]
    pub fn with_freq(freq: Frequency) -> Self {
        Self {
            freq: Some(freq),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn daily() -> Self {
        Self::with_freq(Frequency::Daily)
    }

    #[must_use]
    pub fn weekly() -> Self {
        Self::with_freq(Frequency::Weekly)
    }

    #[must_use]
    pub fn monthly() -> Self {
        Self::with_freq(Frequency::Monthly)
    }

    #[must_use]
    pub fn yearly() -> Self {
        Self::with_freq(Frequency::Yearly)
    }

    /// Effective interval (1 when unset).
    #[must_use]
    pub fn effective_interval(&self) -> u32 {
        self.interval.unwrap_or(1)
    }

    /// Effective week start (Monday when unset).
    #[must_use]
    pub fn effective_wkst(&self) -> Weekday {
        self.wkst.unwrap_or(Weekday::Monday)
    }

    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self.until = None; // Mutually exclusive
        self
    }

    #[must_use]
    pub fn with_until_datetime(mut self, datetime: DateTime) -> Self {
        self.until = Some(RRuleUntil::DateTime(datetime));
        self.count = None; // Mutually exclusive
        self
    }

    #[must_use]
    pub fn with_by_day(mut self, days: Vec<WeekdayNum>) -> Self {
        self.by_day = days;
        self
    }

    #[must_use]
    pub fn with_by_month(mut self, months: Vec<u8>) -> Self {
        self.by_month = months;
        self
    }

    #[must_use]
    pub fn with_by_monthday(mut self, days: Vec<i8>) -> Self {
        self.by_monthday = days;
        self
    }

    #[must_use]
    pub fn with_by_setpos(mut self, positions: Vec<i16>) -> Self {
        self.by_setpos = positions;
        self
    }

    #[must_use]
    pub fn with_wkst(mut self, wkst: Weekday) -> Self {
        self.wkst = Some(wkst);
        self
    }
}

fn join_list<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(ref freq) = self.freq {
            parts.push(format!("FREQ={freq}"));
        }
        if let Some(interval) = self.interval {
            parts.push(format!("INTERVAL={interval}"));
        }
        if let Some(ref until) = self.until {
            parts.push(format!("UNTIL={until}"));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(wkst) = self.wkst {
            parts.push(format!("WKST={wkst}"));
        }

        let lists = [
            ("BYSECOND", join_list(&self.by_second)),
            ("BYMINUTE", join_list(&self.by_minute)),
            ("BYHOUR", join_list(&self.by_hour)),
            ("BYDAY", join_list(&self.by_day)),
            ("BYMONTHDAY", join_list(&self.by_monthday)),
            ("BYYEARDAY", join_list(&self.by_yearday)),
            ("BYWEEKNO", join_list(&self.by_weekno)),
            ("BYMONTH", join_list(&self.by_month)),
            ("BYSETPOS", join_list(&self.by_setpos)),
        ];
        for (name, joined) in lists {
            if !joined.is_empty() {
                parts.push(format!("{name}={joined}"));
            }
        }

        write!(f, "{}", parts.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rrule_display_basic() {
        let rrule = RRule::daily().with_count(10);
        assert_eq!(rrule.to_string(), "FREQ=DAILY;COUNT=10");
    }

    #[test]
    fn rrule_display_monthly_setpos() {
        let rrule = RRule::monthly()
            .with_interval(1)
            .with_by_day(vec![WeekdayNum::every(Weekday::Saturday)])
            .with_by_setpos(vec![1])
            .with_count(4);
        assert_eq!(
            rrule.to_string(),
            "FREQ=MONTHLY;INTERVAL=1;COUNT=4;BYDAY=SA;BYSETPOS=1"
        );
    }

    #[test]
    fn rrule_display_nth_weekday() {
        let last_friday = WeekdayNum::nth(-1, Weekday::Friday).unwrap();
        let rrule = RRule::monthly().with_by_day(vec![last_friday]);
        assert_eq!(rrule.to_string(), "FREQ=MONTHLY;BYDAY=-1FR");
    }

    #[test]
    fn rrule_display_until() {
        let rrule = RRule::daily().with_until_datetime(DateTime::utc(2030, 6, 2, 17, 0, 0));
        assert_eq!(rrule.to_string(), "FREQ=DAILY;UNTIL=20300602T170000Z");
    }

    #[test]
    fn until_replaces_count() {
        let rrule = RRule::daily()
            .with_count(3)
            .with_until_datetime(DateTime::utc(2030, 6, 2, 17, 0, 0));
        assert_eq!(rrule.count, None);
        assert!(rrule.until.as_ref().is_some_and(RRuleUntil::is_utc));
    }

    #[test]
    fn weekday_num_rejects_zero_ordinal() {
        assert!(WeekdayNum::nth(0, Weekday::Monday).is_none());
        assert!(WeekdayNum::nth(54, Weekday::Monday).is_none());
        assert!(WeekdayNum::nth(-53, Weekday::Monday).is_some());
    }

    #[test]
    fn weekday_chrono_round_trip() {
        for weekday in [
            Weekday::Sunday,
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
        ] {
            assert_eq!(Weekday::from_chrono(weekday.to_chrono()), weekday);
        }
    }

    #[test]
    fn frequency_parse_and_order() {
        assert_eq!(Frequency::parse("weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("INVALID"), None);
        assert!(Frequency::Daily > Frequency::Hourly);
        assert_eq!(Frequency::Minutely.fixed_seconds(), Some(60));
        assert_eq!(Frequency::Monthly.fixed_seconds(), None);
    }

    #[test]
    fn date_until_is_midnight() {
        let until = RRuleUntil::Date(Date::new(2030, 6, 2));
        assert!(!until.is_utc());
        assert_eq!(until.to_naive().unwrap().to_string(), "2030-06-02 00:00:00");
    }
}
