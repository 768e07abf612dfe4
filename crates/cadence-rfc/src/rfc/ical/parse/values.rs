//! Value parsers for the pieces of a recurrence rule (RFC 5545 §3.3).
//!
//! Error sources are discarded (`map_err_ignore`): the integer parse errors
//! carry nothing the offending token does not already show.
#![expect(
    clippy::map_err_ignore,
    reason = "Value parsers report the offending token instead of the std parse error"
)]

use std::fmt::Display;
use std::str::FromStr;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{
    Date, DateTime, DateTimeForm, Frequency, RRule, RRuleUntil, Weekday, WeekdayNum,
};

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str, offset: usize) -> ParseResult<Date> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDate, offset, s);

    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year = s[0..4].parse::<u16>().map_err(|_| invalid())?;
    let month = s[4..6].parse::<u8>().map_err(|_| invalid())?;
    let day = s[6..8].parse::<u8>().map_err(|_| invalid())?;

    let date = Date { year, month, day };
    if date.to_naive().is_none() {
        return Err(invalid());
    }
    Ok(date)
}

/// Parses a TIME value (RFC 5545 §3.3.12) into `(hour, minute, second, is_utc)`.
///
/// Format: HHMMSS[Z] (e.g., "133000", "133000Z")
fn parse_time(s: &str, offset: usize) -> ParseResult<(u8, u8, u8, bool)> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidTime, offset, s);

    let (time_str, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };

    if time_str.len() != 6 || !time_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hour = time_str[0..2].parse::<u8>().map_err(|_| invalid())?;
    let minute = time_str[2..4].parse::<u8>().map_err(|_| invalid())?;
    let second = time_str[4..6].parse::<u8>().map_err(|_| invalid())?;

    if hour > 23 || minute > 59 || second > 59 {
        return Err(invalid());
    }

    Ok((hour, minute, second, is_utc))
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Format: YYYYMMDD"T"HHMMSS[Z] (e.g., "19970714T133000Z"). The TZID is a
/// property parameter, so it is passed in separately.
///
/// ## Errors
/// Returns an error if the string is not a valid datetime format.
pub fn parse_datetime(s: &str, tzid: Option<&str>, offset: usize) -> ParseResult<DateTime> {
    let t_pos = s
        .find(['T', 't'])
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDateTime, offset, s))?;

    let date = parse_date(&s[..t_pos], offset)?;
    let (hour, minute, second, is_utc) = parse_time(&s[t_pos + 1..], offset + t_pos + 1)?;

    let form = if is_utc {
        DateTimeForm::Utc
    } else if let Some(tz) = tzid {
        DateTimeForm::Zoned {
            tzid: tz.to_string(),
        }
    } else {
        DateTimeForm::Floating
    };

    Ok(DateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        hour,
        minute,
        second,
        form,
    })
}

/// Parses a RECUR (RRULE) value (RFC 5545 §3.3.10).
///
/// `offset` is the byte offset of `s` inside the full rule text; errors point
/// at the rule part that failed.
///
/// ## Errors
/// Returns an error if the string is not a valid recurrence rule.
pub fn parse_rrule(s: &str, offset: usize) -> ParseResult<RRule> {
    let mut rrule = RRule::new();
    let mut part_offset = offset;

    for part in s.split(';') {
        if !part.is_empty() {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidRRule, part_offset, part))?;
            parse_rrule_part(&mut rrule, key, value, part_offset + key.len() + 1)?;
        }
        part_offset += part.len() + 1;
    }

    if rrule.freq.is_none() {
        return Err(ParseError::new(ParseErrorKind::MissingFrequency, offset, s));
    }

    Ok(rrule)
}

/// Parses a single RRULE key-value pair. `offset` points at the value.
fn parse_rrule_part(rrule: &mut RRule, key: &str, value: &str, offset: usize) -> ParseResult<()> {
    match key.to_ascii_uppercase().as_str() {
        "FREQ" => {
            rrule.freq = Some(
                Frequency::parse(value)
                    .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidFrequency, offset, value))?,
            );
        }
        "INTERVAL" => {
            let interval = parse_number::<u32>(value, offset)?;
            if interval == 0 {
                return Err(ParseError::out_of_range(offset, "INTERVAL", interval));
            }
            rrule.interval = Some(interval);
        }
        "COUNT" => parse_rrule_count(rrule, value, offset)?,
        "UNTIL" => parse_rrule_until(rrule, value, offset)?,
        "WKST" => {
            rrule.wkst = Some(
                Weekday::parse(value)
                    .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidWeekday, offset, value))?,
            );
        }
        "BYSECOND" => rrule.by_second = parse_list(value, offset, "BYSECOND", |v: u8| v <= 59)?,
        "BYMINUTE" => rrule.by_minute = parse_list(value, offset, "BYMINUTE", |v: u8| v <= 59)?,
        "BYHOUR" => rrule.by_hour = parse_list(value, offset, "BYHOUR", |v: u8| v <= 23)?,
        "BYDAY" => rrule.by_day = parse_byday(value, offset)?,
        "BYMONTHDAY" => {
            rrule.by_monthday = parse_list(value, offset, "BYMONTHDAY", |v: i8| {
                v != 0 && (-31..=31).contains(&v)
            })?;
        }
        "BYYEARDAY" => {
            rrule.by_yearday = parse_list(value, offset, "BYYEARDAY", |v: i16| {
                v != 0 && (-366..=366).contains(&v)
            })?;
        }
        "BYWEEKNO" => {
            rrule.by_weekno = parse_list(value, offset, "BYWEEKNO", |v: i8| {
                v != 0 && (-53..=53).contains(&v)
            })?;
        }
        "BYMONTH" => {
            rrule.by_month = parse_list(value, offset, "BYMONTH", |v: u8| (1..=12).contains(&v))?;
        }
        "BYSETPOS" => {
            rrule.by_setpos = parse_list(value, offset, "BYSETPOS", |v: i16| {
                v != 0 && (-366..=366).contains(&v)
            })?;
        }
        other => {
            tracing::trace!(rule_part = %other, "Ignoring unknown RRULE part");
        }
    }
    Ok(())
}

/// Parses the COUNT component of an RRULE.
fn parse_rrule_count(rrule: &mut RRule, value: &str, offset: usize) -> ParseResult<()> {
    if rrule.until.is_some() {
        return Err(ParseError::new(
            ParseErrorKind::UntilCountConflict,
            offset,
            value,
        ));
    }
    let count = parse_number::<u32>(value, offset)?;
    if count == 0 {
        return Err(ParseError::out_of_range(offset, "COUNT", count));
    }
    rrule.count = Some(count);
    Ok(())
}

/// Parses the UNTIL component of an RRULE.
fn parse_rrule_until(rrule: &mut RRule, value: &str, offset: usize) -> ParseResult<()> {
    if rrule.count.is_some() {
        return Err(ParseError::new(
            ParseErrorKind::UntilCountConflict,
            offset,
            value,
        ));
    }
    // UNTIL can be DATE or DATE-TIME
    rrule.until = Some(if value.contains(['T', 't']) {
        RRuleUntil::DateTime(parse_datetime(value, None, offset)?)
    } else {
        RRuleUntil::Date(parse_date(value, offset)?)
    });
    Ok(())
}

fn parse_number<T: FromStr>(value: &str, offset: usize) -> ParseResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidRRule, offset, value))
}

/// Parses a comma-separated list of numbers, checking each against `valid`.
fn parse_list<T>(
    s: &str,
    offset: usize,
    part: &str,
    valid: impl Fn(T) -> bool,
) -> ParseResult<Vec<T>>
where
    T: FromStr + Display + Copy,
{
    s.split(',')
        .map(|v| {
            let n = parse_number::<T>(v, offset)?;
            if valid(n) {
                Ok(n)
            } else {
                Err(ParseError::out_of_range(offset, part, n))
            }
        })
        .collect()
}

/// Parses a BYDAY value (weekdays with optional ordinals).
fn parse_byday(s: &str, offset: usize) -> ParseResult<Vec<WeekdayNum>> {
    s.split(',')
        .map(|v| parse_weekday_num(v.trim(), offset))
        .collect()
}

/// Parses a single weekday with optional ordinal (e.g., "MO", "1MO", "-1FR").
fn parse_weekday_num(s: &str, offset: usize) -> ParseResult<WeekdayNum> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidWeekday, offset, s);

    // The weekday is always the last two characters
    let split = s.len().checked_sub(2).ok_or_else(invalid)?;
    if !s.is_char_boundary(split) {
        return Err(invalid());
    }
    let (ordinal_str, weekday_str) = s.split_at(split);

    let weekday = Weekday::parse(weekday_str).ok_or_else(invalid)?;

    if ordinal_str.is_empty() {
        return Ok(WeekdayNum::every(weekday));
    }

    let ordinal = parse_number::<i8>(ordinal_str, offset)?;
    WeekdayNum::nth(ordinal, weekday).ok_or_else(|| ParseError::out_of_range(offset, "BYDAY", s))
}
