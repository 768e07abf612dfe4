//! Parser for schedule rule text: one `DTSTART` and one `RRULE` content line
//! separated by whitespace.
//!
//! ```text
//! DTSTART;TZID=America/New_York:20300112T210000 RRULE:FREQ=DAILY;INTERVAL=1
//! ```

use std::ops::Range;

use cadence_core::constants::{DTSTART_PROPERTY, RRULE_PROPERTY, UNTIL_RULE_PART};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::values::{parse_datetime, parse_rrule};
use crate::rfc::ical::core::{DateTime, RRule};
use crate::rfc::ical::expand::{RuleZone, TimeZoneResolver};

/// A parsed rule, still carrying the text it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleText {
    text: String,
    dtstart: DateTime,
    zone: RuleZone,
    rrule: RRule,
    until_span: Option<Range<usize>>,
}

impl RuleText {
    /// The rule text exactly as given.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn dtstart(&self) -> &DateTime {
        &self.dtstart
    }

    /// The zone DTSTART is expressed in.
    #[must_use]
    pub const fn zone(&self) -> &RuleZone {
        &self.zone
    }

    #[must_use]
    pub const fn rrule(&self) -> &RRule {
        &self.rrule
    }

    /// Byte range of the UNTIL value inside [`Self::text`].
    #[must_use]
    pub fn until_span(&self) -> Option<Range<usize>> {
        self.until_span.clone()
    }
}

/// ## Summary
/// Parses rule text with a fresh timezone resolver.
///
/// ## Errors
/// Returns a `ParseError` pointing at the offending token.
pub fn parse_rule_text(text: &str) -> ParseResult<RuleText> {
    parse_rule_text_with_resolver(text, &mut TimeZoneResolver::new())
}

/// ## Summary
/// Parses rule text, resolving the DTSTART TZID through `resolver`.
///
/// ## Errors
/// Returns a `ParseError` if:
/// - the text is empty or contains a token other than DTSTART/RRULE
/// - DTSTART or RRULE is missing or repeated
/// - DTSTART is floating, or carries both a TZID and a UTC value
/// - the TZID is unknown
/// - any value fails to parse or is out of range
pub fn parse_rule_text_with_resolver(
    text: &str,
    resolver: &mut TimeZoneResolver,
) -> ParseResult<RuleText> {
    let tokens = split_tokens(text);
    if tokens.is_empty() {
        return Err(ParseError::new(ParseErrorKind::Empty, 0, ""));
    }

    let mut dtstart: Option<(DateTime, RuleZone)> = None;
    let mut rrule: Option<(RRule, Option<Range<usize>>)> = None;

    for (offset, token) in tokens {
        match property_name(token).as_str() {
            DTSTART_PROPERTY => {
                if dtstart.is_some() {
                    return Err(ParseError::new(
                        ParseErrorKind::DuplicateDtstart,
                        offset,
                        token,
                    ));
                }
                dtstart = Some(parse_dtstart(token, offset, resolver)?);
            }
            RRULE_PROPERTY => {
                if rrule.is_some() {
                    return Err(ParseError::new(
                        ParseErrorKind::DuplicateRRule,
                        offset,
                        token,
                    ));
                }
                rrule = Some(parse_rrule_line(token, offset)?);
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken,
                    offset,
                    token,
                ));
            }
        }
    }

    let (dtstart, zone) =
        dtstart.ok_or_else(|| ParseError::new(ParseErrorKind::MissingDtstart, 0, ""))?;
    let (rrule, until_span) =
        rrule.ok_or_else(|| ParseError::new(ParseErrorKind::MissingRRule, 0, ""))?;

    tracing::trace!(%dtstart, zone = zone.label(), %rrule, "Parsed rule text");

    Ok(RuleText {
        text: text.to_string(),
        dtstart,
        zone,
        rrule,
        until_span,
    })
}

/// Splits on any whitespace, keeping each token's byte offset.
fn split_tokens(text: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push((s, &text[s..]));
    }

    tokens
}

/// Property name of a content line, uppercased.
fn property_name(token: &str) -> String {
    let end = token.find([':', ';']).unwrap_or(token.len());
    token[..end].to_ascii_uppercase()
}

/// Parses `DTSTART[;TZID=<zone>]:<date-time>`.
fn parse_dtstart(
    token: &str,
    offset: usize,
    resolver: &mut TimeZoneResolver,
) -> ParseResult<(DateTime, RuleZone)> {
    let (head, value) = token
        .rsplit_once(':')
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDateTime, offset, token))?;
    let value_offset = offset + head.len() + 1;

    let mut tzid: Option<(usize, &str)> = None;
    let mut param_offset = offset + DTSTART_PROPERTY.len();
    for param in head[DTSTART_PROPERTY.len()..].split(';') {
        if !param.is_empty() {
            let (key, param_value) = param.split_once('=').ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidParameter, param_offset, param)
            })?;
            match key.to_ascii_uppercase().as_str() {
                "TZID" => {
                    let zone = param_value.trim_matches('"');
                    if zone.is_empty() {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidParameter,
                            param_offset,
                            param,
                        ));
                    }
                    tzid = Some((param_offset + key.len() + 1, zone));
                }
                "VALUE" if param_value.eq_ignore_ascii_case("DATE-TIME") => {}
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidParameter,
                        param_offset,
                        param,
                    ));
                }
            }
        }
        param_offset += param.len() + 1;
    }

    let dtstart = parse_datetime(value, tzid.map(|(_, zone)| zone), value_offset)?;

    if dtstart.is_floating() {
        return Err(ParseError::new(
            ParseErrorKind::FloatingDtstart,
            value_offset,
            value,
        ));
    }

    let zone = match tzid {
        Some((tzid_offset, zone)) if dtstart.is_utc() => {
            return Err(ParseError::new(
                ParseErrorKind::ZonedUtcDtstart,
                tzid_offset,
                zone,
            ));
        }
        Some((tzid_offset, zone)) => resolver.rule_zone(zone).map_err(|_e| {
            ParseError::new(ParseErrorKind::UnknownTimezone, tzid_offset, zone)
        })?,
        None => RuleZone::Utc,
    };

    Ok((dtstart, zone))
}

/// Parses `RRULE:<recur>`, also locating the UNTIL value in the full text.
fn parse_rrule_line(token: &str, offset: usize) -> ParseResult<(RRule, Option<Range<usize>>)> {
    let value = token
        .get(RRULE_PROPERTY.len()..)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidRRule, offset, token))?;
    let value_offset = offset + RRULE_PROPERTY.len() + 1;

    let rrule = parse_rrule(value, value_offset)?;

    let mut part_offset = value_offset;
    let mut until_span = None;
    for part in value.split(';') {
        if let Some((key, part_value)) = part.split_once('=')
            && key.eq_ignore_ascii_case(UNTIL_RULE_PART)
        {
            let start = part_offset + key.len() + 1;
            until_span = Some(start..start + part_value.len());
        }
        part_offset += part.len() + 1;
    }

    Ok((rrule, until_span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::{Frequency, RRuleUntil};

    #[test]
    fn parses_utc_rule() {
        let rule = parse_rule_text("DTSTART:20300112T210000Z RRULE:FREQ=DAILY;INTERVAL=1").unwrap();
        assert!(rule.dtstart().is_utc());
        assert_eq!(rule.zone(), &RuleZone::Utc);
        assert_eq!(rule.rrule().freq, Some(Frequency::Daily));
        assert_eq!(rule.until_span(), None);
    }

    #[test]
    fn parses_zoned_rule_across_newline() {
        let rule = parse_rule_text(
            "DTSTART;TZID=America/New_York:20300112T210000\nRRULE:FREQ=DAILY;INTERVAL=1",
        )
        .unwrap();
        assert_eq!(rule.zone().label(), "America/New_York");
        assert_eq!(rule.dtstart().tzid(), Some("America/New_York"));
    }

    #[test]
    fn shared_resolver_serves_repeated_zones() {
        let mut resolver = TimeZoneResolver::new();
        let first = parse_rule_text_with_resolver(
            "DTSTART;TZID=America/New_York:20300112T210000 RRULE:FREQ=DAILY",
            &mut resolver,
        )
        .unwrap();
        let second = parse_rule_text_with_resolver(
            "DTSTART;TZID=America/New_York:20300601T090000 RRULE:FREQ=WEEKLY",
            &mut resolver,
        )
        .unwrap();
        assert_eq!(first.zone(), second.zone());
        assert_eq!(
            resolver.resolve("America/New_York").unwrap(),
            chrono_tz::America::New_York
        );
    }

    #[test]
    fn property_names_are_case_insensitive() {
        let rule = parse_rule_text("dtstart:20300112T210000Z rrule:FREQ=WEEKLY").unwrap();
        assert_eq!(rule.rrule().freq, Some(Frequency::Weekly));
    }

    #[test]
    fn quoted_tzid() {
        let rule =
            parse_rule_text("DTSTART;TZID=\"Europe/Berlin\":20300112T210000 RRULE:FREQ=DAILY")
                .unwrap();
        assert_eq!(rule.zone().label(), "Europe/Berlin");
    }

    #[test]
    fn locates_until_value() {
        let text = "DTSTART:20300112T210000Z RRULE:FREQ=DAILY;UNTIL=20380601T170000;INTERVAL=1";
        let rule = parse_rule_text(text).unwrap();
        let span = rule.until_span().unwrap();
        assert_eq!(&text[span], "20380601T170000");
        assert!(matches!(rule.rrule().until, Some(RRuleUntil::DateTime(_))));
    }

    #[test]
    fn rejects_floating_dtstart() {
        let err = parse_rule_text("DTSTART:20300112T210000 RRULE:FREQ=DAILY").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::FloatingDtstart);
        assert_eq!(err.offset, 8);
    }

    #[test]
    fn rejects_tzid_with_utc_value() {
        let err = parse_rule_text("DTSTART;TZID=America/New_York:20300112T210000Z RRULE:FREQ=DAILY")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ZonedUtcDtstart);
    }

    #[test]
    fn rejects_unknown_timezone() {
        let err = parse_rule_text("DTSTART;TZID=Mars/Olympus_Mons:20300112T210000 RRULE:FREQ=DAILY")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownTimezone);
        assert_eq!(err.offset, 13);
        assert_eq!(err.context, "Mars/Olympus_Mons");
    }

    #[test]
    fn rejects_date_valued_dtstart() {
        let err =
            parse_rule_text("DTSTART;VALUE=DATE:20300112 RRULE:FREQ=DAILY").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidParameter);
    }

    #[test]
    fn missing_and_duplicate_lines() {
        assert_eq!(
            parse_rule_text("   ").unwrap_err().kind,
            ParseErrorKind::Empty
        );
        assert_eq!(
            parse_rule_text("RRULE:FREQ=DAILY").unwrap_err().kind,
            ParseErrorKind::MissingDtstart
        );
        assert_eq!(
            parse_rule_text("DTSTART:20300112T210000Z").unwrap_err().kind,
            ParseErrorKind::MissingRRule
        );
        assert_eq!(
            parse_rule_text("DTSTART:20300112T210000Z DTSTART:20300112T210000Z RRULE:FREQ=DAILY")
                .unwrap_err()
                .kind,
            ParseErrorKind::DuplicateDtstart
        );
        assert_eq!(
            parse_rule_text("DTSTART:20300112T210000Z RRULE:FREQ=DAILY RRULE:FREQ=WEEKLY")
                .unwrap_err()
                .kind,
            ParseErrorKind::DuplicateRRule
        );
    }

    #[test]
    fn rejects_stray_tokens() {
        let err = parse_rule_text("DTSTART:20300112T210000Z EXDATE:20300113T210000Z RRULE:FREQ=DAILY")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.offset, 25);
    }

    #[test]
    fn rrule_errors_point_into_full_text() {
        let err = parse_rule_text("DTSTART:20300112T210000Z RRULE:FREQ=DAILY;INTERVAL=0")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ValueOutOfRange);
        assert_eq!(err.offset, 51);
    }

    #[test]
    fn rejects_count_with_until() {
        let err = parse_rule_text(
            "DTSTART:20300112T210000Z RRULE:FREQ=DAILY;COUNT=2;UNTIL=20300201T000000Z",
        )
        .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UntilCountConflict);
    }
}
