use cadence_core::config::EngineConfig;
use cadence_core::types::OwnerId;
use chrono::{DateTime, Utc};

use super::{Schedule, ServiceError};

pub enum Expected {
    Fields {
        first: Option<&'static str>,
        next: Option<&'static str>,
        last: Option<&'static str>,
    },
    Density,
    Rejected,
}

pub struct ScheduleCase {
    pub name: &'static str,
    pub rule: &'static str,
    pub reference: &'static str,
    pub enabled: bool,
    pub expected: Expected,
    pub timezone: Option<&'static str>,
    pub until: Option<&'static str>,
    pub canonical_suffix: Option<&'static str>,
}

const REFERENCE: &str = "2026-01-01T00:00:00Z";

#[expect(clippy::too_many_lines)]
pub fn schedule_cases() -> Vec<ScheduleCase> {
    vec![
        ScheduleCase {
            name: "repeats_forever",
            rule: "DTSTART:20300112T210000Z RRULE:FREQ=DAILY;INTERVAL=1",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-01-12T21:00:00Z"),
                next: Some("2030-01-12T21:00:00Z"),
                last: None,
            },
            timezone: Some("UTC"),
            until: Some(""),
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "no_recurrence_utc",
            rule: "DTSTART:20300112T210000Z RRULE:FREQ=DAILY;INTERVAL=1;COUNT=1",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-01-12T21:00:00Z"),
                next: Some("2030-01-12T21:00:00Z"),
                last: Some("2030-01-12T21:00:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "no_recurrence_est",
            rule: "DTSTART;TZID=America/New_York:20300112T210000 RRULE:FREQ=DAILY;INTERVAL=1;COUNT=1",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-01-13T02:00:00Z"),
                next: Some("2030-01-13T02:00:00Z"),
                last: Some("2030-01-13T02:00:00Z"),
            },
            timezone: Some("America/New_York"),
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "next_run_utc",
            rule: "DTSTART:20300112T210000Z RRULE:FREQ=MONTHLY;INTERVAL=1;BYDAY=SA;BYSETPOS=1;COUNT=4",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-02-02T21:00:00Z"),
                next: Some("2030-02-02T21:00:00Z"),
                last: Some("2030-05-04T21:00:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "next_run_est",
            rule: "DTSTART;TZID=America/New_York:20300112T210000 RRULE:FREQ=MONTHLY;INTERVAL=1;BYDAY=SA;BYSETPOS=1;COUNT=4",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-02-03T02:00:00Z"),
                next: Some("2030-02-03T02:00:00Z"),
                last: Some("2030-05-05T01:00:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "year_boundary",
            rule: "DTSTART;TZID=America/New_York:20301231T230000 RRULE:FREQ=YEARLY;INTERVAL=1;BYMONTH=12;BYMONTHDAY=31;COUNT=4",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2031-01-01T04:00:00Z"),
                next: Some("2031-01-01T04:00:00Z"),
                last: Some("2034-01-01T04:00:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "leap_year_day",
            rule: "DTSTART;TZID=America/New_York:20320229T050000 RRULE:FREQ=YEARLY;INTERVAL=1;BYMONTH=02;BYMONTHDAY=29;COUNT=2",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2032-02-29T10:00:00Z"),
                next: Some("2032-02-29T10:00:00Z"),
                last: Some("2036-02-29T10:00:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "utc_until_afternoon",
            rule: "DTSTART:20300601T120000Z RRULE:FREQ=DAILY;INTERVAL=1;UNTIL=20300602T170000Z",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-06-01T12:00:00Z"),
                next: Some("2030-06-01T12:00:00Z"),
                last: Some("2030-06-02T12:00:00Z"),
            },
            timezone: None,
            until: Some("2030-06-02T17:00:00"),
            canonical_suffix: Some("UNTIL=20300602T170000Z"),
        },
        ScheduleCase {
            name: "utc_until_midnight",
            rule: "DTSTART:20300601T120000Z RRULE:FREQ=DAILY;INTERVAL=1;UNTIL=20300602T000000Z",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-06-01T12:00:00Z"),
                next: Some("2030-06-01T12:00:00Z"),
                last: Some("2030-06-01T12:00:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "naive_until_utc_start",
            rule: "DTSTART:20380601T120000Z RRULE:FREQ=HOURLY;INTERVAL=1;UNTIL=20380601T170000",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2038-06-01T12:00:00Z"),
                next: Some("2038-06-01T12:00:00Z"),
                last: Some("2038-06-01T17:00:00Z"),
            },
            timezone: Some("UTC"),
            until: Some("2038-06-01T17:00:00"),
            canonical_suffix: Some("20380601T170000Z"),
        },
        ScheduleCase {
            name: "naive_until_zoned_start",
            rule: "DTSTART;TZID=America/New_York:20380601T120000 RRULE:FREQ=HOURLY;INTERVAL=1;UNTIL=20380601T170000",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2038-06-01T16:00:00Z"),
                next: Some("2038-06-01T16:00:00Z"),
                last: Some("2038-06-01T21:00:00Z"),
            },
            timezone: Some("America/New_York"),
            until: Some("2038-06-01T17:00:00"),
            canonical_suffix: Some("20380601T210000Z"),
        },
        ScheduleCase {
            name: "localized_utc_until",
            rule: "DTSTART;TZID=America/New_York:20380601T120000 RRULE:FREQ=HOURLY;INTERVAL=1;UNTIL=20380601T220000Z",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2038-06-01T16:00:00Z"),
                next: Some("2038-06-01T16:00:00Z"),
                last: Some("2038-06-01T22:00:00Z"),
            },
            timezone: Some("America/New_York"),
            until: Some("2038-06-01T18:00:00"),
            canonical_suffix: Some("20380601T220000Z"),
        },
        ScheduleCase {
            name: "empty_until_label",
            rule: "DTSTART;TZID=America/New_York:20380601T120000 RRULE:FREQ=HOURLY;INTERVAL=1",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2038-06-01T16:00:00Z"),
                next: Some("2038-06-01T16:00:00Z"),
                last: None,
            },
            timezone: Some("America/New_York"),
            until: Some(""),
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "utc_until_in_the_past",
            rule: "DTSTART:20180601T120000Z RRULE:FREQ=DAILY;INTERVAL=1;UNTIL=20150101T100000Z",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: None,
                next: None,
                last: None,
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "dst_phantom_hour",
            rule: "DTSTART;TZID=America/New_York:20300303T023000 RRULE:FREQ=WEEKLY;BYDAY=SU;INTERVAL=1;COUNT=3",
            reference: "2030-03-05T00:00:00Z",
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-03-03T07:30:00Z"),
                next: Some("2030-03-17T06:30:00Z"),
                last: Some("2030-03-24T06:30:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "beginning_of_time",
            rule: "DTSTART:19700101T000000Z RRULE:FREQ=MINUTELY;INTERVAL=1",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Density,
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "disabled_keeps_first_and_final",
            rule: "DTSTART:20300112T210000Z RRULE:FREQ=DAILY;INTERVAL=1;COUNT=3",
            reference: REFERENCE,
            enabled: false,
            expected: Expected::Fields {
                first: Some("2030-01-12T21:00:00Z"),
                next: None,
                last: Some("2030-01-14T21:00:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "dtstart_in_dst_gap",
            rule: "DTSTART;TZID=America/New_York:20300310T023000 RRULE:FREQ=WEEKLY;BYDAY=SU;COUNT=3",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-03-17T06:30:00Z"),
                next: Some("2030-03-17T06:30:00Z"),
                last: Some("2030-03-31T06:30:00Z"),
            },
            timezone: Some("America/New_York"),
            until: Some(""),
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "naive_until_in_dst_fold",
            rule: "DTSTART;TZID=America/New_York:20301101T013000 RRULE:FREQ=DAILY;UNTIL=20301103T013000",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-11-01T05:30:00Z"),
                next: Some("2030-11-01T05:30:00Z"),
                last: Some("2030-11-03T05:30:00Z"),
            },
            timezone: Some("America/New_York"),
            until: Some("2030-11-03T01:30:00"),
            canonical_suffix: Some("UNTIL=20301103T053000Z"),
        },
        ScheduleCase {
            name: "utc_until_in_second_fold_pass",
            rule: "DTSTART;TZID=America/New_York:20301101T013000 RRULE:FREQ=DAILY;UNTIL=20301103T063000Z",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-11-01T05:30:00Z"),
                next: Some("2030-11-01T05:30:00Z"),
                last: Some("2030-11-03T05:30:00Z"),
            },
            timezone: None,
            until: Some("2030-11-03T01:30:00"),
            canonical_suffix: Some("UNTIL=20301103T063000Z"),
        },
        ScheduleCase {
            name: "naive_until_at_end_of_calendar",
            rule: "DTSTART;TZID=America/New_York:20300101T000000 RRULE:FREQ=YEARLY;UNTIL=99991231T180000",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2030-01-01T05:00:00Z"),
                next: Some("2030-01-01T05:00:00Z"),
                last: Some("9999-01-01T05:00:00Z"),
            },
            timezone: None,
            until: Some("9999-12-31T18:00:00"),
            canonical_suffix: Some("UNTIL=99991231T230000Z"),
        },
        ScheduleCase {
            name: "naive_until_past_end_of_calendar",
            rule: "DTSTART;TZID=America/New_York:20300101T000000 RRULE:FREQ=YEARLY;UNTIL=99991231T230000",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Rejected,
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
        ScheduleCase {
            name: "long_minutely_until",
            rule: "DTSTART:20260101T000000Z RRULE:FREQ=MINUTELY;UNTIL=20280101T000000Z",
            reference: REFERENCE,
            enabled: true,
            expected: Expected::Fields {
                first: Some("2026-01-01T00:00:00Z"),
                next: Some("2026-01-01T00:00:00Z"),
                last: Some("2028-01-01T00:00:00Z"),
            },
            timezone: None,
            until: None,
            canonical_suffix: None,
        },
    ]
}

fn instant(value: &str) -> DateTime<Utc> {
    value
        .parse()
        .unwrap_or_else(|err| panic!("Failed to parse instant {value}: {err}"))
}

pub fn assert_case(case: &ScheduleCase) {
    let mut schedule =
        Schedule::new("Some Schedule", case.rule, OwnerId::random()).with_enabled(case.enabled);
    let result = schedule.recompute_fields(instant(case.reference), &EngineConfig::default());

    match &case.expected {
        Expected::Density => {
            assert!(
                matches!(result, Err(ServiceError::Density { .. })),
                "Case {} expected a density error, got {result:?}",
                case.name
            );
            return;
        }
        Expected::Rejected => {
            assert!(
                matches!(result, Err(ServiceError::RfcError(_))),
                "Case {} expected the rule to be rejected, got {result:?}",
                case.name
            );
            assert_eq!(schedule.rule_text(), case.rule, "Case {} rule text", case.name);
            return;
        }
        Expected::Fields { first, next, last } => {
            if let Err(err) = result {
                panic!("Case {} failed to recompute: {err}", case.name);
            }
            assert_eq!(
                schedule.first_occurrence(),
                first.map(instant),
                "Case {} first occurrence",
                case.name
            );
            assert_eq!(
                schedule.next_run(),
                next.map(instant),
                "Case {} next run",
                case.name
            );
            assert_eq!(
                schedule.final_occurrence(),
                last.map(instant),
                "Case {} final occurrence",
                case.name
            );
        }
    }

    if let Some(timezone) = case.timezone {
        assert_eq!(
            schedule.timezone_label().ok().as_deref(),
            Some(timezone),
            "Case {} timezone label",
            case.name
        );
    }
    if let Some(until) = case.until {
        assert_eq!(
            schedule.until_label().ok().as_deref(),
            Some(until),
            "Case {} until label",
            case.name
        );
    }
    if let Some(suffix) = case.canonical_suffix {
        assert!(
            schedule.rule_text().ends_with(suffix),
            "Case {} canonical text {} should end with {suffix}",
            case.name,
            schedule.rule_text()
        );
    }
}
