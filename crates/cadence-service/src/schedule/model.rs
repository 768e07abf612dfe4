use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cadence_core::types::OwnerId;
use cadence_rfc::rfc::ical::expand::NormalizedRule;

use crate::error::ServiceResult;

/// Cached occurrence fields derived from a schedule's rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedFields {
    /// First occurrence of the rule, `None` if it never fires.
    pub first_occurrence: Option<DateTime<Utc>>,
    /// First occurrence at or after the reference instant.
    pub next_run: Option<DateTime<Utc>>,
    /// Last occurrence, `None` if the rule never ends or never fires.
    pub final_occurrence: Option<DateTime<Utc>>,
}

/// A named recurrence attached to an owning unit of work.
///
/// The rule text is the source of truth. Computed fields are only written by
/// [`Schedule::recompute_fields`] and are stale after any setter until the
/// next recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    name: String,
    rule_text: String,
    owner_id: OwnerId,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    description: String,
    #[serde(flatten)]
    computed: ComputedFields,
}

const fn default_enabled() -> bool {
    true
}

impl Schedule {
    #[must_use]
    pub fn new(name: impl Into<String>, rule_text: impl Into<String>, owner_id: OwnerId) -> Self {
        Self {
            name: name.into(),
            rule_text: rule_text.into(),
            owner_id,
            enabled: true,
            description: String::new(),
            computed: ComputedFields::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule text, canonical once the schedule has been recomputed.
    #[must_use]
    pub fn rule_text(&self) -> &str {
        &self.rule_text
    }

    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn computed(&self) -> ComputedFields {
        self.computed
    }

    #[must_use]
    pub const fn first_occurrence(&self) -> Option<DateTime<Utc>> {
        self.computed.first_occurrence
    }

    #[must_use]
    pub const fn next_run(&self) -> Option<DateTime<Utc>> {
        self.computed.next_run
    }

    #[must_use]
    pub const fn final_occurrence(&self) -> Option<DateTime<Utc>> {
        self.computed.final_occurrence
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_rule_text(&mut self, rule_text: impl Into<String>) {
        self.rule_text = rule_text.into();
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// ## Summary
    /// Start TZID as written in the rule, or `UTC`.
    ///
    /// ## Errors
    /// Returns an error if the rule text does not parse.
    pub fn timezone_label(&self) -> ServiceResult<String> {
        Ok(self.rule()?.timezone_label().to_string())
    }

    /// ## Summary
    /// End boundary as `YYYY-MM-DDTHH:MM:SS` wall-clock time in the rule's
    /// zone, or an empty string when the rule has no UNTIL.
    ///
    /// ## Errors
    /// Returns an error if the rule text does not parse.
    pub fn until_label(&self) -> ServiceResult<String> {
        Ok(self.rule()?.until_label())
    }

    pub(super) fn rule(&self) -> ServiceResult<NormalizedRule> {
        Ok(NormalizedRule::parse(&self.rule_text)?)
    }

    pub(super) fn apply(&mut self, rule_text: &str, computed: ComputedFields) {
        rule_text.clone_into(&mut self.rule_text);
        self.computed = computed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_schedule_has_no_computed_fields() {
        let schedule = Schedule::new(
            "nightly",
            "DTSTART:20300112T210000Z RRULE:FREQ=DAILY",
            OwnerId::random(),
        );
        assert!(schedule.enabled());
        assert_eq!(schedule.description(), "");
        assert_eq!(schedule.computed(), ComputedFields::default());
    }

    #[test]
    fn labels_come_from_rule() {
        let schedule = Schedule::new(
            "nightly",
            "DTSTART;TZID=America/New_York:20380601T120000 RRULE:FREQ=HOURLY;INTERVAL=1;UNTIL=20380601T220000Z",
            OwnerId::random(),
        );
        assert_eq!(schedule.timezone_label().unwrap(), "America/New_York");
        // 22:00Z is 18:00 EDT
        assert_eq!(schedule.until_label().unwrap(), "2038-06-01T18:00:00");
    }

    #[test]
    fn labels_fail_on_bad_rule() {
        let schedule = Schedule::new("broken", "RRULE:FREQ=DAILY", OwnerId::random());
        assert!(schedule.timezone_label().is_err());
    }

    #[test]
    fn setters_replace_fields() {
        let mut schedule = Schedule::new(
            "nightly",
            "DTSTART:20300112T210000Z RRULE:FREQ=DAILY",
            OwnerId::random(),
        );
        schedule.set_name("weekly");
        schedule.set_description("Runs on Mondays");
        schedule.set_rule_text("DTSTART:20300112T210000Z RRULE:FREQ=WEEKLY;BYDAY=MO");
        schedule.set_enabled(false);

        assert_eq!(schedule.name(), "weekly");
        assert_eq!(schedule.description(), "Runs on Mondays");
        assert_eq!(
            schedule.rule_text(),
            "DTSTART:20300112T210000Z RRULE:FREQ=WEEKLY;BYDAY=MO"
        );
        assert!(!schedule.enabled());
    }

    #[test]
    fn serde_round_trip_keeps_computed_fields_flat() {
        let owner = OwnerId::random();
        let schedule = Schedule::new("nightly", "DTSTART:20300112T210000Z RRULE:FREQ=DAILY", owner)
            .with_description("Runs every night");
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["name"], "nightly");
        assert_eq!(json["owner_id"], owner.to_string());
        assert!(json["next_run"].is_null());

        let back: Schedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, schedule);
    }

    #[test]
    fn missing_enabled_defaults_to_true() {
        let json = serde_json::json!({
            "name": "nightly",
            "rule_text": "DTSTART:20300112T210000Z RRULE:FREQ=DAILY",
            "owner_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        });
        let schedule: Schedule = serde_json::from_value(json).unwrap();
        assert!(schedule.enabled());
        assert_eq!(schedule.next_run(), None);
    }
}
