//! Computed-field derivation and the density guard.

use chrono::{DateTime, Utc};

use cadence_core::config::EngineConfig;
use cadence_rfc::rfc::ical::expand::{Bound, GeneratorLimits, NormalizedRule, Occurrences};

use super::model::{ComputedFields, Schedule};
use crate::error::{ServiceError, ServiceResult};

impl Schedule {
    /// ## Summary
    /// Recomputes the cached occurrence fields against `reference`.
    ///
    /// The rule text is parsed and coerced; on success the canonical text
    /// replaces it. Disabled schedules get no `next_run`.
    ///
    /// ## Errors
    /// Returns an error if:
    /// - the rule text does not parse or its start cannot be placed in time
    /// - the rule is too dense to reach `reference`, or a walk from the start
    ///   to its end crosses more than `config.max_candidate_periods` periods
    ///   (`ServiceError::Density`)
    /// - `config` is invalid or the schedule name is blank
    ///
    /// ## Side Effects
    /// On error the schedule is left unchanged.
    #[tracing::instrument(skip(self, config), fields(
        name = %self.name(),
        owner_id = %self.owner_id(),
        enabled = self.enabled()
    ))]
    pub fn recompute_fields(
        &mut self,
        reference: DateTime<Utc>,
        config: &EngineConfig,
    ) -> ServiceResult<()> {
        config.validate()?;
        if self.name().trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "schedule name must not be empty".to_string(),
            ));
        }

        let rule = self.rule()?;
        let computed = compute_fields(&rule, self.enabled(), reference, config)?;

        tracing::debug!(
            first_occurrence = ?computed.first_occurrence,
            next_run = ?computed.next_run,
            final_occurrence = ?computed.final_occurrence,
            "Recomputed schedule fields"
        );

        self.apply(rule.canonical_text(), computed);
        Ok(())
    }

    /// ## Summary
    /// Recomputes the cached occurrence fields against the current time.
    ///
    /// ## Errors
    /// See [`Schedule::recompute_fields`].
    pub fn update_computed_fields(&mut self, config: &EngineConfig) -> ServiceResult<()> {
        self.recompute_fields(Utc::now(), config)
    }
}

/// ## Summary
/// Derives first, next and final occurrences of `rule`.
///
/// ## Errors
/// Returns `ServiceError::Density` if reaching `reference`, or walking from the
/// start to the end, needs more than `config.max_candidate_periods` periods.
pub fn compute_fields(
    rule: &NormalizedRule,
    enabled: bool,
    reference: DateTime<Utc>,
    config: &EngineConfig,
) -> ServiceResult<ComputedFields> {
    let limits = GeneratorLimits::from(config);

    let Some(first_occurrence) = rule.occurrences(limits).next() else {
        tracing::debug!("Rule never fires");
        return Ok(ComputedFields::default());
    };

    let final_occurrence = final_occurrence(rule, config)?;
    let next_run = if enabled {
        upcoming(rule, reference, 1, config)?.into_iter().next()
    } else {
        None
    };

    Ok(ComputedFields {
        first_occurrence: Some(first_occurrence),
        next_run,
        final_occurrence,
    })
}

/// ## Summary
/// At most `count` occurrences at or after `reference`.
///
/// ## Errors
/// Returns `ServiceError::Density` if reaching `reference` needs more than
/// `config.max_candidate_periods` periods.
pub fn upcoming(
    rule: &NormalizedRule,
    reference: DateTime<Utc>,
    count: usize,
    config: &EngineConfig,
) -> ServiceResult<Vec<DateTime<Utc>>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let limits = GeneratorLimits::from(config);

    match rule.bound() {
        Bound::Count(_) => {
            let mut occurrences = rule.occurrences(limits);
            let mut found = Vec::new();
            while let Some(instant) = occurrences.next() {
                check_budget(occurrences.periods_visited(), config)?;
                if instant >= reference {
                    found.push(instant);
                    if found.len() == count {
                        break;
                    }
                }
            }
            Ok(found)
        }
        Bound::Until(until) => {
            check_budget(rule.periods_between(rule.start(), reference.min(until)), config)?;
            Ok(rule.occurrences_at_or_after(reference, count, limits))
        }
        Bound::Unbounded => {
            check_budget(rule.periods_between(rule.start(), reference), config)?;
            Ok(rule.occurrences_at_or_after(reference, count, limits))
        }
    }
}

/// ## Summary
/// Last occurrence of a bounded rule, `None` for unbounded ones.
///
/// ## Errors
/// Returns `ServiceError::Density` if the end has to be found by walking from
/// the start and that walk crosses more than `config.max_candidate_periods`
/// periods. UNTIL rules with an occurrence in the day before UNTIL never walk.
pub fn final_occurrence(
    rule: &NormalizedRule,
    config: &EngineConfig,
) -> ServiceResult<Option<DateTime<Utc>>> {
    let limits = GeneratorLimits::from(config);

    match rule.bound() {
        Bound::Unbounded => Ok(None),
        Bound::Count(_) => last_within_budget(rule.occurrences(limits), config),
        Bound::Until(until) => {
            let mut tail = rule.occurrences(limits);
            tail.seek(until);
            if let Some(last) = tail.last() {
                return Ok(Some(last));
            }
            // Nothing in the day before UNTIL, walk from the start
            last_within_budget(rule.occurrences(limits), config)
        }
    }
}

fn last_within_budget(
    mut occurrences: Occurrences<'_>,
    config: &EngineConfig,
) -> ServiceResult<Option<DateTime<Utc>>> {
    let mut last = None;
    while let Some(instant) = occurrences.next() {
        check_budget(occurrences.periods_visited(), config)?;
        last = Some(instant);
    }
    check_budget(occurrences.periods_visited(), config)?;
    Ok(last)
}

fn check_budget(periods: u64, config: &EngineConfig) -> ServiceResult<()> {
    let limit = config.max_candidate_periods;
    if periods > limit {
        tracing::warn!(periods, limit, "Rule too dense to evaluate");
        return Err(ServiceError::Density { periods, limit });
    }
    Ok(())
}
