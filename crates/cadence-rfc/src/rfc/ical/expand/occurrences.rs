//! Absolute occurrence sequences: candidates resolved through the rule's zone
//! and cut off by its bound.

use chrono::{DateTime, Duration, Utc};

use cadence_core::config::EngineConfig;

use super::candidates::CandidateIter;
use super::coerce::{Bound, NormalizedRule};
use super::timezone::{RuleZone, convert_to_utc};

const DEFAULT_MAX_EMPTY_PERIODS: u32 = 100_000;

/// Work bounds applied while generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorLimits {
    /// Consecutive candidate-free periods after which the sequence ends.
    pub max_empty_periods: u32,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS,
        }
    }
}

impl From<&EngineConfig> for GeneratorLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_empty_periods: config.max_empty_periods,
        }
    }
}

/// Lazy sequence of occurrence instants in ascending order.
///
/// Wall-clock candidates inside a DST gap are dropped without counting
/// towards COUNT; repeated wall-clock times resolve to the earlier instant.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    zone: &'a RuleZone,
    bound: Bound,
    candidates: CandidateIter<'a>,
    produced: u32,
    finished: bool,
}

impl Occurrences<'_> {
    /// Periods expanded so far. Periods jumped over by `seek` are not counted.
    #[must_use]
    pub const fn periods_visited(&self) -> u64 {
        self.candidates.periods_visited()
    }

    /// Moves the cursor to just before `reference` without expanding the
    /// periods in between.
    ///
    /// COUNT rules must be walked from the start, so this is a no-op for them.
    pub fn seek(&mut self, reference: DateTime<Utc>) {
        if matches!(self.bound, Bound::Count(_)) {
            return;
        }
        let local = self.zone.to_local(reference);
        let target = local
            .checked_sub_signed(Duration::days(1))
            .unwrap_or(local);
        self.candidates.seek(target);
    }
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Bound::Count(count) = self.bound
            && self.produced >= count
        {
            self.finished = true;
            return None;
        }

        for candidate in self.candidates.by_ref() {
            let instant = match convert_to_utc(candidate, self.zone) {
                Ok(instant) => instant,
                Err(error) => {
                    tracing::trace!(%candidate, %error, "Skipping candidate");
                    continue;
                }
            };

            if let Bound::Until(until) = self.bound
                && instant > until
            {
                self.finished = true;
                return None;
            }

            self.produced += 1;
            return Some(instant);
        }

        self.finished = true;
        None
    }
}

impl NormalizedRule {
    /// Starts a fresh occurrence sequence.
    #[must_use]
    pub fn occurrences(&self, limits: GeneratorLimits) -> Occurrences<'_> {
        Occurrences {
            zone: self.zone(),
            bound: self.bound(),
            candidates: self.expansion().candidates(limits.max_empty_periods),
            produced: 0,
            finished: false,
        }
    }

    /// At most `max_count` occurrences at or after `reference`.
    ///
    /// Rules without COUNT skip straight to the period holding `reference`.
    #[must_use]
    pub fn occurrences_at_or_after(
        &self,
        reference: DateTime<Utc>,
        max_count: usize,
        limits: GeneratorLimits,
    ) -> Vec<DateTime<Utc>> {
        let mut occurrences = self.occurrences(limits);
        occurrences.seek(reference);
        occurrences
            .skip_while(|instant| *instant < reference)
            .take(max_count)
            .collect()
    }

    /// Number of FREQ x INTERVAL periods between two instants.
    #[must_use]
    pub fn periods_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
        let expansion = self.expansion();
        let from = expansion.period_index_of(self.zone().to_local(from));
        let to = expansion.period_index_of(self.zone().to_local(to));
        to.saturating_sub(from)
    }
}
