use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cadence_core::config::EngineConfig;
use cadence_core::constants::LOCAL_LABEL_FORMAT;

use super::compute::upcoming;
use super::model::Schedule;
use crate::error::ServiceResult;

/// One upcoming occurrence, absolute and as seen in the schedule's zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewOccurrence {
    pub instant: DateTime<Utc>,
    /// Wall-clock time in the schedule's zone, `YYYY-MM-DDTHH:MM:SS`.
    pub local: String,
}

impl Schedule {
    /// ## Summary
    /// Lists the next `count` occurrences at or after `reference`, whether or
    /// not the schedule is enabled.
    ///
    /// `count` falls back to `config.preview_count` when `None`.
    ///
    /// ## Errors
    /// Returns an error if the rule does not parse or is too dense to reach
    /// `reference`.
    #[tracing::instrument(skip(self, config), fields(name = %self.name()))]
    pub fn preview(
        &self,
        reference: DateTime<Utc>,
        count: Option<usize>,
        config: &EngineConfig,
    ) -> ServiceResult<Vec<PreviewOccurrence>> {
        let rule = self.rule()?;
        let count = count.unwrap_or(config.preview_count);

        let occurrences = upcoming(&rule, reference, count, config)?
            .into_iter()
            .map(|instant| PreviewOccurrence {
                instant,
                local: rule
                    .zone()
                    .to_local(instant)
                    .format(LOCAL_LABEL_FORMAT)
                    .to_string(),
            })
            .collect::<Vec<_>>();

        tracing::trace!(count = occurrences.len(), "Built schedule preview");
        Ok(occurrences)
    }
}
