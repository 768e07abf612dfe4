use anyhow::Result;
use config::Config;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

const DEFAULT_MAX_CANDIDATE_PERIODS: u64 = 1_000_000;
const DEFAULT_MAX_EMPTY_PERIODS: u32 = 100_000;
const DEFAULT_PREVIEW_COUNT: usize = 10;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Work bounds for occurrence generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest number of FREQ x INTERVAL periods the engine will cross to
    /// establish the next run or the final occurrence of a schedule.
    pub max_candidate_periods: u64,
    /// Consecutive periods without a single candidate after which a generator
    /// gives up (e.g. `BYMONTH=2;BYMONTHDAY=30`).
    pub max_empty_periods: u32,
    /// Default number of occurrences returned by a schedule preview.
    pub preview_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_candidate_periods: DEFAULT_MAX_CANDIDATE_PERIODS,
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS,
            preview_count: DEFAULT_PREVIEW_COUNT,
        }
    }
}

impl EngineConfig {
    /// ## Summary
    /// Checks that every bound is usable.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if a bound is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_candidate_periods == 0 {
            return Err(CoreError::ConfigError(
                "engine.max_candidate_periods must be greater than zero".to_string(),
            ));
        }
        if self.max_empty_periods == 0 {
            return Err(CoreError::ConfigError(
                "engine.max_empty_periods must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `config.toml` into `Settings`.
    ///
    /// Environment variables use the `CADENCE_` prefix and `__` between
    /// sections, e.g. `CADENCE_ENGINE__MAX_CANDIDATE_PERIODS=5000`.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the
    /// configuration fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("engine.max_candidate_periods", DEFAULT_MAX_CANDIDATE_PERIODS)?
            .set_default("engine.max_empty_periods", DEFAULT_MAX_EMPTY_PERIODS)?
            .set_default("engine.preview_count", u64::try_from(DEFAULT_PREVIEW_COUNT)?)?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name("config.toml").required(false))
            .add_source(
                config::Environment::with_prefix("CADENCE")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.engine.validate()?;
        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from the `.env` file, environment variables and
/// `config.toml`.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
