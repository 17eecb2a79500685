//! TOML configuration for the mutation core.
//!
//! ```toml
//! [recalc]
//! workers = 4
//!
//! [ordering]
//! precision_floor = 1e-9
//!
//! [filter]
//! utc_offset_minutes = 120
//! ```

use gridbase_core::ordering::DEFAULT_PRECISION_FLOOR;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;
use time::UtcOffset;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("recalc.workers must be at least 1")]
    ZeroWorkers,

    #[error("ordering.precision_floor must be positive and finite, got {value}")]
    InvalidPrecisionFloor { value: f64 },

    #[error("filter.utc_offset_minutes {minutes} is outside the valid offset range")]
    InvalidUtcOffset { minutes: i16 },
}

///
/// CoreConfig
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub recalc: RecalcConfig,
    pub ordering: OrderingConfig,
    pub filter: FilterConfig,
}

impl CoreConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        tracing::debug!(
            workers = config.recalc.workers,
            precision_floor = config.ordering.precision_floor,
            utc_offset_minutes = config.filter.utc_offset_minutes,
            "loaded mutation core config"
        );

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recalc.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }

        let floor = self.ordering.precision_floor;
        if !floor.is_finite() || floor <= 0.0 {
            return Err(ConfigError::InvalidPrecisionFloor { value: floor });
        }

        self.filter.utc_offset()?;

        Ok(())
    }
}

///
/// RecalcConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecalcConfig {
    /// Upper bound on threads used for bulk row recalculation; 1 runs
    /// sequentially.
    pub workers: usize,
}

impl Default for RecalcConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

///
/// OrderingConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderingConfig {
    pub precision_floor: f64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            precision_floor: DEFAULT_PRECISION_FLOOR,
        }
    }
}

///
/// FilterConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Offset used to resolve calendar-day literals when the caller does not
    /// supply one.
    pub utc_offset_minutes: i16,
}

impl FilterConfig {
    pub fn utc_offset(&self) -> Result<UtcOffset, ConfigError> {
        UtcOffset::from_whole_seconds(i32::from(self.utc_offset_minutes) * 60).map_err(|_| {
            ConfigError::InvalidUtcOffset {
                minutes: self.utc_offset_minutes,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("").expect("empty config should load");

        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.recalc.workers, 4);
        assert_eq!(config.ordering.precision_floor, DEFAULT_PRECISION_FLOOR);
        assert_eq!(config.filter.utc_offset().expect("valid"), UtcOffset::UTC);
    }

    #[test]
    fn sections_override_defaults() {
        let config = CoreConfig::from_toml_str(
            r"
            [recalc]
            workers = 8

            [filter]
            utc_offset_minutes = -300
            ",
        )
        .expect("config should load");

        assert_eq!(config.recalc.workers, 8);
        assert_eq!(config.ordering, OrderingConfig::default());
        assert_eq!(
            config.filter.utc_offset().expect("valid").whole_minutes(),
            -300
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            CoreConfig::from_toml_str("[recalc]\nworkers = 0"),
            Err(ConfigError::ZeroWorkers)
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("[ordering]\nprecision_floor = -1.0"),
            Err(ConfigError::InvalidPrecisionFloor { .. })
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("[filter]\nutc_offset_minutes = 2000"),
            Err(ConfigError::InvalidUtcOffset { minutes: 2000 })
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("[recalc]\nthreads = 2"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = CoreConfig::from_path("/nonexistent/gridbase.toml")
            .expect_err("missing file should fail");

        assert!(err.to_string().contains("/nonexistent/gridbase.toml"));
    }
}
