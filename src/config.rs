//! Generator configuration: per-generator LCG parameters, start date, order
//! population and segment percentages.
//!
//! Loaded from a JSON file (see [`GeneratorConfig::load`]) and validated once,
//! before any record is produced.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lcg::{FloatLcgParams, LcgParams};

/// Largest population whose record count (at most 4 per order) fits in `u64`.
pub const MAX_TOTAL_ORDERS: u64 = u64::MAX / 4;

/// `dd.mm.yyyy HH:MM:SS`, used both to parse the start date and to render record dates.
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Configuration errors. All are reported before generation starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{generator}: modulus must be non-zero")]
    ZeroModulus { generator: &'static str },

    #[error("px_fill: {field} must be finite (modulus also positive), got {value}")]
    InvalidFloatParam { field: &'static str, value: f64 },

    #[error("invalid start date '{value}' (expected dd.mm.yyyy HH:MM:SS): {source}")]
    InvalidStartDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("segment percentages must sum to 100, got {0}")]
    SegmentPercentages(u64),

    #[error("segments.{band}: percentage must be at most 100, got {value}")]
    SegmentPercentOutOfRange { band: &'static str, value: u64 },

    #[error("total_orders must be at most {max}, got {value}")]
    TooManyOrders { max: u64, value: u64 },

    #[error("total_orders must be greater than zero")]
    NoOrders,
}

/// Side generator: LCG plus the inclusive SELL cutoff (defaults to `modulus / 2`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideParams {
    #[serde(flatten)]
    pub lcg: LcgParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_cutoff: Option<u64>,
}

impl SideParams {
    pub fn cutoff(&self) -> u64 {
        self.sell_cutoff.unwrap_or(self.lcg.modulus / 2)
    }
}

/// Volume fill takes its modulus from each order's initial volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeFillParams {
    pub multiplier: u64,
    pub increment: u64,
}

/// Date generator: own LCG state plus the clock origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParams {
    #[serde(flatten)]
    pub lcg: LcgParams,
    pub start_date: String,
}

/// Tag generator: `number` picks a matrix row per order, `tag` fills the matrix.
/// Both streams start from `seed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagParams {
    pub seed: u64,
    pub number: LcgParams,
    pub tag: LcgParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorParams {
    pub id: LcgParams,
    pub side: SideParams,
    pub instrument: LcgParams,
    pub status: LcgParams,
    pub px_fill: FloatLcgParams,
    pub volume_init: LcgParams,
    pub volume_fill: VolumeFillParams,
    pub date: DateParams,
    pub note: LcgParams,
    pub tags: TagParams,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            id: LcgParams::new(4_294_967_296, 65539, 0, 1),
            side: SideParams {
                lcg: LcgParams::new(100, 1, 3, 0),
                sell_cutoff: None,
            },
            instrument: LcgParams::new(13, 1, 3, 0),
            status: LcgParams::new(300, 7, 4, 0),
            px_fill: FloatLcgParams {
                modulus: 0.00101,
                multiplier: 0.0002,
                increment: 0.00032,
            },
            volume_init: LcgParams::new(1_000_000, 1000, 4_432_423, 0),
            volume_fill: VolumeFillParams {
                multiplier: 1000,
                increment: 4_432_423,
            },
            date: DateParams {
                lcg: LcgParams::new(1000, 12, 7, 1),
                start_date: "01.02.2021 0:00:00".into(),
            },
            note: LcgParams::new(13, 1, 3, 0),
            tags: TagParams {
                seed: 1,
                number: LcgParams::new(13, 1, 3, 0),
                tag: LcgParams::new(423_543, 1000, 43_232, 0),
            },
        }
    }
}

/// Share of the order population (in percent) per segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPercents {
    /// Orders created before recording started (first record not observed).
    pub created_before_recording: u64,
    /// Orders whose whole lifecycle was observed.
    pub created_and_done: u64,
    /// Orders completed after recording ended (DONE not observed).
    pub completed_after_recording: u64,
}

impl Default for SegmentPercents {
    fn default() -> Self {
        Self {
            created_before_recording: 30,
            created_and_done: 60,
            completed_after_recording: 10,
        }
    }
}

/// Logging settings consumed by the binary. Invalid levels fall back to `debug`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    pub append: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: None,
            append: true,
        }
    }
}

/// Full configuration. Same config ⇒ same record stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub total_orders: u64,
    #[serde(default)]
    pub segments: SegmentPercents,
    #[serde(default)]
    pub generators: GeneratorParams,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            total_orders: 2000,
            segments: SegmentPercents::default(),
            generators: GeneratorParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        Self::from_json(&data)
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every value the generators rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_orders == 0 {
            return Err(ConfigError::NoOrders);
        }
        if self.total_orders > MAX_TOTAL_ORDERS {
            return Err(ConfigError::TooManyOrders {
                max: MAX_TOTAL_ORDERS,
                value: self.total_orders,
            });
        }
        let g = &self.generators;
        let moduli = [
            ("id", g.id.modulus),
            ("side", g.side.lcg.modulus),
            ("instrument", g.instrument.modulus),
            ("status", g.status.modulus),
            ("volume_init", g.volume_init.modulus),
            ("date", g.date.lcg.modulus),
            ("note", g.note.modulus),
            ("tags.number", g.tags.number.modulus),
            ("tags.tag", g.tags.tag.modulus),
        ];
        if let Some((generator, _)) = moduli.iter().find(|(_, m)| *m == 0) {
            return Err(ConfigError::ZeroModulus {
                generator: *generator,
            });
        }
        let px = &g.px_fill;
        if !(px.modulus.is_finite() && px.modulus > 0.0) {
            return Err(ConfigError::InvalidFloatParam {
                field: "modulus",
                value: px.modulus,
            });
        }
        for (field, value) in [("multiplier", px.multiplier), ("increment", px.increment)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidFloatParam { field, value });
            }
        }
        let s = &self.segments;
        let percents = [
            ("created_before_recording", s.created_before_recording),
            ("created_and_done", s.created_and_done),
            ("completed_after_recording", s.completed_after_recording),
        ];
        if let Some((band, value)) = percents.iter().find(|(_, v)| *v > 100) {
            return Err(ConfigError::SegmentPercentOutOfRange {
                band: *band,
                value: *value,
            });
        }
        let sum: u64 = percents.iter().map(|(_, v)| v).sum();
        if sum != 100 {
            return Err(ConfigError::SegmentPercentages(sum));
        }
        self.start_date()?;
        Ok(())
    }

    /// Parsed clock origin for the date generator.
    pub fn start_date(&self) -> Result<NaiveDateTime, ConfigError> {
        let value = &self.generators.date.start_date;
        NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
            ConfigError::InvalidStartDate {
                value: value.clone(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GeneratorConfig::default();
        config.validate().unwrap();
        let start = config.start_date().unwrap();
        assert_eq!(start.format(DATE_FORMAT).to_string(), "01.02.2021 00:00:00");
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let config = GeneratorConfig::default();
        let json = config.to_json().unwrap();
        let parsed = GeneratorConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let config = GeneratorConfig::from_json(r#"{"total_orders": 10}"#).unwrap();
        assert_eq!(config.total_orders, 10);
        assert_eq!(config.generators, GeneratorParams::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn zero_modulus_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.generators.note.modulus = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ZeroModulus { generator: "note" }));
    }

    #[test]
    fn bad_float_modulus_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.generators.px_fill.modulus = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFloatParam { field: "modulus", .. })
        ));
        config.generators.px_fill.modulus = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unparsable_start_date_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.generators.date.start_date = "2021-02-01 00:00:00".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("2021-02-01"));
    }

    #[test]
    fn segment_percentages_must_sum_to_100() {
        let mut config = GeneratorConfig::default();
        config.segments.completed_after_recording = 20;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SegmentPercentages(110))
        ));
    }

    #[test]
    fn wrapping_segment_percentages_are_rejected() {
        let mut config = GeneratorConfig::default();
        config.segments.created_before_recording = u64::MAX;
        config.segments.created_and_done = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SegmentPercentOutOfRange {
                band: "created_before_recording",
                value: u64::MAX
            })
        ));

        let third = u64::MAX / 3 + 34;
        config.segments = SegmentPercents {
            created_before_recording: third,
            created_and_done: third,
            completed_after_recording: third,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_population_is_rejected() {
        let mut config = GeneratorConfig {
            total_orders: u64::MAX / 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyOrders { max: MAX_TOTAL_ORDERS, .. })
        ));
        config.total_orders = MAX_TOTAL_ORDERS;
        config.validate().unwrap();
    }

    #[test]
    fn zero_orders_is_rejected() {
        let config = GeneratorConfig {
            total_orders: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoOrders)));
    }

    #[test]
    fn side_cutoff_defaults_to_half_modulus() {
        let mut side = GeneratorParams::default().side;
        assert_eq!(side.cutoff(), 50);
        side.sell_cutoff = Some(10);
        assert_eq!(side.cutoff(), 10);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GeneratorConfig::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("exist.json"));
    }
}
