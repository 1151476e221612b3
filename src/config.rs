//! Run parameters for the trip generator.
//!
//! Defaults reproduce the reference run: 100,000 trips across 2023, seed 42.
//! A JSON file may override any subset of fields:
//! ```json
//! { "record_count": 5000, "seed": 7, "casual_prior": 0.4 }
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance when checking that a weight vector sums to one.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Upper bound for duration means, spreads and the duration floor, in
/// minutes. Keeps every sampled `ended_at` far inside chrono's range.
pub const MAX_DURATION_MINUTES: f64 = 1440.0;

/// Rejected generator parameter. Every variant names the offending field.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("record_count must be positive, got {0}")]
    RecordCount(usize),

    #[error("date range is empty: end_date {end} precedes start_date {start}")]
    EmptyDateRange { start: NaiveDate, end: NaiveDate },

    #[error("casual_prior must be a probability in [0, 1], got {0}")]
    ClassPrior(f64),

    #[error("{field} weights must be non-negative and sum to 1, got sum {sum}")]
    Weights { field: &'static str, sum: f64 },

    #[error("{field} must not be empty")]
    EmptyWeights { field: &'static str },

    #[error("{field} contains hour {hour}, outside 0..=23")]
    Hour { field: &'static str, hour: u32 },

    #[error("{field} {start}..={end} is not a valid hour range within 0..=23")]
    HourRange {
        field: &'static str,
        start: u32,
        end: u32,
    },

    #[error(
        "{field} needs mean and std_dev in (0, {max}] minutes, got mean {mean}, std_dev {std_dev}",
        max = MAX_DURATION_MINUTES
    )]
    DurationProfile {
        field: &'static str,
        mean: f64,
        std_dev: f64,
    },

    #[error(
        "min_duration_minutes must be within 1..={max} minutes, got {0}",
        max = MAX_DURATION_MINUTES
    )]
    MinDuration(f64),

    #[error("speed_km_per_minute must satisfy 0 < min <= max, got {min}..={max}")]
    SpeedRange { min: f64, max: f64 },

    #[error("station_count must be positive")]
    StationCount,
}

/// Inclusive range of start hours drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.start > self.end || self.end > 23 {
            return Err(ConfigError::HourRange {
                field,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Normal distribution of trip duration in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationProfile {
    pub mean: f64,
    pub std_dev: f64,
}

impl DurationProfile {
    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        let within = |v: f64| v > 0.0 && v <= MAX_DURATION_MINUTES;
        if !within(self.mean) || !within(self.std_dev) {
            return Err(ConfigError::DurationProfile {
                field,
                mean: self.mean,
                std_dev: self.std_dev,
            });
        }
        Ok(())
    }
}

/// Weighted start hour used for members on weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourWeight {
    pub hour: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RideableWeights {
    pub classic: f64,
    pub electric: f64,
    pub docked: f64,
}

impl RideableWeights {
    /// Weights in `RideableType::ALL` order.
    pub fn as_array(&self) -> [f64; 3] {
        [self.classic, self.electric, self.docked]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub record_count: usize,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub seed: u64,
    /// Probability that a trip belongs to a casual rider.
    pub casual_prior: f64,
    pub member_commute_hours: Vec<HourWeight>,
    pub member_weekend_hours: HourRange,
    pub casual_hours: HourRange,
    pub member_duration: DurationProfile,
    pub casual_duration: DurationProfile,
    pub min_duration_minutes: f64,
    pub rideable_weights: RideableWeights,
    /// Distance is duration times a per-trip draw from this range.
    pub speed_km_per_minute: SpeedRange,
    pub station_count: u32,
    pub station_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            record_count: 100_000,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            seed: 42,
            casual_prior: 0.35,
            member_commute_hours: [
                (7, 0.20),
                (8, 0.25),
                (9, 0.15),
                (17, 0.15),
                (18, 0.15),
                (19, 0.10),
            ]
            .into_iter()
            .map(|(hour, weight)| HourWeight { hour, weight })
            .collect(),
            member_weekend_hours: HourRange { start: 10, end: 17 },
            casual_hours: HourRange { start: 10, end: 19 },
            member_duration: DurationProfile {
                mean: 15.0,
                std_dev: 5.0,
            },
            casual_duration: DurationProfile {
                mean: 30.0,
                std_dev: 15.0,
            },
            min_duration_minutes: 3.0,
            rideable_weights: RideableWeights {
                classic: 0.5,
                electric: 0.4,
                docked: 0.1,
            },
            speed_km_per_minute: SpeedRange {
                min: 0.15,
                max: 0.25,
            },
            station_count: 50,
            station_prefix: "Estação".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Loads a config from a JSON file. Fields left out keep their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config: GeneratorConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file '{path}'"))?;
        Ok(config)
    }

    /// Checks every parameter before any record is generated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record_count == 0 {
            return Err(ConfigError::RecordCount(self.record_count));
        }

        if self.end_date < self.start_date {
            return Err(ConfigError::EmptyDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        if !(0.0..=1.0).contains(&self.casual_prior) {
            return Err(ConfigError::ClassPrior(self.casual_prior));
        }

        if self.member_commute_hours.is_empty() {
            return Err(ConfigError::EmptyWeights {
                field: "member_commute_hours",
            });
        }
        if let Some(bad) = self.member_commute_hours.iter().find(|h| h.hour > 23) {
            return Err(ConfigError::Hour {
                field: "member_commute_hours",
                hour: bad.hour,
            });
        }
        let commute: Vec<f64> = self.member_commute_hours.iter().map(|h| h.weight).collect();
        check_weights("member_commute_hours", &commute)?;

        self.member_weekend_hours.validate("member_weekend_hours")?;
        self.casual_hours.validate("casual_hours")?;

        self.member_duration.validate("member_duration")?;
        self.casual_duration.validate("casual_duration")?;

        // ended_at is truncated to whole minutes, so a floor under one minute
        // could put it on started_at
        if !(1.0..=MAX_DURATION_MINUTES).contains(&self.min_duration_minutes) {
            return Err(ConfigError::MinDuration(self.min_duration_minutes));
        }

        check_weights("rideable_weights", &self.rideable_weights.as_array())?;

        let speed = self.speed_km_per_minute;
        if !(speed.min > 0.0 && speed.min <= speed.max && speed.max.is_finite()) {
            return Err(ConfigError::SpeedRange {
                min: speed.min,
                max: speed.max,
            });
        }

        if self.station_count == 0 {
            return Err(ConfigError::StationCount);
        }

        Ok(())
    }
}

fn check_weights(field: &'static str, weights: &[f64]) -> Result<(), ConfigError> {
    let sum: f64 = weights.iter().sum();
    let all_valid = weights.iter().all(|w| w.is_finite() && *w >= 0.0);
    if !all_valid || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ConfigError::Weights { field, sum });
    }
    Ok(())
}
