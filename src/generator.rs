//! Seeded synthetic trip generator.
//!
//! All randomness comes from one `ChaCha8Rng` owned by [`TripGenerator`].
//! Each record consumes draws in a fixed order: user class, day, hour,
//! duration, minute, bike type, start station, end station, speed. The same
//! config therefore always yields the same table.

use chrono::{Datelike, Duration, NaiveDate};
use rand::distributions::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::config::{ConfigError, DurationProfile, GeneratorConfig, HourRange, SpeedRange};
use crate::model::{Category, DayOfWeek, RideableType, TripRecord, UserClass};

/// Lazily yields exactly `record_count` trips. Restart by building a new
/// generator from the same config.
pub struct TripGenerator {
    rng: ChaCha8Rng,
    next_id: u64,
    remaining: usize,
    start_date: NaiveDate,
    span_days: i64,
    casual_prior: f64,
    commute_hours: Vec<u32>,
    commute_dist: WeightedIndex<f64>,
    member_weekend_hours: HourRange,
    casual_hours: HourRange,
    member_duration: Normal<f64>,
    casual_duration: Normal<f64>,
    min_duration: f64,
    rideable_dist: WeightedIndex<f64>,
    speed: SpeedRange,
    stations: Vec<String>,
}

impl TripGenerator {
    /// Validates `config` and prepares the sampling distributions.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let commute_weights: Vec<f64> = config
            .member_commute_hours
            .iter()
            .map(|h| h.weight)
            .collect();
        let commute_dist = WeightedIndex::new(&commute_weights).map_err(|_| ConfigError::Weights {
            field: "member_commute_hours",
            sum: commute_weights.iter().sum(),
        })?;

        let rideable_weights = config.rideable_weights.as_array();
        let rideable_dist = WeightedIndex::new(rideable_weights).map_err(|_| ConfigError::Weights {
            field: "rideable_weights",
            sum: rideable_weights.iter().sum(),
        })?;

        let stations = (1..=config.station_count)
            .map(|n| format!("{}_{}", config.station_prefix, n))
            .collect();

        Ok(TripGenerator {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_id: 1,
            remaining: config.record_count,
            start_date: config.start_date,
            span_days: (config.end_date - config.start_date).num_days(),
            casual_prior: config.casual_prior,
            commute_hours: config.member_commute_hours.iter().map(|h| h.hour).collect(),
            commute_dist,
            member_weekend_hours: config.member_weekend_hours,
            casual_hours: config.casual_hours,
            member_duration: normal("member_duration", config.member_duration)?,
            casual_duration: normal("casual_duration", config.casual_duration)?,
            min_duration: config.min_duration_minutes,
            rideable_dist,
            speed: config.speed_km_per_minute,
            stations,
        })
    }
}

fn normal(field: &'static str, profile: DurationProfile) -> Result<Normal<f64>, ConfigError> {
    Normal::new(profile.mean, profile.std_dev).map_err(|_| ConfigError::DurationProfile {
        field,
        mean: profile.mean,
        std_dev: profile.std_dev,
    })
}

impl Iterator for TripGenerator {
    type Item = TripRecord;

    fn next(&mut self) -> Option<TripRecord> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let id = self.next_id;
        self.next_id += 1;

        let rng = &mut self.rng;

        let user_class = if rng.gen_bool(self.casual_prior) {
            UserClass::Casual
        } else {
            UserClass::Member
        };

        let day = self.start_date + Duration::days(rng.gen_range(0..=self.span_days));
        let weekend = DayOfWeek::from(day.weekday()).is_weekend();

        let (hour, duration) = match user_class {
            UserClass::Member => {
                let hour = if weekend {
                    rng.gen_range(self.member_weekend_hours.start..=self.member_weekend_hours.end)
                } else {
                    self.commute_hours[self.commute_dist.sample(rng)]
                };
                (hour, self.member_duration.sample(rng))
            }
            UserClass::Casual => {
                let hour = rng.gen_range(self.casual_hours.start..=self.casual_hours.end);
                (hour, self.casual_duration.sample(rng))
            }
        };
        // normal draws can go negative
        let duration_minutes = duration.max(self.min_duration);

        let minute = rng.gen_range(0..60);
        let started_at = day.and_hms_opt(hour, minute, 0)?;

        let rideable_type = RideableType::ALL[self.rideable_dist.sample(rng)];

        let start_station = self.stations[rng.gen_range(0..self.stations.len())].clone();
        let end_station = self.stations[rng.gen_range(0..self.stations.len())].clone();

        let distance_km = duration_minutes * rng.gen_range(self.speed.min..=self.speed.max);

        Some(TripRecord::new(
            id,
            rideable_type,
            started_at,
            start_station,
            end_station,
            user_class,
            duration_minutes,
            distance_km,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for TripGenerator {}

/// Generates the full trip table described by `config`.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the first invalid parameter; nothing is
/// generated in that case.
#[tracing::instrument(skip(config), fields(record_count = config.record_count, seed = config.seed))]
pub fn generate(config: &GeneratorConfig) -> Result<Vec<TripRecord>, ConfigError> {
    let trips: Vec<TripRecord> = TripGenerator::new(config)?.collect();

    info!(
        trips = trips.len(),
        start = %config.start_date,
        end = %config.end_date,
        "Trip table generated"
    );
    Ok(trips)
}
