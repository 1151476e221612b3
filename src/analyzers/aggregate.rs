use crate::analyzers::insights;
use crate::analyzers::types::{
    Analysis, ByClass, CountTable, DurationStats, Period, RideableShare,
};
use crate::analyzers::utility::{mean, median_sorted, stddev};
use crate::model::{Category, DayOfWeek, HourOfDay, Month, TripRecord, UserClass};
use tracing::{debug, info};

/// Counts `trips` into a zero-filled table keyed by `key`.
fn tally<K: Category>(trips: &[TripRecord], key: impl Fn(&TripRecord) -> K) -> CountTable<K> {
    let mut table = CountTable::default();
    for trip in trips {
        table.increment(key(trip), trip.user_class);
    }
    table
}

pub fn class_counts(trips: &[TripRecord]) -> ByClass<usize> {
    let mut counts = ByClass::default();
    for trip in trips {
        *counts.get_mut(trip.user_class) += 1;
    }
    counts
}

/// Duration statistics per class. A class without trips reports zeros and a
/// count of zero rather than being left out.
pub fn duration_stats(trips: &[TripRecord]) -> ByClass<DurationStats> {
    let mut series: ByClass<Vec<f64>> = ByClass::default();
    for trip in trips {
        series.get_mut(trip.user_class).push(trip.duration_minutes);
    }

    series.map(|_, values| {
        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);

        let avg = mean(&sorted);
        DurationStats {
            mean: avg,
            median: median_sorted(&sorted),
            min: sorted.first().copied().unwrap_or(0.0),
            max: sorted.last().copied().unwrap_or(0.0),
            std_dev: stddev(&sorted, avg),
            count: sorted.len(),
        }
    })
}

pub fn trips_by_weekday(trips: &[TripRecord]) -> CountTable<DayOfWeek> {
    tally(trips, |t| t.day_of_week)
}

pub fn trips_by_hour(trips: &[TripRecord]) -> CountTable<HourOfDay> {
    tally(trips, |t| t.hour_of_day)
}

pub fn trips_by_month(trips: &[TripRecord]) -> CountTable<Month> {
    tally(trips, |t| t.month)
}

pub fn rideable_share(trips: &[TripRecord]) -> RideableShare {
    RideableShare {
        counts: tally(trips, |t| t.rideable_type),
    }
}

/// First and last start time. `None` for an empty table.
pub fn period(trips: &[TripRecord]) -> Option<Period> {
    let first_start = trips.iter().map(|t| t.started_at).min()?;
    let last_start = trips.iter().map(|t| t.started_at).max()?;

    Some(Period {
        first_start,
        last_start,
        days: (last_start - first_start).num_days(),
    })
}

pub fn average_distance(trips: &[TripRecord]) -> Option<f64> {
    if trips.is_empty() {
        return None;
    }
    let distances: Vec<f64> = trips.iter().map(|t| t.distance_km).collect();
    Some(mean(&distances))
}

impl Analysis {
    /// Runs every aggregate over `trips`. The input is only read.
    #[tracing::instrument(skip(trips), fields(trip_count = trips.len()))]
    pub fn from_trips(trips: &[TripRecord]) -> Analysis {
        let class_counts = class_counts(trips);
        let durations = duration_stats(trips);
        let by_weekday = trips_by_weekday(trips);
        let by_hour = trips_by_hour(trips);
        let rideable = rideable_share(trips);
        let by_month = trips_by_month(trips);

        let insights = insights::derive(trips, &durations, &by_month);
        debug!(?insights, "Insights derived");

        info!(
            casual = class_counts[UserClass::Casual],
            member = class_counts[UserClass::Member],
            "Aggregation complete"
        );

        Analysis {
            total_trips: trips.len(),
            class_counts,
            period: period(trips),
            durations,
            by_weekday,
            by_hour,
            rideable,
            by_month,
            insights,
            avg_distance_km: average_distance(trips),
        }
    }
}
