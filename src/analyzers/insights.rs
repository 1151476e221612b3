//! Headline figures derived from the aggregate tables.

use crate::analyzers::types::{
    ByClass, CountTable, DurationStats, Insights, MonthTotal, WeekendShare,
};
use crate::analyzers::utility::pct;
use crate::model::{Month, TripRecord, UserClass};

/// How much longer the average casual trip is than the average member trip,
/// in percent of the member mean. Uses unrounded means; 0.0 if members have
/// no trips.
pub fn duration_gap_pct(durations: &ByClass<DurationStats>) -> f64 {
    let member = durations.member.mean;
    if durations.member.count == 0 || member == 0.0 {
        return 0.0;
    }
    (durations.casual.mean - member) / member * 100.0
}

pub fn weekend_pct(trips: &[TripRecord]) -> WeekendShare {
    let mut weekend: ByClass<usize> = ByClass::default();
    let mut total: ByClass<usize> = ByClass::default();

    for trip in trips {
        *total.get_mut(trip.user_class) += 1;
        if trip.is_weekend {
            *weekend.get_mut(trip.user_class) += 1;
        }
    }

    WeekendShare {
        casual: pct(weekend[UserClass::Casual], total[UserClass::Casual]),
        member: pct(weekend[UserClass::Member], total[UserClass::Member]),
    }
}

/// Busiest month across both classes; the earliest month wins a tie.
pub fn peak_month(by_month: &CountTable<Month>) -> Option<MonthTotal> {
    pick_month(by_month, |candidate, best| candidate > best)
}

/// Quietest month across both classes; the earliest month wins a tie.
pub fn low_month(by_month: &CountTable<Month>) -> Option<MonthTotal> {
    pick_month(by_month, |candidate, best| candidate < best)
}

fn pick_month(
    by_month: &CountTable<Month>,
    better: impl Fn(usize, usize) -> bool,
) -> Option<MonthTotal> {
    let any_trips = by_month.iter().any(|(_, row)| row.total() > 0);
    if !any_trips {
        return None;
    }

    let mut best: Option<MonthTotal> = None;
    for (month, row) in by_month.iter() {
        let trips = row.total();
        match best {
            Some(current) if !better(trips, current.trips) => {}
            _ => best = Some(MonthTotal { month, trips }),
        }
    }
    best
}

pub fn derive(
    trips: &[TripRecord],
    durations: &ByClass<DurationStats>,
    by_month: &CountTable<Month>,
) -> Insights {
    Insights {
        duration_gap_pct: duration_gap_pct(durations),
        weekend_pct: weekend_pct(trips),
        peak_month: peak_month(by_month),
        low_month: low_month(by_month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RideableType;
    use chrono::NaiveDate;

    fn stats(mean: f64, count: usize) -> DurationStats {
        DurationStats {
            mean,
            count,
            ..Default::default()
        }
    }

    #[test]
    fn test_duration_gap_pct() {
        let durations = ByClass {
            casual: stats(30.0, 10),
            member: stats(15.0, 10),
        };
        assert_eq!(duration_gap_pct(&durations), 100.0);
    }

    #[test]
    fn test_duration_gap_without_members() {
        let durations = ByClass {
            casual: stats(30.0, 10),
            member: stats(0.0, 0),
        };
        assert_eq!(duration_gap_pct(&durations), 0.0);
    }

    #[test]
    fn test_weekend_pct() {
        let saturday = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap().and_hms_opt(11, 0, 0).unwrap();
        let monday = NaiveDate::from_ymd_opt(2023, 4, 3).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let make = |id, class, at| {
            TripRecord::new(
                id,
                RideableType::Classic,
                at,
                "Estação_1".to_string(),
                "Estação_1".to_string(),
                class,
                12.0,
                2.4,
            )
        };
        let trips = vec![
            make(1, UserClass::Casual, saturday),
            make(2, UserClass::Casual, monday),
            make(3, UserClass::Member, monday),
            make(4, UserClass::Member, monday),
            make(5, UserClass::Member, monday),
            make(6, UserClass::Member, saturday),
        ];

        let share = weekend_pct(&trips);
        assert_eq!(share.casual, 50.0);
        assert_eq!(share.member, 25.0);
        assert_eq!(share.get(UserClass::Member), 25.0);
    }

    #[test]
    fn test_peak_and_low_month_prefer_earliest_on_tie() {
        let mut by_month: CountTable<Month> = CountTable::default();
        for month in [Month::March, Month::August] {
            for _ in 0..3 {
                by_month.increment(month, UserClass::Casual);
            }
        }
        let peak = peak_month(&by_month).unwrap();
        assert_eq!(peak.month, Month::March);
        assert_eq!(peak.trips, 3);

        let low = low_month(&by_month).unwrap();
        assert_eq!(low.month, Month::January);
        assert_eq!(low.trips, 0);
    }

    #[test]
    fn test_months_of_empty_table() {
        let by_month: CountTable<Month> = CountTable::default();
        assert!(peak_month(&by_month).is_none());
        assert!(low_month(&by_month).is_none());
    }
}
