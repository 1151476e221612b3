//! Aggregate tables produced by the analysis pipeline.
//!
//! Values are kept unrounded in memory. Serialization rounds floats to two
//! decimals for the presentation layer.

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::marker::PhantomData;
use std::ops::Index;

use crate::analyzers::utility::pct;
use crate::format::{minute_timestamp, round2, round2_opt};
use crate::model::{Category, DayOfWeek, HourOfDay, Month, RideableType, UserClass};

/// One value per user class.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct ByClass<T> {
    pub casual: T,
    pub member: T,
}

impl<T> ByClass<T> {
    pub fn get(&self, class: UserClass) -> &T {
        match class {
            UserClass::Casual => &self.casual,
            UserClass::Member => &self.member,
        }
    }

    pub fn get_mut(&mut self, class: UserClass) -> &mut T {
        match class {
            UserClass::Casual => &mut self.casual,
            UserClass::Member => &mut self.member,
        }
    }

    /// Pairs in `UserClass::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (UserClass, &T)> {
        UserClass::ALL.iter().map(move |&class| (class, self.get(class)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(UserClass, &T) -> U) -> ByClass<U> {
        ByClass {
            casual: f(UserClass::Casual, &self.casual),
            member: f(UserClass::Member, &self.member),
        }
    }
}

impl<T> Index<UserClass> for ByClass<T> {
    type Output = T;

    fn index(&self, class: UserClass) -> &T {
        self.get(class)
    }
}

impl ByClass<usize> {
    pub fn total(&self) -> usize {
        self.casual + self.member
    }
}

/// Duration statistics, in minutes, for one user class.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct DurationStats {
    #[serde(serialize_with = "round2::serialize")]
    pub mean: f64,
    #[serde(serialize_with = "round2::serialize")]
    pub median: f64,
    #[serde(serialize_with = "round2::serialize")]
    pub min: f64,
    #[serde(serialize_with = "round2::serialize")]
    pub max: f64,
    #[serde(serialize_with = "round2::serialize")]
    pub std_dev: f64,
    pub count: usize,
}

/// Trip counts per (category, user class). Every category in `K::ALL` has a
/// row, zero-filled when no trip matched.
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable<K: Category> {
    rows: Vec<ByClass<usize>>,
    _key: PhantomData<K>,
}

impl<K: Category> Default for CountTable<K> {
    fn default() -> Self {
        CountTable {
            rows: vec![ByClass::default(); K::ALL.len()],
            _key: PhantomData,
        }
    }
}

impl<K: Category> CountTable<K> {
    pub fn increment(&mut self, key: K, class: UserClass) {
        *self.rows[key.index()].get_mut(class) += 1;
    }

    pub fn get(&self, key: K, class: UserClass) -> usize {
        self.rows[key.index()][class]
    }

    /// Trips for `key` across both classes.
    pub fn total(&self, key: K) -> usize {
        self.rows[key.index()].total()
    }

    /// Trips for `class` across every category.
    pub fn class_total(&self, class: UserClass) -> usize {
        self.rows.iter().map(|row| row[class]).sum()
    }

    /// Rows in the fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &ByClass<usize>)> {
        K::ALL.iter().copied().zip(self.rows.iter())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `n` categories with the most trips for `class`. Ties keep the
    /// earlier category first.
    pub fn top(&self, class: UserClass, n: usize) -> Vec<(K, usize)> {
        let mut ranked: Vec<(K, usize)> = self.iter().map(|(key, row)| (key, row[class])).collect();
        // stable sort keeps category order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

#[derive(serde::Serialize)]
struct CountRow {
    key: String,
    casual: usize,
    member: usize,
}

impl<K: Category> Serialize for CountTable<K> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(self.iter().map(|(key, row)| CountRow {
            key: key.to_string(),
            casual: row.casual,
            member: row.member,
        }))
    }
}

/// Bike-type preference per user class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideableShare {
    pub counts: CountTable<RideableType>,
}

impl RideableShare {
    /// Percentage of `class` trips made on `kind`. Sums to 100 over all
    /// kinds whenever the class has any trips.
    pub fn percent(&self, class: UserClass, kind: RideableType) -> f64 {
        pct(self.counts.get(kind, class), self.counts.class_total(class))
    }
}

#[derive(serde::Serialize)]
struct ShareRow {
    rideable_type: RideableType,
    trips: usize,
    #[serde(serialize_with = "round2::serialize")]
    percent: f64,
}

impl Serialize for RideableShare {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(UserClass::ALL.len()))?;
        for &class in UserClass::ALL {
            let rows: Vec<ShareRow> = RideableType::ALL
                .iter()
                .map(|&kind| ShareRow {
                    rideable_type: kind,
                    trips: self.counts.get(kind, class),
                    percent: self.percent(class, kind),
                })
                .collect();
            map.serialize_entry(&class, &rows)?;
        }
        map.end()
    }
}

/// Span of observed start times.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Period {
    #[serde(with = "minute_timestamp")]
    pub first_start: NaiveDateTime,
    #[serde(with = "minute_timestamp")]
    pub last_start: NaiveDateTime,
    pub days: i64,
}

/// A month together with its trip total across both classes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MonthTotal {
    pub month: Month,
    pub trips: usize,
}

/// Scalars derived from the aggregate tables for the narrative report.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Insights {
    /// How much longer casual trips are than member trips, in percent.
    #[serde(serialize_with = "round2::serialize")]
    pub duration_gap_pct: f64,
    pub weekend_pct: WeekendShare,
    pub peak_month: Option<MonthTotal>,
    pub low_month: Option<MonthTotal>,
}

/// Percent of each class's trips that fall on Saturday or Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct WeekendShare {
    #[serde(serialize_with = "round2::serialize")]
    pub casual: f64,
    #[serde(serialize_with = "round2::serialize")]
    pub member: f64,
}

impl WeekendShare {
    pub fn get(&self, class: UserClass) -> f64 {
        match class {
            UserClass::Casual => self.casual,
            UserClass::Member => self.member,
        }
    }
}

/// Every aggregate of one trip table, ready for rendering.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Analysis {
    pub total_trips: usize,
    pub class_counts: ByClass<usize>,
    pub period: Option<Period>,
    pub durations: ByClass<DurationStats>,
    pub by_weekday: CountTable<DayOfWeek>,
    pub by_hour: CountTable<HourOfDay>,
    pub rideable: RideableShare,
    pub by_month: CountTable<Month>,
    pub insights: Insights,
    #[serde(serialize_with = "round2_opt")]
    pub avg_distance_km: Option<f64>,
}

impl Analysis {
    /// Share of all trips made by `class`, in percent.
    pub fn class_pct(&self, class: UserClass) -> f64 {
        pct(self.class_counts[class], self.total_trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_table_is_zero_filled() {
        let table: CountTable<DayOfWeek> = CountTable::default();
        assert_eq!(table.len(), 7);
        assert!(table.iter().all(|(_, row)| row.total() == 0));
    }

    #[test]
    fn test_count_table_increment_and_totals() {
        let mut table: CountTable<Month> = CountTable::default();
        table.increment(Month::March, UserClass::Casual);
        table.increment(Month::March, UserClass::Member);
        table.increment(Month::July, UserClass::Member);

        assert_eq!(table.get(Month::March, UserClass::Casual), 1);
        assert_eq!(table.total(Month::March), 2);
        assert_eq!(table.class_total(UserClass::Member), 2);
        assert_eq!(table.total(Month::January), 0);
    }

    #[test]
    fn test_count_table_iterates_in_category_order() {
        let table: CountTable<Month> = CountTable::default();
        let months: Vec<Month> = table.iter().map(|(m, _)| m).collect();
        assert_eq!(months, Month::ALL);
    }

    #[test]
    fn test_top_breaks_ties_by_order() {
        let mut table: CountTable<DayOfWeek> = CountTable::default();
        table.increment(DayOfWeek::Friday, UserClass::Casual);
        table.increment(DayOfWeek::Tuesday, UserClass::Casual);
        table.increment(DayOfWeek::Sunday, UserClass::Casual);
        table.increment(DayOfWeek::Sunday, UserClass::Casual);

        let top = table.top(UserClass::Casual, 3);
        assert_eq!(
            top,
            vec![
                (DayOfWeek::Sunday, 2),
                (DayOfWeek::Tuesday, 1),
                (DayOfWeek::Friday, 1)
            ]
        );
    }

    #[test]
    fn test_count_table_serializes_rows_in_order() {
        let mut table: CountTable<DayOfWeek> = CountTable::default();
        table.increment(DayOfWeek::Monday, UserClass::Member);

        let json = serde_json::to_value(&table).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0]["key"], "Monday");
        assert_eq!(rows[0]["member"], 1);
        assert_eq!(rows[6]["key"], "Sunday");
    }

    #[test]
    fn test_rideable_share_percentages() {
        let mut share = RideableShare::default();
        share.counts.increment(RideableType::Classic, UserClass::Casual);
        share.counts.increment(RideableType::Classic, UserClass::Casual);
        share.counts.increment(RideableType::Docked, UserClass::Casual);

        assert!((share.percent(UserClass::Casual, RideableType::Classic) - 66.666).abs() < 0.01);
        assert_eq!(share.percent(UserClass::Casual, RideableType::Electric), 0.0);
        assert_eq!(share.percent(UserClass::Member, RideableType::Classic), 0.0);

        let json = serde_json::to_value(&share).unwrap();
        assert_eq!(json["Casual"][0]["percent"], 66.67);
        assert_eq!(json["Casual"][2]["rideable_type"], "Docked");
    }

    #[test]
    fn test_by_class_index_and_map() {
        let counts = ByClass {
            casual: 3usize,
            member: 7usize,
        };
        assert_eq!(counts[UserClass::Member], 7);
        assert_eq!(counts.total(), 10);

        let doubled = counts.map(|_, v| v * 2);
        assert_eq!(doubled.casual, 6);

        let classes: Vec<UserClass> = counts.iter().map(|(c, _)| c).collect();
        assert_eq!(classes, UserClass::ALL);
    }
}
