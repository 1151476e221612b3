//! Trip records and the fixed categories they are grouped by.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::{minute_timestamp, round2};

/// A dimension with a fixed, externally defined ordering.
///
/// `ALL` lists every value in display order and `index` is the position of a
/// value within `ALL`. Aggregate tables are laid out by this ordinal.
pub trait Category: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    const ALL: &'static [Self];

    fn index(self) -> usize;
}

/// Rider segment: pay-per-ride or subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserClass {
    Casual,
    Member,
}

impl Category for UserClass {
    const ALL: &'static [Self] = &[UserClass::Casual, UserClass::Member];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            UserClass::Casual => "Casual",
            UserClass::Member => "Member",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RideableType {
    Classic,
    Electric,
    Docked,
}

impl Category for RideableType {
    const ALL: &'static [Self] = &[
        RideableType::Classic,
        RideableType::Electric,
        RideableType::Docked,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RideableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            RideableType::Classic => "Classic",
            RideableType::Electric => "Electric",
            RideableType::Docked => "Docked",
        })
    }
}

/// Day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn is_weekend(self) -> bool {
        matches!(self, DayOfWeek::Saturday | DayOfWeek::Sunday)
    }
}

impl Category for DayOfWeek {
    const ALL: &'static [Self] = &[
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        })
    }
}

/// Calendar month, ordered January first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Category for Month {
    const ALL: &'static [Self] = &[
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl Month {
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Hour of the day, 0 through 23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HourOfDay(u8);

const HOURS: [HourOfDay; 24] = {
    let mut hours = [HourOfDay(0); 24];
    let mut i = 0;
    while i < 24 {
        hours[i] = HourOfDay(i as u8);
        i += 1;
    }
    hours
};

impl HourOfDay {
    pub fn new(hour: u32) -> Option<Self> {
        (hour < 24).then_some(HourOfDay(hour as u8))
    }

    pub fn get(self) -> u32 {
        self.0 as u32
    }
}

impl Category for HourOfDay {
    const ALL: &'static [Self] = &HOURS;

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for HourOfDay {
    type Error = String;

    fn try_from(hour: u8) -> Result<Self, Self::Error> {
        HourOfDay::new(hour as u32).ok_or_else(|| format!("hour {hour} is outside 0..=23"))
    }
}

impl From<HourOfDay> for u8 {
    fn from(hour: HourOfDay) -> Self {
        hour.0
    }
}

impl fmt::Display for HourOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:02}:00", self.0))
    }
}

/// One simulated rental. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: u64,
    pub rideable_type: RideableType,
    #[serde(with = "minute_timestamp")]
    pub started_at: NaiveDateTime,
    #[serde(with = "minute_timestamp")]
    pub ended_at: NaiveDateTime,
    pub start_station: String,
    pub end_station: String,
    pub user_class: UserClass,
    #[serde(serialize_with = "round2::serialize")]
    pub duration_minutes: f64,
    #[serde(serialize_with = "round2::serialize")]
    pub distance_km: f64,
    pub day_of_week: DayOfWeek,
    pub month: Month,
    pub hour_of_day: HourOfDay,
    pub is_weekend: bool,
}

impl TripRecord {
    /// Builds a record and derives the calendar columns from `started_at`.
    ///
    /// `ended_at` is `started_at` plus the whole minutes of
    /// `duration_minutes`, so it always lands on a minute boundary and the
    /// minute-precision CSV reproduces it exactly. The fractional minute is
    /// dropped, which makes `ended_at - started_at` up to 59 seconds shorter
    /// than `duration_minutes`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        rideable_type: RideableType,
        started_at: NaiveDateTime,
        start_station: String,
        end_station: String,
        user_class: UserClass,
        duration_minutes: f64,
        distance_km: f64,
    ) -> Self {
        let ended_at = started_at + chrono::Duration::minutes(duration_minutes.floor() as i64);
        let day_of_week = DayOfWeek::from(started_at.weekday());

        TripRecord {
            id,
            rideable_type,
            started_at,
            ended_at,
            start_station,
            end_station,
            user_class,
            duration_minutes,
            distance_km,
            day_of_week,
            month: Month::ALL[started_at.month0() as usize],
            hour_of_day: HOURS[started_at.hour() as usize],
            is_weekend: day_of_week.is_weekend(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_category_indices_follow_all_order() {
        for (i, day) in DayOfWeek::ALL.iter().enumerate() {
            assert_eq!(day.index(), i);
        }
        for (i, month) in Month::ALL.iter().enumerate() {
            assert_eq!(month.index(), i);
        }
        for (i, hour) in HourOfDay::ALL.iter().enumerate() {
            assert_eq!(hour.index(), i);
        }
        assert_eq!(HourOfDay::ALL.len(), 24);
    }

    #[test]
    fn test_hour_of_day_bounds() {
        assert_eq!(HourOfDay::new(23).map(HourOfDay::get), Some(23));
        assert!(HourOfDay::new(24).is_none());
        assert!(HourOfDay::try_from(30u8).is_err());
    }

    #[test]
    fn test_new_derives_calendar_fields() {
        // 2023-07-15 was a Saturday
        let trip = TripRecord::new(
            1,
            RideableType::Electric,
            at(2023, 7, 15, 18, 40),
            "Estação_1".to_string(),
            "Estação_2".to_string(),
            UserClass::Casual,
            25.9,
            5.1,
        );

        assert_eq!(trip.day_of_week, DayOfWeek::Saturday);
        assert_eq!(trip.month, Month::July);
        assert_eq!(trip.hour_of_day.get(), 18);
        assert!(trip.is_weekend);
        assert_eq!(trip.ended_at, at(2023, 7, 15, 19, 5));
    }

    #[test]
    fn test_weekday_is_not_weekend() {
        let trip = TripRecord::new(
            2,
            RideableType::Classic,
            at(2023, 1, 2, 8, 0),
            "Estação_3".to_string(),
            "Estação_3".to_string(),
            UserClass::Member,
            3.0,
            0.6,
        );

        assert_eq!(trip.day_of_week, DayOfWeek::Monday);
        assert!(!trip.is_weekend);
        assert!(trip.ended_at > trip.started_at);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(UserClass::Member.to_string(), "Member");
        assert_eq!(RideableType::Docked.to_string(), "Docked");
        assert_eq!(DayOfWeek::Wednesday.to_string(), "Wednesday");
        assert_eq!(Month::September.to_string(), "September");
        assert_eq!(HourOfDay::new(7).unwrap().to_string(), "07:00");
        assert_eq!(format!("{:<9}|", UserClass::Casual), "Casual   |");
    }
}
