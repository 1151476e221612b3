//! Narrative text report over an [`Analysis`].

use std::fmt;

use crate::analyzers::Analysis;
use crate::model::{Category, RideableType, UserClass};

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "--------------------------------------------------------------------------------";

/// Number of busiest hours listed per class.
const TOP_HOURS: usize = 5;

/// Formats the full console report: per-analysis tables followed by the
/// executive summary and recommendations.
pub struct Report<'a>(pub &'a Analysis);

impl<'a> Report<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Report(analysis)
    }

    fn overview(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        section(f, "ANALYSIS 1: Dataset overview")?;
        writeln!(f, "Total trips: {}", a.total_trips)?;
        if let Some(period) = a.period {
            writeln!(
                f,
                "Period: {} to {} ({} days)",
                period.first_start.date(),
                period.last_start.date(),
                period.days
            )?;
        }
        if let Some(distance) = a.avg_distance_km {
            writeln!(f, "Average distance: {distance:.2} km")?;
        }
        writeln!(f)?;
        writeln!(f, "{:<10} {:>10} {:>9}", "User", "Trips", "Share")?;
        for (class, count) in a.class_counts.iter() {
            writeln!(f, "{:<10} {:>10} {:>8.2}%", class, count, a.class_pct(class))?;
        }
        Ok(())
    }

    fn durations(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        section(f, "ANALYSIS 2: Trip duration by user class (minutes)")?;
        writeln!(
            f,
            "{:<10} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10}",
            "User", "Mean", "Median", "Min", "Max", "StdDev", "Trips"
        )?;
        for (class, s) in a.durations.iter() {
            writeln!(
                f,
                "{:<10} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>10}",
                class, s.mean, s.median, s.min, s.max, s.std_dev, s.count
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "INSIGHT: casual riders take trips {:.1}% longer than members",
            a.insights.duration_gap_pct
        )?;
        writeln!(
            f,
            "         Casual: {:.1} min | Member: {:.1} min",
            a.durations.casual.mean, a.durations.member.mean
        )
    }

    fn weekdays(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        section(f, "ANALYSIS 3: Trips by day of week")?;
        writeln!(f, "{:<10} {:>10} {:>10}", "Day", "Casual", "Member")?;
        for (day, row) in a.by_weekday.iter() {
            writeln!(f, "{:<10} {:>10} {:>10}", day, row.casual, row.member)?;
        }
        writeln!(f)?;
        writeln!(f, "INSIGHT: weekly pattern")?;
        for &class in UserClass::ALL {
            writeln!(
                f,
                "         {}: {:.1}% of trips on weekends",
                class,
                a.insights.weekend_pct.get(class)
            )?;
        }
        Ok(())
    }

    fn hours(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        section(f, "ANALYSIS 4: Trips by hour of day")?;
        for &class in UserClass::ALL {
            writeln!(f, "Top {TOP_HOURS} hours, {class}:")?;
            for (hour, trips) in a.by_hour.top(class, TOP_HOURS) {
                writeln!(f, "  {hour}  {trips:>8}")?;
            }
        }
        Ok(())
    }

    fn rideables(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        section(f, "ANALYSIS 5: Bike type preference (% of class trips)")?;
        write!(f, "{:<10}", "User")?;
        for kind in RideableType::ALL {
            write!(f, " {:>10}", kind.to_string())?;
        }
        writeln!(f)?;
        for &class in UserClass::ALL {
            write!(f, "{:<10}", class.to_string())?;
            for &kind in RideableType::ALL {
                write!(f, " {:>9.2}%", a.rideable.percent(class, kind))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn months(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        section(f, "ANALYSIS 6: Seasonality, trips by month")?;
        writeln!(f, "{:<10} {:>10} {:>10}", "Month", "Casual", "Member")?;
        for (month, row) in a.by_month.iter() {
            writeln!(f, "{:<10} {:>10} {:>10}", month, row.casual, row.member)?;
        }
        if let (Some(peak), Some(low)) = (a.insights.peak_month, a.insights.low_month) {
            writeln!(f)?;
            writeln!(f, "INSIGHT: seasonality")?;
            writeln!(f, "         Peak: {} ({} trips)", peak.month, peak.trips)?;
            writeln!(f, "         Low:  {} ({} trips)", low.month, low.trips)?;
        }
        Ok(())
    }

    fn summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        let casual = a.class_counts[UserClass::Casual];
        let member = a.class_counts[UserClass::Member];

        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "FINAL REPORT: INSIGHTS AND RECOMMENDATIONS")?;
        writeln!(f, "{RULE}")?;
        writeln!(f)?;
        writeln!(f, "EXECUTIVE SUMMARY")?;
        writeln!(f, "  Trips analysed: {}", a.total_trips)?;
        if let Some(period) = a.period {
            writeln!(f, "  Period: {} days", period.days)?;
        }
        writeln!(
            f,
            "  Casual riders: {} ({:.1}%)",
            casual,
            a.class_pct(UserClass::Casual)
        )?;
        writeln!(
            f,
            "  Members: {} ({:.1}%)",
            member,
            a.class_pct(UserClass::Member)
        )?;
        writeln!(f)?;

        writeln!(f, "KEY DIFFERENCES")?;
        writeln!(
            f,
            "  1. Duration: casual {:.1} min vs member {:.1} min ({:.1}% longer)",
            a.durations.casual.mean, a.durations.member.mean, a.insights.duration_gap_pct
        )?;
        writeln!(
            f,
            "  2. Weekends: casual {:.1}% vs member {:.1}% of trips",
            a.insights.weekend_pct.casual, a.insights.weekend_pct.member
        )?;
        let peaks: Vec<String> = a
            .by_hour
            .top(UserClass::Member, 2)
            .into_iter()
            .map(|(hour, _)| hour.to_string())
            .collect();
        writeln!(
            f,
            "  3. Hours: members peak at {}; casual use spreads across the day",
            peaks.join(" and ")
        )?;
        if let (Some(peak), Some(low)) = (a.insights.peak_month, a.insights.low_month) {
            writeln!(f, "  4. Seasonality: busiest {}, quietest {}", peak.month, low.month)?;
        }
        writeln!(f)?;

        writeln!(f, "{RECOMMENDATIONS}")
    }
}

const RECOMMENDATIONS: &str = "\
STRATEGIC INSIGHTS
  Casual riders: mostly leisure use, long trips, weekends, flexible hours,
  more active in summer months.
  Members: mostly commuting, short direct trips on weekdays around the
  morning and evening peaks, steady use through the year.

RECOMMENDATIONS TO CONVERT CASUAL RIDERS INTO MEMBERS
  1. Targeted marketing: weekend and summer campaigns that show the savings
     of regular use.
  2. Flexible plans: a weekend-only plan for frequent casual riders and a
     30-day free trial during the peak season.
  3. Incentives: progressive discounts (10% after 5 trips, 20% after 10)
     and points for long rides.
  4. Communication: monthly usage emails with the savings a membership
     would have given, plus in-app membership prompts.
  5. Partnerships: tourism and leisure app integrations, corporate packages
     to grow commuting use.

SUGGESTED TARGETS
  Raise casual-to-member conversion by 15% next quarter.
  Raise casual trip frequency by 25%.
  Launch 2 new membership plans by Q3.";

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{RULE}")?;
    writeln!(f, "{title}")?;
    writeln!(f, "{THIN_RULE}")
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "BIKE-SHARE DATA ANALYSIS: CASUAL RIDERS VS MEMBERS")?;
        writeln!(f, "{RULE}")?;

        self.overview(f)?;
        self.durations(f)?;
        self.weekdays(f)?;
        self.hours(f)?;
        self.rideables(f)?;
        self.months(f)?;
        self.summary(f)
    }
}
