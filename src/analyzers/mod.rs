//! Trip table aggregation.
//!
//! Groups trip records by user class together with weekday, hour, month and
//! bike type, computes duration statistics, and derives the headline
//! insights consumed by the report and the JSON summary.

pub mod aggregate;
pub mod insights;
pub mod types;
pub mod utility;

pub use types::{Analysis, ByClass, CountTable, DurationStats, Insights, RideableShare};
