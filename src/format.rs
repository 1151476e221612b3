//! Serde helpers for the presentation formats of exported values.

use crate::analyzers::utility;

/// Timestamps with minute precision, e.g. `2023-03-14 08:05`.
pub mod minute_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}

/// Floats written rounded to two decimals. The in-memory value is untouched.
pub mod round2 {
    use super::utility;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(utility::round2(*value))
    }
}

pub(crate) fn round2_opt<S: serde::Serializer>(
    value: &Option<f64>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.serialize_some(&utility::round2(*v)),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Row {
        #[serde(with = "minute_timestamp")]
        at: NaiveDateTime,
        #[serde(serialize_with = "round2::serialize")]
        value: f64,
    }

    #[test]
    fn test_minute_timestamp_drops_seconds() {
        let at = NaiveDate::from_ymd_opt(2023, 3, 14)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        let json = serde_json::to_string(&Row { at, value: 1.0 }).unwrap();
        assert!(json.contains("\"2023-03-14 08:05\""));

        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at, at);
    }

    #[test]
    fn test_round2_serializes_two_decimals() {
        let at = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let json = serde_json::to_string(&Row { at, value: 12.34567 }).unwrap();
        assert!(json.contains("12.35"));
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let result: Result<Row, _> = serde_json::from_str(r#"{"at":"yesterday","value":1.0}"#);
        assert!(result.is_err());
    }
}
