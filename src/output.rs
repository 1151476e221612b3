//! Persistence for the trip table and the aggregate summary.
//!
//! Trips go to a flat CSV with a fixed column order; aggregates go to JSON
//! for the chart renderer.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info};

use crate::analyzers::Analysis;
use crate::model::TripRecord;

/// Byte order mark written ahead of the CSV so spreadsheet tools pick UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row of the exported trip table.
pub const TRIP_COLUMNS: [&str; 13] = [
    "id",
    "rideable_type",
    "started_at",
    "ended_at",
    "start_station",
    "end_station",
    "user_class",
    "duration_minutes",
    "distance_km",
    "day_of_week",
    "month",
    "hour_of_day",
    "is_weekend",
];

/// Writes `trips` as CSV to any writer, header first.
pub fn write_trips_to<W: Write>(out: W, trips: &[TripRecord], with_bom: bool) -> Result<()> {
    let mut out = out;
    if with_bom {
        out.write_all(UTF8_BOM)?;
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(TRIP_COLUMNS)?;
    for trip in trips {
        writer.serialize(trip)?;
    }
    writer.flush()?;

    Ok(())
}

/// Exports the trip table to `path`, replacing any existing file.
///
/// The table is only borrowed, so a failed export leaves it usable.
#[tracing::instrument(skip(trips), fields(rows = trips.len()))]
pub fn write_trips(path: &str, trips: &[TripRecord], with_bom: bool) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create trip export '{path}'"))?;

    write_trips_to(BufWriter::new(file), trips, with_bom)
        .with_context(|| format!("failed to write trip export '{path}'"))?;

    info!(path, rows = trips.len(), "Trip table exported");
    Ok(())
}

/// Parses a trip CSV previously produced by [`write_trips`].
pub fn read_trips(path: &str) -> Result<Vec<TripRecord>> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read trip file '{path}'"))?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    debug!(path, bytes = bytes.len(), "Parsing trip CSV");

    let mut rdr = csv::Reader::from_reader(body);
    let mut trips = Vec::new();

    for result in rdr.deserialize() {
        let record: TripRecord = result.with_context(|| format!("malformed row in '{path}'"))?;
        trips.push(record);
    }

    info!(path, rows = trips.len(), "Trip table loaded");
    Ok(trips)
}

/// Writes every aggregate table as pretty-printed JSON.
pub fn write_summary_json(path: &str, analysis: &Analysis) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create summary '{path}'"))?;
    let mut out = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut out, analysis)
        .with_context(|| format!("failed to write summary '{path}'"))?;
    out.flush()?;

    info!(path, "Aggregate summary written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::generate;
    use std::env;
    use std::fs;
    use std::path::Path;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn trips(count: usize) -> Vec<TripRecord> {
        generate(&GeneratorConfig {
            record_count: count,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_header_has_fixed_column_order() {
        let mut buf = Vec::new();
        write_trips_to(&mut buf, &trips(2), false).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, TRIP_COLUMNS.join(","));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let mut buf = Vec::new();
        write_trips_to(&mut buf, &[], false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim_end(), TRIP_COLUMNS.join(","));
    }

    #[test]
    fn test_bom_and_accents_are_written() {
        let mut buf = Vec::new();
        write_trips_to(&mut buf, &trips(1), true).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(text.contains("Estação_"));
    }

    #[test]
    fn test_row_formats() {
        let mut buf = Vec::new();
        write_trips_to(&mut buf, &trips(1), false).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let row: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(row.len(), 13);
        assert_eq!(row[0], "1");
        // "YYYY-MM-DD HH:MM"
        assert_eq!(row[2].len(), 16);
        let decimals = row[7].split('.').nth(1).map_or(0, str::len);
        assert!(decimals <= 2);
        assert!(row[12] == "true" || row[12] == "false");
    }

    #[test]
    fn test_write_and_read_back() {
        let path = temp_path("bike_share_eda_test_roundtrip.csv");
        let _ = fs::remove_file(&path);

        let original = trips(20);
        write_trips(&path, &original, true).unwrap();
        assert!(Path::new(&path).exists());

        let loaded = read_trips(&path).unwrap();
        assert_eq!(loaded.len(), original.len());
        for (a, b) in original.iter().zip(&loaded) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.started_at, b.started_at);
            assert_eq!(a.ended_at, b.ended_at);
            assert_eq!(a.user_class, b.user_class);
            assert!((a.duration_minutes - b.duration_minutes).abs() <= 0.005 + 1e-9);
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let result = write_trips("/nonexistent-dir/trips.csv", &trips(1), false);
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent-dir/trips.csv"));
    }

    #[test]
    fn test_summary_json_is_written() {
        let path = temp_path("bike_share_eda_test_summary.json");
        let _ = fs::remove_file(&path);

        let analysis = Analysis::from_trips(&trips(100));
        write_summary_json(&path, &analysis).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_trips"], 100);
        assert_eq!(value["by_weekday"].as_array().unwrap().len(), 7);
        assert_eq!(value["by_month"].as_array().unwrap().len(), 12);
        assert_eq!(value["by_hour"].as_array().unwrap().len(), 24);

        fs::remove_file(&path).unwrap();
    }
}
