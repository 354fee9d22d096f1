//! Output formatting and persistence for run results.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::EnrichedAlert;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One qualifying station of one alert, flattened for CSV.
#[derive(Debug, Serialize)]
pub struct StationRecord {
    pub run_at: DateTime<Utc>,
    pub alert_id: String,
    pub event: String,
    pub sent: Option<DateTime<FixedOffset>>,
    pub station_url: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub wind_speed_kmh: f64,
    pub wind_speed_mph: f64,
}

/// Flattens an alert into one record per qualifying station.
pub fn station_records(run_at: DateTime<Utc>, alert: &EnrichedAlert) -> Vec<StationRecord> {
    alert
        .stations
        .iter()
        .map(|s| StationRecord {
            run_at,
            alert_id: alert.id.clone(),
            event: alert.event.clone(),
            sent: alert.sent,
            station_url: s.station_url.clone(),
            longitude: s.coordinates.map(|c| c.longitude),
            latitude: s.coordinates.map(|c| c.latitude),
            wind_speed_kmh: s.wind_speed_kmh,
            wind_speed_mph: s.wind_speed_mph,
        })
        .collect()
}

/// Logs enriched alerts using Rust's debug pretty-print format.
pub fn print_pretty(alerts: &[EnrichedAlert]) {
    debug!("{:#?}", alerts);
}

/// Logs enriched alerts as pretty-printed JSON.
pub fn print_json(alerts: &[EnrichedAlert]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(alerts)?);
    Ok(())
}

/// Appends one serializable record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record<T: Serialize>(path: &str, record: &T) -> Result<()> {
    append_records(path, std::slice::from_ref(record))
}

/// Appends every record in `records` to a CSV file, writing headers only
/// when the file is new.
pub fn append_records<T: Serialize>(path: &str, records: &[T]) -> Result<()> {
    // An empty file would suppress the header on the next append.
    if records.is_empty() {
        return Ok(());
    }

    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = records.len(), "Appending CSV records");

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alert, Coordinates, StationReading};
    use crate::stats::RunStats;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_alert() -> EnrichedAlert {
        let alert = Alert {
            id: "urn:oid:wind-1".into(),
            event: "High Wind Warning".into(),
            headline: Some("High Wind Warning until 6 PM".into()),
            sent: DateTime::parse_from_rfc3339("2026-10-18T14:05:00-07:00").ok(),
            sent_unparsed: None,
            affected_zones: vec!["https://api.weather.gov/zones/forecast/CAZ041".into()],
        };
        let stations = vec![
            StationReading::new(
                "https://api.weather.gov/stations/KLAX".into(),
                Some(Coordinates {
                    longitude: -118.39,
                    latitude: 33.94,
                }),
                40.0,
            ),
            StationReading::new(
                "https://api.weather.gov/stations/KSMO".into(),
                Some(Coordinates {
                    longitude: -118.45,
                    latitude: 34.01,
                }),
                30.0,
            ),
        ];
        EnrichedAlert::new(alert, stations)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&[sample_alert()]);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&[sample_alert()]).unwrap();
    }

    #[test]
    fn test_station_records_one_per_station() {
        let records = station_records(Utc::now(), &sample_alert());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].alert_id, "urn:oid:wind-1");
        assert_eq!(records[1].station_url, "https://api.weather.gov/stations/KSMO");
        assert_eq!(records[1].longitude, Some(-118.45));
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("nws_wind_alerts_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_record(&path, &RunStats::new("CA")).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("nws_wind_alerts_test_header.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &RunStats::new("CA")).unwrap();
        append_record(&path, &RunStats::new("CA")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Header line should appear exactly once
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_station_rows() {
        let path = temp_path("nws_wind_alerts_test_rows.csv");
        let _ = fs::remove_file(&path);

        let records = station_records(Utc::now(), &sample_alert());
        append_records(&path, &records).unwrap();
        append_records(&path, &records).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // 1 header + 4 data rows
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("run_at,alert_id"));

        fs::remove_file(&path).unwrap();
    }
}
