use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use crate::alerts::Aggregation;

/// Counters for one pipeline run, one CSV row per run.
#[derive(Debug, Default, Serialize)]
pub struct RunStats {
    pub timestamp: DateTime<Utc>,
    pub area: String,

    // alerts
    pub alerts_in_feed: usize,
    pub alerts_selected: usize,
    pub alerts_kept: usize,
    pub alerts_failed: usize,

    // zones and stations, summed over alerts
    pub zones_requested: usize,
    pub zone_failures: usize,
    pub unique_stations: usize,
    pub observation_failures: usize,
    pub readings_without_coordinates: usize,
    pub qualifying_stations: usize,

    pub duration_ms: u64,

    // error tracking
    pub feed_error: Option<String>,
}

impl RunStats {
    pub fn new(area: &str) -> Self {
        RunStats {
            timestamp: Utc::now(),
            area: area.to_string(),
            ..Default::default()
        }
    }

    /// Folds one alert's aggregation into the run totals.
    pub fn record_aggregation(&mut self, agg: &Aggregation) {
        self.zones_requested += agg.zones_requested;
        self.zone_failures += agg.zone_failures;
        self.unique_stations += agg.unique_stations;
        self.observation_failures += agg.observation_failures;
        self.readings_without_coordinates += agg.readings_without_coordinates;
        self.qualifying_stations += agg.stations.len();
    }

    pub fn finish(mut self, started: Instant) -> Self {
        self.duration_ms = started.elapsed().as_millis() as u64;
        self
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Share of unique stations whose observation could not be read.
    pub fn observation_failure_pct(&self) -> f64 {
        Self::pct(self.observation_failures, self.unique_stations)
    }
}
