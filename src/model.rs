//! Domain types shared by the alert pipeline.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Divisor used to turn km/h into mph.
pub const KMH_PER_MPH: f64 = 1.609;

/// Converts km/h to mph. Zero stays zero.
pub fn kmh_to_mph(kmh: f64) -> f64 {
    if kmh == 0.0 { 0.0 } else { kmh / KMH_PER_MPH }
}

/// An active alert as published by the feed, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: String,
    pub event: String,
    pub headline: Option<String>,
    pub sent: Option<DateTime<FixedOffset>>,
    /// The feed's `sent` text when it is not RFC 3339.
    pub sent_unparsed: Option<String>,
    /// Zone locators, in feed order.
    pub affected_zones: Vec<String>,
}

/// A `[longitude, latitude]` position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.longitude, c.latitude]
    }
}

/// Latest observation for one station.
///
/// `wind_speed_mph` is always derived from `wind_speed_kmh`; build readings
/// through [`StationReading::new`] to keep them in step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationReading {
    pub station_url: String,
    pub coordinates: Option<Coordinates>,
    pub wind_speed_kmh: f64,
    pub wind_speed_mph: f64,
}

impl StationReading {
    pub fn new(station_url: String, coordinates: Option<Coordinates>, wind_speed_kmh: f64) -> Self {
        Self {
            station_url,
            coordinates,
            wind_speed_kmh,
            wind_speed_mph: kmh_to_mph(wind_speed_kmh),
        }
    }

    /// A reading counts only when it has a position and reaches `threshold_mph`.
    pub fn qualifies(&self, threshold_mph: f64) -> bool {
        self.coordinates.is_some() && self.wind_speed_mph >= threshold_mph
    }
}

/// An alert together with the stations that qualified for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAlert {
    pub id: String,
    pub event: String,
    pub headline: Option<String>,
    pub sent: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_unparsed: Option<String>,
    pub affected_zones: Vec<String>,
    pub stations: Vec<StationReading>,
    pub observation_stations: Vec<String>,
}

impl EnrichedAlert {
    pub fn new(alert: Alert, stations: Vec<StationReading>) -> Self {
        let observation_stations = stations.iter().map(|s| s.station_url.clone()).collect();
        Self {
            id: alert.id,
            event: alert.event,
            headline: alert.headline,
            sent: alert.sent,
            sent_unparsed: alert.sent_unparsed,
            affected_zones: alert.affected_zones,
            stations,
            observation_stations,
        }
    }
}

/// Selects alerts by event label: any term found as a case-insensitive
/// substring matches.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    terms: Vec<String>,
}

impl EventFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// Parses a comma-separated list such as `"wind, winter"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn matches(&self, event: &str) -> bool {
        let event = event.to_lowercase();
        self.terms.iter().any(|t| event.contains(t.as_str()))
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(mph: f64, with_coords: bool) -> StationReading {
        let coords = with_coords.then_some(Coordinates {
            longitude: -118.2,
            latitude: 34.0,
        });
        StationReading::new(
            "https://api.weather.gov/stations/KLAX".into(),
            coords,
            mph * KMH_PER_MPH,
        )
    }

    #[test]
    fn test_kmh_to_mph() {
        assert_eq!(kmh_to_mph(0.0), 0.0);
        assert!((kmh_to_mph(1.609) - 1.0).abs() < 1e-12);
        assert!((kmh_to_mph(32.18) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_reading_derives_mph() {
        let r = StationReading::new("s".into(), None, 16.09);
        assert!((r.wind_speed_mph - 10.0).abs() < 1e-9);

        let calm = StationReading::new("s".into(), None, 0.0);
        assert_eq!(calm.wind_speed_mph, 0.0);
    }

    #[test]
    fn test_threshold_boundary() {
        let mut below = reading(15.0, true);
        below.wind_speed_mph = 14.99;
        let mut at = reading(15.0, true);
        at.wind_speed_mph = 15.0;

        assert!(!below.qualifies(15.0));
        assert!(at.qualifies(15.0));
    }

    #[test]
    fn test_missing_coordinates_never_qualifies() {
        assert!(!reading(80.0, false).qualifies(15.0));
    }

    #[test]
    fn test_event_filter_case_insensitive() {
        let filter = EventFilter::parse("wind");
        let events = ["High Wind Warning", "Flood Watch", "Wind Advisory"];
        let selected: Vec<_> = events.iter().filter(|e| filter.matches(e)).collect();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_event_filter_multiple_terms() {
        let filter = EventFilter::parse(" Wind , winter,,");
        assert_eq!(filter.terms(), ["wind", "winter"]);
        assert!(filter.matches("Winter Storm Warning"));
        assert!(!filter.matches("Dense Fog Advisory"));
    }

    #[test]
    fn test_enriched_alert_lists_station_urls() {
        let alert = Alert {
            id: "urn:oid:1".into(),
            event: "Wind Advisory".into(),
            headline: None,
            sent: None,
            sent_unparsed: None,
            affected_zones: vec!["https://api.weather.gov/zones/forecast/CAZ041".into()],
        };
        let enriched = EnrichedAlert::new(alert, vec![reading(20.0, true)]);
        assert_eq!(enriched.observation_stations, ["https://api.weather.gov/stations/KLAX"]);

        let json = serde_json::to_value(&enriched).unwrap();
        assert!(json.get("sentUnparsed").is_none());
    }

    #[test]
    fn test_enriched_alert_carries_unparsed_sent() {
        let alert = Alert {
            id: "urn:oid:2".into(),
            event: "High Wind Warning".into(),
            headline: None,
            sent: None,
            sent_unparsed: Some("Tuesday afternoon".into()),
            affected_zones: Vec::new(),
        };
        let json = serde_json::to_value(EnrichedAlert::new(alert, Vec::new())).unwrap();
        assert_eq!(json["sent"], serde_json::Value::Null);
        assert_eq!(json["sentUnparsed"], "Tuesday afternoon");
    }

    #[test]
    fn test_reading_serializes_like_the_feed() {
        let json = serde_json::to_value(reading(20.0, true)).unwrap();
        assert_eq!(json["stationUrl"], "https://api.weather.gov/stations/KLAX");
        assert_eq!(json["coordinates"], serde_json::json!([-118.2, 34.0]));
        assert!(json.get("windSpeedMph").is_some());
    }
}
