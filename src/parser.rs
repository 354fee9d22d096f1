//! Decoders for the api.weather.gov GeoJSON payloads.
//!
//! Only the fields the pipeline reads are modeled; everything else in the
//! documents is ignored.

use chrono::DateTime;
use serde::Deserialize;
use tracing::warn;

use crate::fetch::FetchError;
use crate::model::{Alert, Coordinates, StationReading};

#[derive(Deserialize)]
struct AlertCollection {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Deserialize)]
struct AlertFeature {
    id: Option<String>,
    properties: Option<AlertProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertProperties {
    event: Option<String>,
    headline: Option<String>,
    sent: Option<String>,
    affected_zones: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct Zone {
    properties: Option<ZoneProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneProperties {
    observation_stations: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct Observation {
    geometry: Option<Geometry>,
    properties: Option<ObservationProperties>,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Option<Vec<f64>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationProperties {
    wind_speed: Option<QuantitativeValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuantitativeValue {
    unit_code: Option<String>,
    value: Option<f64>,
}

/// Decodes an alerts collection.
///
/// Returns every feature that has an id, properties and an event label;
/// anything else is skipped with a warning. An unparseable `sent` timestamp
/// leaves `sent` as `None` and keeps the raw text in `sent_unparsed`.
pub fn parse_alerts(bytes: &[u8]) -> Result<Vec<Alert>, FetchError> {
    let collection: AlertCollection = serde_json::from_slice(bytes)?;

    let alerts = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let (Some(id), Some(props)) = (feature.id, feature.properties) else {
                warn!("Skipping alert feature without id or properties");
                return None;
            };
            let Some(event) = props.event else {
                warn!(alert_id = %id, "Skipping alert feature without event");
                return None;
            };

            let (sent, sent_unparsed) = match props.sent {
                Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
                    Ok(sent) => (Some(sent), None),
                    Err(e) => {
                        warn!(
                            alert_id = %id,
                            sent = %raw,
                            error = %e,
                            "Unparseable sent timestamp"
                        );
                        (None, Some(raw))
                    }
                },
                None => (None, None),
            };

            Some(Alert {
                id,
                event,
                headline: props.headline,
                sent,
                sent_unparsed,
                affected_zones: props.affected_zones.unwrap_or_default(),
            })
        })
        .collect();

    Ok(alerts)
}

/// Decodes a zone document into its observation-station locators.
///
/// # Errors
///
/// A zone without `properties.observationStations` is malformed.
pub fn parse_zone_stations(bytes: &[u8]) -> Result<Vec<String>, FetchError> {
    let zone: Zone = serde_json::from_slice(bytes)?;
    zone.properties
        .and_then(|p| p.observation_stations)
        .ok_or_else(|| FetchError::Malformed("missing properties.observationStations".into()))
}

/// Decodes a latest-observation document for `station_url`.
///
/// Missing wind speed reads as zero; missing or non-pair coordinates read
/// as `None`.
pub fn parse_observation(station_url: &str, bytes: &[u8]) -> Result<StationReading, FetchError> {
    let obs: Observation = serde_json::from_slice(bytes)?;

    let coordinates = obs
        .geometry
        .and_then(|g| g.coordinates)
        .and_then(|c| match c.as_slice() {
            [longitude, latitude] => Some(Coordinates {
                longitude: *longitude,
                latitude: *latitude,
            }),
            _ => None,
        });

    let wind_speed_kmh = obs
        .properties
        .and_then(|p| p.wind_speed)
        .and_then(|w| w.value.map(|v| to_kmh(v, w.unit_code.as_deref())))
        .unwrap_or(0.0);

    Ok(StationReading::new(
        station_url.to_string(),
        coordinates,
        wind_speed_kmh,
    ))
}

/// Normalizes a WMO unit-coded speed to km/h. Unknown codes pass through.
fn to_kmh(value: f64, unit_code: Option<&str>) -> f64 {
    match unit_code {
        Some("wmoUnit:m_s-1") => value * 3.6,
        Some("wmoUnit:kn") => value * 1.852,
        _ => value,
    }
}
