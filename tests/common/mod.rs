//! Offline api.weather.gov stand-in for pipeline tests.

use async_trait::async_trait;
use nws_wind_alerts::alerts::{AlertPipeline, NwsApi, PipelineSettings};
use nws_wind_alerts::fetch::HttpClient;
use nws_wind_alerts::model::EventFilter;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE: &str = "https://api.weather.gov";

pub type Hits = Arc<Mutex<HashMap<String, usize>>>;

/// Serves canned responses by exact URL and counts every request.
/// Unknown URLs answer 404.
///
/// Also tracks how many requests are outstanding at once. With a delay set,
/// each response is held back so concurrent requests overlap.
#[derive(Default)]
pub struct FixtureClient {
    routes: HashMap<String, (u16, String)>,
    panics: HashSet<String>,
    delay: Option<Duration>,
    hits: Hits,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl FixtureClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, status: u16, body: String) -> Self {
        self.routes.insert(url.to_string(), (status, body));
        self
    }

    /// Makes requests for `url` panic instead of answering.
    pub fn panic_at(mut self, url: &str) -> Self {
        self.panics.insert(url.to_string());
        self
    }

    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Some(Duration::from_millis(millis));
        self
    }

    pub fn hits(&self) -> Hits {
        self.hits.clone()
    }

    /// Highest number of requests seen outstanding at the same time.
    pub fn peak(&self) -> Arc<AtomicUsize> {
        self.peak.clone()
    }
}

#[async_trait]
impl HttpClient for FixtureClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().to_string();
        *self.hits.lock().unwrap().entry(url.clone()).or_default() += 1;

        if self.panics.contains(&url) {
            panic!("fixture panic for {url}");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let (status, body) = self
            .routes
            .get(&url)
            .cloned()
            .unwrap_or((404, r#"{"title": "Not Found"}"#.to_string()));

        let resp = http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        Ok(resp.into())
    }
}

pub fn hits_for(hits: &Hits, url: &str) -> usize {
    hits.lock().unwrap().get(url).copied().unwrap_or(0)
}

pub fn total_hits(hits: &Hits) -> usize {
    hits.lock().unwrap().values().sum()
}

pub fn alerts_url(area: &str) -> String {
    format!("{BASE}/alerts/active?area={area}")
}

pub fn zone_url(id: &str) -> String {
    format!("{BASE}/zones/forecast/{id}")
}

pub fn station_url(id: &str) -> String {
    format!("{BASE}/stations/{id}")
}

pub fn observation_url(id: &str) -> String {
    format!("{BASE}/stations/{id}/observations/latest")
}

/// Alerts collection with one feature per `(id, event, zone ids)`.
pub fn alerts_body(alerts: &[(&str, &str, &[&str])]) -> String {
    let features: Vec<_> = alerts
        .iter()
        .map(|(id, event, zones)| {
            let zones: Vec<_> = zones.iter().map(|z| zone_url(z)).collect();
            json!({
                "id": format!("{BASE}/alerts/{id}"),
                "type": "Feature",
                "properties": {
                    "event": event,
                    "headline": format!("{event} in effect"),
                    "sent": "2026-10-18T14:05:00-07:00",
                    "affectedZones": zones,
                }
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

pub fn zone_body(stations: &[&str]) -> String {
    let stations: Vec<_> = stations.iter().map(|s| station_url(s)).collect();
    json!({ "properties": { "observationStations": stations } }).to_string()
}

/// Latest observation reporting `mph` (sent as km/h, as the API does).
pub fn observation_body(mph: Option<f64>, with_coordinates: bool) -> String {
    let geometry = if with_coordinates {
        json!({ "type": "Point", "coordinates": [-118.39, 33.94] })
    } else {
        serde_json::Value::Null
    };
    json!({
        "geometry": geometry,
        "properties": {
            "windSpeed": { "unitCode": "wmoUnit:km_h-1", "value": mph.map(|m| m * 1.609) }
        }
    })
    .to_string()
}

pub fn settings(filter: &str, max_in_flight: usize) -> PipelineSettings {
    PipelineSettings {
        area: "CA".to_string(),
        filter: EventFilter::parse(filter),
        threshold_mph: 15.0,
        max_in_flight,
    }
}

pub fn pipeline(client: FixtureClient) -> AlertPipeline<FixtureClient> {
    AlertPipeline::new(Arc::new(NwsApi::new(client, BASE)), settings("wind", 8))
}
