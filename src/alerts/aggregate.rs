use futures::future::join_all;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

use super::api::NwsApi;
use super::observations::ObservationClient;
use super::zones::ZoneResolver;
use crate::fetch::HttpClient;
use crate::model::StationReading;

/// Outcome of aggregating one alert's zones.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Readings that passed the threshold, in no particular order.
    pub stations: Vec<StationReading>,
    pub zones_requested: usize,
    pub zone_failures: usize,
    pub unique_stations: usize,
    pub observation_failures: usize,
    pub readings_without_coordinates: usize,
}

/// Expands zones into stations and keeps the windy ones.
///
/// Zone lookups and station reads for one call run concurrently on the
/// caller's task; at most `max_in_flight` requests are outstanding at once.
pub struct StationAggregator<C> {
    zones: ZoneResolver<C>,
    observations: ObservationClient<C>,
    limiter: Arc<Semaphore>,
}

impl<C: HttpClient> StationAggregator<C> {
    pub fn new(api: Arc<NwsApi<C>>, max_in_flight: usize) -> Self {
        Self {
            zones: ZoneResolver::new(api.clone()),
            observations: ObservationClient::new(api),
            limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub async fn aggregate(&self, zone_urls: &[String], threshold_mph: f64) -> Aggregation {
        let mut agg = Aggregation {
            zones_requested: zone_urls.len(),
            ..Default::default()
        };

        let resolved = join_all(
            zone_urls
                .iter()
                .map(|zone| self.limited(self.zones.resolve_zone(zone))),
        )
        .await;

        let mut station_urls = Vec::new();
        for result in resolved {
            match result {
                Ok(urls) => station_urls.extend(urls),
                Err(_) => agg.zone_failures += 1,
            }
        }

        let unique = unique_stations(station_urls);
        agg.unique_stations = unique.len();
        debug!(
            zones = agg.zones_requested,
            stations = agg.unique_stations,
            "Fetching station observations"
        );

        let observed = join_all(
            unique
                .iter()
                .map(|station| self.limited(self.observations.fetch_observation(station))),
        )
        .await;

        let mut readings = Vec::with_capacity(observed.len());
        for result in observed {
            match result {
                Ok(reading) => {
                    if reading.coordinates.is_none() {
                        agg.readings_without_coordinates += 1;
                    }
                    readings.push(reading);
                }
                Err(_) => agg.observation_failures += 1,
            }
        }

        agg.stations = filter_by_threshold(readings, threshold_mph);
        agg
    }

    async fn limited<F: Future>(&self, fut: F) -> F::Output {
        // The semaphore is never closed, so a failed acquire cannot happen.
        let _permit = self.limiter.acquire().await.ok();
        fut.await
    }
}

/// Drops repeated locators, comparing by exact string value. First
/// occurrence wins.
pub fn unique_stations(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

/// Keeps readings that have coordinates and reach `threshold_mph`.
pub fn filter_by_threshold(
    readings: Vec<StationReading>,
    threshold_mph: f64,
) -> Vec<StationReading> {
    readings
        .into_iter()
        .filter(|r| r.qualifies(threshold_mph))
        .collect()
}
