use std::sync::Arc;
use tracing::{debug, warn};

use super::api::NwsApi;
use crate::fetch::{FetchError, HttpClient};
use crate::parser::parse_zone_stations;

/// Looks up the observation stations that belong to a forecast zone.
pub struct ZoneResolver<C> {
    api: Arc<NwsApi<C>>,
}

impl<C: HttpClient> ZoneResolver<C> {
    pub fn new(api: Arc<NwsApi<C>>) -> Self {
        Self { api }
    }

    /// Returns the station locators for `zone_url`.
    ///
    /// Failures are logged here; callers treat an `Err` as an empty zone.
    pub async fn resolve_zone(&self, zone_url: &str) -> Result<Vec<String>, FetchError> {
        let result = match self.api.get(zone_url).await {
            Ok(bytes) => parse_zone_stations(&bytes),
            Err(e) => Err(e),
        };

        match &result {
            Ok(stations) => debug!(zone = zone_url, stations = stations.len(), "Zone resolved"),
            Err(e) => warn!(
                zone = zone_url,
                kind = e.kind(),
                error = %e,
                "Zone station lookup failed"
            ),
        }
        result
    }
}
