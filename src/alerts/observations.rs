use std::sync::Arc;
use tracing::warn;

use super::api::{NwsApi, latest_observation_url};
use crate::fetch::{FetchError, HttpClient};
use crate::model::StationReading;
use crate::parser::parse_observation;

/// A station whose latest observation could not be read.
#[derive(Debug, thiserror::Error)]
#[error("{station_url}: {reason}")]
pub struct ObservationFailure {
    pub station_url: String,
    #[source]
    pub reason: FetchError,
}

/// Reads the latest observation of a single station.
pub struct ObservationClient<C> {
    api: Arc<NwsApi<C>>,
}

impl<C: HttpClient> ObservationClient<C> {
    pub fn new(api: Arc<NwsApi<C>>) -> Self {
        Self { api }
    }

    pub async fn fetch_observation(
        &self,
        station_url: &str,
    ) -> Result<StationReading, ObservationFailure> {
        let result = match self.api.get(&latest_observation_url(station_url)).await {
            Ok(bytes) => parse_observation(station_url, &bytes),
            Err(e) => Err(e),
        };

        result.map_err(|reason| {
            warn!(
                station = station_url,
                kind = reason.kind(),
                error = %reason,
                "Station observation unavailable"
            );
            ObservationFailure {
                station_url: station_url.to_string(),
                reason,
            }
        })
    }
}
