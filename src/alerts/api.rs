use crate::fetch::{FetchError, HttpClient, fetch_bytes};

pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";

/// An [`HttpClient`] bound to an api.weather.gov root.
///
/// Zone and station locators in the feed are absolute URLs and are fetched
/// as-is; only the alerts endpoint is built from the base URL.
pub struct NwsApi<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> NwsApi<C> {
    pub fn new(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn alerts_url(&self, area: &str) -> String {
        format!("{}/alerts/active?area={}", self.base_url, area)
    }

    pub async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        fetch_bytes(&self.client, url).await
    }
}

/// Latest-observation endpoint for a station locator.
pub fn latest_observation_url(station_url: &str) -> String {
    format!("{}/observations/latest", station_url.trim_end_matches('/'))
}
