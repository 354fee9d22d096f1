use std::sync::Arc;
use tracing::info;

use super::api::NwsApi;
use crate::fetch::{FetchError, HttpClient};
use crate::model::{Alert, EventFilter};
use crate::parser::parse_alerts;

/// Alerts picked out of one read of the active feed.
#[derive(Debug, Default)]
pub struct AlertSelection {
    /// Alerts present in the feed before filtering.
    pub total: usize,
    /// Alerts whose event matched, in feed order.
    pub alerts: Vec<Alert>,
}

/// Reads the active-alerts feed for one area.
pub struct AlertSelector<C> {
    api: Arc<NwsApi<C>>,
    area: String,
}

impl<C: HttpClient> AlertSelector<C> {
    pub fn new(api: Arc<NwsApi<C>>, area: &str) -> Self {
        Self {
            api,
            area: area.to_string(),
        }
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    /// Fetches the feed and keeps the alerts `filter` matches.
    ///
    /// # Errors
    ///
    /// Fails only when the feed itself cannot be fetched or decoded, so the
    /// caller can tell "no alerts" apart from "no feed".
    #[tracing::instrument(skip(self, filter), fields(area = %self.area))]
    pub async fn select_alerts(&self, filter: &EventFilter) -> Result<AlertSelection, FetchError> {
        info!("Fetching active alerts");
        let bytes = self.api.get(&self.api.alerts_url(&self.area)).await?;
        let all = parse_alerts(&bytes)?;

        let total = all.len();
        let alerts: Vec<Alert> = all.into_iter().filter(|a| filter.matches(&a.event)).collect();

        info!(total, selected = alerts.len(), "Active alerts filtered");
        Ok(AlertSelection { total, alerts })
    }
}
