use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, error, info};

use super::aggregate::StationAggregator;
use super::api::NwsApi;
use super::selector::AlertSelector;
use crate::fetch::HttpClient;
use crate::model::{EnrichedAlert, EventFilter};
use crate::stats::RunStats;

/// Knobs for one pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub area: String,
    pub filter: EventFilter,
    pub threshold_mph: f64,
    pub max_in_flight: usize,
}

/// Result of one run. `stats.feed_error` is set when the feed itself failed,
/// in which case `alerts` is empty.
#[derive(Debug)]
pub struct PipelineRun {
    pub alerts: Vec<EnrichedAlert>,
    pub stats: RunStats,
}

impl PipelineRun {
    pub fn feed_failed(&self) -> bool {
        self.stats.feed_error.is_some()
    }
}

pub struct AlertPipeline<C> {
    selector: AlertSelector<C>,
    aggregator: StationAggregator<C>,
    filter: EventFilter,
    threshold_mph: f64,
}

impl<C: HttpClient> AlertPipeline<C> {
    pub fn new(api: Arc<NwsApi<C>>, settings: PipelineSettings) -> Self {
        Self {
            selector: AlertSelector::new(api.clone(), &settings.area),
            aggregator: StationAggregator::new(api, settings.max_in_flight),
            filter: settings.filter,
            threshold_mph: settings.threshold_mph,
        }
    }

    /// Runs selection and enrichment once. Never fails: feed errors are
    /// reported through the returned stats, and alerts are processed one at a
    /// time so a failure in one leaves the others untouched.
    pub async fn run(&self) -> PipelineRun {
        let started = Instant::now();
        let mut stats = RunStats::new(self.selector.area());

        let selection = match self.selector.select_alerts(&self.filter).await {
            Ok(selection) => selection,
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Alert feed unavailable");
                stats.feed_error = Some(e.to_string());
                return PipelineRun {
                    alerts: Vec::new(),
                    stats: stats.finish(started),
                };
            }
        };

        stats.alerts_in_feed = selection.total;
        stats.alerts_selected = selection.alerts.len();

        if selection.alerts.is_empty() {
            info!("No matching alerts this run");
            return PipelineRun {
                alerts: Vec::new(),
                stats: stats.finish(started),
            };
        }

        let mut enriched = Vec::new();

        for alert in selection.alerts {
            let span = tracing::info_span!("alert", alert_id = %alert.id, event = %alert.event);

            let outcome = AssertUnwindSafe(
                self.aggregator
                    .aggregate(&alert.affected_zones, self.threshold_mph),
            )
            .catch_unwind()
            .instrument(span.clone())
            .await;

            span.in_scope(|| match outcome {
                Ok(agg) => {
                    stats.record_aggregation(&agg);
                    if agg.stations.is_empty() {
                        debug!("No qualifying stations, alert dropped");
                    } else {
                        info!(
                            stations = agg.stations.len(),
                            threshold_mph = self.threshold_mph,
                            "Alert kept"
                        );
                        enriched.push(EnrichedAlert::new(alert, agg.stations));
                    }
                }
                Err(_) => {
                    error!("Aggregation panicked, alert skipped");
                    stats.alerts_failed += 1;
                }
            });
        }

        stats.alerts_kept = enriched.len();
        let stats = stats.finish(started);
        info!(
            selected = stats.alerts_selected,
            kept = stats.alerts_kept,
            "Run complete"
        );

        PipelineRun {
            alerts: enriched,
            stats,
        }
    }
}
