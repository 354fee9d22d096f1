//! Persistence of enriched alerts.
//!
//! [`AlertStore`] is the async trait for upserting an alert keyed by its id.
//! [`PostgresAlertStore`] implements it with `tokio-postgres`.

mod postgres;

pub use postgres::PostgresAlertStore;

use anyhow::Result;
use tracing::{error, info};

use crate::model::EnrichedAlert;

/// Upserts alerts keyed by `id`. Every upsert marks the row unprocessed.
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    async fn upsert(&self, alert: &EnrichedAlert) -> Result<()>;
}

/// How many alerts reached the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishSummary {
    pub upserted: usize,
    pub failed: usize,
}

/// Upserts every alert, logging and skipping the ones the store rejects.
pub async fn publish<S: AlertStore + ?Sized>(
    store: &S,
    alerts: &[EnrichedAlert],
) -> PublishSummary {
    let mut summary = PublishSummary::default();

    for alert in alerts {
        match store.upsert(alert).await {
            Ok(()) => summary.upserted += 1,
            Err(e) => {
                error!(alert_id = %alert.id, error = %e, "Failed to store alert");
                summary.failed += 1;
            }
        }
    }

    info!(
        upserted = summary.upserted,
        failed = summary.failed,
        "Alerts stored"
    );
    summary
}
