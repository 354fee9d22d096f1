use anyhow::{Context, Result};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use super::AlertStore;
use crate::model::EnrichedAlert;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY,
    event TEXT NOT NULL,
    headline TEXT,
    sent TIMESTAMPTZ,
    details JSONB NOT NULL,
    is_processed BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

const UPSERT: &str = "INSERT INTO alerts (id, event, headline, sent, details, is_processed) \
    VALUES ($1, $2, $3, $4, $5, FALSE) \
    ON CONFLICT (id) DO UPDATE SET \
        headline = EXCLUDED.headline, \
        details = EXCLUDED.details, \
        sent = EXCLUDED.sent, \
        updated_at = now(), \
        is_processed = FALSE";

/// Stores alerts in a PostgreSQL `alerts` table, one row per alert id.
///
/// `details` holds the whole enriched alert as JSON. Downstream consumers
/// flip `is_processed` once they have acted on a row; every upsert resets it.
pub struct PostgresAlertStore {
    client: Client,
}

impl PostgresAlertStore {
    /// Connects and creates the `alerts` table if it does not exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .context("Failed to connect to PostgreSQL")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        client
            .batch_execute(CREATE_TABLE)
            .await
            .context("Failed to create alerts table")?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl AlertStore for PostgresAlertStore {
    async fn upsert(&self, alert: &EnrichedAlert) -> Result<()> {
        let details = serde_json::to_value(alert)?;

        self.client
            .execute(
                UPSERT,
                &[&alert.id, &alert.event, &alert.headline, &alert.sent, &details],
            )
            .await
            .with_context(|| format!("Upsert failed for alert '{}'", alert.id))?;

        debug!(alert_id = %alert.id, "Alert upserted");
        Ok(())
    }
}
