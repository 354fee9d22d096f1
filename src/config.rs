//! Runtime configuration, read from the environment (and `.env`, loaded by
//! the binary before this runs).

use anyhow::{Context, Result, bail};
use std::str::FromStr;
use std::time::Duration;

use crate::alerts::PipelineSettings;
use crate::alerts::api::DEFAULT_BASE_URL;
use crate::model::EventFilter;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub area: String,
    pub event_filter: EventFilter,
    pub threshold_mph: f64,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_in_flight: usize,
    pub user_agent: String,
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let filter_list = get("ALERT_EVENT_FILTER").unwrap_or_else(|| "wind".into());

        let config = Self {
            base_url: get("NWS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            area: get("STATE").unwrap_or_else(|| "CA".into()),
            event_filter: EventFilter::parse(&filter_list),
            threshold_mph: parse_or(&get, "WIND_THRESHOLD_MPH", 15.0)?,
            request_timeout: Duration::from_secs(parse_or(&get, "REQUEST_TIMEOUT_SECS", 30)?),
            connect_timeout: Duration::from_secs(parse_or(&get, "CONNECT_TIMEOUT_SECS", 10)?),
            max_in_flight: parse_or(&get, "MAX_IN_FLIGHT", 16)?,
            user_agent: get("NWS_USER_AGENT").unwrap_or_else(|| {
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            }),
            database_url: get("DATABASE_URL"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the values the pipeline cannot run with. Call again after
    /// changing fields by hand.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold_mph.is_finite() || self.threshold_mph < 0.0 {
            bail!(
                "Wind threshold must be a non-negative number of mph, got {}",
                self.threshold_mph
            );
        }
        if self.max_in_flight == 0 {
            bail!("MAX_IN_FLIGHT must be at least 1");
        }
        if self.event_filter.terms().is_empty() {
            bail!("ALERT_EVENT_FILTER must name at least one term");
        }
        Ok(())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            area: self.area.clone(),
            filter: self.event_filter.clone(),
            threshold_mph: self.threshold_mph,
            max_in_flight: self.max_in_flight,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}
