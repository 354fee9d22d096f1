//! CLI entry point for the NWS wind-alert poller.
//!
//! Provides subcommands for a single pipeline run, a periodic watch loop,
//! and listing the alerts the event filter currently selects.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use nws_wind_alerts::alerts::{AlertPipeline, AlertSelector, NwsApi};
use nws_wind_alerts::config::Config;
use nws_wind_alerts::fetch::{BasicClient, UserAgent};
use nws_wind_alerts::output::{
    append_record, append_records, print_json, print_pretty, station_records,
};
use nws_wind_alerts::store::{PostgresAlertStore, publish};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

type NwsClient = UserAgent<BasicClient>;

#[derive(Parser)]
#[command(name = "nws_wind_alerts")]
#[command(about = "Polls NWS alerts and reports stations with high wind", long_about = None)]
struct Cli {
    /// Region code for the alerts feed (overrides STATE)
    #[arg(long, global = true)]
    state: Option<String>,

    /// Minimum wind speed in mph (overrides WIND_THRESHOLD_MPH)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// CSV file to append one row per qualifying station to
    #[arg(short, long)]
    output: Option<String>,

    /// Log the enriched alerts as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// CSV file to append run statistics to
    #[arg(long)]
    stats_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once
    Run {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run the pipeline periodically
    Watch {
        /// Seconds between runs
        #[arg(short, long, default_value_t = 300)]
        interval: u64,

        /// Number of runs (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        runs: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// List active alerts that match the event filter
    ListAlerts,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/nws_wind_alerts.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nws_wind_alerts.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(state) = cli.state {
        config.area = state;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold_mph = threshold;
    }
    config.validate().context("Invalid command-line override")?;

    info!(
        area = %config.area,
        filter = ?config.event_filter.terms(),
        threshold_mph = config.threshold_mph,
        max_in_flight = config.max_in_flight,
        "Configuration loaded"
    );

    let client = UserAgent::new(
        BasicClient::with_timeouts(config.request_timeout, config.connect_timeout)?,
        &config.user_agent,
    )
    .context("NWS_USER_AGENT is not a valid header value")?;
    let api = Arc::new(NwsApi::new(client, &config.base_url));

    match cli.command {
        Commands::Run { output } => {
            let pipeline = AlertPipeline::new(api, config.pipeline_settings());
            let store = connect_store(&config).await?;
            run_once(&pipeline, store.as_ref(), &output).await?;
        }
        Commands::Watch {
            interval,
            runs,
            output,
        } => {
            let pipeline = AlertPipeline::new(api, config.pipeline_settings());
            let store = connect_store(&config).await?;
            watch(&pipeline, store.as_ref(), interval, runs, &output).await?;
        }
        Commands::ListAlerts => {
            let selector = AlertSelector::new(api, &config.area);
            let selection = selector
                .select_alerts(&config.event_filter)
                .await
                .context("Failed to fetch active alerts")?;

            for alert in &selection.alerts {
                info!(
                    alert_id = %alert.id,
                    event = %alert.event,
                    headline = alert.headline.as_deref().unwrap_or(""),
                    zones = alert.affected_zones.len(),
                    "Alert"
                );
            }

            info!(
                total = selection.total,
                selected = selection.alerts.len(),
                "Alert list summary"
            );
        }
    }

    Ok(())
}

async fn connect_store(config: &Config) -> Result<Option<PostgresAlertStore>> {
    match &config.database_url {
        Some(url) => Ok(Some(PostgresAlertStore::connect(url).await?)),
        None => {
            info!("DATABASE_URL not set, results will not be stored");
            Ok(None)
        }
    }
}

/// Runs the pipeline once, writes the requested outputs and publishes any
/// kept alerts.
#[tracing::instrument(skip_all)]
async fn run_once(
    pipeline: &AlertPipeline<NwsClient>,
    store: Option<&PostgresAlertStore>,
    output: &OutputArgs,
) -> Result<()> {
    let run = pipeline.run().await;

    if run.feed_failed() {
        warn!("Alert feed could not be read, nothing to report this run");
    }

    print_pretty(&run.alerts);
    if output.json {
        print_json(&run.alerts)?;
    }

    if let Some(path) = &output.output {
        let records: Vec<_> = run
            .alerts
            .iter()
            .flat_map(|a| station_records(run.stats.timestamp, a))
            .collect();
        append_records(path, &records)?;
    }

    if let Some(path) = &output.stats_file {
        append_record(path, &run.stats)?;
    }

    if let Some(store) = store {
        if !run.alerts.is_empty() {
            publish(store, &run.alerts).await;
        }
    }

    info!(
        kept = run.stats.alerts_kept,
        qualifying_stations = run.stats.qualifying_stations,
        zone_failures = run.stats.zone_failures,
        observation_failures = run.stats.observation_failures,
        observation_failure_pct = run.stats.observation_failure_pct(),
        duration_ms = run.stats.duration_ms,
        "Run summary"
    );
    Ok(())
}

/// Runs the pipeline every `interval` seconds until `runs` is reached
/// (0 = forever) or Ctrl+C arrives.
async fn watch(
    pipeline: &AlertPipeline<NwsClient>,
    store: Option<&PostgresAlertStore>,
    interval: u64,
    runs: usize,
    output: &OutputArgs,
) -> Result<()> {
    if runs == 0 {
        info!(interval, "Polling indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(runs, interval, "Starting polling");
    }

    let mut run_count = 0;

    loop {
        // Check if we've reached the run limit (0 = infinite)
        if runs > 0 && run_count >= runs {
            break;
        }

        run_count += 1;
        info!(
            run = run_count,
            total = if runs == 0 { None } else { Some(runs) },
            started_at = %Utc::now(),
            "Starting run"
        );

        // A failed output write should not stop the poller
        if let Err(e) = run_once(pipeline, store, output).await {
            error!(error = %e, "Run outputs failed");
        }

        if runs == 0 || run_count < runs {
            info!(interval, "Waiting before next run");
            tokio::select! {
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(interval)) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping");
                    break;
                }
            }
        }
    }

    info!(run_count, "Finished polling");
    Ok(())
}
