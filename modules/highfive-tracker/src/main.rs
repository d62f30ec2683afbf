use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use highfive_client::{HighFiveClient, PagingParams, RetryPolicy};
use highfive_common::Config;
use highfive_tracker::metrics::{HttpMetrics, LogMetrics, MetricsBackend, NoopMetrics};
use highfive_tracker::notify::{EmailBackend, NoopBackend, NotifyBackend};
use highfive_tracker::people::RuleBasedRecognizer;
use highfive_tracker::{InterestFilter, Tracker, TrackerSettings};

#[derive(Parser)]
#[command(name = "high-five-tracker", about = "Check the high five feed for names of interest")]
struct Cli {
    /// Directory holding config.toml and secrets.toml (development mode only).
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Fetch and filter, but don't send notifications or metrics.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    info!("High five tracker starting...");

    let config = Config::load(&cli.config_dir)?;
    config.log_summary();

    let client = HighFiveClient::new(
        &config.base_url,
        RetryPolicy::new(config.num_retries, config.retry_backoff_factor),
    )?
    .with_paging_params(PagingParams::new(&config.count_param, &config.offset_param));

    let notifier: Box<dyn NotifyBackend> = match &config.email {
        Some(email) if config.notifications_enabled && !cli.dry_run => {
            Box::new(EmailBackend::from_config(email)?)
        }
        _ => {
            info!("Notifications disabled");
            Box::new(NoopBackend)
        }
    };

    let metrics: Box<dyn MetricsBackend> = if !config.metrics_enabled || cli.dry_run {
        info!("Metrics disabled");
        Box::new(NoopMetrics)
    } else if let Some(endpoint) = &config.metrics.endpoint {
        info!(endpoint = %endpoint, "Sending metrics to endpoint");
        Box::new(HttpMetrics::new(endpoint.clone()))
    } else {
        info!("No metrics-endpoint set, logging metrics only");
        Box::new(LogMetrics)
    };

    let filter = InterestFilter::new(&config.names_of_interest, &config.communities_of_interest);

    let mut tracker = Tracker::new(
        Box::new(client),
        filter,
        notifier,
        metrics,
        TrackerSettings::from_config(&config),
    );
    if config.person_counts_enabled {
        tracker = tracker.with_person_counts(Box::new(RuleBasedRecognizer::new()));
    }

    match tracker.run().await {
        Ok(stats) => {
            info!("High five tracker complete. {stats}");
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "High five tracker run failed");
            Err(e)
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("highfive=info".parse()?)
        .add_directive("high_five_tracker=info".parse()?);

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
