//! Rainbow Weather CLI
//!
//! Local host for the alert poller and on-demand forecast lookups.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rainbow_weather::{
    config::{self, CONFIG_FILE},
    error::Result,
    models::{Config, Gazetteer, Location},
    pipeline::{self, AlertPoller, LogNotifier},
    services::{AlertService, FeedFetcher, ForecastService, ForecastState, HttpFetcher},
    storage::{KeyValueStore, LocalStore, LocationBook},
};
use tokio_util::sync::CancellationToken;

/// Time layout for alert listings.
const LISTING_TIME_FORMAT: &str = "%Y/%m/%d %I:%M %p";

/// Rainbow Weather - Taiwan weather alerts and forecasts
#[derive(Parser, Debug)]
#[command(
    name = "weather",
    version,
    about = "Weather alert poller and short-range forecast viewer"
)]
struct Cli {
    /// Path to data directory containing config.toml, counties.json and state
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the alert feed and notify on changes until Ctrl-C
    Poll,

    /// Print the current weather alerts
    Alerts,

    /// Print the 3-hourly forecast for a location
    Forecast {
        /// County name (default: [location] in config)
        #[arg(long, requires = "township")]
        county: Option<String>,

        /// Township name within the county
        #[arg(long, requires = "county")]
        township: Option<String>,
    },

    /// Manage saved locations
    Locations {
        #[command(subcommand)]
        action: LocationsAction,
    },

    /// Validate configuration and gazetteer
    Validate,

    /// Show persisted poller state
    Info,
}

#[derive(Subcommand, Debug)]
enum LocationsAction {
    /// List saved locations
    List,

    /// Save a location
    Add {
        county: String,
        township: String,
    },
}

/// Initialize logging from the verbosity flag, else the configured level.
fn init_logging(verbose: bool, data_dir: &Path) {
    let level = if verbose {
        "debug".to_string()
    } else {
        Config::load(data_dir.join(CONFIG_FILE))
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string())
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, &cli.data_dir);

    let (config, gazetteer) = config::load_all(&cli.data_dir)?;
    log::debug!("Loaded configuration from {}", cli.data_dir.display());

    let store: Arc<dyn KeyValueStore> =
        Arc::new(LocalStore::new(config.paths.state_path(&cli.data_dir)));

    match cli.command {
        Command::Poll => {
            config.require_api_key()?;
            let fetcher: Arc<dyn FeedFetcher> = Arc::new(HttpFetcher::from_config(&config.api)?);
            let alerts = AlertService::new(fetcher, &config.api)?;
            let poller = AlertPoller::new(alerts, Arc::new(LogNotifier), store, &config.poller);

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                }
                log::info!("Shutdown requested");
                on_signal.cancel();
            });

            pipeline::supervise(&poller, cancel, config.poller.restart_delay()).await;
        }

        Command::Alerts => {
            config.require_api_key()?;
            let fetcher: Arc<dyn FeedFetcher> = Arc::new(HttpFetcher::from_config(&config.api)?);
            let alerts = AlertService::new(fetcher, &config.api)?.fetch_alerts().await?;

            if alerts.is_empty() {
                println!("No active weather alerts.");
            }
            for alert in &alerts {
                println!(
                    "{}",
                    alert.format(
                        "{description}  {issue_time} ~ {end_time}\n  {content}",
                        LISTING_TIME_FORMAT
                    )
                );
            }
        }

        Command::Forecast { county, township } => {
            config.require_api_key()?;
            let location = match (county, township) {
                (Some(county), Some(township)) => Location::new(county, township),
                _ => config.location.clone(),
            };
            print_forecast(&config, gazetteer, &location).await?;
        }

        Command::Locations { action } => {
            let book = LocationBook::new(store.as_ref());
            match action {
                LocationsAction::List => {
                    let saved = book.list().await?;
                    if saved.is_empty() {
                        println!("No saved locations (default: {}).", config.location);
                    }
                    for location in saved {
                        println!("{}", location);
                    }
                }
                LocationsAction::Add { county, township } => {
                    let location = Location::new(county, township);
                    gazetteer.resolve(&location)?;
                    if book.add(location.clone()).await? {
                        log::info!("Added {}", location);
                    } else {
                        log::info!("{} is already saved", location);
                    }
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK");
            match config.require_api_key() {
                Ok(()) => log::info!("✓ API key set"),
                Err(e) => log::warn!("{} (needed by poll, alerts and forecast)", e),
            }

            gazetteer.resolve(&config.location)?;
            log::info!(
                "✓ Gazetteer OK ({} counties, default location {})",
                gazetteer.counties().len(),
                config.location
            );

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Data directory: {}", cli.data_dir.display());
            log::info!("Alert dataset: {}", config.api.alert_dataset);

            match store.get(&config.poller.fingerprint_key).await? {
                Some(fingerprint) => log::info!("Last alert fingerprint: {}", fingerprint),
                None => log::info!("No alerts seen yet."),
            }

            let saved = LocationBook::new(store.as_ref()).list().await?;
            log::info!("Saved locations: {}", saved.len());
        }
    }

    Ok(())
}

async fn print_forecast(config: &Config, gazetteer: Gazetteer, location: &Location) -> Result<()> {
    let fetcher: Arc<dyn FeedFetcher> = Arc::new(HttpFetcher::from_config(&config.api)?);
    let service = ForecastService::new(fetcher, config.api.clone(), Arc::new(gazetteer));

    match service.load(location).await {
        ForecastState::Ready(forecast) => {
            println!("{}", location);
            for (day, slots) in forecast.days() {
                println!("{}", day.format("%m/%d %a"));
                for slot in slots {
                    println!(
                        "  {}  {:<8} {:>3}°C (feels {:>3}°C)  rain {:>3}%  RH {:>3}%  [{}]",
                        slot.time.format("%H:%M"),
                        slot.weather.description,
                        slot.temperature,
                        slot.apparent_temperature,
                        slot.precipitation_probability,
                        slot.relative_humidity,
                        slot.weather.icon_name()
                    );
                }
            }
        }
        ForecastState::NoData => println!("No forecast data for {} yet.", location),
        ForecastState::Unavailable { reason, retryable } => {
            println!(
                "Forecast for {} unavailable: {}{}",
                location,
                reason,
                if retryable { " (try again later)" } else { "" }
            );
        }
    }
    Ok(())
}
