use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use preset_store::PresetStore;
use tracing::{info, warn};

mod config;
mod handlers;
mod logging;
mod routes;
mod state;
mod views;

use config::{ConfigSource, DashboardConfig, DEFAULT_CONFIG_FILE};
use logging::LoggingMode;
use state::AppState;

/// HEOS Dashboard
///
/// Serves a small web UI for starting radio presets, transport control
/// and volume on a HEOS/Denon receiver.
#[derive(Parser, Debug)]
#[command(name = "heos-dashboard")]
#[command(version, about)]
pub struct Args {
    /// Configuration file, created with defaults when missing
    #[arg(short, long, env = "HEOS_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Address to bind, overriding `app.host`
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to bind, overriding `app.port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Logging mode; defaults to `debug` when `app.debug` is set
    #[arg(long, value_enum)]
    pub log_mode: Option<LoggingMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = DashboardConfig::load(&args.config)?;

    let mode = args
        .log_mode
        .unwrap_or_else(|| LoggingMode::from_debug_flag(config.app.debug));
    logging::init_logging(mode).context("Failed to initialize logging")?;

    match source {
        ConfigSource::Loaded => info!(path = %args.config.display(), "configuration loaded"),
        ConfigSource::CreatedDefault => {
            info!(path = %args.config.display(), "config file not found, created with defaults")
        }
        ConfigSource::DefaultUnsaved(e) => {
            warn!(error = %e, "could not write default config, continuing with defaults")
        }
        ConfigSource::Invalid(e) => warn!(error = %e, "error loading config, using defaults"),
    }

    discover_device(&mut config, &args.config).await;

    let presets = PresetStore::open(&config.app.stations_file);

    let host = match args.host {
        Some(host) => host,
        None => config
            .app
            .host
            .parse()
            .with_context(|| format!("Invalid app.host `{}`", config.app.host))?,
    };
    let addr = SocketAddr::new(host, args.port.unwrap_or(config.app.port));

    info!(
        device = %config.device.friendly_name,
        endpoint = %format!("{}:{}", config.device.ip, config.device.port),
        theme = %config.ui.theme,
        stations = presets.presets().len(),
        "HEOS Dashboard starting up"
    );

    let state = Arc::new(AppState::new(args.config.clone(), config, presets));
    let routes = routes::routes(state);

    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server: http://{}", bound);
    server.await;
    info!("shut down");

    Ok(())
}

/// Fill in name, model and manufacturer from the device, saving when they change
async fn discover_device(config: &mut DashboardConfig, path: &std::path::Path) {
    let (ip, port) = (config.device.ip.clone(), config.device.port);
    let info = match tokio::task::spawn_blocking(move || heos_discovery::get_device_info(&ip, port)).await {
        Ok(info) => info,
        Err(e) => {
            warn!(error = %e, "device discovery task failed");
            return;
        }
    };

    if info.is_empty() {
        warn!(ip = %config.device.ip, port = config.device.port, "no device information discovered");
        return;
    }

    if config.apply_device_info(&info) {
        info!(name = %config.device.friendly_name, model = %config.device.model, "device information updated");
        if let Err(e) = config.save(path) {
            warn!(error = %format!("{:#}", e), "failed to save discovered device information");
        }
    }
}
