//! Feedfin API server binary.
//!
//! Reads configuration from the environment (and a `.env` file, if present),
//! then serves the API on a multi-threaded runtime.

use std::num::NonZeroUsize;
use std::sync::Arc;

use clap::Parser;
use feedfin_api::AppState;
use feedfin_api::config::ApiConfig;
use feedfin_core::registry::InMemoryRegistry;
use flexi_logger::{Cleanup, Criterion, FileSpec, Naming};
use flexi_logger::writers::{FileLogWriter, FileLogWriterHandle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "feedfin_server", about = "Feedfin API server")]
struct Args {
    /// IP address to bind the server to (overrides FEEDFIN_HOST).
    #[arg(long)]
    host: Option<String>,

    /// Port to serve from (overrides FEEDFIN_PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Number of runtime worker threads (default: twice the available cores).
    #[arg(long, env = "FEEDFIN_WORKERS")]
    workers: Option<NonZeroUsize>,

    /// Run in development mode: one worker, non-secure cookies, info logging.
    #[arg(short, long, default_value_t = false)]
    develop: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config =
        ApiConfig::from_lookup(|key| config_lookup(&args, key, |k| std::env::var(k).ok()));

    // Held for the life of the process; dropping it stops file logging.
    let _log_handle = init_tracing(&config)?;

    let workers = if config.dev_mode {
        1
    } else {
        args.workers.map_or_else(default_workers, NonZeroUsize::get)
    };

    info!(
        addr = %config.bind_addr,
        workers,
        dev_mode = config.dev_mode,
        algorithm = %config.algorithm,
        "starting feedfin_server"
    );

    if std::env::var("FEEDFIN_SECRET").map_or(true, |s| s.trim().is_empty()) {
        warn!("FEEDFIN_SECRET unset, generated a random secret; tokens will not survive a restart");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(InMemoryRegistry::with_users(config.seed_users.clone()));
    let state = AppState::new(config.clone(), registry);
    let app = feedfin_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("shutting down");
        })
        .await?;

    Ok(())
}

/// Overlay command-line flags on the variable lookup so `ApiConfig` stays
/// the only place that parses them. `--develop` behaves exactly like
/// `FEEDFIN_DEV=true`.
fn config_lookup<F>(args: &Args, key: &str, env: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match key {
        "FEEDFIN_DEV" if args.develop => Some("true".into()),
        "FEEDFIN_HOST" if args.host.is_some() => args.host.clone(),
        "FEEDFIN_PORT" if args.port.is_some() => args.port.map(|p| p.to_string()),
        _ => env(key),
    }
}

/// Number of rotated log files kept next to the live one.
const KEPT_LOG_FILES: usize = 5;

/// `RUST_LOG` wins; otherwise the configured level. Logs go to stderr, or
/// to the configured log file, rotated once it reaches `log_bytes`.
fn init_tracing(
    config: &ApiConfig,
) -> Result<Option<FileLogWriterHandle>, Box<dyn std::error::Error>> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();

    match &config.log_file {
        Some(path) => {
            let (writer, handle) = FileLogWriter::builder(FileSpec::try_from(path)?)
                .rotate(
                    Criterion::Size(config.log_bytes),
                    Naming::NumbersDirect,
                    Cleanup::KeepLogFiles(KEPT_LOG_FILES),
                )
                .append()
                .try_build_with_handle()?;
            tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
            Ok(Some(handle))
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
            Ok(None)
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get()) * 2
}
