use tokio::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod db;
mod models;
mod scheduler;
mod services;
mod utils;
mod viewer;

use api::product_page::ProductPageClient;
use config::Config;
use db::HistoryLog;
use scheduler::{Schedule, Scheduler};
use services::chart_service;
use services::check_service::PriceTracker;
use services::notify_service::EmailNotifier;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("🛒 Starting price tracker...");
    info!("   Product: {}", config.product_url);
    info!("   Target:  £{}", config.target_price);

    let client = match ProductPageClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = match EmailNotifier::new(&config) {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to set up email alerts: {}", e);
            std::process::exit(1);
        }
    };

    let history = HistoryLog::new(config.history_path.clone());
    info!("   Log:     {}", history.path().display());
    let mut tracker = PriceTracker::new(&config, client, notifier, history);

    // First check runs right away; later ones are counted from this moment
    let started = Instant::now();
    let outcome = tracker.run_cycle().await;
    debug!("First check finished: {}", outcome);

    if let Err(e) = chart_service::plot_history(tracker.history(), config.show_chart) {
        error!("❌ Failed to plot prices: {}", e);
    }

    let mut scheduler = Scheduler::new(
        Schedule::new(config.check_interval, started + config.check_interval),
        config.poll_interval,
    );
    scheduler.run(&mut tracker, shutdown_signal()).await;
}

/// Directive that keeps the tracker's own status lines visible
const STATUS_DIRECTIVE: &str = "price_tracker=info";

/// Filter from `RUST_LOG`, with the status lines on unless it names this crate
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    let Some(spec) = rust_log.map(str::trim).filter(|s| !s.is_empty()) else {
        return EnvFilter::new(STATUS_DIRECTIVE);
    };
    let filter = EnvFilter::try_new(spec).unwrap_or_else(|_| EnvFilter::new(STATUS_DIRECTIVE));
    if spec.contains("price_tracker") {
        return filter;
    }
    match STATUS_DIRECTIVE.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
