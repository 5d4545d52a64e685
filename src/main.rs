mod app_config;

use anyhow::Result;
use app_config::{AppConfig, RunMode};
use chrono::Local;
use colored::Colorize;
use oi_tracker::api_server_axum::{self, AppState};
use oi_tracker::tracker::{display, scheduler, BellSink, LogSink, SchedulerSettings};
use oi_tracker::utility::Timer;
use oi_tracker::{KiteClient, OiTracker, TrackerConfig};
use tracing::{error, info};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn print_banner(title: &str, config: &TrackerConfig) {
    println!("{}", "=".repeat(60).blue());
    println!("{}", title.green().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{} Index: {}", "→".cyan(), config.index_symbol.yellow());
    println!(
        "{} Strikes: {} x {}",
        "→".cyan(),
        config.strikes_to_track,
        config.strike_increment
    );
    println!("{} Windows: {:?} minutes", "→".cyan(), config.time_intervals);
    println!(
        "{} Alert above {:.1}% abnormal cells",
        "→".cyan(),
        config.alert_threshold_percentage
    );
    println!();
}

/// Run a single cycle and print it
async fn run_once(client: KiteClient, config: TrackerConfig) -> Result<()> {
    print_banner("OI Tracker (single cycle)", &config);

    let mut tracker = OiTracker::new(client, config, Box::new(BellSink));
    let now = Local::now().naive_local();
    let outcome = Timer::measure_async("oi cycle", tracker.run_cycle(now)).await?;
    display::print_outcome(&outcome);
    Ok(())
}

/// Poll until Ctrl-C or too many failed cycles
async fn run_watch(client: KiteClient, config: TrackerConfig) -> Result<()> {
    print_banner("OI Tracker", &config);

    let settings = SchedulerSettings::from(&config);
    let mut tracker = OiTracker::new(client, config, Box::new(BellSink));

    match scheduler::run(&mut tracker, settings, shutdown_signal(), display::print_outcome).await {
        Ok(summary) => {
            println!(
                "{} Stopped after {} cycles ({} skipped, {} failed, {} alerts)",
                "✓".green(),
                summary.completed,
                summary.skipped,
                summary.failed,
                summary.alerts
            );
            Ok(())
        }
        Err(e) => {
            println!("{} Data source unavailable, stopping: {:#}", "✗".red(), e);
            Err(e)
        }
    }
}

/// Poll and expose the latest cycle over HTTP
async fn run_server(client: KiteClient, config: TrackerConfig, port: u16) -> Result<()> {
    print_banner("OI Tracker API Server", &config);

    let (app_state, latest_tx) = AppState::new(config.clone());
    let server = tokio::spawn(async move {
        if let Err(e) = api_server_axum::start_server(port, app_state).await {
            error!(error = %e, "API server stopped");
        }
    });

    let settings = SchedulerSettings::from(&config);
    let mut tracker = OiTracker::new(client, config, Box::new(LogSink));
    let result = scheduler::run(&mut tracker, settings, shutdown_signal(), |outcome| {
        latest_tx.send_replace(Some(outcome.clone()));
    })
    .await;

    server.abort();
    let summary = result?;
    info!(?summary, "tracker stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    oi_tracker::logging::init_logging()?;

    let app = match AppConfig::from_env() {
        Ok(app) => app,
        Err(msg) => {
            eprintln!("{}", msg);
            AppConfig::print_usage();
            std::process::exit(1);
        }
    };

    let config = TrackerConfig::from_env()?;
    let client = KiteClient::from_env()?;
    info!(mode = %app.mode, "starting OI tracker");

    match app.mode {
        RunMode::Once => run_once(client, config).await,
        RunMode::Watch => run_watch(client, config).await,
        RunMode::Server => run_server(client, config, app.port).await,
    }
}
