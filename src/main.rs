//! graccstat - Generate and cache OSG usage reports from the GRACC accounting backend

use clap::Parser;
use graccstat::{
    cli::{Cli, Command, parse_reference},
    config::GraccConfig,
    error::{GraccstatError, Result},
    output::get_formatter,
    report_cache::ReportCache,
    report_generator::ReportGenerator,
    revalidator::Revalidator,
    types::{GeneratedReports, Timespan},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. RUST_LOG wins over both defaults.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            tracing_subscriber::EnvFilter::new("graccstat=info")
        } else {
            tracing_subscriber::EnvFilter::new("graccstat=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.config()?;

    match cli.command.clone().unwrap_or(Command::Report {
        at: None,
        timespan: None,
    }) {
        Command::Report { at, timespan } => run_report(config, cli.json, at, timespan).await,
        Command::Watch => run_watch(config, cli.json).await,
    }
}

/// Generate the reports once and print them
async fn run_report(
    config: GraccConfig,
    json: bool,
    at: Option<String>,
    timespan: Option<Timespan>,
) -> Result<()> {
    info!("Generating one-shot report");
    let generator = Arc::new(ReportGenerator::new(config)?);

    let reports = match at {
        Some(at) => {
            // a fixed reference instant bypasses the process cache; the
            // sanity gate still applies
            let reference = parse_reference(&at)?;
            let reports = generator.assemble(reference).await?;
            if !reports.passes_sanity_check() {
                return Err(GraccstatError::SanityCheck);
            }
            Arc::new(reports)
        }
        None => {
            let cache = ReportCache::new(generator);
            cache.get_or_build().await?
        }
    };

    let formatter = get_formatter(json);
    match timespan {
        Some(timespan) => println!("{}", formatter.format_histogram(&reports, timespan)),
        None => println!("{}", formatter.format_summary(&reports)),
    }

    Ok(())
}

/// Build once, then keep the reports fresh until Ctrl+C
async fn run_watch(config: GraccConfig, json: bool) -> Result<()> {
    info!("Starting watch mode");
    let refresh_interval = config.refresh_interval;
    let generator = Arc::new(ReportGenerator::new(config)?);

    // the initial build goes through the cache so an unreachable backend is
    // a fatal startup error rather than an endless all-zero display
    let cache = ReportCache::new(generator.clone());
    let initial = cache.get_or_build().await?;

    let mut revalidator = Revalidator::new(generator, initial, refresh_interval);
    revalidator.start();

    let clear_screen = !json && is_terminal::is_terminal(std::io::stdout());
    let mut ticker = tokio::time::interval(refresh_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reports = revalidator.current().await;
                render_watch(&reports, json, clear_screen, refresh_interval.as_secs());
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nExiting watch mode...");
                break;
            }
        }
    }

    revalidator.stop().await;
    Ok(())
}

/// Redraw the watch-mode display with the current reports
fn render_watch(reports: &GeneratedReports, json: bool, clear_screen: bool, interval_secs: u64) {
    if clear_screen {
        print!("\x1B[2J\x1B[1;1H"); // Clear screen and move cursor to top-left
    }

    if !json {
        println!(
            "graccstat watch - Last updated: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("Refresh interval: {interval_secs}s | Press Ctrl+C to exit");
        println!("{}", "-".repeat(80));
    }

    let formatter = get_formatter(json);
    println!("{}", formatter.format_summary(reports));
}
