// hoopshare entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout is reserved for the report)
// 2. Load config
// 3. Load box scores and aggregate the player's season
// 4. Assemble the season record with the league context
// 5. Evaluate the requested metrics
// 6. Print the report

use hoopshare_app::config;
use hoopshare_app::report::Report;
use hoopshare_app::season;
use hoopshare_core::Calculator;

use anyhow::Context;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("hoopshare starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: player={}, season={}, {} metric(s)",
        config.player,
        config.season,
        config.metrics.len()
    );

    // 3. Load box scores and aggregate
    let totals = season::load_season(&config.boxscore_dir, &config.player)
        .with_context(|| format!("failed to load box scores for {}", config.player))?;

    // 4. Merge step
    let record = totals
        .to_record(&config.league)
        .context("failed to assemble season record")?;

    // 5. Evaluate
    let calculator = Calculator::new();
    if let Err(e) = calculator.validate(&record, &config.metrics) {
        warn!("Season record is incomplete: {}", e);
    }
    let metrics = calculator.evaluate_only(&record, &config.metrics);
    for failure in metrics.failures() {
        warn!("{}", failure);
    }
    info!(
        "Evaluated {} metric(s), {} unavailable",
        config.metrics.len(),
        metrics.failures().len()
    );

    // 6. Report
    let report = Report {
        player: &config.player,
        season: &config.season,
        totals: &totals,
        metrics: &metrics,
        requested: &config.metrics,
    };
    let rendered = report
        .render(config.output.format)
        .context("failed to render report")?;
    println!("{rendered}");

    info!("hoopshare finished");
    Ok(())
}

/// Initialize tracing to log to a file (stdout carries the report).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("hoopshare.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hoopshare=info,hoopshare_app=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
