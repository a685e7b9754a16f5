/// Logging setup and report helpers
///
/// Console gets INFO (or `RUST_LOG`), the log file gets everything from DEBUG.
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{info, Level};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::Config;
use crate::orchestrator::{RangeJob, RunSummary};

/// Installs the console and file loggers
///
/// # Arguments
/// - `log_file_path`: log file, truncated on every start
pub fn init(log_file_path: &Path) -> Result<()> {
    let file = init_log_file(log_file_path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chromiumoxide=off,tungstenite=off"));
    let file_filter = Targets::new()
        .with_default(Level::DEBUG)
        .with_target("chromiumoxide", LevelFilter::OFF)
        .with_target("tungstenite", LevelFilter::OFF);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(console_filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(file_filter),
        )
        .try_init()
        .context("logger already initialised")?;
    Ok(())
}

/// Creates the log file with a header line
fn init_log_file(log_file_path: &Path) -> Result<File> {
    let mut file = File::create(log_file_path)
        .with_context(|| format!("cannot create log file {}", log_file_path.display()))?;
    let header = format!(
        "{}\neKW download log - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    file.write_all(header.as_bytes())?;
    Ok(file)
}

/// Logs the run parameters
pub fn log_startup(config: &Config, job: &RangeJob) {
    info!("{}", "=".repeat(60));
    info!("🚀 Starting eKW download");
    info!(
        "📚 Region {} books {:08}..={:08} ({} total)",
        job.region,
        job.start,
        job.end,
        job.len()
    );
    info!("📊 Parallel browsers: {}", job.processes);
    info!(
        "💾 Output: {} (pdf={}, png={}, txt={}), CSV: {}",
        config.out_dir.display(),
        config.save_pdf,
        config.save_png,
        config.save_txt,
        config.csv_file.display()
    );
    info!("{}", "=".repeat(60));
}

/// Logs the final statistics
pub fn print_final_stats(summary: &RunSummary, config: &Config) {
    info!("{}", "=".repeat(60));
    info!("📊 Run finished");
    info!(
        "Finished at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ Downloaded: {}/{}", summary.found, summary.total);
    info!("🧩 Partial: {}", summary.partial);
    info!("🔍 Not found: {}", summary.not_found);
    info!("⛔ Blocked: {}", summary.blocked);
    info!("❓ Missing elements: {}", summary.lookup_failed);
    info!("❌ Failed: {}", summary.failed);
    info!("🚫 Invalid identifiers: {}", summary.invalid);
    info!("{}", "=".repeat(60));
    info!("Log saved to: {}", config.log_file.display());
}
