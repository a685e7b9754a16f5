use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ekw_fetch::cli::{Cli, Command};
use ekw_fetch::utils::logging;
use ekw_fetch::{App, Config, RangeJob, RecordId};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start {
            region,
            start,
            end,
            processes,
        } => {
            let job = RangeJob {
                region: region.to_uppercase(),
                start,
                end,
                processes: usize::from(processes),
            };
            job.check_bounds()?;

            // Load configuration
            let (config, created) = Config::load(&cli.config)
                .with_context(|| format!("cannot load {}", cli.config.display()))?;

            // Initialise logging
            logging::init(&config.log_file)?;
            if created {
                info!("Wrote default configuration to {}", cli.config.display());
            }
            info!("Loaded configuration from {}", cli.config.display());

            App::initialize(config)?.run(&job).await?;
        }
        Command::Checksum { code } => {
            let (region, number) = code
                .split_once('/')
                .context("expected REGION/NUMBER, e.g. KR1P/00286974")?;
            let number: u32 = number
                .parse()
                .with_context(|| format!("'{}' is not a book number", number))?;
            println!("{}", RecordId::new(region, number)?);
        }
    }

    Ok(())
}
