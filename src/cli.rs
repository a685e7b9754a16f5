use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::models::MAX_BOOK_NUMBER;

/// Downloads land and mortgage register books from the public eKW browser
#[derive(Debug, Parser)]
#[command(name = "ekw", version, about)]
pub struct Cli {
    /// Config file, created with defaults when missing
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download books `start..=end` of a region
    Start {
        /// Region code, e.g. KR1A
        region: String,
        /// First book number
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=MAX_BOOK_NUMBER as i64))]
        start: u32,
        /// Last book number (inclusive)
        #[arg(long, default_value_t = 9999, value_parser = clap::value_parser!(u32).range(0..=MAX_BOOK_NUMBER as i64))]
        end: u32,
        /// Number of browsers working in parallel
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        processes: u16,
    },
    /// Print the full identifier of REGION/NUMBER with its check digit
    Checksum {
        /// e.g. KR1P/00286974
        code: String,
    },
}
