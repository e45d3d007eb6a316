//! CLI interface for halving-sentinel
//!
//! Provides subcommands for:
//! - `watch`: Stream live display values for the configured widgets
//! - `parse`: Parse one raw ticker payload
//! - `config`: Show the effective configuration

mod parse;
mod watch;

pub use parse::ParseArgs;
pub use watch::WatchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "halving-sentinel")]
#[command(about = "Live price feed core for the Halving Sentinel dashboard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream live display values until Ctrl-C
    Watch(WatchArgs),
    /// Parse a raw ticker payload and show its projections
    Parse(ParseArgs),
    /// Show the effective configuration
    Config,
}
