//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Live score feed for a shooting range
#[derive(Parser)]
#[command(
    name = "shotwatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Live score feed for a shooting range",
    long_about = "Watch the files a scoring device writes and publish the complete score tree on every change.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .shotwatch directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    #[command(about = "Display active settings")]
    Config,

    /// Watch a device directory and stream trees as NDJSON
    #[command(about = "Publish the score tree on every change until Ctrl+C")]
    Watch {
        /// Directory the device writes into (overrides config)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Range label added to every published range (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Polling interval in milliseconds (overrides config)
        #[arg(long, value_name = "MS")]
        poll_interval: Option<u64>,
    },

    /// Read a device directory once and print one tree
    #[command(about = "Print the current score tree as JSON")]
    Snapshot {
        /// Directory the device writes into (overrides config)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Range label added to every published range (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Pretty-print instead of a single line
        #[arg(long)]
        pretty: bool,
    },

    /// Decode a shot file
    #[command(about = "Print one JSON line per shot in an .MLD file")]
    Shots {
        /// Path to the shot file
        file: PathBuf,

        /// Target type identifier used to scale coordinates (raw units if omitted)
        #[arg(short, long, value_name = "ID")]
        target: Option<String>,
    },
}
