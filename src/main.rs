use anyhow::anyhow;
use clap::Parser;

use shotwatch::Settings;
use shotwatch::cli::commands::{init, shots, snapshot, watch};
use shotwatch::cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| anyhow!("Configuration error: {e}"))?;

    shotwatch::logging::init_with_config(&config.logging);

    match cli.command {
        Commands::Init { force } => init::run_init(force),

        Commands::Config => init::run_config(&config),

        Commands::Watch {
            dir,
            host,
            poll_interval,
        } => {
            // CLI arguments override config
            if let Some(dir) = dir {
                config.source.dir = dir;
            }
            if host.is_some() {
                config.publish.host = host;
            }
            if let Some(ms) = poll_interval {
                config.watch.poll_interval_ms = ms;
            }
            watch::run(&config).await
        }

        Commands::Snapshot { dir, host, pretty } => {
            if let Some(dir) = dir {
                config.source.dir = dir;
            }
            if host.is_some() {
                config.publish.host = host;
            }
            snapshot::run(&config, pretty).await
        }

        Commands::Shots { file, target } => shots::run(&file, target.as_deref()).await,
    }
}
