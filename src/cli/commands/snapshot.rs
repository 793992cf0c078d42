//! Snapshot command: read the device directory once and print the tree.

use anyhow::Context;

use crate::config::Settings;
use crate::session::{self, SessionOptions};

pub async fn run(settings: &Settings, pretty: bool) -> anyhow::Result<()> {
    let dir = &settings.source.dir;
    let options = SessionOptions::from_settings(settings);
    let files = session::discover(dir, &options.index_name)
        .await
        .with_context(|| format!("Cannot read {}", dir.display()))?;

    let tree = session::snapshot(&files, &options).await?;
    let json = if pretty {
        serde_json::to_string_pretty(&tree)?
    } else {
        serde_json::to_string(&tree)?
    };
    println!("{json}");
    Ok(())
}
