//! Watch command: stream every published tree to stdout.

use std::io::Write;

use anyhow::Context;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::config::Settings;
use crate::publish::{SessionEvent, TreeBroadcaster};
use crate::score::ScoreTree;
use crate::session::{self, ScoreSession, SessionOptions};

/// Write one tree as a single JSON line.
pub fn write_tree(out: &mut impl Write, tree: &ScoreTree) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, tree)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let dir = &settings.source.dir;
    let options = SessionOptions::from_settings(settings);
    let files = session::discover(dir, &options.index_name)
        .await
        .with_context(|| format!("Cannot watch {}", dir.display()))?;

    let broadcaster = TreeBroadcaster::new(settings.publish.channel_capacity);
    let mut events = broadcaster.subscribe();
    let session = ScoreSession::start(files, &options, broadcaster)?;
    eprintln!(
        "Watching {} lanes in {} (Ctrl+C to stop)",
        session.lane_count(),
        dir.display()
    );

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl+C")?;
                eprintln!("Received shutdown signal");
                break;
            }
            event = events.recv() => match event {
                Ok(SessionEvent::TreeUpdated(tree)) => write_tree(&mut stdout, &tree)?,
                Ok(SessionEvent::Failed { entity, .. }) => {
                    crate::debug_event!("session", "failure event", "{entity}");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[session] output fell behind, skipped {skipped} trees");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    session.shutdown().await?;

    // Reads in flight at shutdown still publish.
    loop {
        match events.try_recv() {
            Ok(SessionEvent::TreeUpdated(tree)) => write_tree(&mut stdout, &tree)?,
            Ok(SessionEvent::Failed { .. }) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    Ok(())
}
