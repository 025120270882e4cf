use std::path::Path;

use anyhow::Result;

use agg_config::EngineConfig;
use agg_runtime::Session;

/// Load the specification, optionally restore a snapshot, replay the event
/// log, print current values as JSON on stdout.
pub fn run(
    config: &EngineConfig,
    spec: &Path,
    events: &Path,
    snapshot_in: Option<&Path>,
    snapshot_out: Option<&Path>,
) -> Result<()> {
    let mut session = Session::new(config);
    session
        .load_spec(spec)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if let Some(path) = snapshot_in {
        let restored = session
            .load_snapshot(path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        tracing::info!(domain = "res", restored, "snapshot loaded");
    }

    let report = session
        .replay_file(events)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if let Some(path) = snapshot_out {
        session
            .save_snapshot(path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    println!("{}", serde_json::to_string_pretty(&session.current_values())?);

    eprintln!("---");
    eprintln!(
        "Replay complete: {} events processed, {} errors",
        report.event_count, report.error_count
    );

    Ok(())
}
