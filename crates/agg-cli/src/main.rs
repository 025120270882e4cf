use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use agg_config::EngineConfig;
use agg_runtime::tracing_init::init_tracing;

mod cmd_check;
mod cmd_replay;

#[derive(Parser)]
#[command(name = "aggregate", about = "Incremental event aggregation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL event log through a specification and print the
    /// aggregator values
    Replay {
        /// Path to the JSON specification document
        #[arg(short, long)]
        spec: PathBuf,

        /// Path to the JSONL event log
        #[arg(short, long)]
        events: PathBuf,

        /// Path to engine.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Restore aggregator states from this snapshot before replaying
        #[arg(long)]
        snapshot_in: Option<PathBuf>,

        /// Write aggregator states to this snapshot after replaying
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },

    /// Parse every function and aggregator of a specification and report
    /// errors
    Check {
        /// Path to the JSON specification document
        #[arg(short, long)]
        spec: PathBuf,

        /// Path to engine.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            spec,
            events,
            config,
            snapshot_in,
            snapshot_out,
        } => {
            let (engine_config, base_dir) = load_config(config.as_deref())?;
            let _guard = init_tracing(&engine_config.logging, &base_dir)?;
            cmd_replay::run(
                &engine_config,
                &spec,
                &events,
                snapshot_in.as_deref(),
                snapshot_out.as_deref(),
            )?;
        }

        Commands::Check { spec, config } => {
            let (engine_config, base_dir) = load_config(config.as_deref())?;
            let _guard = init_tracing(&engine_config.logging, &base_dir)?;
            cmd_check::run(&engine_config, &spec)?;
        }
    }

    Ok(())
}

/// Load `engine.toml` when given; defaults otherwise. Returns the directory
/// relative log paths resolve against.
fn load_config(path: Option<&Path>) -> Result<(EngineConfig, PathBuf)> {
    let Some(path) = path else {
        return Ok((EngineConfig::default(), std::env::current_dir()?));
    };
    let config_path = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("config path '{}': {e}", path.display()))?;
    let config = EngineConfig::load(&config_path)?;
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow::anyhow!("config path has no parent directory"))?;
    Ok((config, base_dir))
}
