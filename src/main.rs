mod config;
mod crawl;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::Config;
use crate::crawl::{Mailman, Mirror};

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Mirror the index graphs published by the configured pods.
        cmd podmirror {
            /// Path to the TOML configuration file. Defaults to podmirror.toml.
            optional -c, --config path: PathBuf
            /// Run a single sweep and exit instead of staying scheduled.
            optional --once
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let flags = flags::Podmirror::from_env_or_exit();
    let config_path = flags
        .config
        .unwrap_or_else(|| PathBuf::from("podmirror.toml"));
    let config = load_config(&config_path).await?;
    if config.crawl.servers.is_empty() {
        warn!("no pods configured; every sweep will be empty");
    }

    if flags.once {
        return run_sweep(&config).await;
    }

    // The first tick fires immediately; later ones follow the configured
    // interval, sweeping again right away only if a sweep overran it.
    let mut interval = time::interval(Duration::from_secs(config.crawl.interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(error) = run_sweep(&config).await {
                    warn!(%error, "sweep failed");
                }
            }
            _ = sigterm.recv() => {
                info!("Received the terminate signal; stopping");
                break;
            }
            _ = sigint.recv() => {
                info!("Received the interrupt signal; stopping");
                break;
            }
        }
    }

    Ok(())
}

async fn load_config(path: &Path) -> Result<Config> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("unable to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("unable to parse {}", path.display()))
}

async fn run_sweep(config: &Config) -> Result<()> {
    let mailman = Mailman::new();
    let mirror = Mirror::new(&config.crawl.mirror_dir);
    let snapshot = crawl::sweep(&config.crawl, &mailman, &mirror).await;
    let json = serde_json::to_string_pretty(&snapshot)?;
    tokio::fs::write(&config.crawl.snapshot_path, json)
        .await
        .with_context(|| {
            format!(
                "unable to write snapshot to {}",
                config.crawl.snapshot_path.display()
            )
        })?;
    info!(
        indexes = snapshot.len(),
        path = %config.crawl.snapshot_path.display(),
        "snapshot written"
    );
    Ok(())
}
