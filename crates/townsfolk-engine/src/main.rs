//! Engine binary for the Townsfolk simulation.
//!
//! Wires the scheduler, the broadcaster, the seed spawner and the snapshot
//! exporter together, then runs the tick loop until the pass budget is
//! spent or the process receives ctrl-c.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `townsfolk-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the broadcaster and the scheduler
//! 4. Spawn seed agents
//! 5. Install the ctrl-c handler
//! 6. Run the simulation loop
//! 7. Write a final snapshot and close the broadcaster

mod error;
mod snapshot_callback;
mod spawner;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use townsfolk_core::config::LoggingConfig;
use townsfolk_core::runner::{self, RunControl};
use townsfolk_core::{Broadcaster, Scheduler, SimulationConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::snapshot_callback::SnapshotCallback;

/// Config file looked up relative to the working directory.
const CONFIG_PATH: &str = "townsfolk-config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration. Logging is not up yet, so a missing file is
    //    reported again after step 2.
    let config = SimulationConfig::load_or_default(Path::new(CONFIG_PATH))
        .map_err(EngineError::from)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        config_file_found = Path::new(CONFIG_PATH).exists(),
        "townsfolk-engine starting"
    );

    // 3. Create the broadcaster and the scheduler.
    let broadcaster = Broadcaster::new(&config.broadcast);
    let started_at = Utc::now();
    let mut scheduler =
        Scheduler::new(config.clone(), broadcaster, started_at).map_err(EngineError::from)?;
    info!(tick = scheduler.world().tick(), "scheduler initialized");

    // 4. Spawn seed agents.
    let mut spawn_rng = spawner::spawner_rng(config.world.seed);
    let spawned = spawner::spawn_seed_agents(
        &mut scheduler,
        config.population.initial_agents,
        &mut spawn_rng,
        started_at,
    )?;
    info!(agents_spawned = spawned.agents.len(), "seed agents spawned");

    // 5. Install the ctrl-c handler.
    let control = Arc::new(RunControl::new(config.world.max_ticks));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("ctrl-c received, stopping after the current pass");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
            }
        });
    }

    // 6. Run the simulation loop.
    let mut callback = SnapshotCallback::new(&config.snapshot.path, config.snapshot.every_ticks);
    let result = runner::run_simulation(&mut scheduler, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 7. Final snapshot and teardown.
    if config.snapshot.every_ticks > 0 {
        callback.write_now(scheduler.world(), scheduler.sink())?;
    }
    let sent = scheduler.sink().sent();
    scheduler.shutdown();

    info!(
        end_reason = ?result.end_reason,
        total_passes = result.total_passes,
        final_tick = scheduler.world().tick(),
        snapshots_written = callback.written(),
        messages_sent = sent,
        "townsfolk-engine shutdown complete"
    );
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
