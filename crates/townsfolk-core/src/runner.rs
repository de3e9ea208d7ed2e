//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`Scheduler::tick`] off a tokio interval. The
//! interval uses [`MissedTickBehavior::Delay`]: a pass that overruns the
//! interval pushes the next firing back instead of bursting to catch up.
//! Catch-up is the scheduler's job, through elapsed-tick counting.
//!
//! Passes never overlap. The loop owns the scheduler mutably and awaits
//! only between passes.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::Notify;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::broadcast::EventSink;
use crate::tick::{Scheduler, TickError, TickReport};
use crate::world::World;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A pass failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// The configured interval cannot drive a timer.
    #[error("invalid tick interval: {interval_ms} ms")]
    InvalidInterval {
        /// The rejected interval.
        interval_ms: u64,
    },
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// Ran the configured number of passes.
    MaxTicksReached,
    /// A stop was requested.
    Stopped,
}

/// Result of the simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Why the loop ended.
    pub end_reason: SimulationEndReason,
    /// Report of the last pass, if any ran.
    pub final_report: Option<TickReport>,
    /// Passes executed.
    pub total_passes: u64,
}

/// Shared stop flag plus an optional pass budget.
#[derive(Debug, Default)]
pub struct RunControl {
    stop_requested: AtomicBool,
    wake: Notify,
    max_ticks: Option<u64>,
}

impl RunControl {
    /// Control that stops after `max_ticks` passes, or never when `None`.
    pub fn new(max_ticks: Option<u64>) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            wake: Notify::new(),
            max_ticks,
        }
    }

    /// Ask the loop to stop before its next pass.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// The pass budget.
    pub const fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }

    fn limit_reached(&self, passes: u64) -> bool {
        self.max_ticks.is_some_and(|max| passes >= max)
    }
}

/// Callback invoked after each pass.
pub trait TickCallback: Send {
    /// Called after a pass completes. `sink` exposes recent headlines.
    fn on_tick(&mut self, report: &TickReport, world: &World, sink: &dyn EventSink);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _report: &TickReport, _world: &World, _sink: &dyn EventSink) {}
}

/// Run passes until the budget is spent or a stop is requested.
///
/// # Errors
///
/// Returns [`RunnerError::Tick`] if a pass fails unrecoverably and
/// [`RunnerError::InvalidInterval`] for a zero interval.
pub async fn run_simulation<S: EventSink>(
    scheduler: &mut Scheduler<S>,
    control: &RunControl,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let interval_ms = scheduler.world().config.world.tick_interval_ms;
    if interval_ms == 0 {
        return Err(RunnerError::InvalidInterval { interval_ms });
    }
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut final_report = None;
    let mut total_passes: u64 = 0;
    info!(
        interval_ms,
        max_ticks = control.max_ticks(),
        agents = scheduler.world().agents.len(),
        "simulation starting"
    );

    let end_reason = loop {
        if control.is_stop_requested() {
            break SimulationEndReason::Stopped;
        }
        if control.limit_reached(total_passes) {
            break SimulationEndReason::MaxTicksReached;
        }
        tokio::select! {
            _ = interval.tick() => {}
            () = control.wake.notified() => continue,
        }

        let report = scheduler.tick(Utc::now())?;
        total_passes = total_passes.saturating_add(1);
        if report.failures > 0 {
            warn!(tick = report.tick, failures = report.failures, "pass had agent failures");
        }
        callback.on_tick(&report, scheduler.world(), scheduler.sink());
        final_report = Some(report);
    };

    info!(reason = ?end_reason, total_passes, tick = scheduler.world().tick(), "simulation ended");
    Ok(SimulationResult {
        end_reason,
        final_report,
        total_passes,
    })
}
