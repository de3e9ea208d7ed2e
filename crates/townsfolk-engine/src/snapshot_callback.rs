//! Tick callback that exports the world as a JSON snapshot.
//!
//! Every `every_ticks` passes the callback serializes a
//! [`WorldSnapshot`](townsfolk_types::WorldSnapshot) and replaces the file at
//! the configured path. The file is written next to its target and renamed
//! over it so readers never see a half-written snapshot.

use std::path::{Path, PathBuf};

use chrono::Utc;
use townsfolk_core::runner::TickCallback;
use townsfolk_core::{EventSink, TickReport, World};
use tracing::{debug, warn};

use crate::error::EngineError;

/// Writes a snapshot file on a fixed pass cadence.
#[derive(Debug)]
pub struct SnapshotCallback {
    path: PathBuf,
    every_ticks: u64,
    passes: u64,
    written: u64,
}

impl SnapshotCallback {
    /// Export to `path` every `every_ticks` passes. Zero disables export.
    pub fn new(path: impl Into<PathBuf>, every_ticks: u64) -> Self {
        Self {
            path: path.into(),
            every_ticks,
            passes: 0,
            written: 0,
        }
    }

    /// Snapshots written so far.
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Write a snapshot right now, regardless of cadence.
    pub fn write_now(&mut self, world: &World, sink: &dyn EventSink) -> Result<(), EngineError> {
        let snapshot = world.snapshot(sink.recent_headlines(), Utc::now());
        let json = serde_json::to_vec_pretty(&snapshot)?;
        write_atomically(&self.path, &json)?;
        self.written = self.written.saturating_add(1);
        debug!(path = %self.path.display(), tick = snapshot.tick, "snapshot written");
        Ok(())
    }

    const fn due(&self) -> bool {
        matches!(self.passes.checked_rem(self.every_ticks), Some(0))
    }
}

impl TickCallback for SnapshotCallback {
    fn on_tick(&mut self, _report: &TickReport, world: &World, sink: &dyn EventSink) {
        self.passes = self.passes.saturating_add(1);
        if !self.due() {
            return;
        }
        if let Err(err) = self.write_now(world, sink) {
            warn!(path = %self.path.display(), error = %err, "snapshot export failed");
        }
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use townsfolk_core::{RecordingSink, SimulationConfig};
    use townsfolk_types::{AgentId, Personality, WorldSnapshot};

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("townsfolk-test-{}", AgentId::new()))
            .join(name)
    }

    fn world() -> World {
        let mut world = World::new(SimulationConfig::default(), Utc::now()).unwrap();
        world.register_agent(AgentId::new(), "Ola".into(), Personality::balanced(), Utc::now());
        world
    }

    #[test]
    fn writes_on_cadence_only() {
        let path = scratch_path("snap.json");
        let mut callback = SnapshotCallback::new(&path, 3);
        let world = world();
        let sink = RecordingSink::default();
        let report = TickReport::default();

        for _ in 0..7 {
            callback.on_tick(&report, &world, &sink);
        }
        assert_eq!(callback.written(), 2);
        assert!(path.exists());
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn zero_cadence_disables_export() {
        let path = scratch_path("never.json");
        let mut callback = SnapshotCallback::new(&path, 0);
        let world = world();
        let sink = RecordingSink::default();
        for _ in 0..5 {
            callback.on_tick(&TickReport::default(), &world, &sink);
        }
        assert_eq!(callback.written(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn snapshot_file_round_trips() {
        let path = scratch_path("round.json");
        let mut callback = SnapshotCallback::new(&path, 1);
        let world = world();
        let mut sink = RecordingSink::default();
        sink.headline(String::from("Ola opened a stall."));

        callback.write_now(&world, &sink).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let snapshot: WorldSnapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot.agents.len(), 1);
        assert_eq!(snapshot.headlines, vec![String::from("Ola opened a stall.")]);
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
