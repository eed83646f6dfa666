//! Snapshot Output
//!
//! Decides when to snapshot a session and writes snapshots as JSON.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use eco_types::{generate_snapshot_id, SessionSnapshot};

use crate::session::Session;

/// Errors that can occur while writing snapshots.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tracks snapshot ids and the snapshot interval
#[derive(Debug)]
pub struct SnapshotGenerator {
    next_snapshot_id: u64,
    snapshot_interval: u64,
    last_snapshot_tick: Option<u64>,
}

impl SnapshotGenerator {
    /// An interval of 0 disables periodic snapshots.
    pub fn new(snapshot_interval: u64) -> Self {
        Self {
            next_snapshot_id: 1,
            snapshot_interval,
            last_snapshot_tick: None,
        }
    }

    pub fn should_snapshot(&self, current_tick: u64) -> bool {
        self.snapshot_interval > 0
            && current_tick % self.snapshot_interval == 0
            && self.last_snapshot_tick != Some(current_tick)
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    /// Takes a snapshot of the session and records its tick.
    pub fn capture(&mut self, session: &Session, triggered_by: &str) -> SessionSnapshot {
        let id = self.next_id();
        self.last_snapshot_tick = Some(session.current_tick());
        session.snapshot(id, triggered_by)
    }

    /// Whether a snapshot was already taken at `tick`.
    pub fn captured(&self, tick: u64) -> bool {
        self.last_snapshot_tick == Some(tick)
    }

    pub fn snapshot_count(&self) -> u64 {
        self.next_snapshot_id - 1
    }
}

/// Writes output files under one directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    /// Creates the writer and its `snapshots/` directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(output_dir.join("snapshots"))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the per-tick snapshot file
    pub fn snapshot_path(&self, tick: u64) -> PathBuf {
        self.output_dir
            .join("snapshots")
            .join(format!("snap_{:06}.json", tick))
    }

    /// Path of the always-current state file
    pub fn current_state_path(&self) -> PathBuf {
        self.output_dir.join("current_state.json")
    }

    /// Write snapshot to the snapshots directory
    pub fn write_snapshot(&self, snapshot: &SessionSnapshot) -> Result<PathBuf, OutputError> {
        let path = self.snapshot_path(snapshot.tick);
        write_snapshot(snapshot, &path)?;
        Ok(path)
    }

    /// Write current state (overwrites each time)
    pub fn write_current_state(&self, snapshot: &SessionSnapshot) -> Result<(), OutputError> {
        write_snapshot(snapshot, self.current_state_path())
    }
}

/// Write snapshot to file
pub fn write_snapshot(
    snapshot: &SessionSnapshot,
    path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let json = snapshot.to_json_pretty()?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryConfigTable;
    use eco_types::FactoryKind;

    #[test]
    fn test_snapshot_interval() {
        let generator = SnapshotGenerator::new(100);
        assert!(generator.should_snapshot(0));
        assert!(!generator.should_snapshot(50));
        assert!(generator.should_snapshot(200));
    }

    #[test]
    fn test_zero_interval_disables() {
        let generator = SnapshotGenerator::new(0);
        assert!(!generator.should_snapshot(0));
        assert!(!generator.should_snapshot(100));
    }

    #[test]
    fn test_capture_assigns_ids() {
        let mut session = Session::new(FactoryConfigTable::default(), 0);
        session.place_factory(FactoryKind::Air).unwrap();
        let mut generator = SnapshotGenerator::new(10);

        let first = generator.capture(&session, "start");
        assert_eq!(first.snapshot_id, "snap_000001");
        // Same tick is not snapshotted twice
        assert!(!generator.should_snapshot(0));

        for _ in 0..10 {
            session.tick(0.1);
        }
        assert!(generator.should_snapshot(session.current_tick()));
        let second = generator.capture(&session, "periodic");
        assert_eq!(second.snapshot_id, "snap_000002");
        assert_eq!(second.tick, 10);
        assert_eq!(generator.snapshot_count(), 2);
    }

    #[test]
    fn test_end_capture_skipped_after_periodic() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path()).unwrap();
        let mut session = Session::new(FactoryConfigTable::default(), 0);
        let mut generator = SnapshotGenerator::new(10);

        for _ in 0..10 {
            session.tick(0.1);
        }
        let tick = session.current_tick();
        assert!(generator.should_snapshot(tick));
        let periodic = generator.capture(&session, "periodic");
        writer.write_snapshot(&periodic).unwrap();

        // The run ends on the same tick
        assert!(generator.captured(tick));
        if !generator.captured(tick) {
            generator.capture(&session, "simulation_end");
        }

        assert_eq!(generator.snapshot_count(), 1);
        let content = fs::read_to_string(writer.snapshot_path(tick)).unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.snapshot_id, "snap_000001");
        assert_eq!(parsed.triggered_by, "periodic");

        session.tick(0.1);
        assert!(!generator.captured(session.current_tick()));
    }

    #[test]
    fn test_write_snapshot_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("out")).unwrap();
        let session = Session::new(FactoryConfigTable::default(), 5);
        let snapshot = session.snapshot("snap_000001", "test");

        let path = writer.write_snapshot(&snapshot).unwrap();
        writer.write_current_state(&snapshot).unwrap();

        assert!(path.ends_with("snapshots/snap_000000.json"));
        let content = fs::read_to_string(writer.current_state_path()).unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.money, 5);
    }
}
