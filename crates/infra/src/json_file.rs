//! JSON-file snapshot store.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use splitbill_core::GroupId;
use splitbill_ledger::Group;
use splitbill_store::{SnapshotError, SnapshotStore};

const GROUPS_FILE: &str = "groups.json";
const ACTIVE_GROUP_FILE: &str = "active_group";

/// Snapshot store backed by two files under one data directory:
/// `groups.json` with the full collection and an `active_group` marker
/// holding the selected group id.
///
/// Timestamps round-trip through chrono's serde support, so loaded groups
/// carry structured dates, never raw strings. Invalid persisted state is
/// rejected on load instead of being masked.
pub struct JsonFileSnapshotStore {
    dir: PathBuf,
}

impl JsonFileSnapshotStore {
    /// Opens the store, creating the data directory when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_error)?;
        Ok(Self { dir })
    }

    fn groups_path(&self) -> PathBuf {
        self.dir.join(GROUPS_FILE)
    }

    fn active_group_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_GROUP_FILE)
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn load_groups(&self) -> Result<Vec<Group>, SnapshotError> {
        match fs::read_to_string(self.groups_path()) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| SnapshotError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error(e)),
        }
    }

    fn load_active_group_id(&self) -> Result<Option<GroupId>, SnapshotError> {
        match fs::read_to_string(self.active_group_path()) {
            Ok(raw) => raw
                .trim()
                .parse::<GroupId>()
                .map(Some)
                .map_err(|e| SnapshotError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e)),
        }
    }

    fn save_groups(&self, groups: &[Group]) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(groups)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        fs::write(self.groups_path(), json).map_err(io_error)
    }

    fn save_active_group_id(&self, group_id: GroupId) -> Result<(), SnapshotError> {
        fs::write(self.active_group_path(), group_id.to_string()).map_err(io_error)
    }

    fn clear_all(&self) -> Result<(), SnapshotError> {
        for path in [self.groups_path(), self.active_group_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(e)),
            }
        }
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> SnapshotError {
    SnapshotError::Io(e.to_string())
}
