//! Persistence contract for ledger snapshots.

use thiserror::Error;

use splitbill_core::GroupId;
use splitbill_ledger::Group;

/// Storage-level error for snapshot persistence.
///
/// Deliberately separate from the domain error model: a failing disk is
/// not a business rule violation.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io failed: {0}")]
    Io(String),

    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}

/// Load/save contract for the full ledger snapshot.
///
/// The store calls `save_groups` with the complete collection after every
/// mutation, so implementations must be idempotent. Loading happens once,
/// at store construction.
pub trait SnapshotStore {
    /// Loads all persisted groups. Date-valued fields must come back as
    /// structured timestamps, not raw strings.
    fn load_groups(&self) -> Result<Vec<Group>, SnapshotError>;

    /// Loads the previously selected group id, if any was saved.
    fn load_active_group_id(&self) -> Result<Option<GroupId>, SnapshotError>;

    /// Replaces the persisted collection with `groups`.
    fn save_groups(&self, groups: &[Group]) -> Result<(), SnapshotError>;

    /// Persists the active-group selection.
    fn save_active_group_id(&self, group_id: GroupId) -> Result<(), SnapshotError>;

    /// Erases all persisted state.
    fn clear_all(&self) -> Result<(), SnapshotError>;
}

/// Shared references delegate, so a caller can keep inspecting a snapshot
/// store it lent to a [`crate::LedgerStore`].
impl<T: SnapshotStore + ?Sized> SnapshotStore for &T {
    fn load_groups(&self) -> Result<Vec<Group>, SnapshotError> {
        (**self).load_groups()
    }

    fn load_active_group_id(&self) -> Result<Option<GroupId>, SnapshotError> {
        (**self).load_active_group_id()
    }

    fn save_groups(&self, groups: &[Group]) -> Result<(), SnapshotError> {
        (**self).save_groups(groups)
    }

    fn save_active_group_id(&self, group_id: GroupId) -> Result<(), SnapshotError> {
        (**self).save_active_group_id(group_id)
    }

    fn clear_all(&self) -> Result<(), SnapshotError> {
        (**self).clear_all()
    }
}
