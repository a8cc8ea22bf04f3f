//! In-memory snapshot store.

use std::cell::RefCell;

use splitbill_core::GroupId;
use splitbill_ledger::Group;

use crate::persistence::{SnapshotError, SnapshotStore};

/// In-memory snapshot store.
///
/// Intended for tests/dev. Also counts `save_groups` calls so tests can
/// assert the save-after-every-mutation contract. `RefCell` suffices: the
/// session is single-threaded by design.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    state: RefCell<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    groups: Vec<Group>,
    active_group_id: Option<GroupId>,
    save_count: usize,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates persisted state, as if a previous session saved it.
    pub fn seeded(groups: Vec<Group>, active_group_id: Option<GroupId>) -> Self {
        Self {
            state: RefCell::new(MemoryState {
                groups,
                active_group_id,
                save_count: 0,
            }),
        }
    }

    /// Number of `save_groups` calls observed so far.
    pub fn save_count(&self) -> usize {
        self.state.borrow().save_count
    }

    pub fn persisted_groups(&self) -> Vec<Group> {
        self.state.borrow().groups.clone()
    }

    pub fn persisted_active_group_id(&self) -> Option<GroupId> {
        self.state.borrow().active_group_id
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load_groups(&self) -> Result<Vec<Group>, SnapshotError> {
        Ok(self.state.borrow().groups.clone())
    }

    fn load_active_group_id(&self) -> Result<Option<GroupId>, SnapshotError> {
        Ok(self.state.borrow().active_group_id)
    }

    fn save_groups(&self, groups: &[Group]) -> Result<(), SnapshotError> {
        let mut state = self.state.borrow_mut();
        state.groups = groups.to_vec();
        state.save_count += 1;
        Ok(())
    }

    fn save_active_group_id(&self, group_id: GroupId) -> Result<(), SnapshotError> {
        self.state.borrow_mut().active_group_id = Some(group_id);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), SnapshotError> {
        let mut state = self.state.borrow_mut();
        state.groups.clear();
        state.active_group_id = None;
        Ok(())
    }
}
