//! Ledger store: the owned, process-wide collection of groups.

use chrono::Utc;

use splitbill_core::{DomainError, DomainResult, Entity, ExpenseId, GroupId, PersonId};
use splitbill_ledger::{Expense, ExpenseInput, Group, Person};
use splitbill_settlement::{SettlementResult, compute_settlement};

use crate::persistence::{SnapshotError, SnapshotStore};

/// Owned aggregate of all groups plus the active-group selection.
///
/// Constructed once at process start from a [`SnapshotStore`] and passed
/// explicitly to callers, never a process-wide global. Mutations validate
/// first and apply second, so a failed operation leaves the store
/// unchanged; successful ones return an owned snapshot of the affected
/// entity and then persist the full collection. Persisting is
/// fire-and-forget: a storage failure is logged, never rolled back into
/// the mutation result.
pub struct LedgerStore<S: SnapshotStore> {
    snapshots: S,
    /// Insertion order; `remove_group` falls back to the first entry.
    groups: Vec<Group>,
    active_group_id: Option<GroupId>,
}

impl<S: SnapshotStore> LedgerStore<S> {
    /// Loads the persisted snapshot. Loading is a blocking prerequisite:
    /// no store exists until it succeeds.
    pub fn load(snapshots: S) -> Result<Self, SnapshotError> {
        let groups = snapshots.load_groups()?;
        let stored_id = snapshots.load_active_group_id()?;
        // A stale selection (group gone from the snapshot) degrades to no
        // active group instead of failing the load.
        let active_group_id = stored_id.filter(|id| groups.iter().any(|g| g.id() == *id));

        Ok(Self {
            snapshots,
            groups,
            active_group_id,
        })
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == group_id)
    }

    pub fn active_group_id(&self) -> Option<GroupId> {
        self.active_group_id
    }

    pub fn active_group(&self) -> Option<&Group> {
        self.active_group_id.and_then(|id| self.group(id))
    }

    /// Creates an empty group and makes it the active one.
    pub fn create_group(&mut self, name: &str, description: Option<String>) -> DomainResult<Group> {
        let group = Group::new(name, description)?;
        let snapshot = group.clone();

        self.active_group_id = Some(group.id());
        self.groups.push(group);
        self.persist();
        Ok(snapshot)
    }

    /// Replaces a group's name and description.
    pub fn update_group(
        &mut self,
        group_id: GroupId,
        name: &str,
        description: Option<String>,
    ) -> DomainResult<Group> {
        let group = self.group_mut(group_id)?;
        group.update_details(name, description)?;
        let snapshot = group.clone();

        self.persist();
        Ok(snapshot)
    }

    /// Removes a group. The last remaining group can never be removed; if
    /// the removed group was active, the first remaining group (insertion
    /// order) takes over the selection.
    pub fn remove_group(&mut self, group_id: GroupId) -> DomainResult<Group> {
        if self.groups.len() <= 1 {
            return Err(DomainError::invariant("at least one group must remain"));
        }
        let idx = self
            .groups
            .iter()
            .position(|g| g.id() == group_id)
            .ok_or_else(|| group_not_found(group_id))?;

        let removed = self.groups.remove(idx);
        if self.active_group_id == Some(group_id) {
            self.active_group_id = self.groups.first().map(Entity::id);
        }
        self.persist();
        Ok(removed)
    }

    /// Selects another group. Unknown ids fail without touching state.
    pub fn switch_group(&mut self, group_id: GroupId) -> DomainResult<Group> {
        let snapshot = self
            .group(group_id)
            .ok_or_else(|| group_not_found(group_id))?
            .clone();

        self.active_group_id = Some(group_id);
        self.persist_selection();
        Ok(snapshot)
    }

    /// Adds a member to the active group.
    pub fn add_person(&mut self, name: &str, avatar: Option<String>) -> DomainResult<Person> {
        let person = self.active_group_mut()?.add_member(name, avatar)?;
        self.persist();
        Ok(person)
    }

    /// Soft-deletes a member of the active group. Members with payment
    /// history are protected by the group's conflict check.
    pub fn remove_person(&mut self, person_id: PersonId) -> DomainResult<Person> {
        let person = self.active_group_mut()?.remove_member(person_id)?;
        self.persist();
        Ok(person)
    }

    /// Records an expense in the active group.
    pub fn add_expense(&mut self, input: ExpenseInput) -> DomainResult<Expense> {
        let expense = self.active_group_mut()?.add_expense(input)?;
        self.persist();
        Ok(expense)
    }

    /// Rewrites an expense of the active group.
    pub fn update_expense(
        &mut self,
        expense_id: ExpenseId,
        input: ExpenseInput,
    ) -> DomainResult<Expense> {
        let expense = self.active_group_mut()?.update_expense(expense_id, input)?;
        self.persist();
        Ok(expense)
    }

    /// Deletes an expense of the active group.
    pub fn remove_expense(&mut self, expense_id: ExpenseId) -> DomainResult<Expense> {
        let expense = self.active_group_mut()?.remove_expense(expense_id)?;
        self.persist();
        Ok(expense)
    }

    /// Settlement report for the active group, or `None` when there is no
    /// active group or it has no expenses yet.
    pub fn settlement(&self) -> Option<SettlementResult> {
        let group = self.active_group()?;
        if group.expenses().is_empty() {
            return None;
        }

        let settlement = compute_settlement(group.expenses(), group.members());
        Some(SettlementResult {
            group_id: group.id(),
            person_balances: settlement.person_balances,
            optimal_transfers: settlement.optimal_transfers,
            total_amount: group.expenses().iter().map(|e| e.amount).sum(),
            calculated_at: Utc::now(),
        })
    }

    /// Erases persisted state and resets to an empty collection with no
    /// active group. Unlike saves, an erase failure propagates to the
    /// caller and leaves the in-memory state untouched.
    pub fn clear_all(&mut self) -> Result<(), SnapshotError> {
        self.snapshots.clear_all()?;
        self.groups.clear();
        self.active_group_id = None;
        Ok(())
    }

    fn group_mut(&mut self, group_id: GroupId) -> DomainResult<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| g.id() == group_id)
            .ok_or_else(|| group_not_found(group_id))
    }

    fn active_group_mut(&mut self) -> DomainResult<&mut Group> {
        let group_id = self
            .active_group_id
            .ok_or_else(|| DomainError::not_found("no active group is selected"))?;
        self.group_mut(group_id)
    }

    /// Fire-and-forget save of the full snapshot.
    fn persist(&self) {
        if let Err(e) = self.snapshots.save_groups(&self.groups) {
            tracing::warn!("snapshot save failed: {e}");
        }
        self.persist_selection();
    }

    fn persist_selection(&self) {
        if let Some(group_id) = self.active_group_id {
            if let Err(e) = self.snapshots.save_active_group_id(group_id) {
                tracing::warn!("active group save failed: {e}");
            }
        }
    }
}

fn group_not_found(group_id: GroupId) -> DomainError {
    DomainError::not_found(format!("group {group_id} does not exist"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySnapshotStore;

    fn store() -> LedgerStore<InMemorySnapshotStore> {
        LedgerStore::load(InMemorySnapshotStore::new()).unwrap()
    }

    fn expense_input(payer_id: PersonId, participants: Vec<PersonId>) -> ExpenseInput {
        ExpenseInput {
            title: "Dinner".to_string(),
            amount: 60.0,
            payer_id,
            participants,
            description: None,
            category: None,
        }
    }

    #[test]
    fn create_group_becomes_active() {
        let mut store = store();
        let group = store.create_group("Trip", None).unwrap();

        assert_eq!(store.active_group_id(), Some(group.id()));
        assert_eq!(store.groups().len(), 1);
    }

    #[test]
    fn create_group_rejects_blank_name() {
        let mut store = store();
        let err = store.create_group("  ", None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(store.groups().is_empty());
    }

    #[test]
    fn update_group_replaces_details() {
        let mut store = store();
        let group = store.create_group("Trip", None).unwrap();

        let updated = store
            .update_group(group.id(), "Road trip", Some("summer".to_string()))
            .unwrap();
        assert_eq!(updated.name(), "Road trip");
        assert_eq!(updated.description(), Some("summer"));
    }

    #[test]
    fn update_unknown_group_reports_not_found() {
        let mut store = store();
        store.create_group("Trip", None).unwrap();

        let err = store.update_group(GroupId::new(), "X", None).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn last_group_cannot_be_removed() {
        let mut store = store();
        let group = store.create_group("Trip", None).unwrap();

        let err = store.remove_group(group.id()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(store.groups().len(), 1);
    }

    #[test]
    fn removing_active_group_selects_first_remaining() {
        let mut store = store();
        let first = store.create_group("First", None).unwrap();
        let second = store.create_group("Second", None).unwrap();
        assert_eq!(store.active_group_id(), Some(second.id()));

        store.remove_group(second.id()).unwrap();
        assert_eq!(store.active_group_id(), Some(first.id()));
    }

    #[test]
    fn removing_inactive_group_keeps_selection() {
        let mut store = store();
        let first = store.create_group("First", None).unwrap();
        let second = store.create_group("Second", None).unwrap();

        store.remove_group(first.id()).unwrap();
        assert_eq!(store.active_group_id(), Some(second.id()));
    }

    #[test]
    fn switch_to_unknown_group_is_a_failed_no_op() {
        let mut store = store();
        let group = store.create_group("Trip", None).unwrap();

        let err = store.switch_group(GroupId::new()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(store.active_group_id(), Some(group.id()));
    }

    #[test]
    fn add_person_requires_active_group() {
        let mut store = store();
        let err = store.add_person("Alice", None).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn remove_person_protects_payers() {
        let mut store = store();
        store.create_group("Trip", None).unwrap();
        let alice = store.add_person("Alice", None).unwrap();
        let bob = store.add_person("Bob", None).unwrap();
        store
            .add_expense(expense_input(alice.id, vec![alice.id, bob.id]))
            .unwrap();

        let err = store.remove_person(alice.id).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let removed = store.remove_person(bob.id).unwrap();
        assert!(!removed.is_active());
        assert_eq!(store.active_group().unwrap().members().len(), 2);
    }

    #[test]
    fn expense_lifecycle_round_trips() {
        let mut store = store();
        store.create_group("Trip", None).unwrap();
        let alice = store.add_person("Alice", None).unwrap();
        let bob = store.add_person("Bob", None).unwrap();

        let expense = store
            .add_expense(expense_input(alice.id, vec![alice.id, bob.id]))
            .unwrap();

        let mut input = expense_input(bob.id, vec![bob.id, alice.id]);
        input.amount = 80.0;
        let updated = store.update_expense(expense.id, input).unwrap();
        assert_eq!(updated.id, expense.id);
        assert_eq!(updated.amount, 80.0);

        store.remove_expense(expense.id).unwrap();
        assert!(store.active_group().unwrap().expenses().is_empty());

        let err = store.remove_expense(expense.id).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn settlement_is_none_without_expenses() {
        let mut store = store();
        assert!(store.settlement().is_none());

        store.create_group("Trip", None).unwrap();
        store.add_person("Alice", None).unwrap();
        assert!(store.settlement().is_none());
    }

    #[test]
    fn settlement_reports_totals_for_active_group() {
        let mut store = store();
        let group = store.create_group("Trip", None).unwrap();
        let alice = store.add_person("Alice", None).unwrap();
        let bob = store.add_person("Bob", None).unwrap();
        store
            .add_expense(expense_input(alice.id, vec![alice.id, bob.id]))
            .unwrap();

        let result = store.settlement().unwrap();
        assert_eq!(result.group_id, group.id());
        assert_eq!(result.total_amount, 60.0);
        assert_eq!(result.person_balances.len(), 2);
        assert_eq!(result.optimal_transfers.len(), 1);
        assert_eq!(result.optimal_transfers[0].from_person_id, bob.id);
        assert_eq!(result.optimal_transfers[0].amount, 30.0);
    }

    #[test]
    fn clear_all_resets_to_empty() {
        let mut store = store();
        store.create_group("Trip", None).unwrap();
        store.clear_all().unwrap();

        assert!(store.groups().is_empty());
        assert!(store.active_group_id().is_none());
        assert!(store.settlement().is_none());
    }
}
