//! Group aggregate: the unit of persistence and settlement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitbill_core::{DomainError, DomainResult, Entity, ExpenseId, GroupId, PersonId};

use crate::expense::{Expense, ExpenseInput};
use crate::person::Person;

/// Self-contained ledger of people and shared expenses.
///
/// The group exclusively owns its members and expenses (composition).
/// Every mutation validates first and only touches state afterwards, so a
/// failed call leaves the group exactly as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    description: Option<String>,
    /// Insertion order. Soft-deleted members stay in place.
    members: Vec<Person>,
    /// Insertion order.
    expenses: Vec<Expense>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Group {
    /// Creates an empty group.
    pub fn new(name: &str, description: Option<String>) -> DomainResult<Self> {
        let name = valid_name(name)?;
        let now = Utc::now();
        Ok(Self {
            id: GroupId::new(),
            name,
            description,
            members: Vec::new(),
            expenses: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn members(&self) -> &[Person] {
        &self.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Members that participate in balances and settlements.
    pub fn active_members(&self) -> impl Iterator<Item = &Person> {
        self.members.iter().filter(|m| m.is_active())
    }

    /// Replaces name and description.
    pub fn update_details(&mut self, name: &str, description: Option<String>) -> DomainResult<()> {
        self.name = valid_name(name)?;
        self.description = description;
        self.touch();
        Ok(())
    }

    /// Appends a new active member.
    ///
    /// Names must be unique among *active* members: a deleted member's name
    /// can be reused.
    pub fn add_member(&mut self, name: &str, avatar: Option<String>) -> DomainResult<Person> {
        let name = valid_name(name)?;
        if self.active_members().any(|m| m.name == name) {
            return Err(DomainError::validation(format!(
                "a member named '{name}' already exists"
            )));
        }

        let person = Person::new(name, avatar);
        self.members.push(person.clone());
        self.touch();
        Ok(person)
    }

    /// Soft-deletes a member.
    ///
    /// Blocked with a conflict while any expense names the member as payer:
    /// a payer's history must remain attributable. Members who merely
    /// participated stay in the sequence as tombstones, so their expenses
    /// keep resolving.
    pub fn remove_member(&mut self, person_id: PersonId) -> DomainResult<Person> {
        let idx = self
            .members
            .iter()
            .position(|m| m.id == person_id)
            .ok_or_else(|| member_not_found(person_id))?;

        if self.expenses.iter().any(|e| e.payer_id == person_id) {
            return Err(DomainError::conflict("member has payment history"));
        }

        self.members[idx].soft_delete();
        self.touch();
        Ok(self.members[idx].clone())
    }

    /// Appends a new expense after validating its fields and payer.
    pub fn add_expense(&mut self, input: ExpenseInput) -> DomainResult<Expense> {
        input.validate()?;
        self.ensure_active_payer(input.payer_id)?;

        let expense = Expense::from_input(input);
        self.expenses.push(expense.clone());
        self.touch();
        Ok(expense)
    }

    /// Replaces every mutable field of an existing expense.
    pub fn update_expense(
        &mut self,
        expense_id: ExpenseId,
        input: ExpenseInput,
    ) -> DomainResult<Expense> {
        let idx = self
            .expenses
            .iter()
            .position(|e| e.id == expense_id)
            .ok_or_else(|| expense_not_found(expense_id))?;

        input.validate()?;
        self.ensure_active_payer(input.payer_id)?;

        self.expenses[idx].apply_input(input);
        self.touch();
        Ok(self.expenses[idx].clone())
    }

    /// Removes an expense. No domain invariant depends on expense history,
    /// so removal is unconditional once the id resolves.
    pub fn remove_expense(&mut self, expense_id: ExpenseId) -> DomainResult<Expense> {
        let idx = self
            .expenses
            .iter()
            .position(|e| e.id == expense_id)
            .ok_or_else(|| expense_not_found(expense_id))?;

        let removed = self.expenses.remove(idx);
        self.touch();
        Ok(removed)
    }

    /// Payers must be active members: combined with the payment-history
    /// conflict in [`Group::remove_member`], this keeps "soft-deleted payer
    /// with expenses on record" structurally unreachable.
    fn ensure_active_payer(&self, payer_id: PersonId) -> DomainResult<()> {
        if self.active_members().any(|m| m.id == payer_id) {
            Ok(())
        } else {
            Err(DomainError::validation(
                "payer must be an active member of this group",
            ))
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Group {
    type Id = GroupId;

    fn id(&self) -> GroupId {
        self.id
    }
}

fn valid_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn member_not_found(person_id: PersonId) -> DomainError {
    DomainError::not_found(format!("member {person_id} is not part of this group"))
}

fn expense_not_found(expense_id: ExpenseId) -> DomainError {
    DomainError::not_found(format!("expense {expense_id} does not exist"))
}
