//! Expense entity and its validated input model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitbill_core::{DomainError, DomainResult, Entity, ExpenseId, PersonId};

/// Mutable fields of an expense, validated as one unit.
///
/// Shared by the add and update paths so the validation rules are written
/// once. Membership checks need the owning group and happen there.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseInput {
    pub title: String,
    pub amount: f64,
    pub payer_id: PersonId,
    pub participants: Vec<PersonId>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl ExpenseInput {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(DomainError::validation("amount must be a positive number"));
        }
        if self.participants.is_empty() {
            return Err(DomainError::validation(
                "at least one participant is required",
            ));
        }
        Ok(())
    }
}

/// Shared expense paid by one member and split equally among participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    /// Positive amount in a currency-agnostic unit.
    pub amount: f64,
    /// Who paid. Weak reference by id; the payer may only be soft-deleted
    /// once no expense names them here.
    pub payer_id: PersonId,
    /// Members sharing the cost equally.
    pub participants: Vec<PersonId>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Builds a new expense from already-validated input.
    pub(crate) fn from_input(input: ExpenseInput) -> Self {
        Self {
            id: ExpenseId::new(),
            title: input.title,
            amount: input.amount,
            payer_id: input.payer_id,
            participants: input.participants,
            description: input.description,
            category: input.category,
            created_at: Utc::now(),
        }
    }

    /// Replaces every mutable field. `id` and `created_at` never change.
    pub(crate) fn apply_input(&mut self, input: ExpenseInput) {
        self.title = input.title;
        self.amount = input.amount;
        self.payer_id = input.payer_id;
        self.participants = input.participants;
        self.description = input.description;
        self.category = input.category;
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> ExpenseId {
        self.id
    }
}
