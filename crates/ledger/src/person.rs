//! Person entity and soft-delete lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitbill_core::{Entity, PersonId};

/// Person lifecycle state.
///
/// Deletion is a tagged state rather than a flag: `is_active` is the single
/// predicate both the store and the settlement engine rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonStatus {
    Active,
    Deleted,
}

/// Group member.
///
/// Never removed from `Group::members` once created: expenses reference
/// people by id, so history must stay resolvable. Deletion only changes
/// `status` to [`PersonStatus::Deleted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Opaque reference rendered by the caller (emoji, URL, ...).
    pub avatar: Option<String>,
    pub status: PersonStatus,
    pub created_at: DateTime<Utc>,
}

impl Person {
    /// Creates an active member with a fresh identifier.
    pub fn new(name: impl Into<String>, avatar: Option<String>) -> Self {
        Self {
            id: PersonId::new(),
            name: name.into(),
            avatar,
            status: PersonStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Whether this person participates in balances and settlements.
    pub fn is_active(&self) -> bool {
        self.status == PersonStatus::Active
    }

    /// Marks this person as softly deleted (tombstoned).
    pub(crate) fn soft_delete(&mut self) {
        self.status = PersonStatus::Deleted;
    }
}

impl Entity for Person {
    type Id = PersonId;

    fn id(&self) -> PersonId {
        self.id
    }
}
