//! `splitbill-ledger` — entity model for groups, members and expenses.
//!
//! Pure domain logic only: no IO, no persistence concerns. The `Group`
//! aggregate owns every mutation invariant, so callers can only produce
//! consistent state.

pub mod expense;
pub mod group;
pub mod person;

pub use expense::{Expense, ExpenseInput};
pub use group::Group;
pub use person::{Person, PersonStatus};
