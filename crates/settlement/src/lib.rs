//! `splitbill-settlement` — pure settlement computation.
//!
//! Maps a group's members and expenses to per-person balances and a
//! near-minimal transfer plan. No mutation, no IO: the engine consumes
//! read-only snapshots and always produces the same output for the same
//! input.

pub mod engine;

pub use engine::{
    EPSILON, PersonBalance, Settlement, SettlementResult, Transfer, compute_settlement,
    minimize_transfers,
};
