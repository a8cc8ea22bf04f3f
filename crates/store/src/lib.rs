//! `splitbill-store` — the ledger store and its persistence contract.
//!
//! [`LedgerStore`] owns the group collection and the active-group
//! selection, and guarantees every mutation leaves the model valid before
//! it is persisted. Persistence goes through the [`SnapshotStore`]
//! contract; the store never knows the storage medium.

pub mod memory;
pub mod persistence;
pub mod store;

pub use memory::InMemorySnapshotStore;
pub use persistence::{SnapshotError, SnapshotStore};
pub use store::LedgerStore;
