//! `splitbill-infra` — snapshot store implementations.
//!
//! The core only knows the `SnapshotStore` contract; this crate supplies
//! the actual storage medium.

pub mod json_file;

pub use json_file::JsonFileSnapshotStore;
