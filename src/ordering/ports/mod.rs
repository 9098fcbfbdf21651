//! Port contracts for dense-position ordering.
//!
//! Ports define infrastructure-agnostic interfaces used by ordering services.

pub mod store;

pub use store::{SiblingStore, SiblingStoreError, SiblingStoreResult};

#[cfg(test)]
pub use store::MockSiblingStore;
