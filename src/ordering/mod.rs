//! Dense-position ordering for board columns and column tasks.
//!
//! This module implements the reordering engine of the board backend: given
//! a member (a column within a board, or a task within a column) and a
//! requested placement, it computes the minimal set of sibling position
//! shifts needed to realise the new ordering and applies them atomically,
//! so that every container's positions remain exactly `0..n-1`. The module
//! follows hexagonal architecture:
//!
//! - Domain types and the pure reorder arithmetic in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
