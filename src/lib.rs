//! Trestle: ordered-position reordering engine for collaborative task boards.
//!
//! A task board holds ordered columns and each column holds ordered tasks.
//! Within one container the members' positions are always the dense sequence
//! `0..n-1` with no gaps and no duplicates. This crate implements the engine
//! that preserves that invariant across same-container reorders,
//! cross-container moves, creation-time appends, and removals, applying each
//! operation atomically against storage.
//!
//! # Architecture
//!
//! Trestle follows hexagonal architecture principles:
//!
//! - **Domain**: Pure reorder arithmetic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`ordering`]: Dense-position maintenance for board columns and tasks

pub mod ordering;
