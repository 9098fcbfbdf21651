//! Adapter implementations of the ordering ports.

pub mod memory;
pub mod postgres;
