//! Unit tests for the ordering module.
//!
//! Tests are organised by layer: pure domain types, the reorder arithmetic,
//! role capabilities, and the coordinator service.
